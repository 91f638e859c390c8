//! Corruption heuristics for carved FSEvents logs.
//!
//! Logs recovered by data carving have no trustworthy name or modification
//! time, and their tail is often garbage that still happens to decode as
//! records. fseventsd never writes certain flag combinations, so the first
//! record carrying one marks the point from which the rest of the buffer is
//! presumed unreliable.
//!
//! Logs with an intact name/modification-time pairing are assumed
//! well-formed: only the event id 0 check applies to them.
//!
//! # Example
//!
//! ```rust
//! use fseventsd::format::{DlsVersion, EventMask};
//! use fseventsd::recovery::{InvalidReason, RecordValidator};
//!
//! let carved = RecordValidator::new(true);
//! let both = EventMask(EventMask::FOLDER_EVENT | EventMask::FILE_EVENT);
//! assert_eq!(
//!     carved.check(1, both, DlsVersion::V2),
//!     Err(InvalidReason::FolderAndFile)
//! );
//!
//! let named = RecordValidator::new(false);
//! assert!(named.check(1, both, DlsVersion::V2).is_ok());
//! ```

use crate::format::{DlsVersion, EventMask};

/// Why a record was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    /// Event id 0 is never issued.
    ZeroEventId,
    /// Both the folder and the file type bit are set.
    FolderAndFile,
    /// A folder event flagged `Created` without `FolderCreated`.
    FolderCreatedMissing,
    /// A file event flagged `FolderCreated`.
    FileWithFolderCreated,
    /// Both the symbolic link and the hard link type bit are set.
    SymlinkAndHardLink,
    /// `LastHardLinkRemoved` without the hard link type bit.
    LastHardLinkWithoutHardLink,
    /// `LastHardLinkRemoved` without `Removed`.
    LastHardLinkWithoutRemoved,
    /// A bit fseventsd never sets.
    UnusedBit,
    /// `ItemCloned` on a DLS1 page; the flag exists from DLS2 on.
    ClonedOnVersion1,
}

impl std::fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::ZeroEventId => "event id is 0",
            Self::FolderAndFile => "folder and file type bits both set",
            Self::FolderCreatedMissing => "folder created without FolderCreated flag",
            Self::FileWithFolderCreated => "file event with FolderCreated flag",
            Self::SymlinkAndHardLink => "symbolic link and hard link bits both set",
            Self::LastHardLinkWithoutHardLink => "LastHardLinkRemoved without HardLink type",
            Self::LastHardLinkWithoutRemoved => "LastHardLinkRemoved without Removed flag",
            Self::UnusedBit => "unused mask bit set",
            Self::ClonedOnVersion1 => "ItemCloned flag on a DLS1 page",
        };
        f.write_str(text)
    }
}

/// Checks decoded records against the flag combinations fseventsd writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordValidator {
    carved: bool,
}

impl RecordValidator {
    /// Creates a validator for an archive that is (or is not) carved.
    pub fn new(carved: bool) -> Self {
        Self { carved }
    }

    /// Returns whether mask heuristics are applied.
    pub fn is_carved(&self) -> bool {
        self.carved
    }

    /// Validates one record.
    ///
    /// Event id 0 is always rejected. Mask rules apply to carved archives
    /// only.
    pub fn check(
        &self,
        event_id: u64,
        mask: EventMask,
        version: DlsVersion,
    ) -> Result<(), InvalidReason> {
        if event_id == 0 {
            return Err(InvalidReason::ZeroEventId);
        }
        if self.carved {
            check_mask(mask, version)?;
        }
        Ok(())
    }
}

/// Applies the flag-combination rules to one mask, in a fixed order.
pub fn check_mask(mask: EventMask, version: DlsVersion) -> Result<(), InvalidReason> {
    let folder = mask.contains(EventMask::FOLDER_EVENT);
    let file = mask.contains(EventMask::FILE_EVENT);
    let folder_created = mask.contains(EventMask::FOLDER_CREATED);
    let last_hard_link = mask.contains(EventMask::LAST_HARD_LINK_REMOVED);

    if folder && file {
        return Err(InvalidReason::FolderAndFile);
    }
    if folder && mask.contains(EventMask::CREATED) && !folder_created {
        return Err(InvalidReason::FolderCreatedMissing);
    }
    if file && folder_created {
        return Err(InvalidReason::FileWithFolderCreated);
    }
    if mask.contains(EventMask::SYMBOLIC_LINK | EventMask::HARD_LINK) {
        return Err(InvalidReason::SymlinkAndHardLink);
    }
    if last_hard_link && !mask.contains(EventMask::HARD_LINK) {
        return Err(InvalidReason::LastHardLinkWithoutHardLink);
    }
    if last_hard_link && !mask.contains(EventMask::REMOVED) {
        return Err(InvalidReason::LastHardLinkWithoutRemoved);
    }
    if mask.has_unused_bits() {
        return Err(InvalidReason::UnusedBit);
    }
    if version == DlsVersion::V1 && mask.contains(EventMask::ITEM_CLONED) {
        return Err(InvalidReason::ClonedOnVersion1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const V1: DlsVersion = DlsVersion::V1;
    const V2: DlsVersion = DlsVersion::V2;

    fn carved(mask: u32, version: DlsVersion) -> Result<(), InvalidReason> {
        RecordValidator::new(true).check(1, EventMask(mask), version)
    }

    #[test]
    fn test_ordinary_masks_pass() {
        assert!(carved(EventMask::FILE_EVENT | EventMask::CREATED, V1).is_ok());
        assert!(
            carved(
                EventMask::FOLDER_EVENT | EventMask::FOLDER_CREATED | EventMask::CREATED,
                V1
            )
            .is_ok()
        );
        assert!(carved(EventMask::FILE_EVENT | EventMask::ITEM_CLONED, V2).is_ok());
        assert!(
            carved(
                EventMask::HARD_LINK | EventMask::LAST_HARD_LINK_REMOVED | EventMask::REMOVED,
                V2
            )
            .is_ok()
        );
    }

    #[test]
    fn test_each_rule() {
        assert_eq!(
            carved(EventMask::FOLDER_EVENT | EventMask::FILE_EVENT, V2),
            Err(InvalidReason::FolderAndFile)
        );
        assert_eq!(
            carved(EventMask::FOLDER_EVENT | EventMask::CREATED, V2),
            Err(InvalidReason::FolderCreatedMissing)
        );
        assert_eq!(
            carved(EventMask::FILE_EVENT | EventMask::FOLDER_CREATED, V2),
            Err(InvalidReason::FileWithFolderCreated)
        );
        assert_eq!(
            carved(EventMask::SYMBOLIC_LINK | EventMask::HARD_LINK, V2),
            Err(InvalidReason::SymlinkAndHardLink)
        );
        assert_eq!(
            carved(EventMask::LAST_HARD_LINK_REMOVED | EventMask::REMOVED, V2),
            Err(InvalidReason::LastHardLinkWithoutHardLink)
        );
        assert_eq!(
            carved(EventMask::HARD_LINK | EventMask::LAST_HARD_LINK_REMOVED, V2),
            Err(InvalidReason::LastHardLinkWithoutRemoved)
        );
        assert_eq!(
            carved(EventMask::FILE_EVENT | 0x0020_0000, V2),
            Err(InvalidReason::UnusedBit)
        );
        assert_eq!(
            carved(EventMask::FILE_EVENT | EventMask::ITEM_CLONED, V1),
            Err(InvalidReason::ClonedOnVersion1)
        );
    }

    #[test]
    fn test_folder_created_alone_is_fine_on_folder() {
        assert!(carved(EventMask::FOLDER_EVENT | EventMask::FOLDER_CREATED, V1).is_ok());
    }

    #[test]
    fn test_zero_event_id_always_rejected() {
        for validator in [RecordValidator::new(true), RecordValidator::new(false)] {
            assert_eq!(
                validator.check(0, EventMask(EventMask::FILE_EVENT), V2),
                Err(InvalidReason::ZeroEventId)
            );
        }
    }

    #[test]
    fn test_non_carved_skips_mask_rules() {
        let validator = RecordValidator::new(false);
        assert!(!validator.is_carved());
        assert!(validator.check(7, EventMask(u32::MAX), V1).is_ok());
    }
}
