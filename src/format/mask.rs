//! The record flag mask and its static bit-to-label table.

/// Which output column a mask bit belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskKind {
    /// Item type: folder, file, symbolic link, hard link.
    Type,
    /// Change flag: created, removed, renamed, ...
    Flag,
    /// A bit that fseventsd never sets.
    Unused,
}

/// One entry of [`MASK_TABLE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaskBit {
    /// The bit value.
    pub bit: u32,
    /// Label written to the output, `;`-terminated.
    pub label: &'static str,
    /// Output column.
    pub kind: MaskKind,
}

const fn bit(bit: u32, label: &'static str, kind: MaskKind) -> MaskBit {
    MaskBit { bit, label, kind }
}

/// Bit-to-label mapping, in output order.
pub const MASK_TABLE: [MaskBit; 32] = [
    bit(0x0000_0001, "FolderEvent;", MaskKind::Type),
    bit(0x0000_0002, "Mount;", MaskKind::Flag),
    bit(0x0000_0004, "Unmount;", MaskKind::Flag),
    bit(0x0000_0020, "EndOfTransaction;", MaskKind::Flag),
    bit(0x0000_0800, "LastHardLinkRemoved;", MaskKind::Flag),
    bit(0x0000_1000, "HardLink;", MaskKind::Type),
    bit(0x0000_4000, "SymbolicLink;", MaskKind::Type),
    bit(0x0000_8000, "FileEvent;", MaskKind::Type),
    bit(0x0001_0000, "PermissionChange;", MaskKind::Flag),
    bit(0x0002_0000, "ExtendedAttrModified;", MaskKind::Flag),
    bit(0x0004_0000, "ExtendedAttrRemoved;", MaskKind::Flag),
    bit(0x0010_0000, "DocumentRevisioning;", MaskKind::Flag),
    bit(0x0040_0000, "ItemCloned;", MaskKind::Flag),
    bit(0x0100_0000, "Created;", MaskKind::Flag),
    bit(0x0200_0000, "Removed;", MaskKind::Flag),
    bit(0x0400_0000, "InodeMetaMod;", MaskKind::Flag),
    bit(0x0800_0000, "Renamed;", MaskKind::Flag),
    bit(0x1000_0000, "Modified;", MaskKind::Flag),
    bit(0x2000_0000, "Exchange;", MaskKind::Flag),
    bit(0x4000_0000, "FinderInfoMod;", MaskKind::Flag),
    bit(0x8000_0000, "FolderCreated;", MaskKind::Flag),
    bit(0x0000_0008, "NOT_USED-0x00000008;", MaskKind::Unused),
    bit(0x0000_0010, "NOT_USED-0x00000010;", MaskKind::Unused),
    bit(0x0000_0040, "NOT_USED-0x00000040;", MaskKind::Unused),
    bit(0x0000_0080, "NOT_USED-0x00000080;", MaskKind::Unused),
    bit(0x0000_0100, "NOT_USED-0x00000100;", MaskKind::Unused),
    bit(0x0000_0200, "NOT_USED-0x00000200;", MaskKind::Unused),
    bit(0x0000_0400, "NOT_USED-0x00000400;", MaskKind::Unused),
    bit(0x0000_2000, "NOT_USED-0x00002000;", MaskKind::Unused),
    bit(0x0008_0000, "NOT_USED-0x00080000;", MaskKind::Unused),
    bit(0x0020_0000, "NOT_USED-0x00200000;", MaskKind::Unused),
    bit(0x0080_0000, "NOT_USED-0x00800000;", MaskKind::Unused),
];

/// The 32-bit flag mask of a record (stored big-endian).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct EventMask(pub u32);

impl EventMask {
    /// The item is a folder.
    pub const FOLDER_EVENT: u32 = 0x0000_0001;
    /// The last hard link to the item was removed.
    pub const LAST_HARD_LINK_REMOVED: u32 = 0x0000_0800;
    /// The item is a hard link.
    pub const HARD_LINK: u32 = 0x0000_1000;
    /// The item is a symbolic link.
    pub const SYMBOLIC_LINK: u32 = 0x0000_4000;
    /// The item is a file.
    pub const FILE_EVENT: u32 = 0x0000_8000;
    /// The item was cloned (DLS2 only).
    pub const ITEM_CLONED: u32 = 0x0040_0000;
    /// The item was created.
    pub const CREATED: u32 = 0x0100_0000;
    /// The item was removed.
    pub const REMOVED: u32 = 0x0200_0000;
    /// A folder was created.
    pub const FOLDER_CREATED: u32 = 0x8000_0000;

    /// Union of all bits fseventsd never sets.
    pub const UNUSED_BITS: u32 = 0x0000_0008
        | 0x0000_0010
        | 0x0000_0040
        | 0x0000_0080
        | 0x0000_0100
        | 0x0000_0200
        | 0x0000_0400
        | 0x0000_2000
        | 0x0008_0000
        | 0x0020_0000
        | 0x0080_0000;

    /// Decodes the mask from its 4 big-endian bytes.
    pub fn from_be_bytes(bytes: [u8; 4]) -> Self {
        Self(u32::from_be_bytes(bytes))
    }

    /// Returns the raw mask value.
    pub fn bits(self) -> u32 {
        self.0
    }

    /// Returns `true` if every bit of `bits` is set.
    pub fn contains(self, bits: u32) -> bool {
        self.0 & bits == bits
    }

    /// Returns `true` if any bit the table marks unused is set.
    pub fn has_unused_bits(self) -> bool {
        self.0 & Self::UNUSED_BITS != 0
    }

    /// Concatenated labels of the set type bits, e.g. `FileEvent;`.
    pub fn type_labels(self) -> String {
        self.labels(|kind| kind == MaskKind::Type)
    }

    /// Concatenated labels of every other set bit, e.g. `Created;Modified;`.
    pub fn flag_labels(self) -> String {
        self.labels(|kind| kind != MaskKind::Type)
    }

    fn labels(self, want: impl Fn(MaskKind) -> bool) -> String {
        MASK_TABLE
            .iter()
            .filter(|entry| self.0 & entry.bit != 0 && want(entry.kind))
            .map(|entry| entry.label)
            .collect()
    }
}

impl std::fmt::LowerHex for EventMask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::LowerHex::fmt(&self.0, f)
    }
}
