//! Fuzz target for page scanning and record decoding on inflated bytes.
//!
//! Run with: cargo +nightly fuzz run decode_page

#![no_main]

use fseventsd::format::{RecordDecoder, scan_pages};
use fseventsd::recovery::RecordValidator;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let validator = RecordValidator::new(true);
    for page in scan_pages(data) {
        for record in RecordDecoder::new(page.bytes(data), page.version, page.start) {
            let _ = record.file_name();
            let _ = record.mask.flag_labels();
            if validator
                .check(record.event_id, record.mask, record.version)
                .is_err()
            {
                return;
            }
        }
    }
});
