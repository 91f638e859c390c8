//! Fuzz target for parse_archive with arbitrary compressed input.
//!
//! Run with: cargo +nightly fuzz run parse_archive
//!
//! The input is used as the gzip member itself, so the fuzzer exercises the
//! header parser, the tolerant inflater, page scanning and record decoding.

#![no_main]

use fseventsd::emit::CountingSink;
use fseventsd::read::{ArchiveInput, ArchiveSource, ParseOptions};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let input = ArchiveInput::new(ArchiveSource::new("carved"), data.to_vec());
    let options = ParseOptions::new().max_decompressed_size(16 * 1024 * 1024);
    let sink = CountingSink::new();

    // Only panics and hangs matter here
    let _ = fseventsd::parse_archive(&input, &options, &sink);
});
