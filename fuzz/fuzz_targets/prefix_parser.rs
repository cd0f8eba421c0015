//! Fuzz target for prefix parsing
//!
//! Prefix parsing is documented as infallible; this target checks that
//! it neither panics nor loses the raw text.

#![no_main]

use libfuzzer_sys::fuzz_target;
use std::str;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = str::from_utf8(data) {
        let prefix = slirc_client::Prefix::parse(input);
        assert_eq!(prefix.raw, input);
    }
});
