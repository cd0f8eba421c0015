//! Fuzz target for IRC line parsing
//!
//! Feeds randomly generated input to the parser and ensures it never
//! panics: any outcome must be a clean `Ok` or `Err`.

#![no_main]

use libfuzzer_sys::fuzz_target;
use std::str;

fuzz_target!(|data: &[u8]| {
    // Only fuzz valid UTF-8 strings to focus on protocol-level issues
    if let Ok(input) = str::from_utf8(data) {
        // Skip very long inputs (over 512 bytes is unusual for IRC)
        if input.len() > 512 {
            return;
        }

        // Parsing must never panic
        if let Ok(msg) = input.parse::<slirc_client::Message>() {
            // Neither may re-serializing whatever parsed
            let _ = msg.to_string();
        }
    }
});
