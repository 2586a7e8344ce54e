// Copyright (c) 2026 Lets Dance
// Licensed under the Apache-2.0 License.

#![no_main]
#![forbid(unsafe_code)]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Board bodies are arbitrary attacker-controlled HTML; extraction must
    // never panic, whatever the markup looks like.
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = lets_dance::core::html::extract_time_tags(s);
    }
});
