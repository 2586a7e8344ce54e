// Copyright (c) 2026 Lets Dance
// Licensed under the Apache-2.0 License.

#![no_main]
#![forbid(unsafe_code)]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Best-effort: ensure roster parsing does not panic. URL validation is
    // covered by unit tests; here we focus on parser robustness.
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = lets_dance::networking::peers::parse_peer_file(s);
    }
});
