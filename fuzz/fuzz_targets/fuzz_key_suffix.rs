// Copyright (c) 2026 Lets Dance
// Licensed under the Apache-2.0 License.

#![no_main]
#![forbid(unsafe_code)]

use chrono::{TimeZone, Utc};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let now = Utc.with_ymd_and_hms(2022, 5, 20, 0, 0, 0).unwrap();
        let _ = lets_dance::core::crypto::validate_public_key(s, now);
    }
});
