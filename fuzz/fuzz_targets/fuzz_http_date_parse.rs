// Copyright (c) 2026 Lets Dance
// Licensed under the Apache-2.0 License.

#![no_main]
#![forbid(unsafe_code)]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = lets_dance::core::timecodec::parse_http_date(s);
        let _ = lets_dance::core::timecodec::parse_board_time(s);
    }
});
