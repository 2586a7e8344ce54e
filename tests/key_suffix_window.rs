// Copyright (c) 2026 Lets Dance
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//     http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

#![forbid(unsafe_code)]

use chrono::{DateTime, TimeZone, Utc};
use lets_dance::core::crypto::validate_public_key;
use lets_dance::core::types::is_board_key;

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2022, 5, 20, 0, 0, 0).unwrap()
}

fn key_with_suffix(mmyy: &str) -> String {
    assert_eq!(mmyy.len(), 4);
    format!("{}83e{mmyy}", "c".repeat(57))
}

#[test]
fn suffix_dates_within_window_are_valid() {
    for date in ["0522", "0622", "1223", "0524"] {
        assert!(
            validate_public_key(&key_with_suffix(date), fixed_now()),
            "expected {date} to be valid"
        );
    }
}

#[test]
fn suffix_dates_outside_window_are_invalid() {
    // Past months, and months more than two years out.
    for date in ["0521", "0422", "0525", "0624"] {
        assert!(
            !validate_public_key(&key_with_suffix(date), fixed_now()),
            "expected {date} to be invalid"
        );
    }
}

#[test]
fn suffix_must_sit_at_the_very_end() {
    let key = key_with_suffix("0522");

    // Replacing the final character breaks the pattern.
    let mut tail_broken = key.clone();
    tail_broken.replace_range(63.., "a");
    assert!(!validate_public_key(&tail_broken, fixed_now()));

    // Shifting the pattern off the end breaks it too.
    let shifted = format!("{}83e05209", "c".repeat(56));
    assert!(!validate_public_key(&shifted, fixed_now()));
}

#[test]
fn suffix_shape_is_checked() {
    // Month out of range.
    assert!(!validate_public_key(&key_with_suffix("0022"), fixed_now()));
    assert!(!validate_public_key(&key_with_suffix("1322"), fixed_now()));
    // Non-digit month/year.
    assert!(!validate_public_key(&key_with_suffix("a522"), fixed_now()));
    assert!(!validate_public_key(&key_with_suffix("05b2"), fixed_now()));
    // Too short to carry a suffix at all.
    assert!(!validate_public_key("83e052", fixed_now()));
    assert!(!validate_public_key("", fixed_now()));
}

#[test]
fn board_key_shape() {
    assert!(is_board_key(&"a".repeat(64)));
    assert!(is_board_key(&format!("{:064x}", 0xdeadbeefu32)));

    assert!(!is_board_key(&"a".repeat(63)));
    assert!(!is_board_key(&"a".repeat(65)));
    assert!(!is_board_key(&"A".repeat(64)));
    assert!(!is_board_key(&"g".repeat(64)));
    assert!(!is_board_key(""));
}
