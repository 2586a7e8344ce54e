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
#![warn(missing_docs)]

//! Instant codecs: RFC 1123 HTTP dates and the board `<time>` tag format.
//!
//! All comparisons in the protocol happen at 1-second resolution, so both
//! parsers truncate any sub-second component.

use chrono::{DateTime, NaiveDateTime, Utc};

/// `strftime` pattern of the `datetime` attribute carried in board HTML.
pub const BOARD_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Format an instant as an RFC 1123 / IMF-fixdate HTTP date,
/// e.g. `Sun, 06 Nov 1994 08:49:37 GMT`.
pub fn format_http_date(when: DateTime<Utc>) -> String {
    when.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Parse an RFC 1123 HTTP date. Returns `None` on malformed input; the
/// caller decides whether that is a 400 or merely skips a conditional check.
pub fn parse_http_date(raw: &str) -> Option<DateTime<Utc>> {
    let parsed = DateTime::parse_from_rfc2822(raw).ok()?;
    DateTime::from_timestamp(parsed.timestamp(), 0)
}

/// Format an instant for a board `<time datetime="...">` attribute.
pub fn format_board_time(when: DateTime<Utc>) -> String {
    when.format(BOARD_TIME_FORMAT).to_string()
}

/// Parse a board `datetime` attribute. Strict: the format is exactly
/// `YYYY-MM-DDTHH:MM:SSZ`.
pub fn parse_board_time(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw, BOARD_TIME_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Abstraction over wall-clock time so handlers and jobs are testable with
/// a fixed instant.
pub trait Clock: Send + Sync {
    /// Current UTC instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
