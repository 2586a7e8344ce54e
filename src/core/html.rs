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

//! Board HTML helpers: `<time>` tag inspection and filler content generation.
//!
//! Boards are arbitrary, frequently malformed HTML fragments, so inspection
//! goes through an HTML5 fragment parser rather than anything XML-strict.

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use scraper::{Html, Selector};

use crate::core::timecodec::format_board_time;

/// Result of scanning a board body for `<time>` tags.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TimeTags {
    /// Number of `<time>` elements in the fragment.
    pub count: usize,
    /// `datetime` attribute of the first `<time>` element, if any.
    pub first_datetime: Option<String>,
}

/// Scan `content` for `<time>` elements. Tolerant of malformed markup; the
/// caller enforces the exactly-one rule.
pub fn extract_time_tags(content: &str) -> TimeTags {
    let fragment = Html::parse_fragment(content);
    let selector = Selector::parse("time").expect("static selector");

    let mut tags = TimeTags::default();
    for element in fragment.select(&selector) {
        if tags.count == 0 {
            tags.first_datetime = element.value().attr("datetime").map(str::to_string);
        }
        tags.count += 1;
    }
    tags
}

const FILLER_SENTENCES: [&str; 12] = [
    "The newsstand on the corner has a fresh stack of boards this morning.",
    "Somebody taped a hand-written note over the timetable again.",
    "Rain on the skylight, coffee going cold, nothing else to report.",
    "The river was higher than last week but the ferries still ran.",
    "A good day for flying kites from the roof of the library.",
    "We counted forty-one swifts over the market square at dusk.",
    "The print shop smells of solvent and warm paper.",
    "New chalk drawings by the south entrance, worth the detour.",
    "Half the street lights are out and the stars are better for it.",
    "The allotment gate is fixed; bring your own string.",
    "Lost: one glove, grey wool. Found: one glove, also grey wool.",
    "Closing early on Thursday for the spring dance.",
];

/// Generate filler board content carrying a single `<time>` tag at
/// `last_modified`. Used for the synthetic test board and the seed command.
pub fn generate_board_content(last_modified: DateTime<Utc>) -> String {
    let mut rng = rand::thread_rng();
    let mut out = format!(
        "<time datetime=\"{}\">\n",
        format_board_time(last_modified)
    );
    let paragraphs = rng.gen_range(2..=4);
    for _ in 0..paragraphs {
        let picks = rng.gen_range(1..=3);
        let sentences = FILLER_SENTENCES
            .choose_multiple(&mut rng, picks)
            .copied()
            .collect::<Vec<_>>()
            .join(" ");
        out.push_str("<p>");
        out.push_str(&sentences);
        out.push_str("</p>\n");
    }
    out
}
