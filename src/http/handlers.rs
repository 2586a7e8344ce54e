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

//! Protocol handlers: the index page, `GET /{key}`, `PUT /{key}` and the
//! metrics endpoint.
//!
//! The PUT pipeline runs its checks in a fixed order: cheap shape checks
//! (size, key) before signature verification, header freshness before body
//! parsing. The body's `<time>` tag is the authoritative `last_modified`.

use std::fmt::Write as _;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use chrono::{DateTime, Utc};
use prometheus::{Encoder, TextEncoder};

use crate::core::constants::{
    BOARD_MAX_SIZE_BYTES, SIGNATURE_PREFIX, SPRING_DIFFICULTY_HEADER, SPRING_VERSION,
    SPRING_VERSION_HEADER, TEST_KEY_PUBLIC,
};
use crate::core::crypto::{self, KeyPolicy};
use crate::core::html::extract_time_tags;
use crate::core::store::{BoardStore, StoreError};
use crate::core::timecodec::{format_http_date, parse_board_time, parse_http_date, Clock};
use crate::core::types::{is_board_key, Board};
use crate::http::error::{ApiError, SpringError};
use crate::monitoring::metrics::{Metrics, MetricsError};
use crate::tasks::Gossip;

/// Boards listed on the index page.
const INDEX_BOARD_LIMIT: usize = 500;

const OLD_TIMESTAMP: &str =
    "Board was submitted with a timestamp older than the server's timestamp.";

/// Shared handler state. All components are injected so tests can substitute
/// a fixed clock, a permissive key policy and an unstarted scheduler.
#[derive(Clone)]
pub struct AppState {
    /// Durable board/peer store.
    pub store: BoardStore,
    /// Gossip engine fed by successful PUTs.
    pub gossip: Gossip,
    /// Wall clock.
    pub clock: Arc<dyn Clock>,
    /// Key-suffix acceptance policy.
    pub key_policy: Arc<dyn KeyPolicy>,
    /// Metrics container.
    pub metrics: Arc<Metrics>,
}

fn spring_version_value() -> HeaderValue {
    HeaderValue::from_static(SPRING_VERSION)
}

fn signature_header(signature: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("{SIGNATURE_PREFIX}{signature}"))
        .expect("hex signature header value")
}

/// `GET /`: newsstand index with the current difficulty factor.
pub async fn index(State(state): State<AppState>) -> Result<Response, ApiError> {
    let boards = state.store.sample(INDEX_BOARD_LIMIT)?;
    let difficulty = state.store.difficulty();
    state.metrics.boards_stored.set(state.store.count() as i64);

    let mut page = String::from(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\">\
         <title>Spring '83 newsstand</title></head>\n<body>\n<h1>Spring '83</h1>\n<ul>\n",
    );
    for board in &boards {
        let _ = writeln!(
            page,
            "<li><a href=\"/{key}\">{key}</a> &mdash; {modified}</li>",
            key = board.key,
            modified = format_http_date(board.last_modified),
        );
    }
    page.push_str("</ul>\n</body>\n</html>\n");

    let mut response = Html(page).into_response();
    let headers = response.headers_mut();
    headers.insert(SPRING_VERSION_HEADER, spring_version_value());
    headers.insert(
        SPRING_DIFFICULTY_HEADER,
        HeaderValue::from_str(&format!("{difficulty}")).expect("difficulty header value"),
    );
    Ok(response)
}

/// `GET /{key}`: retrieve a board from the server.
pub async fn get_board(
    State(state): State<AppState>,
    Path(key): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    if !is_board_key(&key) {
        return Ok(StatusCode::NOT_FOUND.into_response());
    }

    let board = if key == TEST_KEY_PUBLIC {
        Board::test_board(state.clock.now())?
    } else {
        state.store.get(&key)?.ok_or(SpringError::NotFound(
            "No board for this key found on this server.",
        ))?
    };

    if let Some(raw) = headers.get(header::IF_MODIFIED_SINCE) {
        // Malformed conditional headers just skip the check.
        if let Some(since) = raw.to_str().ok().and_then(parse_http_date) {
            if since > board.last_modified {
                return Err(SpringError::NotModified(
                    "Board requested is newer than server's timestamp.",
                )
                .into());
            }
        }
    }

    let mut response = Html(board.content).into_response();
    let headers = response.headers_mut();
    headers.insert(SPRING_VERSION_HEADER, spring_version_value());
    headers.insert(header::AUTHORIZATION, signature_header(&board.signature));
    Ok(response)
}

/// `PUT /{key}`: create or replace a board on the server.
pub async fn put_board(
    State(state): State<AppState>,
    Path(key): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    if !is_board_key(&key) {
        return Ok(StatusCode::NOT_FOUND.into_response());
    }
    let now = state.clock.now();

    if body.len() > BOARD_MAX_SIZE_BYTES {
        return Err(SpringError::TooLarge(BOARD_MAX_SIZE_BYTES).into());
    }
    let content = std::str::from_utf8(&body)
        .map_err(|_| SpringError::BadRequest("Board content must be valid UTF-8."))?;

    if key == TEST_KEY_PUBLIC {
        return Err(SpringError::Unauthorized("Cannot PUT board with test key value.").into());
    }
    if !state.key_policy.validate_public_key(&key, now) {
        return Err(SpringError::BadRequest("Key does not end with a valid suffix.").into());
    }

    // The signature covers the raw body bytes.
    let signature = validate_signature(&headers, &key, &body)?;

    let existing = state.store.get(&key)?;
    validate_last_modified_header(&headers, existing.as_ref())?;
    let last_modified = validate_last_modified_meta(content, existing.as_ref(), now)?;

    let board = Board {
        key,
        content: content.to_string(),
        signature,
        last_modified,
    };
    let created = match state.store.upsert(&board) {
        Ok(created) => created,
        // A concurrent writer won the race since the check above.
        Err(StoreError::Stale) => return Err(SpringError::Conflict(OLD_TIMESTAMP).into()),
        Err(e) => return Err(e.into()),
    };

    if created {
        state.metrics.boards_created_total.inc();
    } else {
        state.metrics.boards_updated_total.inc();
    }
    state.metrics.boards_stored.set(state.store.count() as i64);

    state.gossip.enqueue_broadcast(&board.key);

    let message = if created {
        "Board was successfully created."
    } else {
        "Board was successfully updated."
    };
    let mut response = (StatusCode::OK, message).into_response();
    let headers = response.headers_mut();
    headers.insert(SPRING_VERSION_HEADER, spring_version_value());
    headers.insert(header::AUTHORIZATION, signature_header(&board.signature));
    Ok(response)
}

/// Check the `Authorization` framing and verify the signature over `body`.
fn validate_signature(
    headers: &HeaderMap,
    key: &str,
    body: &[u8],
) -> Result<String, SpringError> {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(SpringError::Unauthorized("Missing authorization header."))?;
    let signature = authorization
        .strip_prefix(SIGNATURE_PREFIX)
        .ok_or(SpringError::Unauthorized("Invalid authorization format."))?;
    if !crypto::verify(key, signature, body) {
        return Err(SpringError::Unauthorized(
            "Board was submitted without a valid signature.",
        ));
    }
    Ok(signature.to_string())
}

/// On updates, `If-Unmodified-Since` is required and must be strictly newer
/// than the stored board. Creates carry no stored timestamp to compare with.
fn validate_last_modified_header(
    headers: &HeaderMap,
    existing: Option<&Board>,
) -> Result<(), SpringError> {
    let Some(existing) = existing else {
        return Ok(());
    };

    let raw = headers
        .get(header::IF_UNMODIFIED_SINCE)
        .and_then(|v| v.to_str().ok())
        .ok_or(SpringError::BadRequest("Missing If-Unmodified-Since header."))?;
    let unmodified_since = parse_http_date(raw).ok_or(SpringError::BadRequest(
        "Unable to parse If-Unmodified-Since header.",
    ))?;

    if unmodified_since <= existing.last_modified {
        return Err(SpringError::Conflict(OLD_TIMESTAMP));
    }
    Ok(())
}

/// Extract the authoritative last-modified instant from the single `<time>`
/// tag the board body must carry.
fn validate_last_modified_meta(
    content: &str,
    existing: Option<&Board>,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>, SpringError> {
    let tags = extract_time_tags(content);
    if tags.count == 0 {
        return Err(SpringError::BadRequest(
            "Board is missing last-modified <time> tag.",
        ));
    }
    if tags.count > 1 {
        return Err(SpringError::BadRequest(
            "Board contains more than one last-modified <time> tag",
        ));
    }

    let last_modified = tags
        .first_datetime
        .as_deref()
        .and_then(parse_board_time)
        .ok_or(SpringError::BadRequest(
            "Unable to parse date from last-modified <time> tag.",
        ))?;

    if last_modified > now {
        return Err(SpringError::BadRequest(
            "Board was submitted with a timestamp in the future.",
        ));
    }
    if let Some(existing) = existing {
        if last_modified <= existing.last_modified {
            return Err(SpringError::Conflict(OLD_TIMESTAMP));
        }
    }
    Ok(last_modified)
}

/// `GET /metrics`: Prometheus text exposition.
pub async fn metrics(State(state): State<AppState>) -> Result<Response, ApiError> {
    let mut buf = Vec::new();
    TextEncoder::new()
        .encode(&state.metrics.registry.gather(), &mut buf)
        .map_err(|_| MetricsError::Prom)?;
    Ok(([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], buf).into_response())
}
