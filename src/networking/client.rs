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

//! Outbound HTTP client for peer servers.
//!
//! Transport problems surface as a typed error; HTTP-level statuses
//! (including 4xx/5xx) come back non-exceptionally so the gossip layer can
//! apply its own retry rule.

use std::time::Duration;

use reqwest::header;
use thiserror::Error;
use url::Url;

use crate::core::constants::{
    SIGNATURE_PREFIX, SPRING_VERSION, SPRING_VERSION_HEADER, USER_AGENT,
};
use crate::core::timecodec::format_http_date;
use crate::core::types::Board;

/// Connect + read timeout for peer requests.
const PEER_TIMEOUT: Duration = Duration::from_secs(5);

/// Client error.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("http client build")]
    Build,
    #[error("invalid peer url")]
    BadUrl,
    #[error("transport: {0}")]
    Transport(String),
}

/// A board fetched from a peer.
#[derive(Clone, Debug)]
pub struct FetchedBoard {
    /// HTTP status returned by the peer.
    pub status: u16,
    /// Body, present on 200.
    pub content: Option<String>,
    /// Hex signature from the `Authorization` header, if framed correctly.
    pub signature: Option<String>,
}

/// HTTP client for outbound peer traffic.
#[derive(Clone)]
pub struct PeerClient {
    http: reqwest::Client,
}

impl PeerClient {
    /// Build a client with the standard user agent and peer timeouts.
    pub fn new() -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(PEER_TIMEOUT)
            .connect_timeout(PEER_TIMEOUT)
            .build()
            .map_err(|_| ClientError::Build)?;
        Ok(Self { http })
    }

    /// Resolve `/{key}` against a peer base URL.
    fn board_url(&self, peer_url: &str, key: &str) -> Result<Url, ClientError> {
        Url::parse(peer_url)
            .and_then(|base| base.join(&format!("/{key}")))
            .map_err(|_| ClientError::BadUrl)
    }

    /// PUT a board to a peer. Returns the peer's HTTP status.
    pub async fn put_board(&self, board: &Board, peer_url: &str) -> Result<u16, ClientError> {
        let url = self.board_url(peer_url, &board.key)?;
        let response = self
            .http
            .put(url)
            .header(header::CONTENT_TYPE, "text/html;charset=utf-8")
            .header(SPRING_VERSION_HEADER, SPRING_VERSION)
            .header(
                header::IF_UNMODIFIED_SINCE,
                format_http_date(board.last_modified),
            )
            .header(
                header::AUTHORIZATION,
                format!("{SIGNATURE_PREFIX}{}", board.signature),
            )
            .body(board.content.clone())
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        Ok(response.status().as_u16())
    }

    /// GET a board from a peer.
    pub async fn get_board(&self, key: &str, peer_url: &str) -> Result<FetchedBoard, ClientError> {
        let url = self.board_url(peer_url, key)?;
        let response = self
            .http
            .get(url)
            .header(SPRING_VERSION_HEADER, SPRING_VERSION)
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let signature = response
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix(SIGNATURE_PREFIX))
            .map(str::to_string);

        let content = if status == 200 {
            Some(
                response
                    .text()
                    .await
                    .map_err(|e| ClientError::Transport(e.to_string()))?,
            )
        } else {
            None
        };

        Ok(FetchedBoard {
            status,
            content,
            signature,
        })
    }
}
