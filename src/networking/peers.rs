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
#![deny(missing_docs)]

//! Peer roster loading.
//!
//! Peers are managed **out-of-band** (an admin edits the roster file, config
//! management ships it). The server only reads it at startup and syncs new
//! entries into the store.
//!
//! ## Format (TOML)
//! ```text
//! peers = [
//!     "https://bogbody.biz",
//!     "https://spring83.kindrobot.ca",
//! ]
//! ```
//!
//! Every entry must be an absolute `http`/`https` URL with a host.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::info;
use url::Url;

use crate::core::store::{BoardStore, StoreError};
use crate::core::types::Peer;

/// Peer roster errors.
#[derive(Debug, Error)]
pub enum PeerFileError {
    /// Cannot read the roster file.
    #[error("read roster")]
    Read,
    /// Cannot parse TOML.
    #[error("parse roster")]
    Parse,
    /// An entry is not an absolute http(s) URL.
    #[error("invalid peer url: {0}")]
    InvalidUrl(String),
    /// Store failure while syncing.
    #[error("store")]
    Store(#[from] StoreError),
}

#[derive(Debug, Deserialize)]
struct PeerFile {
    peers: Vec<String>,
}

/// Parse roster TOML into validated peers.
pub fn parse_peer_file(raw: &str) -> Result<Vec<Peer>, PeerFileError> {
    let file: PeerFile = toml::from_str(raw).map_err(|_| PeerFileError::Parse)?;

    let mut peers = Vec::with_capacity(file.peers.len());
    for entry in file.peers {
        let parsed = Url::parse(&entry).map_err(|_| PeerFileError::InvalidUrl(entry.clone()))?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
            return Err(PeerFileError::InvalidUrl(entry));
        }
        peers.push(Peer { url: entry });
    }
    Ok(peers)
}

/// Load a roster file and register any new peers. Returns the number added.
pub fn sync_peer_file(store: &BoardStore, path: &Path) -> Result<usize, PeerFileError> {
    let raw = std::fs::read_to_string(path).map_err(|_| PeerFileError::Read)?;
    let peers = parse_peer_file(&raw)?;

    let mut added = 0;
    for peer in &peers {
        if store.add_peer(&peer.url)? {
            added += 1;
        }
    }
    info!(
        roster = %path.display(),
        total = peers.len(),
        added,
        "peer roster synced"
    );
    Ok(added)
}
