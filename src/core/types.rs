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

//! Core records, the canonical store codec and server settings.

use std::net::SocketAddr;
use std::path::PathBuf;

use bincode::Options;
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

use crate::core::constants::{TEST_KEY_PUBLIC, TEST_KEY_SECRET};
use crate::core::crypto::{self, CryptoError};
use crate::core::html::generate_board_content;

/// Canonical serialization error.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("serialization")]
    Serialize,
    #[error("deserialization")]
    Deserialize,
    #[error("size limit exceeded")]
    TooLarge,
}

/// Canonical bincode options (deterministic).
fn bincode_opts() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .reject_trailing_bytes()
}

/// Encode a record with deterministic rules.
pub fn encode_canonical<T: Serialize>(v: &T) -> Result<Vec<u8>, CodecError> {
    bincode_opts()
        .serialize(v)
        .map_err(|_| CodecError::Serialize)
}

/// Decode a record with a hard size cap.
pub fn decode_canonical_limited<T: DeserializeOwned>(
    bytes: &[u8],
    max: usize,
) -> Result<T, CodecError> {
    if bytes.len() > max {
        return Err(CodecError::TooLarge);
    }
    // Defensive cap inside the deserializer as well, so container lengths in
    // a corrupt value cannot request unbounded allocations.
    bincode_opts()
        .with_limit(max as u64)
        .deserialize(bytes)
        .map_err(|_| CodecError::Deserialize)
}

/// A published board: one per Ed25519 public key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    /// 64 lowercase hex chars, the owning public key.
    pub key: String,
    /// UTF-8 board HTML, at most `BOARD_MAX_SIZE_BYTES` when encoded.
    pub content: String,
    /// 128 lowercase hex chars, Ed25519 signature over `content`.
    pub signature: String,
    /// Timestamp embedded in the body's `<time>` tag, 1 s resolution.
    pub last_modified: DateTime<Utc>,
}

impl Board {
    /// Synthesize the well-known test board: a fresh filler body carrying a
    /// single `<time>` tag at `now` (truncated to whole seconds), signed with
    /// the embedded test secret.
    pub fn test_board(now: DateTime<Utc>) -> Result<Board, CryptoError> {
        let last_modified = DateTime::from_timestamp(now.timestamp(), 0).unwrap_or(now);
        let content = generate_board_content(last_modified);
        let signature = crypto::sign(TEST_KEY_SECRET, content.as_bytes())?;
        Ok(Board {
            key: TEST_KEY_PUBLIC.to_string(),
            content,
            signature,
            last_modified,
        })
    }
}

/// A known peer server, identified by its absolute base URL.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Peer {
    /// Absolute HTTP(S) base URL.
    pub url: String,
}

/// Path-parameter shape of a board key: exactly 64 lowercase hex characters.
pub fn is_board_key(raw: &str) -> bool {
    raw.len() == 64
        && raw
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

/// Settings error.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("DEBUG must be a boolean")]
    BadDebug,
    #[error("SECRET_KEY is required when DEBUG is false")]
    MissingSecretKey,
    #[error("TRUSTED_ORIGIN is required when DEBUG is false")]
    MissingTrustedOrigin,
    #[error("invalid listen address")]
    BadListenAddr,
}

/// Server settings, sourced from the environment.
#[derive(Clone, Debug)]
pub struct Settings {
    /// Development mode. Relaxes the secret/origin requirements.
    pub debug: bool,
    /// Secret for the admin console collaborator. Required in production.
    pub secret_key: String,
    /// Trusted origin for the admin console collaborator.
    pub trusted_origin: Option<String>,
    /// HTTP listen address.
    pub listen_addr: SocketAddr,
    /// Data directory (store + peer roster).
    pub data_dir: String,
    /// Optional explicit peer roster path.
    pub peer_file: Option<PathBuf>,
}

impl Settings {
    /// Load settings from the process environment.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through an injectable lookup, so tests never have to
    /// mutate the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let debug = match lookup("DEBUG").as_deref().map(str::trim) {
            None | Some("") => true,
            Some(raw) => match raw.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => return Err(SettingsError::BadDebug),
            },
        };

        let secret_key = match (debug, lookup("SECRET_KEY")) {
            (_, Some(secret)) if !secret.is_empty() => secret,
            (true, _) => "PLEASE_REPLACE_ME!".to_string(),
            (false, _) => return Err(SettingsError::MissingSecretKey),
        };

        let trusted_origin = lookup("TRUSTED_ORIGIN").filter(|v| !v.is_empty());
        if !debug && trusted_origin.is_none() {
            return Err(SettingsError::MissingTrustedOrigin);
        }

        let listen_addr = lookup("LETSDANCE_LISTEN_ADDR")
            .unwrap_or_else(|| "0.0.0.0:8000".to_string())
            .parse::<SocketAddr>()
            .map_err(|_| SettingsError::BadListenAddr)?;

        let data_dir = lookup("LETSDANCE_DATA_DIR").unwrap_or_else(|| "./data".to_string());
        let peer_file = lookup("LETSDANCE_PEERS_FILE").map(PathBuf::from);

        Ok(Settings {
            debug,
            secret_key,
            trusted_origin,
            listen_addr,
            data_dir,
            peer_file,
        })
    }
}
