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

//! Durable board and peer storage on sled.
//!
//! Two trees: `boards` (key = 64-hex board key, value = canonical record)
//! and `peers` (key = peer base URL). The monotonic last-modified rule is
//! enforced inside the upsert transaction, which makes writes linearizable
//! per key without any lock held across I/O.

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sled::transaction::{ConflictableTransactionError, TransactionError};
use thiserror::Error;

use crate::core::constants::{BOARD_MAX_COUNT, BOARD_MAX_SIZE_BYTES};
use crate::core::types::{decode_canonical_limited, encode_canonical, Board, Peer};

/// Stored record cap: board content plus the hex signature and framing.
const RECORD_MAX_BYTES: usize = BOARD_MAX_SIZE_BYTES + 512;

/// Store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("db open")]
    DbOpen,
    #[error("db io")]
    DbIo,
    #[error("codec")]
    Codec,
    /// The write carried a last-modified not strictly newer than the row.
    #[error("stale write")]
    Stale,
}

/// On-disk board record. The key lives in the tree key, not the value.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct BoardRecord {
    content: String,
    signature: String,
    last_modified_secs: i64,
}

impl BoardRecord {
    fn into_board(self, key: &str) -> Result<Board, StoreError> {
        let last_modified =
            DateTime::from_timestamp(self.last_modified_secs, 0).ok_or(StoreError::Codec)?;
        Ok(Board {
            key: key.to_string(),
            content: self.content,
            signature: self.signature,
            last_modified,
        })
    }
}

/// Durable board store.
#[derive(Clone)]
pub struct BoardStore {
    boards: sled::Tree,
    peers: sled::Tree,
}

impl BoardStore {
    /// Open (or create) the store under `path`.
    pub fn open(path: &str) -> Result<Self, StoreError> {
        let db = sled::open(path).map_err(|_| StoreError::DbOpen)?;
        let boards = db.open_tree("boards").map_err(|_| StoreError::DbOpen)?;
        let peers = db.open_tree("peers").map_err(|_| StoreError::DbOpen)?;
        Ok(Self { boards, peers })
    }

    /// Fetch a board by key.
    pub fn get(&self, key: &str) -> Result<Option<Board>, StoreError> {
        let Some(value) = self.boards.get(key.as_bytes()).map_err(|_| StoreError::DbIo)? else {
            return Ok(None);
        };
        let record: BoardRecord =
            decode_canonical_limited(&value, RECORD_MAX_BYTES).map_err(|_| StoreError::Codec)?;
        record.into_board(key).map(Some)
    }

    /// Insert or replace the board under its key. Returns `true` when a new
    /// row was created.
    ///
    /// Rejects with [`StoreError::Stale`] when an existing row is not
    /// strictly older; the check runs inside the transaction so concurrent
    /// writers for the same key serialize correctly.
    pub fn upsert(&self, board: &Board) -> Result<bool, StoreError> {
        let record = BoardRecord {
            content: board.content.clone(),
            signature: board.signature.clone(),
            last_modified_secs: board.last_modified.timestamp(),
        };
        let value = encode_canonical(&record).map_err(|_| StoreError::Codec)?;
        let key = board.key.as_bytes();

        let result = self.boards.transaction(|tree| {
            let created = match tree.get(key)? {
                Some(existing) => {
                    let old: BoardRecord = decode_canonical_limited(&existing, RECORD_MAX_BYTES)
                        .map_err(|_| ConflictableTransactionError::Abort(StoreError::Codec))?;
                    if old.last_modified_secs >= record.last_modified_secs {
                        return Err(ConflictableTransactionError::Abort(StoreError::Stale));
                    }
                    false
                }
                None => true,
            };
            tree.insert(key, value.as_slice())?;
            Ok(created)
        });

        match result {
            Ok(created) => Ok(created),
            Err(TransactionError::Abort(e)) => Err(e),
            Err(TransactionError::Storage(_)) => Err(StoreError::DbIo),
        }
    }

    /// Number of boards stored.
    pub fn count(&self) -> usize {
        self.boards.len()
    }

    /// Delete all boards with `last_modified < before`. Returns the number
    /// removed.
    pub fn expire(&self, before: DateTime<Utc>) -> Result<usize, StoreError> {
        let cutoff = before.timestamp();
        let mut removed = 0;
        for item in self.boards.iter() {
            let (key, value) = item.map_err(|_| StoreError::DbIo)?;
            let record: BoardRecord =
                decode_canonical_limited(&value, RECORD_MAX_BYTES).map_err(|_| StoreError::Codec)?;
            if record.last_modified_secs < cutoff {
                self.boards.remove(&key).map_err(|_| StoreError::DbIo)?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Difficulty factor in `[0, 1]`: `(count / BOARD_MAX_COUNT)^4`.
    pub fn difficulty(&self) -> f64 {
        (self.count() as f64 / BOARD_MAX_COUNT as f64)
            .powi(4)
            .clamp(0.0, 1.0)
    }

    /// Up to `limit` boards in random order, for the index page.
    pub fn sample(&self, limit: usize) -> Result<Vec<Board>, StoreError> {
        let mut rng = rand::thread_rng();

        // Reservoir over raw entries; decode only the survivors.
        let mut reservoir: Vec<(sled::IVec, sled::IVec)> = Vec::new();
        for (i, item) in self.boards.iter().enumerate() {
            let pair = item.map_err(|_| StoreError::DbIo)?;
            if reservoir.len() < limit {
                reservoir.push(pair);
            } else {
                let j = rng.gen_range(0..=i);
                if j < limit {
                    reservoir[j] = pair;
                }
            }
        }
        reservoir.shuffle(&mut rng);

        let mut boards = Vec::with_capacity(reservoir.len());
        for (key, value) in reservoir {
            let key = std::str::from_utf8(&key).map_err(|_| StoreError::Codec)?;
            let record: BoardRecord =
                decode_canonical_limited(&value, RECORD_MAX_BYTES).map_err(|_| StoreError::Codec)?;
            boards.push(record.into_board(key)?);
        }
        Ok(boards)
    }

    /// Register a peer URL. Returns `true` when the peer was not yet known.
    pub fn add_peer(&self, url: &str) -> Result<bool, StoreError> {
        let previous = self
            .peers
            .insert(url.as_bytes(), vec![])
            .map_err(|_| StoreError::DbIo)?;
        Ok(previous.is_none())
    }

    /// Remove a peer URL. Returns `true` when it existed.
    pub fn remove_peer(&self, url: &str) -> Result<bool, StoreError> {
        Ok(self
            .peers
            .remove(url.as_bytes())
            .map_err(|_| StoreError::DbIo)?
            .is_some())
    }

    /// All known peers.
    pub fn peers(&self) -> Result<Vec<Peer>, StoreError> {
        let mut peers = Vec::new();
        for item in self.peers.iter() {
            let (key, _) = item.map_err(|_| StoreError::DbIo)?;
            let url = std::str::from_utf8(&key)
                .map_err(|_| StoreError::Codec)?
                .to_string();
            peers.push(Peer { url });
        }
        Ok(peers)
    }
}
