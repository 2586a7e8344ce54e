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

//! Background jobs: board gossip and TTL expiry.
//!
//! Gossip failures never surface to the client that triggered them; they are
//! retried under capped backoff and eventually logged and dropped.

use std::sync::Arc;
use std::time::Duration;

use chrono::Duration as ChronoDuration;
use rand::seq::SliceRandom;
use tracing::{debug, info, warn};

use crate::core::constants::{
    BOARD_TTL_DAYS, BROADCAST_DELAY_SECS, EXPIRE_INTERVAL_SECS, PUBLISH_BACKOFF_MAX_DAYS,
    PUBLISH_BACKOFF_START_SECS,
};
use crate::core::store::BoardStore;
use crate::core::timecodec::Clock;
use crate::core::types::Board;
use crate::monitoring::metrics::Metrics;
use crate::networking::client::PeerClient;
use crate::scheduler::{ReplacePolicy, Scheduler, SchedulerError};

/// Maximum peers a broadcast fans out to.
const BROADCAST_MAX_PEERS: usize = 5;

/// Next retry delay in whole seconds: `backoff * (1 + jitter)` with
/// `jitter` in `[0, 1)`, so the result lies in `[backoff, 2 * backoff)`.
pub fn next_backoff(backoff: u64, jitter: f64) -> u64 {
    backoff + (backoff as f64 * jitter) as u64
}

/// Gossip engine: fans accepted boards out to a random subset of peers.
#[derive(Clone)]
pub struct Gossip {
    inner: Arc<GossipInner>,
}

struct GossipInner {
    store: BoardStore,
    scheduler: Scheduler,
    client: PeerClient,
    metrics: Arc<Metrics>,
}

impl Gossip {
    /// Assemble the gossip engine.
    pub fn new(
        store: BoardStore,
        scheduler: Scheduler,
        client: PeerClient,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            inner: Arc::new(GossipInner {
                store,
                scheduler,
                client,
                metrics,
            }),
        }
    }

    /// Queue a debounced broadcast for `key`. Called from the PUT handler;
    /// a broadcast already queued for this key is kept, so bursts of updates
    /// collapse into one fan-out carrying the latest board.
    pub fn enqueue_broadcast(&self, key: &str) {
        let id = format!("broadcast:{key}");
        let gossip = self.clone();
        let job_key = key.to_string();
        let result = self.inner.scheduler.add(
            &id,
            Duration::from_secs(BROADCAST_DELAY_SECS),
            ReplacePolicy::KeepExisting,
            move || async move { gossip.broadcast(&job_key).await },
        );
        match result {
            Ok(()) => info!(job = %id, eta = BROADCAST_DELAY_SECS, "scheduled job"),
            Err(SchedulerError::ConflictingId) => {
                // Already queued; don't replace it.
                debug!(job = %id, "broadcast already queued");
            }
            Err(SchedulerError::Stopped) => warn!(job = %id, "scheduler stopped; broadcast lost"),
        }
    }

    /// Share a board with a random subset of peers by queueing per-peer
    /// publish jobs. Silently a no-op when the board has expired meanwhile.
    pub async fn broadcast(&self, key: &str) {
        let board = match self.inner.store.get(key) {
            Ok(Some(board)) => board,
            Ok(None) => return,
            Err(e) => {
                warn!(key, error = %e, "broadcast aborted: store failure");
                return;
            }
        };
        let peers = match self.inner.store.peers() {
            Ok(peers) => peers,
            Err(e) => {
                warn!(key, error = %e, "broadcast aborted: store failure");
                return;
            }
        };

        let fan_out = ((peers.len() as f64 * 0.5).round() as usize).min(BROADCAST_MAX_PEERS);
        let sampled: Vec<_> = peers
            .choose_multiple(&mut rand::thread_rng(), fan_out)
            .cloned()
            .collect();

        info!(key, peers = sampled.len(), "sharing board with peers");
        self.inner.metrics.gossip_broadcast_total.inc();
        for peer in sampled {
            self.schedule_publish(
                board.clone(),
                peer.url,
                PUBLISH_BACKOFF_START_SECS,
                Duration::ZERO,
            );
        }
    }

    fn schedule_publish(&self, board: Board, peer_url: String, backoff: u64, delay: Duration) {
        let id = format!("publish:{}", board.key);
        let gossip = self.clone();
        let result = self.inner.scheduler.add(
            &id,
            delay,
            ReplacePolicy::Replace,
            move || async move { gossip.publish(board, &peer_url, backoff).await },
        );
        match result {
            Ok(()) => info!(job = %id, eta = delay.as_secs(), "scheduled job"),
            Err(e) => warn!(job = %id, error = %e, "publish not scheduled"),
        }
    }

    /// Attempt one outbound PUT to `peer_url`, rescheduling under jittered
    /// backoff on transport errors and 5xx responses.
    pub async fn publish(&self, board: Board, peer_url: &str, backoff: u64) {
        info!(key = %board.key, peer = %peer_url, "publishing board");
        self.inner.metrics.gossip_publish_total.inc();

        let retry = match self.inner.client.put_board(&board, peer_url).await {
            Ok(status) => {
                info!(status, "peer response");
                // Only 5xx server errors are worth retrying.
                (500..=599).contains(&status)
            }
            Err(e) => {
                info!(error = %e, "error publishing board");
                true
            }
        };
        if !retry {
            return;
        }

        let backoff = next_backoff(backoff, rand::random::<f64>());
        if backoff < PUBLISH_BACKOFF_MAX_DAYS * 24 * 60 * 60 {
            self.inner.metrics.gossip_publish_retry_total.inc();
            self.schedule_publish(
                board,
                peer_url.to_string(),
                backoff,
                Duration::from_secs(backoff),
            );
        } else {
            self.inner.metrics.gossip_publish_dropped_total.inc();
            info!(key = %board.key, "backoff limit exceeded, giving up on publish");
        }
    }
}

/// Register the recurring TTL sweep: every hour, delete boards whose
/// last modification is older than the TTL.
pub fn schedule_board_expiry(
    scheduler: &Scheduler,
    store: BoardStore,
    clock: Arc<dyn Clock>,
    metrics: Arc<Metrics>,
) {
    scheduler.interval(
        "expire_old_boards",
        Duration::from_secs(EXPIRE_INTERVAL_SECS),
        move || {
            let store = store.clone();
            let clock = Arc::clone(&clock);
            let metrics = Arc::clone(&metrics);
            async move {
                info!("checking for old boards to expire");
                let cutoff = clock.now() - ChronoDuration::days(BOARD_TTL_DAYS);
                match store.expire(cutoff) {
                    Ok(removed) => {
                        metrics.boards_expired_total.inc_by(removed as u64);
                        metrics.boards_stored.set(store.count() as i64);
                        info!(removed, "removed boards due to ttl timeout");
                    }
                    Err(e) => warn!(error = %e, "board expiry failed"),
                }
            }
        },
    );
}
