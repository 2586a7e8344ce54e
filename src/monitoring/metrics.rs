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

use prometheus::{IntCounter, IntGauge, Registry};
use thiserror::Error;

/// Metrics errors.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("prometheus")]
    Prom,
}

/// Metrics container.
#[derive(Clone)]
pub struct Metrics {
    /// Registry.
    pub registry: Registry,

    /// Boards currently stored.
    pub boards_stored: IntGauge,
    /// Boards created via PUT.
    pub boards_created_total: IntCounter,
    /// Boards updated via PUT.
    pub boards_updated_total: IntCounter,
    /// Boards removed by the TTL sweep.
    pub boards_expired_total: IntCounter,

    /// Broadcast fan-outs executed.
    pub gossip_broadcast_total: IntCounter,
    /// Outbound publish attempts.
    pub gossip_publish_total: IntCounter,
    /// Publish attempts rescheduled under backoff.
    pub gossip_publish_retry_total: IntCounter,
    /// Publish tasks dropped at the backoff cap.
    pub gossip_publish_dropped_total: IntCounter,
}

impl Metrics {
    /// Create and register metrics.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let boards_stored = IntGauge::new("letsdance_boards_stored", "Boards currently stored")
            .map_err(|_| MetricsError::Prom)?;
        let boards_created_total =
            IntCounter::new("letsdance_boards_created_total", "Boards created via PUT")
                .map_err(|_| MetricsError::Prom)?;
        let boards_updated_total =
            IntCounter::new("letsdance_boards_updated_total", "Boards updated via PUT")
                .map_err(|_| MetricsError::Prom)?;
        let boards_expired_total = IntCounter::new(
            "letsdance_boards_expired_total",
            "Boards removed by the TTL sweep",
        )
        .map_err(|_| MetricsError::Prom)?;

        let gossip_broadcast_total = IntCounter::new(
            "letsdance_gossip_broadcast_total",
            "Broadcast fan-outs executed",
        )
        .map_err(|_| MetricsError::Prom)?;
        let gossip_publish_total = IntCounter::new(
            "letsdance_gossip_publish_total",
            "Outbound publish attempts",
        )
        .map_err(|_| MetricsError::Prom)?;
        let gossip_publish_retry_total = IntCounter::new(
            "letsdance_gossip_publish_retry_total",
            "Publish attempts rescheduled under backoff",
        )
        .map_err(|_| MetricsError::Prom)?;
        let gossip_publish_dropped_total = IntCounter::new(
            "letsdance_gossip_publish_dropped_total",
            "Publish tasks dropped at the backoff cap",
        )
        .map_err(|_| MetricsError::Prom)?;

        registry
            .register(Box::new(boards_stored.clone()))
            .map_err(|_| MetricsError::Prom)?;
        registry
            .register(Box::new(boards_created_total.clone()))
            .map_err(|_| MetricsError::Prom)?;
        registry
            .register(Box::new(boards_updated_total.clone()))
            .map_err(|_| MetricsError::Prom)?;
        registry
            .register(Box::new(boards_expired_total.clone()))
            .map_err(|_| MetricsError::Prom)?;

        registry
            .register(Box::new(gossip_broadcast_total.clone()))
            .map_err(|_| MetricsError::Prom)?;
        registry
            .register(Box::new(gossip_publish_total.clone()))
            .map_err(|_| MetricsError::Prom)?;
        registry
            .register(Box::new(gossip_publish_retry_total.clone()))
            .map_err(|_| MetricsError::Prom)?;
        registry
            .register(Box::new(gossip_publish_dropped_total.clone()))
            .map_err(|_| MetricsError::Prom)?;

        Ok(Self {
            registry,
            boards_stored,
            boards_created_total,
            boards_updated_total,
            boards_expired_total,
            gossip_broadcast_total,
            gossip_publish_total,
            gossip_publish_retry_total,
            gossip_publish_dropped_total,
        })
    }
}
