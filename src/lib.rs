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

//! Lets Dance - a Spring '83 protocol server.
//!
//! This crate provides:
//! - The protocol validation pipeline for `GET /{key}` and `PUT /{key}`
//!   (size cap, key-suffix windowing, Ed25519 signatures, timestamp
//!   monotonicity carried in the board body)
//! - A durable board store with monotonic last-modified semantics, TTL
//!   expiry and difficulty reporting
//! - A named-job scheduler driving debounced broadcast fan-out and per-peer
//!   publish retries with capped jittered backoff
//! - Monitoring via Prometheus metrics and structured logging

/// Protocol primitives (constants, records, crypto, codecs, store).
pub mod core;
/// HTTP surface (router, handlers, error adapter).
pub mod http;
/// Observability (metrics).
pub mod monitoring;
/// Outbound peer networking (client, roster).
pub mod networking;
/// Named-job scheduler.
pub mod scheduler;
/// Background jobs (gossip, TTL expiry).
pub mod tasks;
