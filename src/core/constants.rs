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

//! Protocol constants shared across the server, gossip tasks and CLI tools.

/// Maximum encoded size of a board body in bytes.
pub const BOARD_MAX_SIZE_BYTES: usize = 2217;

/// Board capacity the difficulty curve is anchored to.
pub const BOARD_MAX_COUNT: u64 = 10_000_000;

/// Boards whose last modification is older than this are swept.
pub const BOARD_TTL_DAYS: i64 = 22;

/// Publish retries give up once the next delay would reach this many days.
pub const PUBLISH_BACKOFF_MAX_DAYS: u64 = 3;

/// Initial publish retry delay in seconds.
pub const PUBLISH_BACKOFF_START_SECS: u64 = 300;

/// Delay between a successful PUT and the broadcast fan-out.
pub const BROADCAST_DELAY_SECS: u64 = 300;

/// Interval of the recurring board-expiry job.
pub const EXPIRE_INTERVAL_SECS: u64 = 3600;

/// Value of the `Spring-Version` header on every protocol response.
pub const SPRING_VERSION: &str = "83";

/// Header carrying the protocol version.
pub const SPRING_VERSION_HEADER: &str = "Spring-Version";

/// Header carrying the server difficulty factor on the index page.
pub const SPRING_DIFFICULTY_HEADER: &str = "Spring-Difficulty";

/// Prefix of the `Authorization` header carrying a board signature.
pub const SIGNATURE_PREFIX: &str = "Spring-83 Signature=";

/// User agent sent on outbound peer requests.
pub const USER_AGENT: &str = concat!("lets-dance/", env!("CARGO_PKG_VERSION"));

/// Well-known test public key. GET serves a synthetic board signed with
/// [`TEST_KEY_SECRET`]; PUT with this key is always rejected.
///
/// The pair is the RFC 8032 Ed25519 test vector 1, so the halves are
/// guaranteed to match without deriving keys at build time.
pub const TEST_KEY_PUBLIC: &str =
    "d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a";

/// Secret half of the well-known test keypair.
pub const TEST_KEY_SECRET: &str =
    "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60";
