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

//! Protocol primitives: constants, records, crypto, codecs and the store.

/// Protocol constants and the embedded test keypair.
pub mod constants;
/// Ed25519 operations and the key-suffix rule.
pub mod crypto;
/// Board HTML inspection and generation.
pub mod html;
/// Durable board/peer storage.
pub mod store;
/// Instant codecs and the clock seam.
pub mod timecodec;
/// Records, canonical codec and settings.
pub mod types;
