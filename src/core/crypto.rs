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

//! Ed25519 key handling and the Spring '83 key-suffix rule.
//!
//! Keys and signatures cross this boundary as lowercase hex strings (32-byte
//! raw public keys, 32-byte seeds, 64-byte signatures). [`verify`] never
//! fails across the boundary: any decoding or verification problem is `false`.

use chrono::{DateTime, Datelike, Utc};
use ring::rand::{SecureRandom, SystemRandom};
use ring::signature::{Ed25519KeyPair, KeyPair, UnparsedPublicKey, ED25519};
use thiserror::Error;
use zeroize::Zeroize;

/// Crypto error.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// The system RNG failed.
    #[error("rng")]
    Rng,
    /// Key material is not valid hex of the right length.
    #[error("invalid key encoding")]
    InvalidKey,
}

/// Generate a fresh Ed25519 keypair as `(public_hex, secret_hex)`.
pub fn generate_keypair() -> Result<(String, String), CryptoError> {
    let rng = SystemRandom::new();
    let mut seed = [0u8; 32];
    rng.fill(&mut seed).map_err(|_| CryptoError::Rng)?;

    let keypair = Ed25519KeyPair::from_seed_unchecked(&seed).map_err(|_| CryptoError::InvalidKey)?;
    let public_hex = hex::encode(keypair.public_key().as_ref());
    let secret_hex = hex::encode(seed);
    seed.zeroize();
    Ok((public_hex, secret_hex))
}

/// Sign `data` with a hex-encoded 32-byte seed.
pub fn sign(secret_hex: &str, data: &[u8]) -> Result<String, CryptoError> {
    let mut seed = hex::decode(secret_hex).map_err(|_| CryptoError::InvalidKey)?;
    if seed.len() != 32 {
        seed.zeroize();
        return Err(CryptoError::InvalidKey);
    }

    let keypair = Ed25519KeyPair::from_seed_unchecked(&seed);
    seed.zeroize();
    let keypair = keypair.map_err(|_| CryptoError::InvalidKey)?;

    Ok(hex::encode(keypair.sign(data).as_ref()))
}

/// Verify a hex signature over `data` under a hex public key.
///
/// Returns `false` on any decoding or verification failure.
pub fn verify(public_hex: &str, signature_hex: &str, data: &[u8]) -> bool {
    let Ok(public) = hex::decode(public_hex) else {
        return false;
    };
    let Ok(signature) = hex::decode(signature_hex) else {
        return false;
    };
    if public.len() != 32 || signature.len() != 64 {
        return false;
    }

    UnparsedPublicKey::new(&ED25519, &public)
        .verify(data, &signature)
        .is_ok()
}

/// Policy seam for key validation, so tests can substitute a permissive stub
/// the way the HTTP tests need to (brute-forcing a conforming key per test
/// run is far too slow).
pub trait KeyPolicy: Send + Sync {
    /// Is `key` acceptable for a PUT at instant `now`?
    fn validate_public_key(&self, key: &str, now: DateTime<Utc>) -> bool;
}

/// Production policy: the `83e<MM><YY>` month-window suffix rule.
pub struct ProtocolKeyPolicy;

impl KeyPolicy for ProtocolKeyPolicy {
    fn validate_public_key(&self, key: &str, now: DateTime<Utc>) -> bool {
        validate_public_key(key, now)
    }
}

/// Validate the key suffix: the last seven characters must be
/// `83e<MM><YY>` with `MM` in `01..=12`, and the month `(2000+YY, MM)` must
/// satisfy `key_month - 24 <= now_month <= key_month` at month granularity.
///
/// Keys therefore expire at the end of their encoded month and become
/// mintable 24 months earlier. Hand-parsed rather than matched with a regex:
/// this sits on the keygen brute-force hot loop.
pub fn validate_public_key(key: &str, now: DateTime<Utc>) -> bool {
    if key.len() < 7 || !key.is_ascii() {
        return false;
    }
    let suffix = &key[key.len() - 7..];
    if !suffix.starts_with("83e") || !suffix[3..].bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }

    let month: i32 = match suffix[3..5].parse() {
        Ok(m) => m,
        Err(_) => return false,
    };
    let year: i32 = match suffix[5..7].parse() {
        Ok(y) => y,
        Err(_) => return false,
    };
    if !(1..=12).contains(&month) {
        return false;
    }

    // Month-granularity window arithmetic, matching the protocol's two-year
    // key lifetime.
    let max_months = (2000 + year) * 12 + month;
    let min_months = max_months - 24;
    let now_months = now.year() * 12 + now.month() as i32;
    (min_months..=max_months).contains(&now_months)
}
