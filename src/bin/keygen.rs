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

//! Brute-force a Spring '83 keypair whose public key carries a currently
//! valid `83e<MM><YY>` suffix. This is the protocol's proof-of-work: expect
//! millions of iterations.

use anyhow::Result;
use chrono::Utc;
use std::time::Instant;

use lets_dance::core::crypto::{generate_keypair, validate_public_key};

fn main() -> Result<()> {
    eprintln!("Generating a valid ed25519 key, this may take a while...");

    let start = Instant::now();
    let mut i: u64 = 0;
    let (public_hex, secret_hex) = loop {
        if i % 5000 == 0 {
            eprintln!("Iteration {i}...");
        }
        let (public_hex, secret_hex) = generate_keypair()?;
        if validate_public_key(&public_hex, Utc::now()) {
            break (public_hex, secret_hex);
        }
        i += 1;
    };

    println!("Generated keypair in {}s:", start.elapsed().as_secs());
    println!("Public : {public_hex}");
    println!("Secret : {secret_hex}");
    Ok(())
}
