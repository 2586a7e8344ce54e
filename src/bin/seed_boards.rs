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

//! Create fake boards for development/testing. Writes straight into the
//! store and skips the key-suffix rule, so the results are only good on a
//! development server.

use anyhow::Result;
use chrono::Utc;
use clap::Parser;

use lets_dance::core::crypto::{generate_keypair, sign};
use lets_dance::core::html::generate_board_content;
use lets_dance::core::store::BoardStore;
use lets_dance::core::types::Board;

#[derive(Parser)]
#[command(about = "Create fake boards for development/testing.")]
struct Args {
    /// Number of boards to create.
    #[arg(long, default_value_t = 1)]
    count: usize,
    /// Data directory of the server store.
    #[arg(long, default_value = "./data")]
    data_dir: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let store = BoardStore::open(&args.data_dir)?;

    for _ in 0..args.count {
        let now = Utc::now();
        let last_modified = chrono::DateTime::from_timestamp(now.timestamp(), 0).unwrap_or(now);
        let content = generate_board_content(last_modified);
        let (public_hex, secret_hex) = generate_keypair()?;
        let signature = sign(&secret_hex, content.as_bytes())?;

        let board = Board {
            key: public_hex,
            content,
            signature,
            last_modified,
        };
        store.upsert(&board)?;
        println!("Generated board: {}", board.key);
    }
    Ok(())
}
