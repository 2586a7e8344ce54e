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

//! Upload a board to a Spring '83 server.
//!
//! Prepends a `<time datetime="...Z">` tag at the current instant, signs the
//! result and issues a single outbound PUT.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::Parser;

use lets_dance::core::constants::BOARD_MAX_SIZE_BYTES;
use lets_dance::core::crypto::sign;
use lets_dance::core::timecodec::format_board_time;
use lets_dance::core::types::Board;
use lets_dance::networking::client::{ClientError, PeerClient};

#[derive(Parser)]
#[command(about = "Upload a board to a Spring '83 server.")]
struct Args {
    /// Your public key, formatted as a hex string.
    #[arg(long)]
    public_key: String,
    /// Your private key, formatted as a hex string.
    #[arg(long)]
    private_key: String,
    /// URL of the server to upload to.
    #[arg(long)]
    server_url: String,
    /// A text file containing your board HTML, use '-' to pipe from stdin.
    #[arg(long)]
    content_file: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut content = String::new();
    if args.content_file.as_os_str() == "-" {
        std::io::stdin()
            .read_to_string(&mut content)
            .context("read stdin")?;
    } else {
        content = std::fs::read_to_string(&args.content_file)
            .with_context(|| format!("read {}", args.content_file.display()))?;
    }

    let last_modified = Utc::now();
    let last_modified = chrono::DateTime::from_timestamp(last_modified.timestamp(), 0)
        .unwrap_or(last_modified);
    let content = format!(
        "<time datetime=\"{}\">\n{content}",
        format_board_time(last_modified)
    );
    if content.len() > BOARD_MAX_SIZE_BYTES {
        bail!("Board exceeds maximum size of {BOARD_MAX_SIZE_BYTES} bytes.");
    }

    let signature = sign(&args.private_key, content.as_bytes())?;
    let board = Board {
        key: args.public_key,
        content,
        signature,
        last_modified,
    };

    println!("Uploading board to {}", args.server_url);
    println!("{}", board.content);

    let client = PeerClient::new()?;
    match client.put_board(&board, &args.server_url).await {
        Ok(status) => println!("Server response: {status}"),
        Err(e @ ClientError::Transport(_)) => println!("{e}"),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}
