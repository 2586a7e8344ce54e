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

//! HTTP surface: router, server lifecycle and the protocol handlers.

/// Error taxonomy and the response adapter.
pub mod error;
/// Protocol handlers.
pub mod handlers;

use std::net::SocketAddr;

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;
use thiserror::Error;
use tokio::sync::oneshot;

use crate::http::handlers::AppState;

/// Server error.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("bind")]
    Bind,
    #[error("serve")]
    Serve,
}

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Listen address.
    pub listen_addr: SocketAddr,
}

/// The protocol HTTP server.
pub struct Server {
    config: ServerConfig,
}

impl Server {
    /// Create a server with the given configuration.
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Build the application router.
    pub fn router(state: AppState) -> Router {
        Router::new()
            .route("/", get(handlers::index))
            .route("/metrics", get(handlers::metrics))
            .route("/:key", get(handlers::get_board).put(handlers::put_board))
            // Keep the limit well above the board cap so the PUT handler owns
            // the 413 and responds with protocol framing; only absurdly large
            // bodies are cut off at the transport layer.
            .layer(DefaultBodyLimit::max(64 * 1024))
            .with_state(state)
    }

    /// Run until shutdown, signalling `ready_tx` with the bound address once
    /// accepting connections.
    pub async fn run(
        self,
        state: AppState,
        ready_tx: oneshot::Sender<SocketAddr>,
    ) -> Result<(), ServerError> {
        let app = Self::router(state);
        let listener = tokio::net::TcpListener::bind(self.config.listen_addr)
            .await
            .map_err(|_| ServerError::Bind)?;
        let local_addr = listener.local_addr().map_err(|_| ServerError::Bind)?;
        let _ = ready_tx.send(local_addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|_| ServerError::Serve)
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
