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

//! Error taxonomy of the protocol surface.
//!
//! Validation failures carry a status and a message and render with the
//! `Spring-Version` header. Implementation failures (store, crypto, metrics)
//! render as bare 500s without protocol framing.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{info, warn};

use crate::core::constants::{SPRING_VERSION, SPRING_VERSION_HEADER};
use crate::core::crypto::CryptoError;
use crate::core::store::StoreError;
use crate::monitoring::metrics::MetricsError;

/// A protocol validation failure, tagged with its HTTP status.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SpringError {
    /// 413: the body exceeds the board size cap.
    #[error("Board is larger than {0} bytes.")]
    TooLarge(usize),
    /// 400: malformed body, key suffix or timestamp.
    #[error("{0}")]
    BadRequest(&'static str),
    /// 401: missing/malformed authorization or bad signature.
    #[error("{0}")]
    Unauthorized(&'static str),
    /// 409: timestamp not strictly newer than the stored board.
    #[error("{0}")]
    Conflict(&'static str),
    /// 404: no board for this key.
    #[error("{0}")]
    NotFound(&'static str),
    /// 304: the client's copy is at least as new.
    #[error("{0}")]
    NotModified(&'static str),
}

impl SpringError {
    /// HTTP status this failure maps onto.
    pub fn status(&self) -> StatusCode {
        match self {
            SpringError::TooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            SpringError::BadRequest(_) => StatusCode::BAD_REQUEST,
            SpringError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            SpringError::Conflict(_) => StatusCode::CONFLICT,
            SpringError::NotFound(_) => StatusCode::NOT_FOUND,
            SpringError::NotModified(_) => StatusCode::NOT_MODIFIED,
        }
    }
}

impl IntoResponse for SpringError {
    fn into_response(self) -> Response {
        info!("spring 83 error: {self}");
        (
            self.status(),
            [(SPRING_VERSION_HEADER, SPRING_VERSION)],
            self.to_string(),
        )
            .into_response()
    }
}

/// Handler failure: a protocol error or an implementation error.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Validation failure with Spring framing.
    #[error(transparent)]
    Spring(#[from] SpringError),
    /// Store outage or corruption.
    #[error("store: {0}")]
    Store(#[from] StoreError),
    /// Crypto library failure.
    #[error("crypto: {0}")]
    Crypto(#[from] CryptoError),
    /// Metrics encoding failure.
    #[error("metrics: {0}")]
    Metrics(#[from] MetricsError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Spring(e) => e.into_response(),
            other => {
                warn!(error = %other, "internal error");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}
