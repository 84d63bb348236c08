//! Job result reporting.
//!
//! # Data Flow
//! ```text
//! ci job finishes
//!     → client.rs (POST /result, basic auth)
//!     → http/server.rs (auth, decode, validate request.rs)
//!     → observability/metrics.rs (ci_operator_error_rate counter)
//! ```
//!
//! # Design Decisions
//! - Stateless: every request only increments a counter
//! - Missing and empty fields are the same failure

pub mod client;
pub mod request;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

pub use client::{ReportError, ResultClient};
pub use request::Request;

/// Rejections produced while handling a result.
#[derive(Debug, Error)]
pub enum ResultsError {
    #[error("unable to decode request body: {0}")]
    Decode(String),

    #[error("{0} field in request is empty")]
    EmptyField(&'static str),

    #[error("Unauthorized")]
    Unauthorized,
}

impl ResultsError {
    pub fn status(&self) -> StatusCode {
        match self {
            ResultsError::Unauthorized => StatusCode::UNAUTHORIZED,
            ResultsError::Decode(_) | ResultsError::EmptyField(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ResultsError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}
