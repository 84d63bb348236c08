//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → request.rs (request ID, trace span)
//!     → server.rs (limits, timeout, routing)
//!     → auth.rs (basic auth on /result)
//!     → server.rs handler (decode, validate, count)
//!     → 200 / 400 / 401 / 404
//! ```

pub mod auth;
pub mod request;
pub mod server;

pub use auth::Credentials;
pub use request::X_REQUEST_ID;
pub use server::ResultServer;
