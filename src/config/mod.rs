//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (YAML/TOML)
//!     → loader.rs (read & deserialize into schema.rs types)
//!     → validation.rs (compile patterns, semantic checks)
//!     → model.rs Config (validated, immutable)
//!     → shared by reference or Arc with every resolver call
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no reload path
//! - Loading is all-or-nothing: a document with any error yields no Config
//! - Validation separates syntactic (serde) from semantic checks
//! - All semantic errors are reported together

pub mod loader;
pub mod model;
pub mod schema;
pub mod validation;

pub use loader::{load_config, save_config, ConfigError, Format};
pub use model::{Config, Group, JobGroups};
pub use schema::{ConfigDocument, GroupSpec};
pub use validation::{ValidationError, ValidationErrors};
