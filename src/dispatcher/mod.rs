//! Dispatching subsystem.
//!
//! # Data Flow
//! ```text
//! (JobBase, declaring file path)
//!     → resolver.rs (agent check, precedence across groups)
//!     → matcher.rs (job name set / path patterns per group)
//!     → Return: ClusterName, or Assignment with relocation flag
//!
//! Membership queries:
//!     ClusterName → build_farm.rs → CloudProvider or none
//! ```
//!
//! # Design Decisions
//! - Every operation is a pure read of an immutable Config
//! - Deterministic: same config and input always give the same cluster
//! - No error outcomes; defaults cover every unmatched job

pub mod build_farm;
pub mod matcher;
pub mod resolver;
pub mod types;

pub use matcher::{JobNameMatcher, Matcher, PathMatcher, PatternFault};
pub use resolver::Assignment;
pub use types::{Agent, CloudProvider, ClusterName, JobBase};
