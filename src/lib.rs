//! Cluster dispatching for CI jobs.
//!
//! Decides which execution cluster runs a job from a static routing table
//! and build-farm pools, and aggregates job results reported back by the
//! clusters.

pub mod config;
pub mod dispatcher;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod results;

pub use config::{load_config, Config};
pub use dispatcher::{Agent, Assignment, CloudProvider, ClusterName, JobBase};
pub use http::ResultServer;
pub use lifecycle::Shutdown;
