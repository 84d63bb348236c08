//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define aggregator metrics
//! - Expose a Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `ci_operator_error_rate` (counter): reported job results by
//!   job_name, type, state, reason, cluster
//!
//! # Design Decisions
//! - The `metrics` facade keeps call sites free of exporter details
//! - Without an installed recorder every update is a no-op

use std::net::SocketAddr;

use metrics::{counter, describe_counter};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::results::Request;

pub const ERROR_RATE: &str = "ci_operator_error_rate";

/// Install the Prometheus recorder and serve it on `addr`.
///
/// Must be called from inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    describe();
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

fn describe() {
    describe_counter!(ERROR_RATE, "number of errors, sorted by label/type");
}

/// Count one reported result.
pub fn record_result(request: &Request) {
    counter!(
        ERROR_RATE,
        "job_name" => request.job_name.clone(),
        "type" => request.kind.clone(),
        "state" => request.state.clone(),
        "reason" => request.reason.clone(),
        "cluster" => request.cluster.clone()
    )
    .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_result_labels() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        let request = Request {
            job_name: "periodic-build01-upgrade".into(),
            kind: "ci-operator".into(),
            state: "failed".into(),
            reason: "timeout".into(),
            cluster: "build01".into(),
        };
        metrics::with_local_recorder(&recorder, || {
            describe();
            record_result(&request);
            record_result(&request);
        });

        let rendered = handle.render();
        let line = rendered
            .lines()
            .find(|l| l.starts_with(ERROR_RATE) && l.contains("job_name=\"periodic-build01-upgrade\""))
            .expect("counter line rendered");
        assert!(line.contains("cluster=\"build01\""));
        assert!(line.contains("type=\"ci-operator\""));
        assert!(line.ends_with(" 2"));
    }
}
