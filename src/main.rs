//! Result aggregator.
//!
//! Accepts job result notifications from CI clusters and counts them per
//! job, type, state, reason and cluster for Prometheus.
//!
//! ```text
//!   cluster ──POST /result──▶ basic auth ──▶ decode/validate ──▶ ci_operator_error_rate
//!                                                                   │
//!   prometheus ◀──────────────── GET /metrics (metrics address) ◀───┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;

use ci_dispatcher::http::{Credentials, ResultServer};
use ci_dispatcher::lifecycle::{signals, Shutdown};
use ci_dispatcher::observability::{logging, metrics};

#[derive(Parser, Debug)]
#[command(name = "result-aggregator")]
#[command(about = "Collects CI job results and exposes them as metrics", long_about = None)]
struct Options {
    /// Level at which to log output.
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Address to run server on.
    #[arg(long, default_value = "0.0.0.0:8080")]
    address: String,

    /// Address to expose metrics on.
    #[arg(long, default_value = "0.0.0.0:9090")]
    metrics_address: SocketAddr,

    /// Grace period for server shutdown, in seconds.
    #[arg(long, default_value_t = 10)]
    grace_period_secs: u64,

    /// Username to trust for clients.
    #[arg(long, default_value = "")]
    username: String,

    /// File holding the password for clients.
    #[arg(long, default_value = "")]
    password_file: String,
}

impl Options {
    fn validate(&self) -> Result<(), String> {
        logging::parse_level(&self.log_level).map_err(|e| e.to_string())?;
        if self.username.is_empty() {
            return Err("--username is required".to_string());
        }
        if self.password_file.is_empty() {
            return Err("--password-file is required".to_string());
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let options = Options::parse();
    options
        .validate()
        .map_err(|e| format!("invalid options: {}", e))?;

    logging::init_logging(&options.log_level)?;
    tracing::info!("result-aggregator v{} starting", env!("CARGO_PKG_VERSION"));

    let password_file = PathBuf::from(&options.password_file);
    let credentials = Credentials::from_password_file(&options.username, &password_file)
        .map_err(|e| format!("could not load secrets from {}: {}", password_file.display(), e))?;

    metrics::init_metrics(options.metrics_address)?;

    let listener = TcpListener::bind(&options.address).await?;

    let shutdown = Shutdown::new();
    let shutdown_rx = shutdown.subscribe();
    signals::spawn_signal_listener(&shutdown);

    let server = ResultServer::new(credentials);
    server
        .run(
            listener,
            shutdown_rx,
            Duration::from_secs(options.grace_period_secs),
        )
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
