//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use ci_dispatcher::http::{Credentials, ResultServer};
use ci_dispatcher::lifecycle::Shutdown;

pub const USERNAME: &str = "ci";
pub const PASSWORD: &str = "s3cret";

/// A result aggregator bound to an ephemeral local port.
pub struct Aggregator {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<std::io::Result<()>>,
}

impl Aggregator {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

/// Start an aggregator trusting [`USERNAME`]/[`PASSWORD`].
pub async fn start_aggregator(grace_period: Duration) -> Aggregator {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = ResultServer::new(Credentials::new(USERNAME, PASSWORD));
    let rx = shutdown.subscribe();
    let handle = tokio::spawn(async move { server.run(listener, rx, grace_period).await });

    Aggregator {
        addr,
        shutdown,
        handle,
    }
}
