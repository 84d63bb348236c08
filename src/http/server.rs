//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, limits, request ID, basic auth)
//! - Decode, validate and count job results
//! - Serve until shutdown, then drain within the grace period
//!
//! # Design Decisions
//! - `/result` is POST only; other methods get 405 before auth runs

use std::future::IntoFuture;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Bytes,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, oneshot};
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::http::auth::{basic_auth_middleware, Credentials};
use crate::http::request::{propagate_request_id_layer, request_span, set_request_id_layer};
use crate::observability::metrics;
use crate::results::{Request, ResultsError};

const MAX_BODY_BYTES: usize = 1024 * 1024;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP server accepting job result notifications.
pub struct ResultServer {
    router: Router,
}

impl ResultServer {
    pub fn new(credentials: Credentials) -> Self {
        let router = Self::build_router(Arc::new(credentials));
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(credentials: Arc<Credentials>) -> Router {
        let results = Router::new()
            .route("/result", post(handle_result))
            .route_layer(middleware::from_fn_with_state(credentials, basic_auth_middleware));

        Router::new()
            .merge(results)
            .route("/healthz", get(healthz))
            .fallback(not_found)
            .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
            .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http().make_span_with(request_span))
            .layer(set_request_id_layer())
    }

    /// The fully layered router, for serving or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on `listener` until `shutdown` fires, then give in-flight
    /// requests up to `grace_period` to finish.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
        grace_period: Duration,
    ) -> std::io::Result<()> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Result aggregator listening");

        let (draining_tx, draining_rx) = oneshot::channel();
        let server = axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                let _ = draining_tx.send(());
            })
            .into_future();
        tokio::pin!(server);

        tokio::select! {
            result = &mut server => return result,
            _ = draining_rx => {}
        }

        tracing::info!(grace_period_secs = grace_period.as_secs(), "Draining connections");
        match tokio::time::timeout(grace_period, server).await {
            Ok(result) => {
                tracing::info!("HTTP server stopped");
                result
            }
            Err(_) => {
                tracing::warn!("Grace period elapsed, abandoning in-flight requests");
                Ok(())
            }
        }
    }
}

async fn handle_result(body: Bytes) -> Result<StatusCode, ResultsError> {
    let start = Instant::now();

    let request: Request =
        serde_json::from_slice(&body).map_err(|e| ResultsError::Decode(e.to_string()))?;
    if let Err(e) = request.validate() {
        tracing::debug!(error = %e, "Rejected incomplete result");
        return Err(e);
    }

    metrics::record_result(&request);

    tracing::info!(
        job_name = %request.job_name,
        kind = %request.kind,
        state = %request.state,
        reason = %request.reason,
        cluster = %request.cluster,
        duration = ?start.elapsed(),
        "Request processed"
    );
    Ok(StatusCode::OK)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "404 page not found")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method};
    use base64::{engine::general_purpose::STANDARD, Engine};
    use tower::ServiceExt;

    const BODY: &str = r#"{"job_name":"pull-ci-foo","type":"ci-operator","state":"failed","reason":"timeout","cluster":"build01"}"#;

    fn server() -> ResultServer {
        ResultServer::new(Credentials::new("ci", "pw"))
    }

    fn result_request(auth: Option<(&str, &str)>, body: &str) -> axum::http::Request<Body> {
        let mut builder = axum::http::Request::builder()
            .method(Method::POST)
            .uri("/result");
        if let Some((user, pass)) = auth {
            let token = STANDARD.encode(format!("{}:{}", user, pass));
            builder = builder.header(header::AUTHORIZATION, format!("Basic {}", token));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn send(request: axum::http::Request<Body>) -> (StatusCode, String) {
        let response = server().router().oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_accepts_valid_result() {
        let (status, _) = send(result_request(Some(("ci", "pw")), BODY)).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_rejects_bad_credentials() {
        let (status, body) = send(result_request(Some(("ci", "nope")), BODY)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, "Unauthorized");

        let (status, _) = send(result_request(None, BODY)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_rejects_malformed_body() {
        let (status, body) = send(result_request(Some(("ci", "pw")), "{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.starts_with("unable to decode request body"));
    }

    #[tokio::test]
    async fn test_rejects_incomplete_body() {
        let (status, body) = send(result_request(Some(("ci", "pw")), r#"{"reason":"r","job_name":"j"}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "state field in request is empty");
    }

    #[tokio::test]
    async fn test_result_rejects_other_methods() {
        let request = axum::http::Request::builder()
            .method(Method::GET)
            .uri("/result")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(request).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_unknown_path_is_not_found() {
        let request = axum::http::Request::builder()
            .uri("/")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_request_id_is_echoed() {
        let response = server()
            .router()
            .oneshot(axum::http::Request::builder().uri("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }
}
