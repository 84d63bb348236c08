//! Client for posting results to a running aggregator.

use thiserror::Error;

use crate::results::{Request, ResultsError};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("invalid result: {0}")]
    Invalid(#[from] ResultsError),

    #[error("failed to send result: {0}")]
    Http(#[from] reqwest::Error),

    #[error("result aggregator responded with {status}: {body}")]
    Status { status: u16, body: String },
}

/// Posts [`Request`]s to `<base_url>/result` with basic auth.
#[derive(Debug, Clone)]
pub struct ResultClient {
    http: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
}

impl ResultClient {
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            username: username.into(),
            password: password.into(),
        }
    }

    pub async fn report(&self, request: &Request) -> Result<(), ReportError> {
        request.validate()?;

        let res = self
            .http
            .post(format!("{}/result", self.base_url))
            .basic_auth(&self.username, Some(&self.password))
            .json(request)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), body = %body, "Result rejected");
            return Err(ReportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(job_name = %request.job_name, "Result reported");
        Ok(())
    }
}
