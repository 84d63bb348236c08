//! HTTP Basic authentication for result submissions.

use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine};

use crate::results::ResultsError;

/// The single username/password pair clients must present.
#[derive(Clone)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Read the password from a secret file; a trailing newline is dropped.
    pub fn from_password_file(username: impl Into<String>, path: &Path) -> std::io::Result<Self> {
        let password = fs::read_to_string(path)?;
        Ok(Self::new(username, password.trim_end_matches(['\r', '\n'])))
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Check an `Authorization` header value.
    pub fn verify(&self, header: Option<&str>) -> bool {
        let Some((scheme, encoded)) = header.and_then(|h| h.split_once(' ')) else {
            return false;
        };
        if !scheme.eq_ignore_ascii_case("basic") {
            return false;
        }

        let Ok(decoded) = STANDARD.decode(encoded.trim()) else {
            return false;
        };
        let Ok(decoded) = String::from_utf8(decoded) else {
            return false;
        };

        match decoded.split_once(':') {
            Some((user, pass)) => user == self.username && pass == self.password,
            None => false,
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

pub async fn basic_auth_middleware(
    State(credentials): State<Arc<Credentials>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    if credentials.verify(header) {
        return next.run(request).await;
    }

    tracing::warn!(path = %request.uri().path(), "Rejected unauthenticated request");
    ResultsError::Unauthorized.into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basic(user: &str, pass: &str) -> String {
        format!("Basic {}", STANDARD.encode(format!("{}:{}", user, pass)))
    }

    #[test]
    fn test_verify() {
        let creds = Credentials::new("ci", "s3cret:with-colon");
        assert!(creds.verify(Some(&basic("ci", "s3cret:with-colon"))));
        assert!(!creds.verify(Some(&basic("ci", "wrong"))));
        assert!(!creds.verify(Some(&basic("other", "s3cret:with-colon"))));
        assert!(!creds.verify(Some("Bearer abc")));
        assert!(!creds.verify(Some("Basic not-base64!")));
        assert!(!creds.verify(None));
    }

    #[test]
    fn test_scheme_is_case_insensitive() {
        let creds = Credentials::new("ci", "pw");
        let header = basic("ci", "pw").replace("Basic", "basic");
        assert!(creds.verify(Some(&header)));
    }

    #[test]
    fn test_password_file_trailing_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("password");
        fs::write(&path, "hunter2\n").unwrap();

        let creds = Credentials::from_password_file("ci", &path).unwrap();
        assert!(creds.verify(Some(&basic("ci", "hunter2"))));
        assert!(!format!("{:?}", creds).contains("hunter2"));
    }
}
