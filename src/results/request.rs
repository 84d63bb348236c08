//! Result notification payload.

use serde::{Deserialize, Serialize};

use crate::results::ResultsError;

/// A job outcome, as posted to `/result`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    #[serde(default)]
    pub job_name: String,

    /// Kind of failure or event, e.g. "ci-operator".
    #[serde(default, rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub state: String,

    #[serde(default)]
    pub reason: String,

    /// Cluster the job ran on.
    #[serde(default)]
    pub cluster: String,
}

impl Request {
    /// Every field is required; the first empty one is reported.
    pub fn validate(&self) -> Result<(), ResultsError> {
        let fields = [
            ("reason", &self.reason),
            ("job_name", &self.job_name),
            ("state", &self.state),
            ("type", &self.kind),
            ("cluster", &self.cluster),
        ];

        match fields.iter().find(|(_, value)| value.is_empty()) {
            Some((name, _)) => Err(ResultsError::EmptyField(*name)),
            None => Ok(()),
        }
    }
}
