//! Identifiers and job descriptors consumed by the resolver.

use std::borrow::Borrow;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Cluster that serves non-Kubernetes and most static traffic.
pub const CLUSTER_APP_CI: &str = "app.ci";
/// Legacy default cluster.
pub const CLUSTER_API_CI: &str = "api.ci";
pub const CLUSTER_BUILD01: &str = "build01";
pub const CLUSTER_BUILD02: &str = "build02";

pub const CLOUD_AWS: &str = "aws";
pub const CLOUD_GCP: &str = "gcp";

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        // Ord and Hash delegate to the inner String, so map lookups by &str agree.
        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }
    };
}

string_id!(
    /// Name of an execution cluster. Compared by exact, case-sensitive equality
    /// and ordered lexicographically.
    ClusterName
);

string_id!(
    /// Cloud platform hosting a build farm.
    CloudProvider
);

/// Execution backend a job declares.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Agent {
    #[default]
    Kubernetes,
    Jenkins,
    TektonPipeline,
    Other(String),
}

impl Agent {
    pub fn as_str(&self) -> &str {
        match self {
            Agent::Kubernetes => "kubernetes",
            Agent::Jenkins => "jenkins",
            Agent::TektonPipeline => "tekton-pipeline",
            Agent::Other(name) => name,
        }
    }

    pub fn is_kubernetes(&self) -> bool {
        matches!(self, Agent::Kubernetes)
    }
}

impl From<&str> for Agent {
    /// An empty agent means the Kubernetes agent, same as an absent one.
    fn from(value: &str) -> Self {
        match value {
            "" | "kubernetes" => Agent::Kubernetes,
            "jenkins" => Agent::Jenkins,
            "tekton-pipeline" => Agent::TektonPipeline,
            other => Agent::Other(other.to_string()),
        }
    }
}

impl From<String> for Agent {
    fn from(value: String) -> Self {
        Agent::from(value.as_str())
    }
}

impl From<Agent> for String {
    fn from(agent: Agent) -> Self {
        agent.as_str().to_string()
    }
}

impl FromStr for Agent {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Agent::from(s))
    }
}

impl fmt::Display for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The parts of a job definition the resolver looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobBase {
    pub name: String,
    #[serde(default)]
    pub agent: Agent,
}

impl JobBase {
    pub fn new(name: impl Into<String>, agent: Agent) -> Self {
        Self {
            name: name.into(),
            agent,
        }
    }

    /// Job running on the Kubernetes agent.
    pub fn kubernetes(name: impl Into<String>) -> Self {
        Self::new(name, Agent::Kubernetes)
    }
}
