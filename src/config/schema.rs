//! Configuration schema definitions.
//!
//! This module defines the serialized shape of the dispatcher configuration.
//! Nothing here is compiled or validated; see `validation.rs` for that.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::dispatcher::types::{CloudProvider, ClusterName};

/// Root of a dispatcher configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConfigDocument {
    /// Cluster for Kubernetes-agent jobs matching no rule.
    #[serde(default)]
    pub default: ClusterName,

    /// Cluster for every job not on the Kubernetes agent.
    #[serde(default)]
    pub non_kubernetes: ClusterName,

    /// Static routing table.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub groups: BTreeMap<ClusterName, GroupSpec>,

    /// Relocatable pools, by cloud provider.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub build_farm: BTreeMap<CloudProvider, BTreeMap<ClusterName, GroupSpec>>,
}

/// Routing rules for one cluster, as authored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GroupSpec {
    /// Job names pinned to the cluster.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub jobs: Vec<String>,

    /// Path patterns, in authored order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub paths: Vec<String>,
}
