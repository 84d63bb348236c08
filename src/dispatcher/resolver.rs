//! Cluster selection for a job.
//!
//! # Responsibilities
//! - Route non-Kubernetes jobs to the fallback cluster
//! - Resolve Kubernetes jobs against the static table, then build farms
//! - Report whether a placement came only from a build farm
//!
//! # Design Decisions
//! - First match wins; explicit job names beat path patterns
//! - Scans follow BTreeMap order (providers, then clusters, lexicographic),
//!   so a name or path declared twice always resolves the same way
//! - Resolution is total: anything unmatched gets the default cluster

use serde::Serialize;

use crate::config::model::{Config, Group, Rule};
use crate::dispatcher::matcher::Matcher;
use crate::dispatcher::types::{ClusterName, JobBase};

/// Outcome of build-farm-aware resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assignment {
    pub cluster: ClusterName,
    /// True only when no static rule matched and a build-farm group did.
    pub can_be_relocated: bool,
}

impl Assignment {
    fn fixed(cluster: &ClusterName) -> Self {
        Self {
            cluster: cluster.clone(),
            can_be_relocated: false,
        }
    }
}

impl From<Assignment> for (ClusterName, bool) {
    fn from(assignment: Assignment) -> Self {
        (assignment.cluster, assignment.can_be_relocated)
    }
}

/// First cluster whose group matches, trying every rule in precedence order
/// across all groups before falling to the next rule.
fn first_match<'a, I>(groups: I, job: &JobBase, path: &str) -> Option<&'a ClusterName>
where
    I: Iterator<Item = (&'a ClusterName, &'a Group)> + Clone,
{
    Rule::ORDER.iter().find_map(|&rule| {
        groups
            .clone()
            .find(|(_, group)| group.matcher(rule).matches(job, path))
            .map(|(cluster, _)| cluster)
    })
}

impl Config {
    /// Pick the cluster for a job from the static table alone.
    pub fn get_cluster_for_job(&self, job: &JobBase, path: &str) -> ClusterName {
        if !job.agent.is_kubernetes() {
            return self.non_kubernetes().clone();
        }

        let cluster = first_match(self.groups().iter(), job, path).unwrap_or(self.default_cluster());
        tracing::trace!(job = %job.name, path, cluster = %cluster, "Resolved cluster");
        cluster.clone()
    }

    /// Pick the cluster for a job, consulting build farms when the static
    /// table has no rule for it.
    pub fn determine_cluster_for_job(&self, job: &JobBase, path: &str) -> Assignment {
        if !job.agent.is_kubernetes() {
            return Assignment::fixed(self.non_kubernetes());
        }

        if let Some(cluster) = first_match(self.groups().iter(), job, path) {
            tracing::trace!(job = %job.name, path, cluster = %cluster, "Resolved cluster from static groups");
            return Assignment::fixed(cluster);
        }

        let farm_groups = self.build_farm().values().flat_map(|groups| groups.iter());
        if let Some(cluster) = first_match(farm_groups, job, path) {
            tracing::trace!(job = %job.name, path, cluster = %cluster, "Resolved cluster from build farm");
            return Assignment {
                cluster: cluster.clone(),
                can_be_relocated: true,
            };
        }

        Assignment::fixed(self.default_cluster())
    }

    /// True if any static group's patterns match `path`.
    pub fn matching_path_regex(&self, path: &str) -> bool {
        self.groups().values().any(|group| group.matches_path(path))
    }
}
