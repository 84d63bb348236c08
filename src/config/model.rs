//! Compiled, immutable routing table.

use std::collections::{BTreeMap, BTreeSet};

use crate::config::schema::{ConfigDocument, GroupSpec};
use crate::dispatcher::matcher::{JobNameMatcher, Matcher, PathMatcher};
use crate::dispatcher::types::{CloudProvider, ClusterName};

/// Routing rules attached to one cluster.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Group {
    jobs: JobNameMatcher,
    paths: PathMatcher,
}

/// Which half of a group a lookup consults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    JobName,
    Path,
}

impl Rule {
    /// Precedence order: explicit names beat patterns.
    pub const ORDER: [Rule; 2] = [Rule::JobName, Rule::Path];
}

impl Group {
    pub(crate) fn new(jobs: JobNameMatcher, paths: PathMatcher) -> Self {
        Self { jobs, paths }
    }

    pub fn jobs(&self) -> &BTreeSet<String> {
        self.jobs.names()
    }

    pub fn paths(&self) -> &[String] {
        self.paths.patterns()
    }

    pub fn has_job(&self, name: &str) -> bool {
        self.jobs.contains(name)
    }

    pub fn matches_path(&self, path: &str) -> bool {
        self.paths.is_match(path)
    }

    pub fn matcher(&self, rule: Rule) -> &dyn Matcher {
        match rule {
            Rule::JobName => &self.jobs,
            Rule::Path => &self.paths,
        }
    }

    fn to_spec(&self) -> GroupSpec {
        GroupSpec {
            jobs: self.jobs().iter().cloned().collect(),
            paths: self.paths().to_vec(),
        }
    }
}

/// Groups keyed by cluster. Iteration is lexicographic by cluster name,
/// which is the order every resolver scan relies on.
pub type JobGroups = BTreeMap<ClusterName, Group>;

/// The full routing table.
///
/// Only obtainable through validation, so every pattern in it compiled and
/// every cluster appears in exactly one place. There are no mutators; share
/// it behind an `Arc` and read from any number of threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    default: ClusterName,
    non_kubernetes: ClusterName,
    groups: JobGroups,
    build_farm: BTreeMap<CloudProvider, JobGroups>,
}

impl Config {
    pub(crate) fn from_parts(
        default: ClusterName,
        non_kubernetes: ClusterName,
        groups: JobGroups,
        build_farm: BTreeMap<CloudProvider, JobGroups>,
    ) -> Self {
        Self {
            default,
            non_kubernetes,
            groups,
            build_farm,
        }
    }

    pub fn default_cluster(&self) -> &ClusterName {
        &self.default
    }

    pub fn non_kubernetes(&self) -> &ClusterName {
        &self.non_kubernetes
    }

    pub fn groups(&self) -> &JobGroups {
        &self.groups
    }

    pub fn group(&self, cluster: &str) -> Option<&Group> {
        self.groups.get(cluster)
    }

    pub fn build_farm(&self) -> &BTreeMap<CloudProvider, JobGroups> {
        &self.build_farm
    }

    /// Reconstruct the serialized form. Jobs come back sorted, paths in
    /// their authored order.
    pub fn to_document(&self) -> ConfigDocument {
        ConfigDocument {
            default: self.default.clone(),
            non_kubernetes: self.non_kubernetes.clone(),
            groups: specs(&self.groups),
            build_farm: self
                .build_farm
                .iter()
                .map(|(provider, groups)| (provider.clone(), specs(groups)))
                .collect(),
        }
    }
}

fn specs(groups: &JobGroups) -> BTreeMap<ClusterName, GroupSpec> {
    groups
        .iter()
        .map(|(cluster, group)| (cluster.clone(), group.to_spec()))
        .collect()
}
