//! Configuration validation.
//!
//! # Responsibilities
//! - Compile every path pattern (static groups and build farms)
//! - Check every cluster is declared in exactly one place
//! - Require the default and non-Kubernetes clusters to be named
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is a pure function: ConfigDocument → Result<Config, ValidationErrors>
//! - A Config only exists once validation has passed

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use crate::config::model::{Config, Group, JobGroups};
use crate::config::schema::{ConfigDocument, GroupSpec};
use crate::dispatcher::matcher::{JobNameMatcher, PathMatcher, PatternFault};
use crate::dispatcher::types::ClusterName;

/// A single problem found in a configuration document.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("failed to compile path pattern {location}.Paths[{index}] from {pattern:?}: {source}")]
    InvalidPattern {
        location: String,
        index: usize,
        pattern: String,
        #[source]
        source: PatternFault,
    },

    #[error("cluster {cluster} is declared in both {first} and {second}")]
    DuplicateCluster {
        cluster: ClusterName,
        first: String,
        second: String,
    },

    #[error("{field} must name a cluster")]
    EmptyClusterName { field: &'static str },
}

/// Every problem found in one validation pass.
#[derive(Debug)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<ValidationError> {
        self.0
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", err)?;
        }
        write!(f, "]")
    }
}

impl std::error::Error for ValidationErrors {}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Compile and validate a document into an immutable [`Config`].
pub fn validate_config(doc: ConfigDocument) -> Result<Config, ValidationErrors> {
    let mut errors = Vec::new();

    if doc.default.is_empty() {
        errors.push(ValidationError::EmptyClusterName { field: "default" });
    }
    if doc.non_kubernetes.is_empty() {
        errors.push(ValidationError::EmptyClusterName { field: "nonKubernetes" });
    }

    // cluster -> where it was first declared
    let mut declared: BTreeMap<ClusterName, String> = BTreeMap::new();

    let groups = compile_groups(doc.groups, "Groups", &mut declared, &mut errors);

    let mut build_farm = BTreeMap::new();
    for (provider, specs) in doc.build_farm {
        let place = format!("BuildFarm[{}]", provider);
        let groups = compile_groups(specs, &place, &mut declared, &mut errors);
        build_farm.insert(provider, groups);
    }

    if !errors.is_empty() {
        return Err(ValidationErrors(errors));
    }

    Ok(Config::from_parts(
        doc.default,
        doc.non_kubernetes,
        groups,
        build_farm,
    ))
}

fn compile_groups(
    specs: BTreeMap<ClusterName, GroupSpec>,
    place: &str,
    declared: &mut BTreeMap<ClusterName, String>,
    errors: &mut Vec<ValidationError>,
) -> JobGroups {
    let mut groups = JobGroups::new();

    for (cluster, spec) in specs {
        match declared.get(&cluster) {
            Some(first) => errors.push(ValidationError::DuplicateCluster {
                cluster: cluster.clone(),
                first: first.clone(),
                second: place.to_string(),
            }),
            None => {
                declared.insert(cluster.clone(), place.to_string());
            }
        }

        let location = format!("{}[{}]", place, cluster);
        if let Some(group) = compile_group(spec, &location, errors) {
            groups.insert(cluster, group);
        }
    }

    groups
}

fn compile_group(
    spec: GroupSpec,
    location: &str,
    errors: &mut Vec<ValidationError>,
) -> Option<Group> {
    let jobs = JobNameMatcher::new(spec.jobs);

    match PathMatcher::compile(spec.paths) {
        Ok(paths) => Some(Group::new(jobs, paths)),
        Err(failures) => {
            for failure in failures {
                tracing::warn!(
                    location = %location,
                    index = failure.index,
                    pattern = %failure.pattern,
                    "Invalid path pattern"
                );
                errors.push(ValidationError::InvalidPattern {
                    location: location.to_string(),
                    index: failure.index,
                    pattern: failure.pattern,
                    source: failure.source,
                });
            }
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(jobs: &[&str], paths: &[&str]) -> GroupSpec {
        GroupSpec {
            jobs: jobs.iter().map(|s| s.to_string()).collect(),
            paths: paths.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn document() -> ConfigDocument {
        ConfigDocument {
            default: "api.ci".into(),
            non_kubernetes: "app.ci".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_document() {
        let mut doc = document();
        doc.groups.insert("api.ci".into(), spec(&["job-a"], &[".*-postsubmits.yaml$"]));

        let config = validate_config(doc).unwrap();
        let group = config.group("api.ci").unwrap();
        assert!(group.has_job("job-a"));
        assert_eq!(group.paths(), [".*-postsubmits.yaml$".to_string()]);
    }

    #[test]
    fn test_all_invalid_patterns_reported() {
        let mut doc = document();
        doc.groups.insert("default".into(), spec(&[], &["[", "(unclosed"]));
        let mut aws = BTreeMap::new();
        aws.insert(ClusterName::from("build01"), spec(&[], &[".*ok$", "*nothing"]));
        doc.build_farm.insert("aws".into(), aws);

        let errors = validate_config(doc).unwrap_err();
        assert_eq!(errors.len(), 3);

        let message = errors.to_string();
        assert!(message.starts_with('['));
        assert!(message.contains(r#"failed to compile path pattern Groups[default].Paths[0] from "[""#));
        assert!(message.contains(r#"failed to compile path pattern Groups[default].Paths[1] from "(unclosed""#));
        assert!(message.contains(r#"failed to compile path pattern BuildFarm[aws][build01].Paths[1] from "*nothing""#));
    }

    #[test]
    fn test_unclosed_class_and_nested_repetition_in_one_report() {
        let mut doc = document();
        doc.groups.insert("default".into(), spec(&[], &["[", "[0-9]++"]));

        let errors = validate_config(doc).unwrap_err();
        let failing: Vec<_> = errors
            .iter()
            .map(|e| match e {
                ValidationError::InvalidPattern { location, index, pattern, .. } => {
                    (location.as_str(), *index, pattern.as_str())
                }
                other => panic!("unexpected error: {}", other),
            })
            .collect();
        assert_eq!(
            failing,
            vec![("Groups[default]", 0, "["), ("Groups[default]", 1, "[0-9]++")]
        );
    }

    #[test]
    fn test_cluster_in_groups_and_build_farm() {
        let mut doc = document();
        doc.groups.insert("build01".into(), GroupSpec::default());
        let mut aws = BTreeMap::new();
        aws.insert(ClusterName::from("build01"), GroupSpec::default());
        doc.build_farm.insert("aws".into(), aws);

        let errors = validate_config(doc).unwrap_err();
        match errors.iter().next() {
            Some(ValidationError::DuplicateCluster { cluster, first, second }) => {
                assert_eq!(cluster, "build01");
                assert_eq!(first, "Groups");
                assert_eq!(second, "BuildFarm[aws]");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_cluster_in_two_providers() {
        let mut doc = document();
        for provider in ["aws", "gcp"] {
            let mut clusters = BTreeMap::new();
            clusters.insert(ClusterName::from("build01"), GroupSpec::default());
            doc.build_farm.insert(provider.into(), clusters);
        }

        let errors = validate_config(doc).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.to_string(),
            "[cluster build01 is declared in both BuildFarm[aws] and BuildFarm[gcp]]"
        );
    }

    #[test]
    fn test_empty_cluster_names_and_patterns_in_one_report() {
        let mut doc = ConfigDocument::default();
        doc.groups.insert("api.ci".into(), spec(&[], &["["]));

        let errors = validate_config(doc).unwrap_err();
        let kinds: Vec<_> = errors
            .iter()
            .map(|e| match e {
                ValidationError::EmptyClusterName { field } => *field,
                ValidationError::InvalidPattern { .. } => "pattern",
                ValidationError::DuplicateCluster { .. } => "duplicate",
            })
            .collect();
        assert_eq!(kinds, vec!["default", "nonKubernetes", "pattern"]);
    }
}
