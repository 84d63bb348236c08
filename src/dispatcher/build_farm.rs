//! Build-farm membership queries.

use crate::config::model::Config;
use crate::dispatcher::types::{CloudProvider, ClusterName};

impl Config {
    /// Provider whose build farm contains `cluster`, if any.
    ///
    /// Validation guarantees at most one provider lists a cluster and that
    /// no farm cluster is also a static group.
    pub fn is_in_build_farm(&self, cluster: &str) -> Option<&CloudProvider> {
        self.build_farm()
            .iter()
            .find(|(_, clusters)| clusters.contains_key(cluster))
            .map(|(provider, _)| provider)
    }

    /// Providers with a build farm, in name order.
    pub fn build_farm_providers(&self) -> impl Iterator<Item = &CloudProvider> + '_ {
        self.build_farm().keys()
    }

    /// Clusters in one provider's build farm, in name order. Empty for an
    /// unknown provider.
    pub fn build_farm_clusters<'a>(&'a self, provider: &str) -> impl Iterator<Item = &'a ClusterName> + 'a {
        self.build_farm()
            .get(provider)
            .into_iter()
            .flat_map(|clusters| clusters.keys())
    }
}

#[cfg(test)]
mod tests {
    use crate::config::model::Config;
    use crate::dispatcher::types::{CLOUD_AWS, CLOUD_GCP, CLUSTER_APP_CI, CLUSTER_BUILD01, CLUSTER_BUILD02};

    const YAML: &str = r#"
default: api.ci
nonKubernetes: app.ci
groups:
  app.ci:
    jobs: [some-job]
  api.ci: {}
buildFarm:
  aws:
    build01: {}
    build03: {}
  gcp:
    build02: {}
"#;

    #[test]
    fn test_is_in_build_farm() {
        let c = Config::from_yaml_str(YAML).unwrap();
        assert_eq!(c.is_in_build_farm(CLUSTER_BUILD01).map(|p| p.as_str()), Some(CLOUD_AWS));
        assert_eq!(c.is_in_build_farm(CLUSTER_BUILD02).map(|p| p.as_str()), Some(CLOUD_GCP));
        assert_eq!(c.is_in_build_farm(CLUSTER_APP_CI), None);
        assert_eq!(c.is_in_build_farm("nowhere"), None);
    }

    #[test]
    fn test_build_farm_listing() {
        let c = Config::from_yaml_str(YAML).unwrap();
        let providers: Vec<_> = c.build_farm_providers().map(|p| p.as_str()).collect();
        assert_eq!(providers, vec!["aws", "gcp"]);

        let aws: Vec<_> = c.build_farm_clusters("aws").map(|n| n.as_str()).collect();
        assert_eq!(aws, vec!["build01", "build03"]);
        assert_eq!(c.build_farm_clusters("azure").count(), 0);
    }
}
