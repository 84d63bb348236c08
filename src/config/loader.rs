//! Configuration loading from disk.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::model::Config;
use crate::config::schema::ConfigDocument;
use crate::config::validation::{validate_config, ValidationErrors};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read the config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to unmarshal the config as YAML: {0}")]
    ParseYaml(#[source] serde_yaml::Error),

    #[error("failed to unmarshal the config as TOML: {0}")]
    ParseToml(#[source] toml::de::Error),

    #[error("failed to marshal the config as YAML: {0}")]
    SerializeYaml(#[source] serde_yaml::Error),

    #[error("failed to marshal the config as TOML: {0}")]
    SerializeToml(#[source] toml::ser::Error),

    #[error("failed to write the config file {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Validation(#[from] ValidationErrors),
}

/// Serialization format of a configuration document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Toml,
}

impl Format {
    /// `.toml` files are TOML; everything else is YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Format::Toml,
            _ => Format::Yaml,
        }
    }
}

/// Parse a document without validating it.
pub fn parse_document(content: &str, format: Format) -> Result<ConfigDocument, ConfigError> {
    match format {
        Format::Yaml => serde_yaml::from_str(content).map_err(ConfigError::ParseYaml),
        Format::Toml => toml::from_str(content).map_err(ConfigError::ParseToml),
    }
}

/// Parse and validate a document.
pub fn parse_config(content: &str, format: Format) -> Result<Config, ConfigError> {
    let doc = parse_document(content, format)?;
    Ok(validate_config(doc)?)
}

/// Load and validate configuration from a YAML or TOML file.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse_config(&content, Format::from_path(path))?;

    tracing::info!(
        path = %path.display(),
        default = %config.default_cluster(),
        non_kubernetes = %config.non_kubernetes(),
        groups = config.groups().len(),
        build_farm_providers = config.build_farm().len(),
        "Dispatcher configuration loaded"
    );

    Ok(config)
}

/// Serialize a configuration in the given format.
pub fn render_config(config: &Config, format: Format) -> Result<String, ConfigError> {
    let doc = config.to_document();
    match format {
        Format::Yaml => serde_yaml::to_string(&doc).map_err(ConfigError::SerializeYaml),
        Format::Toml => toml::to_string(&doc).map_err(ConfigError::SerializeToml),
    }
}

/// Write a configuration to a file, picking the format from its extension.
pub fn save_config(config: &Config, path: &Path) -> Result<(), ConfigError> {
    let content = render_config(config, Format::from_path(path))?;
    fs::write(path, content).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}

impl Config {
    /// Compile and validate an already-parsed document.
    pub fn from_document(doc: ConfigDocument) -> Result<Self, ValidationErrors> {
        validate_config(doc)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        parse_config(content, Format::Yaml)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        parse_config(content, Format::Toml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
default: api.ci
nonKubernetes: app.ci
groups:
  api.ci:
    jobs:
    - periodic-acme-cert-issuer-for-build01
    paths:
    - ".*-postsubmits.yaml$"
buildFarm:
  aws:
    build01: {}
"#;

    #[test]
    fn test_format_from_path() {
        assert_eq!(Format::from_path(Path::new("c.toml")), Format::Toml);
        assert_eq!(Format::from_path(Path::new("c.yaml")), Format::Yaml);
        assert_eq!(Format::from_path(Path::new("config")), Format::Yaml);
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("testdata/does_not_exist.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().starts_with("failed to read the config file"));
    }

    #[test]
    fn test_malformed_yaml() {
        let err = Config::from_yaml_str("invalid yaml format\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseYaml(_)));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_malformed_toml() {
        let err = Config::from_toml_str("default = ").unwrap_err();
        match &err {
            ConfigError::ParseToml(source) => assert!(!source.message().is_empty()),
            other => panic!("unexpected error: {}", other),
        }
        assert!(err.to_string().starts_with("failed to unmarshal the config as TOML"));
    }

    #[test]
    fn test_invalid_patterns_are_one_error() {
        let yaml = "default: api.ci\nnonKubernetes: app.ci\ngroups:\n  default:\n    paths:\n    - \"[\"\n    - \"(x\"\n";
        match Config::from_yaml_str(yaml).unwrap_err() {
            ConfigError::Validation(errors) => assert_eq!(errors.len(), 2),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_yaml_and_toml_agree() {
        let from_yaml = Config::from_yaml_str(YAML).unwrap();
        let toml = render_config(&from_yaml, Format::Toml).unwrap();
        let from_toml = Config::from_toml_str(&toml).unwrap();
        assert_eq!(from_yaml, from_toml);
    }

    #[test]
    fn test_save_and_reload() {
        let config = Config::from_yaml_str(YAML).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("_config.yaml");

        save_config(&config, &path).unwrap();
        let reloaded = load_config(&path).unwrap();
        assert_eq!(config, reloaded);
        assert_eq!(reloaded.to_document(), parse_document(YAML, Format::Yaml).unwrap());
    }
}
