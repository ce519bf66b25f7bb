//! Service configuration
//!
//! Loaded once at startup: defaults, then an optional YAML file, then
//! environment overrides, then command-line flags, then validation.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid value for {var}: '{value}'")]
    InvalidEnv { var: &'static str, value: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Which graph backend serves queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Gremlin,
    Memory,
}

impl std::str::FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gremlin" | "neptune" => Ok(BackendKind::Gremlin),
            "memory" => Ok(BackendKind::Memory),
            other => Err(format!("unknown backend '{}'", other)),
        }
    }
}

/// How requests to the graph endpoint are authenticated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    #[default]
    None,
    /// AWS SigV4 signed requests
    Iam,
}

impl std::str::FromStr for AuthMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" | "" => Ok(AuthMode::None),
            "iam" => Ok(AuthMode::Iam),
            other => Err(format!("unknown auth mode '{}'", other)),
        }
    }
}

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    pub address: String,
    /// Port
    pub port: u16,
    /// Prefix mounted in front of every route, e.g. `/api/graph`
    pub route_prefix: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "0.0.0.0".to_string(),
            port: 3000,
            route_prefix: String::new(),
        }
    }
}

/// Graph database connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    pub backend: BackendKind,
    /// Host name of the Gremlin endpoint
    pub endpoint: String,
    pub port: u16,
    pub use_tls: bool,
    pub auth_mode: AuthMode,
    /// AWS region, required in IAM mode
    pub region: Option<String>,
    /// JSON fixture for the memory backend
    pub fixture_path: Option<PathBuf>,
    pub connect_timeout_ms: u64,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Gremlin,
            endpoint: "localhost".to_string(),
            port: 8182,
            use_tls: false,
            auth_mode: AuthMode::None,
            region: None,
            fixture_path: None,
            connect_timeout_ms: 2000,
        }
    }
}

impl GraphConfig {
    /// Full URL of the Gremlin HTTP endpoint
    pub fn gremlin_url(&self) -> String {
        let scheme = if self.use_tls { "https" } else { "http" };
        format!("{}://{}:{}/gremlin", scheme, self.endpoint, self.port)
    }
}

/// Query adapter tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    pub query_timeout_ms: u64,
    /// 0 or 1
    pub unavailable_retries: u32,
    pub retry_backoff_ms: u64,
    pub max_subgraph_vertices: usize,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            query_timeout_ms: 5000,
            unavailable_retries: 1,
            retry_backoff_ms: 100,
            max_subgraph_vertices: 500,
        }
    }
}

impl AdapterConfig {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

/// Complete service configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub graph: GraphConfig,
    pub adapter: AdapterConfig,
}

impl AppConfig {
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }

    /// Override fields from environment variables read through `lookup`
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("PORT") {
            self.server.port = parse_env("PORT", &v)?;
        }
        if let Some(v) = lookup("BIND_ADDRESS") {
            self.server.address = v;
        }
        if let Some(v) = lookup("ROUTE_PREFIX") {
            self.server.route_prefix = v;
        }
        if let Some(v) = lookup("GRAPH_BACKEND") {
            self.graph.backend = parse_env("GRAPH_BACKEND", &v)?;
        }
        if let Some(v) = lookup("GRAPH_ENDPOINT") {
            self.graph.endpoint = v;
        }
        if let Some(v) = lookup("GRAPH_PORT") {
            self.graph.port = parse_env("GRAPH_PORT", &v)?;
        }
        if let Some(v) = lookup("GRAPH_USE_TLS") {
            self.graph.use_tls = parse_bool("GRAPH_USE_TLS", &v)?;
        }
        if let Some(v) = lookup("GRAPH_AUTH_MODE") {
            self.graph.auth_mode = parse_env("GRAPH_AUTH_MODE", &v)?;
        }
        if let Some(v) = lookup("AWS_REGION") {
            self.graph.region = Some(v);
        }
        if let Some(v) = lookup("GRAPH_FIXTURE") {
            self.graph.fixture_path = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("GRAPH_QUERY_TIMEOUT_MS") {
            self.adapter.query_timeout_ms = parse_env("GRAPH_QUERY_TIMEOUT_MS", &v)?;
        }
        if let Some(v) = lookup("GRAPH_UNAVAILABLE_RETRIES") {
            self.adapter.unavailable_retries = parse_env("GRAPH_UNAVAILABLE_RETRIES", &v)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let prefix = &self.server.route_prefix;
        if !prefix.is_empty() && (!prefix.starts_with('/') || prefix.ends_with('/')) {
            return Err(ConfigError::Invalid(format!(
                "route_prefix '{}' must start with '/' and not end with '/'",
                prefix
            )));
        }
        if self.adapter.query_timeout_ms == 0 {
            return Err(ConfigError::Invalid("query_timeout_ms must be positive".into()));
        }
        if self.adapter.unavailable_retries > 1 {
            return Err(ConfigError::Invalid(format!(
                "unavailable_retries must be 0 or 1, got {}",
                self.adapter.unavailable_retries
            )));
        }
        if self.adapter.max_subgraph_vertices == 0 {
            return Err(ConfigError::Invalid(
                "max_subgraph_vertices must be positive".into(),
            ));
        }
        match self.graph.backend {
            BackendKind::Gremlin => {
                if self.graph.endpoint.trim().is_empty() {
                    return Err(ConfigError::Invalid("graph endpoint is empty".into()));
                }
                if self.graph.auth_mode == AuthMode::Iam && self.graph.region.is_none() {
                    return Err(ConfigError::Invalid(
                        "IAM auth requires a region (AWS_REGION)".into(),
                    ));
                }
            }
            BackendKind::Memory => {
                if self.graph.fixture_path.is_none() {
                    return Err(ConfigError::Invalid(
                        "memory backend requires a fixture path (GRAPH_FIXTURE)".into(),
                    ));
                }
            }
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(var: &'static str, value: &str) -> ConfigResult<T> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        var,
        value: value.to_string(),
    })
}

fn parse_bool(var: &'static str, value: &str) -> ConfigResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidEnv {
            var,
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.graph.gremlin_url(), "http://localhost:8182/gremlin");
        assert_eq!(config.adapter.query_timeout(), Duration::from_secs(5));
        assert_eq!(config.adapter.unavailable_retries, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_yaml_partial_sections() {
        let yaml = r#"
server:
  port: 8080
  route_prefix: /api/graph
graph:
  endpoint: db.cluster.neptune.amazonaws.com
  use_tls: true
  auth_mode: iam
  region: us-east-1
"#;
        let config = AppConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.address, "0.0.0.0");
        assert_eq!(config.graph.auth_mode, AuthMode::Iam);
        assert_eq!(
            config.graph.gremlin_url(),
            "https://db.cluster.neptune.amazonaws.com:8182/gremlin"
        );
        assert_eq!(config.adapter, AdapterConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(AppConfig::from_yaml_str("  \n").unwrap(), AppConfig::default());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::default();
        config
            .apply_env_overrides(env(&[
                ("PORT", "9000"),
                ("GRAPH_BACKEND", "memory"),
                ("GRAPH_FIXTURE", "data/sample_graph.json"),
                ("GRAPH_USE_TLS", "true"),
                ("GRAPH_QUERY_TIMEOUT_MS", "250"),
                ("GRAPH_UNAVAILABLE_RETRIES", "0"),
            ]))
            .unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.graph.backend, BackendKind::Memory);
        assert!(config.graph.use_tls);
        assert_eq!(config.adapter.query_timeout_ms, 250);
        assert_eq!(config.adapter.unavailable_retries, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_override_rejects_garbage() {
        let mut config = AppConfig::default();
        let err = config
            .apply_env_overrides(env(&[("GRAPH_PORT", "eighty")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { var: "GRAPH_PORT", .. }));

        let err = config
            .apply_env_overrides(env(&[("GRAPH_AUTH_MODE", "kerberos")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { var: "GRAPH_AUTH_MODE", .. }));
    }

    #[test]
    fn test_validation_failures() {
        let mut iam = AppConfig::default();
        iam.graph.auth_mode = AuthMode::Iam;
        assert!(matches!(iam.validate(), Err(ConfigError::Invalid(_))));

        let mut memory = AppConfig::default();
        memory.graph.backend = BackendKind::Memory;
        assert!(memory.validate().is_err());

        let mut retries = AppConfig::default();
        retries.adapter.unavailable_retries = 3;
        assert!(retries.validate().is_err());

        let mut prefix = AppConfig::default();
        prefix.server.route_prefix = "api/".to_string();
        assert!(prefix.validate().is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("moviegraph.yaml");
        std::fs::write(&path, "adapter:\n  query_timeout_ms: 1500\n").unwrap();
        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.adapter.query_timeout_ms, 1500);

        std::fs::write(&path, "server: [not, a, map]\n").unwrap();
        assert!(matches!(
            AppConfig::from_file(&path),
            Err(ConfigError::Parse { .. })
        ));
        assert!(matches!(
            AppConfig::from_file(&dir.path().join("missing.yaml")),
            Err(ConfigError::Read { .. })
        ));
    }
}
