//! Run configuration
//!
//! Loaded from a YAML file (default `scholargraph.yaml`). The `NEO4J_*`
//! environment variables override the connection section key by key.

use crate::community::CommunityConfig;
use crate::error::{ScholarError, ScholarResult};
use crate::loader::{LoadPlan, SchemaVariant};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_CONFIG_FILE: &str = "scholargraph.yaml";

const ENV_URI: &str = "NEO4J_URI";
const ENV_USER: &str = "NEO4J_USER";
const ENV_PASSWORD: &str = "NEO4J_PASSWORD";
const ENV_DATABASE: &str = "NEO4J_DATABASE";

/// Graph store connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// `http(s)://host:port` of the transactional endpoint
    pub uri: String,
    pub user: String,
    pub password: String,
    pub database: String,
    /// Time allowed to establish the TCP/TLS connection
    pub connect_timeout_secs: u64,
    /// Optional cap on a whole statement; unset means statements may run
    /// as long as the server takes
    pub request_timeout_secs: Option<u64>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            uri: String::new(),
            user: "neo4j".to_string(),
            password: String::new(),
            database: "neo4j".to_string(),
            connect_timeout_secs: 30,
            request_timeout_secs: None,
        }
    }
}

impl ConnectionConfig {
    pub fn is_configured(&self) -> bool {
        !self.uri.is_empty()
    }

    fn apply_env(&mut self, env: &impl Fn(&str) -> Option<String>) {
        if let Some(uri) = env(ENV_URI) {
            self.uri = uri;
        }
        if let Some(user) = env(ENV_USER) {
            self.user = user;
        }
        if let Some(password) = env(ENV_PASSWORD) {
            self.password = password;
        }
        if let Some(database) = env(ENV_DATABASE) {
            self.database = database;
        }
    }

    fn validate(&self) -> ScholarResult<()> {
        if !self.is_configured() {
            return Err(ScholarError::Config(format!(
                "no connection URI: set neo4j.uri or {}",
                ENV_URI
            )));
        }
        if !(self.uri.starts_with("http://") || self.uri.starts_with("https://")) {
            return Err(ScholarError::Config(format!(
                "unsupported URI '{}': only http:// and https:// are supported",
                self.uri
            )));
        }
        if self.database.trim().is_empty() {
            return Err(ScholarError::Config("database name is empty".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Target year of the impact-factor query
    pub impact_year: i64,
    /// Distinct editions an author needs to join a conference community
    pub min_editions: u64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            impact_year: 2021,
            min_editions: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlgorithmsConfig {
    pub limit: usize,
}

impl Default for AlgorithmsConfig {
    fn default() -> Self {
        Self { limit: 10 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub neo4j: ConnectionConfig,
    /// Loader task key (`authors`, `paper_keywords`, ...) to CSV file
    pub csv_paths: BTreeMap<String, PathBuf>,
    pub output_dir: PathBuf,
    pub schema: SchemaVariant,
    pub analytics: AnalyticsConfig,
    pub community: CommunityConfig,
    pub algorithms: AlgorithmsConfig,
}

impl Config {
    /// Load a config file, applying process environment overrides
    pub fn load(path: Option<&Path>) -> ScholarResult<Self> {
        Self::load_with_env(path, |key| std::env::var(key).ok())
    }

    /// Load with an explicit environment lookup.
    ///
    /// An explicitly named file must exist. Without one, the default file is
    /// read when present and the environment alone is accepted otherwise.
    pub fn load_with_env<F>(path: Option<&Path>, env: F) -> ScholarResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let (file, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        let mut config = if file.exists() {
            debug!("Reading config from {}", file.display());
            let text = std::fs::read_to_string(&file)?;
            let mut config: Config = serde_yaml::from_str(&text)?;
            if let Some(dir) = file.parent() {
                config.resolve_paths(dir);
            }
            config
        } else if required {
            return Err(ScholarError::Config(format!(
                "config file {} not found",
                file.display()
            )));
        } else {
            debug!("No {} found, using defaults", file.display());
            Config::default()
        };

        config.neo4j.apply_env(&env);
        Ok(config)
    }

    /// Relative CSV paths and output dir are taken relative to the config file
    fn resolve_paths(&mut self, base: &Path) {
        for path in self.csv_paths.values_mut() {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
        if self.output_dir.is_relative() && !self.output_dir.as_os_str().is_empty() {
            self.output_dir = base.join(&self.output_dir);
        }
    }

    /// Validated connection settings for the HTTP backend
    pub fn connection(&self) -> ScholarResult<&ConnectionConfig> {
        self.neo4j.validate()?;
        Ok(&self.neo4j)
    }

    /// Build the load plan from `csv_paths`
    pub fn load_plan(&self) -> ScholarResult<LoadPlan> {
        LoadPlan::from_paths(&self.csv_paths)
    }

    pub fn output_dir(&self) -> PathBuf {
        if self.output_dir.as_os_str().is_empty() {
            PathBuf::from("output")
        } else {
            self.output_dir.clone()
        }
    }
}
