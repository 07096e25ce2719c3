//! Pipeline and repository catalog loaded from YAML

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::Value;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "ADO_PIPELINES_CONFIG";

/// Default config file name
pub const CONFIG_FILE: &str = "config.yaml";

/// Top-level configuration loaded from YAML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Runtime settings (timeouts, cache window, dump directory)
    #[serde(default)]
    pub settings: Settings,

    /// Configured pipelines, in file order
    #[serde(default)]
    pub pipelines: Vec<PipelineEntry>,

    /// Local repositories that can supply a branch
    #[serde(default)]
    pub repositories: Vec<RepositoryEntry>,

    /// File this config was read from
    #[serde(skip)]
    source: Option<PathBuf>,
}

/// One Azure DevOps pipeline definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineEntry {
    /// Unique pipeline name
    pub name: String,

    /// Organization name or URL
    pub organization: String,

    /// Project name
    pub project: String,

    /// Numeric pipeline definition id
    #[serde(rename = "pipelineID", alias = "pipeline_id")]
    pub pipeline_id: u64,

    /// Default branch to queue runs on
    #[serde(default)]
    pub branch: Option<String>,

    /// Variables passed on every run
    #[serde(default, deserialize_with = "scalar_map")]
    pub variables: BTreeMap<String, String>,
}

impl PipelineEntry {
    /// Configured default branch, ignoring blank values
    pub fn default_branch(&self) -> Option<&str> {
        self.branch.as_deref().map(str::trim).filter(|b| !b.is_empty())
    }
}

/// A local git checkout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryEntry {
    pub name: String,

    pub path: String,

    /// Alternative names accepted by exact lookup
    #[serde(default)]
    pub aliases: Vec<String>,

    #[serde(default)]
    pub description: String,
}

/// Runtime settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Timeout for each az invocation (in seconds)
    #[serde(default = "default_command_timeout_secs")]
    pub command_timeout_secs: u64,

    /// Timeout for each `--version` probe while locating az (in seconds)
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,

    /// How long an authentication check stays valid (in seconds)
    #[serde(default = "default_auth_ttl_secs")]
    pub auth_ttl_secs: u64,

    /// Directory for debug dumps, relative to the config file
    #[serde(default = "default_responses_dir")]
    pub responses_dir: PathBuf,

    /// Executable locations to probe, in order
    #[serde(default)]
    pub cli_candidates: Option<Vec<String>>,
}

fn default_command_timeout_secs() -> u64 {
    30
}

fn default_probe_timeout_secs() -> u64 {
    5
}

fn default_auth_ttl_secs() -> u64 {
    300
}

fn default_responses_dir() -> PathBuf {
    PathBuf::from("responses")
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            command_timeout_secs: default_command_timeout_secs(),
            probe_timeout_secs: default_probe_timeout_secs(),
            auth_ttl_secs: default_auth_ttl_secs(),
            responses_dir: default_responses_dir(),
            cli_candidates: None,
        }
    }
}

impl Settings {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn auth_ttl(&self) -> Duration {
        Duration::from_secs(self.auth_ttl_secs)
    }
}

/// Accept strings, numbers and booleans as variable values
fn scalar_map<'de, D>(deserializer: D) -> std::result::Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, Value>> = Option::deserialize(deserializer)?;
    let mut variables = BTreeMap::new();

    for (name, value) in raw.unwrap_or_default() {
        let rendered = match value {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Null => String::new(),
            _ => {
                return Err(serde::de::Error::custom(format!(
                    "variable '{}' must be a string, number or boolean",
                    name
                )))
            }
        };
        variables.insert(name, rendered);
    }

    Ok(variables)
}

impl CatalogConfig {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config = Self::from_yaml(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: CatalogConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for pipeline in &self.pipelines {
            if pipeline.name.trim().is_empty() {
                anyhow::bail!("Pipeline with id {} has an empty name", pipeline.pipeline_id);
            }
            if !seen.insert(pipeline.name.to_lowercase()) {
                anyhow::bail!("Duplicate pipeline name: {}", pipeline.name);
            }
            if pipeline.organization.trim().is_empty() || pipeline.project.trim().is_empty() {
                anyhow::bail!(
                    "Pipeline '{}' needs both an organization and a project",
                    pipeline.name
                );
            }
        }

        let mut seen = HashSet::new();
        for repository in &self.repositories {
            if !seen.insert(repository.name.to_lowercase()) {
                anyhow::bail!("Duplicate repository name: {}", repository.name);
            }
            if repository.path.trim().is_empty() {
                anyhow::bail!("Repository '{}' has no path", repository.name);
            }
        }

        Ok(())
    }

    /// File this config came from, if it was loaded from disk
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn pipeline_names(&self) -> Vec<String> {
        self.pipelines.iter().map(|p| p.name.clone()).collect()
    }

    pub fn repository_names(&self) -> Vec<String> {
        self.repositories.iter().map(|r| r.name.clone()).collect()
    }

    /// Debug dump directory, anchored at the config file's directory
    pub fn responses_dir(&self) -> PathBuf {
        let dir = &self.settings.responses_dir;
        if dir.is_absolute() {
            return dir.clone();
        }
        match self.source.as_deref().and_then(Path::parent) {
            Some(parent) => parent.join(dir),
            None => dir.clone(),
        }
    }
}

/// Pick the config file: explicit path, then `$ADO_PIPELINES_CONFIG`, then
/// `./config.yaml`, then the per-user config directory.
pub fn resolve_config_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }

    if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }

    let local = PathBuf::from(CONFIG_FILE);
    if local.exists() {
        return local;
    }

    dirs::config_dir()
        .map(|dir| dir.join("ado-pipelines").join(CONFIG_FILE))
        .unwrap_or(local)
}
