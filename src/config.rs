//! Stack configuration
//!
//! Loaded from `stack.toml` (or `stack.json`). Every key is optional:
//!
//! ```toml
//! managedClusterName = "azure-native-aks"
//! location = "westus"
//! bindGeneratedPassword = false
//!
//! [paths]
//! module = "."
//! ```

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::paths;

/// Cluster name used when `managedClusterName` is not configured
pub const DEFAULT_MANAGED_CLUSTER_NAME: &str = "azure-native-aks";

/// Environment variable naming an explicit config file
pub const ENV_CONFIG_FILE: &str = "AKS_STACK_CONFIG";

const CONFIG_BASENAME: &str = "stack";

/// Config file that [`StackConfig::load`] would read, if any
///
/// TOML is preferred over JSON when both exist.
pub fn locate(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        return Ok(Some(path.to_path_buf()));
    }
    Ok(find_in(&paths::config_dir()?))
}

fn find_in(dir: &Path) -> Option<PathBuf> {
    ["toml", "json"]
        .into_iter()
        .map(|ext| dir.join(format!("{CONFIG_BASENAME}.{ext}")))
        .find(|path| path.exists())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Ok(Self::Toml),
            Some("json") => Ok(Self::Json),
            _ => bail!(
                "Unsupported config format: {} (expected .toml or .json)",
                path.display()
            ),
        }
    }
}

/// Path mapping the runbook script is read through
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PathMap {
    /// Directory holding `stop-cluster.ps1`
    #[serde(default = "default_module_path")]
    pub module: String,
}

fn default_module_path() -> String {
    ".".to_string()
}

impl Default for PathMap {
    fn default() -> Self {
        Self {
            module: default_module_path(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StackConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub managed_cluster_name: Option<String>,

    /// Region for the resource group; the engine's provider default when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Wire the generated random password into the service principal credential
    #[serde(default)]
    pub bind_generated_password: bool,

    #[serde(default)]
    pub paths: PathMap,

    /// Directory the config was loaded from; relative paths resolve against it
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

impl StackConfig {
    /// Load configuration
    ///
    /// 1. `explicit` path (from `--config` / `AKS_STACK_CONFIG`), which must exist
    /// 2. `stack.toml` or `stack.json` in the config directory
    /// 3. Defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match locate(explicit)? {
            Some(path) => Self::load_file(&path),
            None => {
                log::debug!("No stack config found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn load_file(path: &Path) -> Result<Self> {
        let format = ConfigFormat::from_path(path)?;
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read config file: {}", path.display()))?;
        let mut config = Self::parse(&content, format)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        log::debug!("Loaded stack config from {}", path.display());
        Ok(config)
    }

    pub fn parse(content: &str, format: ConfigFormat) -> Result<Self> {
        let config = match format {
            ConfigFormat::Toml => toml::from_str(content)?,
            ConfigFormat::Json => serde_json::from_str(content)?,
        };
        Ok(config)
    }

    /// Configured cluster name, falling back to [`DEFAULT_MANAGED_CLUSTER_NAME`]
    pub fn managed_cluster_name(&self) -> &str {
        self.managed_cluster_name
            .as_deref()
            .unwrap_or(DEFAULT_MANAGED_CLUSTER_NAME)
    }

    /// Directory `paths.module` points at
    pub fn module_dir(&self) -> PathBuf {
        paths::resolve(&self.paths.module, self.base_dir.as_deref())
    }

    /// Copy with defaults substituted, for display
    pub fn effective(&self) -> Self {
        Self {
            managed_cluster_name: Some(self.managed_cluster_name().to_string()),
            ..self.clone()
        }
    }
}
