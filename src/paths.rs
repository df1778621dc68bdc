//! Path resolution for aks-stack
//!
//! # Environment Variables
//!
//! - `AKS_STACK_CONFIG_DIR` - Override the directory searched for `stack.toml`
//!
//! # Path Resolution Priority
//!
//! For config_dir():
//! 1. `AKS_STACK_CONFIG_DIR` environment variable
//! 2. `XDG_CONFIG_HOME/aks-stack` (if set)
//! 3. Platform default:
//!    - Windows: `%APPDATA%\aks-stack`
//!    - macOS/Linux: `~/.config/aks-stack`

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Environment variable for config directory override
pub const ENV_CONFIG_DIR: &str = "AKS_STACK_CONFIG_DIR";

const APP_DIR: &str = "aks-stack";

/// Get the aks-stack config directory path
pub fn config_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(ENV_CONFIG_DIR) {
        let path = expand(&dir);
        log::debug!(
            "Using config dir from {}: {}",
            ENV_CONFIG_DIR,
            path.display()
        );
        return Ok(path);
    }

    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        let path = PathBuf::from(xdg_config).join(APP_DIR);
        log::debug!("Using XDG_CONFIG_HOME: {}", path.display());
        return Ok(path);
    }

    #[cfg(windows)]
    {
        if let Some(app_data) = dirs::config_dir() {
            let path = app_data.join(APP_DIR);
            log::debug!("Using Windows config dir: {}", path.display());
            return Ok(path);
        }
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    let path = home.join(".config").join(APP_DIR);
    log::debug!("Using default config dir: {}", path.display());
    Ok(path)
}

/// Expand ~ and environment variables in a path string.
///
/// Unknown variables are left as written.
pub fn expand(path: &str) -> PathBuf {
    let expanded = shellexpand::full(path).unwrap_or(std::borrow::Cow::Borrowed(path));
    PathBuf::from(expanded.as_ref())
}

/// Expand `path` and anchor it at `base` when it is relative
pub fn resolve(path: &str, base: Option<&Path>) -> PathBuf {
    let expanded = expand(path);
    match base {
        Some(base) if expanded.is_relative() => base.join(expanded),
        _ => expanded,
    }
}

// ============================================================================
// Tests
// ============================================================================
