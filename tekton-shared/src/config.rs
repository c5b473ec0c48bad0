//! Configuration management for the Tekton pipeline explorer

use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for the explorer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExplorerConfig {
    /// CLI configuration
    #[serde(default)]
    pub cli: CliConfig,

    /// Resource cache configuration
    #[serde(default)]
    pub cache: CacheConfig,

    /// Cluster context file watching
    #[serde(default)]
    pub watch: WatchConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// CLI-specific configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Explicit path to `tkn`; looked up on PATH when unset
    pub tkn_path: Option<String>,

    /// Explicit path to `kubectl`; looked up on PATH when unset
    pub kubectl_path: Option<String>,
}

/// Resource cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Memoize listings until the next invalidation
    pub enabled: bool,
}

/// Which cluster context file to watch
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    pub enabled: bool,

    /// Directory holding the context file (defaults to `~/.kube`)
    pub kube_config_dir: Option<String>,

    pub file_name: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (json, pretty)
    pub format: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            kube_config_dir: None,
            file_name: "config".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl ExplorerConfig {
    /// Load configuration from file or create default
    pub fn load_or_default(config_path: Option<&str>) -> crate::Result<Self> {
        match config_path {
            Some(path) => {
                let content = std::fs::read_to_string(path)?;
                let config: ExplorerConfig = serde_json::from_str(&content)?;
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }

    /// Save configuration to file
    pub fn save(&self, config_path: &str) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    /// Directory and file name of the active cluster context file.
    ///
    /// The first entry of `KUBECONFIG` wins over the configured location.
    pub fn kube_config_path(&self) -> crate::Result<(PathBuf, String)> {
        let sep = if cfg!(windows) { ';' } else { ':' };
        let from_env = std::env::var("KUBECONFIG")
            .ok()
            .and_then(|v| v.split(sep).next().map(|s| PathBuf::from(s.trim())))
            .filter(|p| !p.as_os_str().is_empty());

        if let Some(path) = from_env {
            let file_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .map(str::to_string)
                .ok_or_else(|| {
                    crate::TektonError::Config(format!(
                        "KUBECONFIG entry has no file name: {}",
                        path.display()
                    ))
                })?;
            let dir = path
                .parent()
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("."));
            tracing::debug!("Using KUBECONFIG context file {}", path.display());
            return Ok((dir, file_name));
        }

        let dir = match &self.watch.kube_config_dir {
            Some(dir) => PathBuf::from(dir),
            None => BaseDirs::new()
                .map(|dirs| dirs.home_dir().join(".kube"))
                .ok_or_else(|| {
                    crate::TektonError::Config("Cannot determine home directory".to_string())
                })?,
        };

        Ok((dir, self.watch.file_name.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = ExplorerConfig::default();
        assert!(config.cache.enabled);
        assert!(config.watch.enabled);
        assert_eq!(config.watch.file_name, "config");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("explorer.json");
        let path = path.to_str().unwrap();

        let mut config = ExplorerConfig::default();
        config.cli.tkn_path = Some("/opt/bin/tkn".to_string());
        config.cache.enabled = false;
        config.save(path).unwrap();

        let loaded = ExplorerConfig::load_or_default(Some(path)).unwrap();
        assert_eq!(loaded.cli.tkn_path.as_deref(), Some("/opt/bin/tkn"));
        assert!(!loaded.cache.enabled);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("explorer.json");
        std::fs::write(&path, r#"{"logging": {"level": "debug", "format": "json"}}"#).unwrap();

        let loaded = ExplorerConfig::load_or_default(path.to_str()).unwrap();
        assert_eq!(loaded.logging.level, "debug");
        assert!(loaded.cache.enabled);
        assert_eq!(loaded.watch.file_name, "config");
    }
}
