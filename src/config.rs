// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeviz contributors

//! Configuration loading
//!
//! Settings come from `.pipeviz.yaml` in the working directory, or from
//! the user config directory when the project has none.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::api::OutputFormat;
use crate::errors::{VizError, VizResult};

/// Project configuration file name
pub const CONFIG_FILE: &str = ".pipeviz.yaml";

/// Configuration from .pipeviz.yaml
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VizConfig {
    /// Snapshot file, relative to the working directory
    #[serde(default = "default_snapshot")]
    pub snapshot: PathBuf,

    /// Overrides the snapshot's selected pipeline
    #[serde(default)]
    pub default_pipeline: Option<String>,

    #[serde(default)]
    pub watch: WatchConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

fn default_snapshot() -> PathBuf {
    PathBuf::from("pipeline.json")
}

/// Watch mode settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Debounce delay in milliseconds
    #[serde(default = "default_debounce")]
    pub debounce_ms: u64,
}

fn default_debounce() -> u64 {
    500
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

impl Default for VizConfig {
    fn default() -> Self {
        Self {
            snapshot: default_snapshot(),
            default_pipeline: None,
            watch: WatchConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl VizConfig {
    /// Load from a file; a missing file yields the defaults
    pub fn load(path: &Path) -> VizResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| VizError::FileReadError {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config = serde_yaml::from_str(&content).map_err(|e| VizError::ConfigError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Resolve the configuration for a project directory.
    ///
    /// An explicit path wins, then `.pipeviz.yaml` in `project_root`, then
    /// the same file name in the user config directory.
    pub fn discover(project_root: &Path, explicit: Option<&Path>) -> VizResult<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(VizError::ConfigError {
                    path: path.to_path_buf(),
                    message: "file does not exist".into(),
                });
            }
            return Self::load(path);
        }

        let local = project_root.join(CONFIG_FILE);
        if local.exists() {
            return Self::load(&local);
        }

        match user_config_path() {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// Save to file
    pub fn save(&self, path: &Path) -> VizResult<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content).map_err(|e| VizError::FileWriteError {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }
}

/// `.pipeviz.yaml` inside the platform config directory
pub fn user_config_path() -> Option<PathBuf> {
    ProjectDirs::from("dev", "pipeviz", "pipeviz").map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = VizConfig::default();

        assert_eq!(config.snapshot, PathBuf::from("pipeline.json"));
        assert_eq!(config.watch.debounce_ms, 500);
        assert_eq!(config.output.format, OutputFormat::Text);
    }

    #[test]
    fn test_missing_file_is_default() {
        let temp = TempDir::new().unwrap();
        let config = VizConfig::load(&temp.path().join(CONFIG_FILE)).unwrap();

        assert_eq!(config, VizConfig::default());
    }

    #[test]
    fn test_partial_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE);
        std::fs::write(
            &path,
            "snapshot: build/graph.json\noutput:\n  format: mermaid\n",
        )
        .unwrap();

        let config = VizConfig::discover(temp.path(), None).unwrap();

        assert_eq!(config.snapshot, PathBuf::from("build/graph.json"));
        assert_eq!(config.output.format, OutputFormat::Mermaid);
        assert_eq!(config.watch.debounce_ms, 500);
        assert!(config.default_pipeline.is_none());
    }

    #[test]
    fn test_invalid_file_names_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE);
        std::fs::write(&path, "output:\n  format: svg\n").unwrap();

        let result = VizConfig::load(&path);
        match result {
            Err(VizError::ConfigError { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected config error, got {:?}", other),
        }
    }

    #[test]
    fn test_explicit_path_must_exist() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("custom.yaml");

        let result = VizConfig::discover(temp.path(), Some(&missing));
        assert!(matches!(result, Err(VizError::ConfigError { .. })));
    }

    #[test]
    fn test_save_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE);
        let config = VizConfig {
            default_pipeline: Some("dp".into()),
            ..Default::default()
        };

        config.save(&path).unwrap();
        assert_eq!(VizConfig::load(&path).unwrap(), config);
    }
}
