// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeviz contributors

//! Snapshot sources

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::errors::{VizError, VizResult};
use crate::graph::GraphDefinition;

/// A definition together with its fingerprint
#[derive(Debug, Clone)]
pub struct LoadedDefinition {
    pub definition: GraphDefinition,
    pub fingerprint: String,
}

/// Somewhere a graph definition can be loaded from
#[async_trait]
pub trait GraphSource: Send + Sync {
    /// Read and parse the current definition
    async fn load(&self) -> VizResult<LoadedDefinition>;

    /// Human-readable description for logs
    fn describe(&self) -> String;
}

/// A JSON snapshot file on disk
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
    selected_pipeline: Option<String>,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            selected_pipeline: None,
        }
    }

    /// Override the snapshot's selected pipeline
    pub fn with_selected_pipeline(mut self, pipeline: Option<String>) -> Self {
        self.selected_pipeline = pipeline;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl GraphSource for JsonFileSource {
    async fn load(&self) -> VizResult<LoadedDefinition> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(VizError::SnapshotNotFound {
                    path: self.path.clone(),
                });
            }
            Err(e) => {
                return Err(VizError::FileReadError {
                    path: self.path.clone(),
                    error: e.to_string(),
                });
            }
        };

        let mut definition: GraphDefinition = serde_json::from_slice(&bytes)?;
        if let Some(pipeline) = &self.selected_pipeline {
            definition.selected_pipeline = Some(pipeline.clone());
        }

        let fingerprint = definition.fingerprint()?;

        debug!(
            path = %self.path.display(),
            nodes = definition.nodes.len(),
            "snapshot file read"
        );

        Ok(LoadedDefinition {
            definition,
            fingerprint,
        })
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SNAPSHOT: &str = r#"{
        "nodes": [
            {"id": "d1", "type": "data", "full_name": "companies", "pipelines": ["__default__"]}
        ]
    }"#;

    #[tokio::test]
    async fn test_load_json_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("pipeline.json");
        std::fs::write(&path, SNAPSHOT).unwrap();

        let loaded = JsonFileSource::new(&path).load().await.unwrap();

        assert_eq!(loaded.definition.nodes.len(), 1);
        assert_eq!(loaded.fingerprint, loaded.definition.fingerprint().unwrap());
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let temp = TempDir::new().unwrap();
        let source = JsonFileSource::new(temp.path().join("absent.json"));

        let result = source.load().await;
        assert!(matches!(result, Err(VizError::SnapshotNotFound { .. })));
    }

    #[test]
    fn test_selected_pipeline_override() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("pipeline.json");
        std::fs::write(&path, SNAPSHOT).unwrap();

        let plain = tokio_test::block_on(JsonFileSource::new(&path).load()).unwrap();
        let source = JsonFileSource::new(&path).with_selected_pipeline(Some("dp".into()));
        let loaded = tokio_test::block_on(source.load()).unwrap();

        assert_eq!(loaded.definition.selected_pipeline.as_deref(), Some("dp"));
        assert_ne!(loaded.fingerprint, plain.fingerprint);
    }

    #[tokio::test]
    async fn test_malformed_json() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("pipeline.json");
        std::fs::write(&path, "{ nodes: ").unwrap();

        let result = JsonFileSource::new(&path).load().await;
        assert!(matches!(result, Err(VizError::Json { .. })));
    }
}
