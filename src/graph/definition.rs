// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeviz contributors

//! Snapshot definition structures
//!
//! Defines the JSON schema produced by graph extraction and consumed by
//! [`GraphBuilder`](super::GraphBuilder).

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{hash, NodeKind};
use crate::errors::{VizError, VizResult};

/// Extracted pipeline graph, as written to a JSON snapshot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphDefinition {
    /// Pipeline shown when no pipeline is requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_pipeline: Option<String>,

    /// Registered pipelines, in registration order
    #[serde(default)]
    pub pipelines: Vec<PipelineDefinition>,

    /// Node records; the same node may appear once per pipeline
    pub nodes: Vec<NodeDefinition>,

    /// Dependency edges between node ids
    #[serde(default)]
    pub edges: Vec<EdgeDefinition>,
}

impl GraphDefinition {
    /// Load a definition from a JSON snapshot file
    pub fn from_file(path: &Path) -> VizResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| VizError::FileReadError {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::from_json(&content)
    }

    /// Parse a definition from a JSON string
    pub fn from_json(json: &str) -> VizResult<Self> {
        serde_json::from_str(json).map_err(Into::into)
    }

    /// Serialize the definition to pretty JSON
    pub fn to_json(&self) -> VizResult<String> {
        serde_json::to_string_pretty(self).map_err(Into::into)
    }

    /// Content hash of the canonical JSON form.
    ///
    /// Formatting of the file it was read from does not matter.
    pub fn fingerprint(&self) -> VizResult<String> {
        Ok(hash::fingerprint(self.to_json()?.as_bytes()))
    }

    /// Write the definition to a JSON snapshot file
    pub fn save(&self, path: &Path) -> VizResult<()> {
        let json = self.to_json()?;
        std::fs::write(path, json).map_err(|e| VizError::FileWriteError {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }
}

/// A registered pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineDefinition {
    /// Pipeline id
    pub id: String,

    /// Display name (derived from the id when absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl PipelineDefinition {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
        }
    }
}

/// A task, dataset or parameters record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeDefinition {
    /// Explicit id; derived from `full_name` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Node kind
    #[serde(rename = "type")]
    pub kind: NodeKind,

    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Fully-qualified name
    pub full_name: String,

    /// Dotted namespace of a task
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer: Option<String>,

    /// Pipelines this record was discovered in
    #[serde(default)]
    pub pipelines: Vec<String>,

    /// Source code of a task function
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// Source file of a task, or storage location of a dataset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filepath: Option<String>,

    /// Dataset implementation type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_type: Option<String>,

    /// Parameter value(s)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Value>,
}

impl NodeDefinition {
    fn new(kind: NodeKind, full_name: impl Into<String>) -> Self {
        Self {
            id: None,
            kind,
            name: None,
            full_name: full_name.into(),
            namespace: None,
            tags: Vec::new(),
            layer: None,
            pipelines: Vec::new(),
            code: None,
            filepath: None,
            dataset_type: None,
            parameters: None,
        }
    }

    /// A task record
    pub fn task(full_name: impl Into<String>) -> Self {
        Self::new(NodeKind::Task, full_name)
    }

    /// A dataset record
    pub fn data(full_name: impl Into<String>) -> Self {
        Self::new(NodeKind::Data, full_name)
    }

    /// A parameters record
    pub fn parameters(full_name: impl Into<String>) -> Self {
        Self::new(NodeKind::Parameters, full_name)
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_layer(mut self, layer: impl Into<String>) -> Self {
        self.layer = Some(layer.into());
        self
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn in_pipelines(mut self, pipelines: &[&str]) -> Self {
        self.pipelines = pipelines.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn with_value(mut self, value: serde_json::Value) -> Self {
        self.parameters = Some(value);
        self
    }

    /// The id this record resolves to
    pub fn node_id(&self) -> String {
        self.id
            .clone()
            .unwrap_or_else(|| hash::node_id(&self.full_name))
    }
}

/// A produces/consumes dependency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeDefinition {
    pub source: String,
    pub target: String,
}

impl EdgeDefinition {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_minimal_snapshot() {
        let json = r#"{
            "nodes": [
                {"type": "task", "full_name": "split_data", "pipelines": ["__default__"]},
                {"id": "abc", "type": "data", "full_name": "companies", "layer": "raw"}
            ],
            "edges": [{"source": "abc", "target": "x"}]
        }"#;

        let def = GraphDefinition::from_json(json).unwrap();

        assert_eq!(def.nodes.len(), 2);
        assert_eq!(def.nodes[0].kind, NodeKind::Task);
        assert_eq!(def.nodes[0].node_id(), hash::node_id("split_data"));
        assert_eq!(def.nodes[1].node_id(), "abc");
        assert_eq!(def.nodes[1].layer.as_deref(), Some("raw"));
        assert!(def.pipelines.is_empty());
        assert_eq!(def.edges[0], EdgeDefinition::new("abc", "x"));
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let json = r#"{"nodes": [{"type": "model", "full_name": "x"}]}"#;
        assert!(matches!(
            GraphDefinition::from_json(json),
            Err(VizError::Json { .. })
        ));
    }

    #[test]
    fn test_save_and_reload() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("pipeline.json");

        let def = GraphDefinition {
            selected_pipeline: Some("dp".into()),
            pipelines: vec![PipelineDefinition::new("dp")],
            nodes: vec![NodeDefinition::data("companies").with_layer("raw")],
            edges: vec![],
        };
        def.save(&path).unwrap();

        let loaded = GraphDefinition::from_file(&path).unwrap();
        assert_eq!(loaded.selected_pipeline.as_deref(), Some("dp"));
        assert_eq!(loaded.nodes[0].full_name, "companies");
        assert_eq!(loaded.nodes[0].layer.as_deref(), Some("raw"));
    }

    #[test]
    fn test_missing_file() {
        let result = GraphDefinition::from_file(Path::new("/nonexistent/pipeline.json"));
        assert!(matches!(result, Err(VizError::FileReadError { .. })));
    }
}
