// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeviz contributors

//! Query response types

use serde::Serialize;
use std::collections::BTreeSet;

use crate::graph::naming::pretty_name;
use crate::graph::{Edge, GraphNode, NodeId, NodeKind, PipelineId};
use crate::pipeline::TreeNode;

/// A node as served to the renderer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeResponse {
    pub id: NodeId,
    pub name: String,
    pub full_name: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub tags: Vec<String>,
    pub pipelines: Vec<PipelineId>,
    pub modular_pipelines: Vec<String>,
    pub layer: Option<String>,
    /// Expanded pipelines directly containing a collapsed pipeline node
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parents: Option<Vec<PipelineId>>,
}

impl NodeResponse {
    pub fn from_node(node: &GraphNode) -> Self {
        Self {
            id: node.id.clone(),
            name: node.name.clone(),
            full_name: node.full_name.clone(),
            kind: node.kind(),
            tags: node.tags.iter().cloned().collect(),
            pipelines: node.pipelines.clone(),
            modular_pipelines: node.modular_pipelines.clone(),
            layer: node.layer.clone(),
            parents: None,
        }
    }

    /// A synthetic node standing for a collapsed pipeline
    pub fn pipeline(
        id: &str,
        name: String,
        tags: BTreeSet<String>,
        pipelines: Vec<PipelineId>,
        parents: &BTreeSet<PipelineId>,
    ) -> Self {
        Self {
            id: id.to_string(),
            name,
            full_name: id.to_string(),
            kind: NodeKind::Pipeline,
            tags: tags.into_iter().collect(),
            pipelines,
            modular_pipelines: Vec::new(),
            layer: None,
            parents: Some(parents.iter().cloned().collect()),
        }
    }
}

/// An id with its display name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedEntity {
    pub id: String,
    pub name: String,
}

impl NamedEntity {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Entity whose display name is derived from its id
    pub fn pretty(id: &str) -> Self {
        Self::new(id, pretty_name(id))
    }
}

/// A full, filtered or collapsed graph
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphResponse {
    pub nodes: Vec<NodeResponse>,
    pub edges: Vec<Edge>,
    pub tags: Vec<NamedEntity>,
    pub layers: Vec<String>,
    pub pipelines: Vec<NamedEntity>,
    pub modular_pipelines: Vec<NamedEntity>,
    pub pipeline_tree: Vec<TreeNode>,
    pub selected_pipeline: Option<PipelineId>,
}

impl GraphResponse {
    pub fn node(&self, id: &str) -> Option<&NodeResponse> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Display name of a node, falling back to its id
    pub fn label<'a>(&'a self, id: &'a str) -> &'a str {
        self.node(id).map_or(id, |n| n.name.as_str())
    }
}

/// Kind-specific node metadata
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NodeMetadata {
    Task {
        code: Option<String>,
        filepath: Option<String>,
        /// Values of every parameter feeding the task
        parameters: serde_json::Map<String, serde_json::Value>,
    },
    Data {
        filepath: Option<String>,
        #[serde(rename = "type")]
        dataset_type: Option<String>,
    },
    Parameters {
        parameters: serde_json::Map<String, serde_json::Value>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_node_serializes_kind_as_type() {
        let response = NodeResponse::pipeline(
            "data_science",
            "Data Science".into(),
            BTreeSet::new(),
            vec!["__default__".into()],
            &BTreeSet::from(["__default__".to_string()]),
        );

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["type"], "pipeline");
        assert_eq!(value["parents"], json!(["__default__"]));
    }

    #[test]
    fn test_parents_omitted_for_plain_nodes() {
        let response = NodeResponse {
            id: "d1".into(),
            name: "Companies".into(),
            full_name: "companies".into(),
            kind: NodeKind::Data,
            tags: vec![],
            pipelines: vec![],
            modular_pipelines: vec![],
            layer: Some("raw".into()),
            parents: None,
        };

        let value = serde_json::to_value(&response).unwrap();
        assert!(value.get("parents").is_none());
        assert_eq!(value["layer"], "raw");
    }

    #[test]
    fn test_metadata_tagged_by_kind() {
        let metadata = NodeMetadata::Data {
            filepath: Some("data/01_raw/companies.csv".into()),
            dataset_type: Some("pandas.CSVDataset".into()),
        };

        let value = serde_json::to_value(&metadata).unwrap();
        assert_eq!(
            value,
            json!({
                "kind": "data",
                "filepath": "data/01_raw/companies.csv",
                "type": "pandas.CSVDataset"
            })
        );
    }

    #[test]
    fn test_pretty_entity() {
        assert_eq!(
            NamedEntity::pretty("__default__"),
            NamedEntity::new("__default__", "Default")
        );
    }
}
