// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeviz contributors

//! Graph model
//!
//! The abstract node/edge graph handed over by extraction: tasks,
//! datasets and parameters, their tags, layers and pipeline membership.

mod builder;
mod definition;
pub mod hash;
pub mod naming;

pub use builder::GraphBuilder;
pub use definition::*;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Node identifier
pub type NodeId = String;

/// Pipeline identifier
pub type PipelineId = String;

/// Id of the pipeline every project registers
pub const DEFAULT_PIPELINE: &str = "__default__";

/// Kind discriminator for graph nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Task,
    Data,
    Parameters,
    /// Synthetic node standing for a collapsed pipeline
    Pipeline,
}

impl NodeKind {
    /// Whether nodes of this kind can be folded into a pipeline box
    pub fn is_collapsible(self) -> bool {
        matches!(self, Self::Task)
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Task => write!(f, "task"),
            Self::Data => write!(f, "data"),
            Self::Parameters => write!(f, "parameters"),
            Self::Pipeline => write!(f, "pipeline"),
        }
    }
}

/// Kind-specific payload of a node
#[derive(Debug, Clone, PartialEq)]
pub enum NodeDetails {
    Task {
        code: Option<String>,
        filepath: Option<String>,
    },
    Data {
        filepath: Option<String>,
        dataset_type: Option<String>,
    },
    Parameters {
        value: Option<serde_json::Value>,
    },
}

impl NodeDetails {
    /// Kind discriminator of this payload
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Task { .. } => NodeKind::Task,
            Self::Data { .. } => NodeKind::Data,
            Self::Parameters { .. } => NodeKind::Parameters,
        }
    }
}

/// A task, dataset or parameters node
#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode {
    pub id: NodeId,
    pub name: String,
    pub full_name: String,
    pub tags: BTreeSet<String>,
    /// Never set on tasks
    pub layer: Option<String>,
    /// Membership in discovery order
    pub pipelines: Vec<PipelineId>,
    pub modular_pipelines: Vec<String>,
    pub details: NodeDetails,
}

impl GraphNode {
    pub fn kind(&self) -> NodeKind {
        self.details.kind()
    }

    pub fn is_task(&self) -> bool {
        self.kind() == NodeKind::Task
    }

    /// Record membership in a pipeline; repeated ids are ignored
    pub fn add_pipeline(&mut self, pipeline: &str) {
        if !self.belongs_to_pipeline(pipeline) {
            self.pipelines.push(pipeline.to_string());
        }
    }

    pub fn belongs_to_pipeline(&self, pipeline: &str) -> bool {
        self.pipelines.iter().any(|p| p == pipeline)
    }

    /// Whether this is the node holding every parameter
    pub fn is_all_parameters(&self) -> bool {
        self.kind() == NodeKind::Parameters && self.full_name == naming::ALL_PARAMETERS
    }

    /// Name of the single parameter held by a `params:` node
    pub fn parameter_name(&self) -> Option<&str> {
        if self.kind() != NodeKind::Parameters {
            return None;
        }
        self.full_name.strip_prefix(naming::PARAMS_PREFIX)
    }

    /// Parameter values keyed by name, as shown in metadata
    pub fn parameter_values(&self) -> serde_json::Map<String, serde_json::Value> {
        let NodeDetails::Parameters { value: Some(value) } = &self.details else {
            return serde_json::Map::new();
        };

        if let Some(name) = self.parameter_name() {
            let mut map = serde_json::Map::new();
            map.insert(name.to_string(), value.clone());
            return map;
        }

        match value {
            serde_json::Value::Object(map) => map.clone(),
            _ => serde_json::Map::new(),
        }
    }
}

/// A directed produces/consumes edge
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub source: NodeId,
    pub target: NodeId,
}

impl Edge {
    pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// A registered pipeline with its display name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredPipeline {
    pub id: PipelineId,
    pub name: String,
}

/// Deduplicated node/edge graph produced by [`GraphBuilder`]
#[derive(Debug, Clone, Default)]
pub struct Graph {
    pub(crate) nodes: BTreeMap<NodeId, GraphNode>,
    pub(crate) edges: BTreeSet<Edge>,
    pub(crate) pipelines: Vec<RegisteredPipeline>,
    pub(crate) selected_pipeline: Option<PipelineId>,
}

impl Graph {
    /// Nodes ordered by id
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.values()
    }

    /// Edges ordered by (source, target)
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.get(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Registered pipelines in registration order
    pub fn pipelines(&self) -> &[RegisteredPipeline] {
        &self.pipelines
    }

    pub fn pipeline(&self, id: &str) -> Option<&RegisteredPipeline> {
        self.pipelines.iter().find(|p| p.id == id)
    }

    pub fn selected_pipeline(&self) -> Option<&str> {
        self.selected_pipeline.as_deref()
    }

    /// Direct successors of every node, keyed by node id
    pub fn successors(&self) -> BTreeMap<NodeId, BTreeSet<NodeId>> {
        let mut deps: BTreeMap<NodeId, BTreeSet<NodeId>> = BTreeMap::new();
        for edge in &self.edges {
            deps.entry(edge.source.clone())
                .or_default()
                .insert(edge.target.clone());
        }
        deps
    }

    /// Every tag used by any node, sorted
    pub fn tags(&self) -> BTreeSet<String> {
        self.nodes
            .values()
            .flat_map(|n| n.tags.iter().cloned())
            .collect()
    }

    /// Every modular pipeline named by any node, sorted
    pub fn modular_pipelines(&self) -> BTreeSet<String> {
        self.nodes
            .values()
            .flat_map(|n| n.modular_pipelines.iter().cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parameters_node(full_name: &str, value: serde_json::Value) -> GraphNode {
        GraphNode {
            id: hash::node_id(full_name),
            name: naming::pretty_name(full_name),
            full_name: full_name.into(),
            tags: BTreeSet::new(),
            layer: None,
            pipelines: vec![],
            modular_pipelines: vec![],
            details: NodeDetails::Parameters { value: Some(value) },
        }
    }

    #[test]
    fn test_add_pipeline_keeps_discovery_order() {
        let mut node = parameters_node("parameters", json!({}));
        node.add_pipeline("__default__");
        node.add_pipeline("ds");
        node.add_pipeline("__default__");

        assert_eq!(node.pipelines, vec!["__default__", "ds"]);
        assert!(node.belongs_to_pipeline("ds"));
        assert!(!node.belongs_to_pipeline("dp"));
    }

    #[test]
    fn test_all_parameters_values() {
        let node = parameters_node(
            "parameters",
            json!({"test_split_ratio": 0.3, "num_epochs": 1000}),
        );

        assert!(node.is_all_parameters());
        assert_eq!(node.parameter_name(), None);
        let values = node.parameter_values();
        assert_eq!(values["test_split_ratio"], json!(0.3));
        assert_eq!(values["num_epochs"], json!(1000));
    }

    #[test]
    fn test_single_parameter_values() {
        let node = parameters_node("params:test_split_ratio", json!(0.3));

        assert!(!node.is_all_parameters());
        assert_eq!(node.parameter_name(), Some("test_split_ratio"));
        assert_eq!(node.parameter_values()["test_split_ratio"], json!(0.3));
    }

    #[test]
    fn test_only_tasks_collapse() {
        assert!(NodeKind::Task.is_collapsible());
        assert!(!NodeKind::Data.is_collapsible());
        assert!(!NodeKind::Parameters.is_collapsible());
    }
}
