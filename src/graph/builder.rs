// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeviz contributors

//! Graph builder
//!
//! Merges per-pipeline node records into one deduplicated graph. The
//! first record seen for an id fixes its attributes; later records only
//! extend pipeline membership and tags.

use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

use super::naming::{dataset_namespace, expand_namespace, pretty_name};
use super::{
    Edge, Graph, GraphDefinition, GraphNode, NodeDefinition, NodeDetails, NodeId, NodeKind,
    PipelineId, RegisteredPipeline, DEFAULT_PIPELINE,
};
use crate::errors::{VizError, VizResult};

/// Builder for the deduplicated node/edge graph
#[derive(Debug, Default)]
pub struct GraphBuilder {
    nodes: BTreeMap<NodeId, GraphNode>,
    edges: BTreeSet<Edge>,
    pipelines: Vec<RegisteredPipeline>,
    selected_pipeline: Option<PipelineId>,
}

impl GraphBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from a snapshot definition
    pub fn build(definition: &GraphDefinition) -> VizResult<Graph> {
        let mut builder = Self::new();

        for pipeline in &definition.pipelines {
            builder.register_pipeline(&pipeline.id, pipeline.name.as_deref());
        }

        for node in &definition.nodes {
            builder.add_node(node)?;
        }

        for edge in &definition.edges {
            builder.add_edge(&edge.source, &edge.target);
        }

        builder.selected_pipeline = definition.selected_pipeline.clone();
        builder.finish()
    }

    /// Register a pipeline; re-registering keeps the first display name
    pub fn register_pipeline(&mut self, id: &str, name: Option<&str>) {
        if self.pipelines.iter().any(|p| p.id == id) {
            return;
        }

        self.pipelines.push(RegisteredPipeline {
            id: id.to_string(),
            name: name.map(str::to_string).unwrap_or_else(|| pretty_name(id)),
        });
    }

    /// Add a node record, merging into an existing node with the same id
    pub fn add_node(&mut self, definition: &NodeDefinition) -> VizResult<NodeId> {
        if definition.kind == NodeKind::Pipeline {
            return Err(VizError::InvalidGraph {
                reason: format!(
                    "node '{}' has kind 'pipeline', which is reserved for collapsed views",
                    definition.full_name
                ),
                help: Some("Extracted nodes must be task, data or parameters".into()),
            });
        }

        for pipeline in &definition.pipelines {
            self.register_pipeline(pipeline, None);
        }

        let id = definition.node_id();

        if let Some(existing) = self.nodes.get_mut(&id) {
            if existing.kind() != definition.kind {
                warn!(
                    node = %id,
                    "node re-encountered as {} but first seen as {}; keeping first",
                    definition.kind,
                    existing.kind()
                );
            }
            for pipeline in &definition.pipelines {
                existing.add_pipeline(pipeline);
            }
            existing.tags.extend(definition.tags.iter().cloned());
            return Ok(id);
        }

        let node = Self::create_node(id.clone(), definition);
        self.nodes.insert(id.clone(), node);
        Ok(id)
    }

    fn create_node(id: NodeId, definition: &NodeDefinition) -> GraphNode {
        let layer = match (definition.kind, &definition.layer) {
            (NodeKind::Task, Some(layer)) => {
                warn!(node = %id, layer = %layer, "ignoring layer on task node");
                None
            }
            (_, layer) => layer.clone(),
        };

        let modular_pipelines = match definition.kind {
            NodeKind::Task => definition
                .namespace
                .as_deref()
                .map(expand_namespace)
                .unwrap_or_default(),
            _ => dataset_namespace(&definition.full_name)
                .map(expand_namespace)
                .unwrap_or_default(),
        };

        let details = match definition.kind {
            NodeKind::Task => NodeDetails::Task {
                code: definition.code.clone(),
                filepath: definition.filepath.clone(),
            },
            NodeKind::Parameters => NodeDetails::Parameters {
                value: definition.parameters.clone(),
            },
            _ => NodeDetails::Data {
                filepath: definition.filepath.clone(),
                dataset_type: definition.dataset_type.clone(),
            },
        };

        let mut pipelines = Vec::new();
        for pipeline in &definition.pipelines {
            if !pipelines.contains(pipeline) {
                pipelines.push(pipeline.clone());
            }
        }

        GraphNode {
            id,
            name: definition
                .name
                .clone()
                .unwrap_or_else(|| pretty_name(&definition.full_name)),
            full_name: definition.full_name.clone(),
            tags: definition.tags.iter().cloned().collect(),
            layer,
            pipelines,
            modular_pipelines,
            details,
        }
    }

    /// Add an edge. Returns false for duplicates and dropped self-loops.
    pub fn add_edge(&mut self, source: &str, target: &str) -> bool {
        if source == target {
            warn!(node = %source, "dropping self-loop edge");
            return false;
        }
        self.edges.insert(Edge::new(source, target))
    }

    /// Validate edges and produce the final graph
    pub fn finish(mut self) -> VizResult<Graph> {
        for edge in &self.edges {
            for endpoint in [&edge.source, &edge.target] {
                if !self.nodes.contains_key(endpoint) {
                    return Err(VizError::dangling_edge(&edge.source, &edge.target, endpoint));
                }
            }
        }

        self.propagate_tags();

        let selected_pipeline = self.resolve_selected_pipeline();

        debug!(
            nodes = self.nodes.len(),
            edges = self.edges.len(),
            pipelines = self.pipelines.len(),
            "graph built"
        );

        Ok(Graph {
            nodes: self.nodes,
            edges: self.edges,
            pipelines: self.pipelines,
            selected_pipeline,
        })
    }

    /// Datasets and parameters carry the tags of the tasks touching them
    fn propagate_tags(&mut self) {
        let mut inherited: Vec<(NodeId, Vec<String>)> = Vec::new();

        for edge in &self.edges {
            let (Some(source), Some(target)) =
                (self.nodes.get(&edge.source), self.nodes.get(&edge.target))
            else {
                continue;
            };

            if source.is_task() && !target.is_task() {
                inherited.push((target.id.clone(), source.tags.iter().cloned().collect()));
            } else if target.is_task() && !source.is_task() {
                inherited.push((source.id.clone(), target.tags.iter().cloned().collect()));
            }
        }

        for (id, tags) in inherited {
            if let Some(node) = self.nodes.get_mut(&id) {
                node.tags.extend(tags);
            }
        }
    }

    fn resolve_selected_pipeline(&self) -> Option<PipelineId> {
        if let Some(selected) = &self.selected_pipeline {
            if self.pipelines.iter().any(|p| &p.id == selected) {
                return Some(selected.clone());
            }
            warn!(pipeline = %selected, "selected pipeline is not registered; falling back");
        }

        self.pipelines
            .iter()
            .find(|p| p.id == DEFAULT_PIPELINE)
            .or_else(|| self.pipelines.first())
            .map(|p| p.id.clone())
    }
}
