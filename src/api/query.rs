// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeviz contributors

//! Read-only queries over a snapshot

use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use super::responses::{GraphResponse, NamedEntity, NodeMetadata, NodeResponse};
use crate::errors::{VizError, VizResult};
use crate::graph::naming::pretty_name;
use crate::graph::{Edge, GraphNode, NodeDetails, NodeKind, PipelineId};
use crate::pipeline::CollapsedNode;
use crate::snapshot::GraphSnapshot;

/// Query handler bound to one snapshot
pub struct GraphQuery<'a> {
    snapshot: &'a GraphSnapshot,
}

impl<'a> GraphQuery<'a> {
    pub fn new(snapshot: &'a GraphSnapshot) -> Self {
        Self { snapshot }
    }

    /// The whole graph with its layers and pipeline tree
    pub fn get_full_graph(&self) -> GraphResponse {
        let graph = self.snapshot.graph();
        let nodes: Vec<NodeResponse> = graph.nodes().map(NodeResponse::from_node).collect();
        let edges = graph.edges().cloned().collect();

        self.respond(
            nodes,
            edges,
            graph.selected_pipeline().map(str::to_string),
        )
    }

    /// The nodes and edges belonging to one registered pipeline
    pub fn get_pipeline_graph(&self, pipeline: &str) -> VizResult<GraphResponse> {
        let graph = self.snapshot.graph();
        if graph.pipeline(pipeline).is_none() {
            return Err(VizError::PipelineNotFound {
                id: pipeline.to_string(),
            });
        }

        let members: BTreeSet<&str> = graph
            .nodes()
            .filter(|n| n.belongs_to_pipeline(pipeline))
            .map(|n| n.id.as_str())
            .collect();

        let nodes = graph
            .nodes()
            .filter(|n| members.contains(n.id.as_str()))
            .map(NodeResponse::from_node)
            .collect();
        let edges = graph
            .edges()
            .filter(|e| members.contains(e.source.as_str()) && members.contains(e.target.as_str()))
            .cloned()
            .collect();

        Ok(self.respond(nodes, edges, Some(pipeline.to_string())))
    }

    /// The graph with every non-expanded pipeline folded into one node.
    ///
    /// An empty request yields the root-level view.
    pub fn get_collapsed_graph<S: AsRef<str>>(&self, expanded: &[S]) -> VizResult<GraphResponse> {
        let graph = self.snapshot.graph();
        let tree = self.snapshot.tree();

        let mut request: BTreeSet<PipelineId> = BTreeSet::new();
        for id in expanded {
            let id = id.as_ref();
            if tree.contains(id) {
                request.insert(id.to_string());
            } else if graph.pipeline(id).is_none() {
                return Err(VizError::PipelineNotFound { id: id.to_string() });
            }
        }

        let collapsed = self.snapshot.collapser().collapse(&request)?;

        let nodes = collapsed
            .nodes
            .iter()
            .filter_map(|node| match node {
                CollapsedNode::Node(id) => graph.node(id).map(NodeResponse::from_node),
                CollapsedNode::Pipeline { id, parents } => Some(self.pipeline_node(id, parents)),
            })
            .collect();

        debug!(requested = expanded.len(), "collapsed graph served");

        Ok(self.respond(
            nodes,
            collapsed.edges,
            graph.selected_pipeline().map(str::to_string),
        ))
    }

    /// Task, dataset or parameters metadata of one node
    pub fn get_node_metadata(&self, id: &str) -> VizResult<NodeMetadata> {
        let graph = self.snapshot.graph();
        let node = graph
            .node(id)
            .ok_or_else(|| VizError::NodeNotFound { id: id.to_string() })?;

        let metadata = match &node.details {
            NodeDetails::Task { code, filepath } => NodeMetadata::Task {
                code: code.clone(),
                filepath: filepath.clone(),
                parameters: self.task_parameters(node),
            },
            NodeDetails::Data {
                filepath,
                dataset_type,
            } => NodeMetadata::Data {
                filepath: filepath.clone(),
                dataset_type: dataset_type.clone(),
            },
            NodeDetails::Parameters { .. } => NodeMetadata::Parameters {
                parameters: node.parameter_values(),
            },
        };

        Ok(metadata)
    }

    /// Merged values of the parameters nodes feeding a task directly
    fn task_parameters(&self, task: &GraphNode) -> serde_json::Map<String, serde_json::Value> {
        let graph = self.snapshot.graph();
        let mut parameters = serde_json::Map::new();

        for edge in graph.edges().filter(|e| e.target == task.id) {
            if let Some(source) = graph.node(&edge.source) {
                if source.kind() == NodeKind::Parameters {
                    parameters.extend(source.parameter_values());
                }
            }
        }

        parameters
    }

    fn pipeline_node(&self, id: &str, parents: &BTreeSet<PipelineId>) -> NodeResponse {
        let graph = self.snapshot.graph();

        let name = graph
            .pipeline(id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| pretty_name(id));

        let tags = self
            .snapshot
            .membership()
            .nodes_of(id)
            .into_iter()
            .flatten()
            .filter_map(|n| graph.node(n))
            .filter(|n| n.is_task())
            .flat_map(|n| n.tags.iter().cloned())
            .collect();

        let pipelines = self.snapshot.tree().ancestors(id).into_iter().collect();

        NodeResponse::pipeline(id, name, tags, pipelines, parents)
    }

    fn respond(
        &self,
        nodes: Vec<NodeResponse>,
        edges: Vec<Edge>,
        selected_pipeline: Option<PipelineId>,
    ) -> GraphResponse {
        let graph = self.snapshot.graph();

        let present_layers: BTreeSet<&str> = nodes.iter().filter_map(|n| n.layer.as_deref()).collect();
        let layers = self
            .snapshot
            .layers()
            .iter()
            .filter(|l| present_layers.contains(l.as_str()))
            .cloned()
            .collect();

        let tags: BTreeSet<&str> = nodes
            .iter()
            .flat_map(|n| n.tags.iter().map(String::as_str))
            .collect();

        let modular_pipelines: BTreeMap<&str, NamedEntity> = nodes
            .iter()
            .flat_map(|n| n.modular_pipelines.iter())
            .map(|id| (id.as_str(), NamedEntity::pretty(id)))
            .collect();

        GraphResponse {
            tags: tags.into_iter().map(NamedEntity::pretty).collect(),
            layers,
            pipelines: graph
                .pipelines()
                .iter()
                .map(|p| NamedEntity::new(&p.id, &p.name))
                .collect(),
            modular_pipelines: modular_pipelines.into_values().collect(),
            pipeline_tree: self.snapshot.tree().forest().to_vec(),
            selected_pipeline,
            nodes,
            edges,
        }
    }
}
