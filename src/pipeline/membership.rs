// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeviz contributors

//! Pipeline membership index
//!
//! Lookup tables between pipelines and the nodes they contain.

use std::collections::{BTreeMap, BTreeSet};

use crate::graph::{Graph, NodeId, PipelineId};

/// Pipeline → nodes and node → pipelines lookups
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipIndex {
    pipeline_to_nodes: BTreeMap<PipelineId, BTreeSet<NodeId>>,
    node_to_pipelines: BTreeMap<NodeId, BTreeSet<PipelineId>>,
}

impl MembershipIndex {
    /// Aggregate `(node id, pipelines)` pairs
    pub fn build<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a [PipelineId])>,
    {
        let mut index = Self::default();

        for (node, pipelines) in entries {
            for pipeline in pipelines {
                index
                    .pipeline_to_nodes
                    .entry(pipeline.clone())
                    .or_default()
                    .insert(node.to_string());
                index
                    .node_to_pipelines
                    .entry(node.to_string())
                    .or_default()
                    .insert(pipeline.clone());
            }
        }

        index
    }

    /// Index the membership of every node in a graph
    pub fn from_graph(graph: &Graph) -> Self {
        Self::build(
            graph
                .nodes()
                .map(|n| (n.id.as_str(), n.pipelines.as_slice())),
        )
    }

    /// Nodes belonging to a pipeline
    pub fn nodes_of(&self, pipeline: &str) -> Option<&BTreeSet<NodeId>> {
        self.pipeline_to_nodes.get(pipeline)
    }

    /// Pipelines a node belongs to
    pub fn pipelines_of(&self, node: &str) -> Option<&BTreeSet<PipelineId>> {
        self.node_to_pipelines.get(node)
    }

    pub fn contains_pipeline(&self, pipeline: &str) -> bool {
        self.pipeline_to_nodes.contains_key(pipeline)
    }

    pub fn pipeline_to_nodes(&self) -> &BTreeMap<PipelineId, BTreeSet<NodeId>> {
        &self.pipeline_to_nodes
    }

    pub fn node_to_pipelines(&self) -> &BTreeMap<NodeId, BTreeSet<PipelineId>> {
        &self.node_to_pipelines
    }

    /// Number of nodes in a pipeline, zero when unknown
    pub fn pipeline_size(&self, pipeline: &str) -> usize {
        self.nodes_of(pipeline).map_or(0, BTreeSet::len)
    }

    pub fn is_empty(&self) -> bool {
        self.pipeline_to_nodes.is_empty()
    }
}
