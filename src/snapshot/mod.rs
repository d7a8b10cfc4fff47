// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeviz contributors

//! Graph snapshots
//!
//! A [`GraphSnapshot`] bundles a built graph with every structure derived
//! from it. Snapshots are immutable; a reload builds a new one and
//! publishes it through a [`SnapshotStore`].

mod source;
mod store;

pub use source::{GraphSource, JsonFileSource, LoadedDefinition};
pub use store::SnapshotStore;

use tracing::debug;

use crate::errors::VizResult;
use crate::graph::{Graph, GraphBuilder, GraphDefinition};
use crate::pipeline::{CollapseIndex, Collapser, LayerSequencer, MembershipIndex, PipelineTree};

/// A built graph and its derived artifacts
#[derive(Debug)]
pub struct GraphSnapshot {
    graph: Graph,
    layers: Vec<String>,
    membership: MembershipIndex,
    tree: PipelineTree,
    collapse_index: CollapseIndex,
    fingerprint: String,
}

impl GraphSnapshot {
    /// Derive layers, membership, tree and collapse tables from a graph.
    ///
    /// Fails on a layer cycle or inconsistent containment; nothing is
    /// returned partially built.
    pub fn build(graph: Graph, fingerprint: impl Into<String>) -> VizResult<Self> {
        let layers = LayerSequencer::from_graph(&graph).sequence()?;
        let membership = MembershipIndex::from_graph(&graph);
        let tree = PipelineTree::build(membership.pipeline_to_nodes())?;
        let collapse_index = CollapseIndex::build(&graph);

        let snapshot = Self {
            graph,
            layers,
            membership,
            tree,
            collapse_index,
            fingerprint: fingerprint.into(),
        };

        debug!(
            nodes = snapshot.graph.node_count(),
            layers = snapshot.layers.len(),
            fingerprint = %snapshot.fingerprint,
            "snapshot built"
        );

        Ok(snapshot)
    }

    /// Build a snapshot straight from a definition
    pub fn from_definition(definition: &GraphDefinition) -> VizResult<Self> {
        let fingerprint = definition.fingerprint()?;
        let graph = GraphBuilder::build(definition)?;
        Self::build(graph, fingerprint)
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Layers in dependency order
    pub fn layers(&self) -> &[String] {
        &self.layers
    }

    pub fn membership(&self) -> &MembershipIndex {
        &self.membership
    }

    pub fn tree(&self) -> &PipelineTree {
        &self.tree
    }

    /// Collapser bound to this snapshot
    pub fn collapser(&self) -> Collapser<'_> {
        Collapser::new(&self.collapse_index, &self.membership, &self.tree)
    }

    /// Content hash of the source this snapshot was built from
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}
