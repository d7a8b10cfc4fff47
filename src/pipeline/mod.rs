// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeviz contributors

//! Derived pipeline structure
//!
//! Everything computed from a built [`Graph`](crate::graph::Graph): layer
//! order, pipeline membership, the sub-pipeline tree and collapsed views.

mod collapse;
mod layers;
mod membership;
mod tree;

pub use collapse::{CollapseIndex, CollapsedGraph, CollapsedNode, Collapser, TaskPath};
pub use layers::{descendant_layers, sequence_layers, LayerSequencer};
pub use membership::MembershipIndex;
pub use tree::{containment, transitive_reduction, PipelineTree, Relation, TreeNode};
