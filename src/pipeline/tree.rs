// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeviz contributors

//! Sub-pipeline tree
//!
//! Infers a display hierarchy between pipelines from node-set inclusion:
//! `A` contains `B` when every node of `B` is also in `A`. Pipelines with
//! identical node sets are ordered by id, the smaller id being the parent.
//! The tree keeps only direct containment (the transitive reduction).

use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

use crate::errors::{VizError, VizResult};
use crate::graph::{NodeId, PipelineId};

/// Parent → children relation between pipelines
pub type Relation = BTreeMap<PipelineId, BTreeSet<PipelineId>>;

/// A pipeline and its direct children
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeNode {
    pub id: PipelineId,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
}

/// Containment hierarchy between pipelines
#[derive(Debug, Clone, Default)]
pub struct PipelineTree {
    pipelines: BTreeSet<PipelineId>,
    direct_children: Relation,
    direct_parents: Relation,
    forest: Vec<TreeNode>,
}

impl PipelineTree {
    /// Build the tree from each pipeline's node set
    pub fn build(pipeline_to_nodes: &BTreeMap<PipelineId, BTreeSet<NodeId>>) -> VizResult<Self> {
        let (parents, children) = containment(pipeline_to_nodes);
        let direct_children = transitive_reduction(&children, &parents);

        Self::from_direct_children(pipeline_to_nodes.keys().cloned().collect(), direct_children)
    }

    /// Build the tree from an already reduced parent → children relation.
    ///
    /// Fails with [`VizError::DataIntegrity`] when the relation has a cycle.
    pub fn from_direct_children(
        mut pipelines: BTreeSet<PipelineId>,
        direct_children: Relation,
    ) -> VizResult<Self> {
        for (parent, children) in &direct_children {
            pipelines.insert(parent.clone());
            pipelines.extend(children.iter().cloned());
        }

        check_acyclic(&pipelines, &direct_children)?;

        let mut direct_parents: Relation = BTreeMap::new();
        for (parent, children) in &direct_children {
            for child in children {
                direct_parents
                    .entry(child.clone())
                    .or_default()
                    .insert(parent.clone());
            }
        }

        let mut tree = Self {
            pipelines,
            direct_children,
            direct_parents,
            forest: Vec::new(),
        };

        tree.forest = tree.roots().map(|root| tree.subtree(root)).collect();

        debug!(
            pipelines = tree.pipelines.len(),
            roots = tree.forest.len(),
            "pipeline tree built"
        );

        Ok(tree)
    }

    fn subtree(&self, id: &str) -> TreeNode {
        TreeNode {
            id: id.to_string(),
            children: self.children(id).map(|child| self.subtree(child)).collect(),
        }
    }

    /// Every pipeline in the tree, sorted
    pub fn pipelines(&self) -> impl Iterator<Item = &str> {
        self.pipelines.iter().map(String::as_str)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.pipelines.contains(id)
    }

    /// Direct children of a pipeline, sorted
    pub fn children(&self, id: &str) -> impl Iterator<Item = &str> {
        self.direct_children
            .get(id)
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    /// Direct parents of a pipeline, sorted
    pub fn parents(&self, id: &str) -> impl Iterator<Item = &str> {
        self.direct_parents
            .get(id)
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    /// Pipelines with no parent
    pub fn roots(&self) -> impl Iterator<Item = &str> {
        self.pipelines().filter(move |id| self.is_root(id))
    }

    /// Pipelines with no children
    pub fn leaves(&self) -> impl Iterator<Item = &str> {
        self.pipelines().filter(move |id| self.is_leaf(id))
    }

    pub fn is_root(&self, id: &str) -> bool {
        self.parents(id).next().is_none()
    }

    pub fn is_leaf(&self, id: &str) -> bool {
        self.children(id).next().is_none()
    }

    /// Every pipeline containing `id`, directly or not
    pub fn ancestors(&self, id: &str) -> BTreeSet<PipelineId> {
        self.walk(id, |tree, node| tree.parents(node))
    }

    /// Whether `ancestor` contains `id` through one or more levels
    pub fn is_ancestor(&self, ancestor: &str, id: &str) -> bool {
        self.ancestors(id).contains(ancestor)
    }

    fn walk<'a, F, I>(&'a self, start: &'a str, step: F) -> BTreeSet<PipelineId>
    where
        F: Fn(&'a Self, &'a str) -> I,
        I: Iterator<Item = &'a str>,
    {
        let mut seen = BTreeSet::new();
        let mut stack = vec![start];
        while let Some(node) = stack.pop() {
            for next in step(self, node) {
                if seen.insert(next.to_string()) {
                    stack.push(next);
                }
            }
        }
        seen
    }

    /// Rooted forest for display
    pub fn forest(&self) -> &[TreeNode] {
        &self.forest
    }
}

/// Pairwise containment between pipelines.
///
/// Returns `(parents, children)`, both transitive.
pub fn containment(pipeline_to_nodes: &BTreeMap<PipelineId, BTreeSet<NodeId>>) -> (Relation, Relation) {
    let mut parents: Relation = BTreeMap::new();
    let mut children: Relation = BTreeMap::new();

    let entries: Vec<(&PipelineId, &BTreeSet<NodeId>)> = pipeline_to_nodes.iter().collect();

    // entries are sorted, so `a < b` in every pair below
    for (i, (a, a_nodes)) in entries.iter().enumerate() {
        for (b, b_nodes) in &entries[i + 1..] {
            let a_in_b = a_nodes.is_subset(b_nodes);
            let b_in_a = b_nodes.is_subset(a_nodes);

            // equal sets fall in the first branch: the smaller id is the parent
            let (parent, child) = if b_in_a {
                (a, b)
            } else if a_in_b {
                (b, a)
            } else {
                continue;
            };

            parents
                .entry((*child).clone())
                .or_default()
                .insert((*parent).clone());
            children
                .entry((*parent).clone())
                .or_default()
                .insert((*child).clone());
        }
    }

    (parents, children)
}

/// Keep only direct children: drop a child that is also below a sibling
pub fn transitive_reduction(children: &Relation, parents: &Relation) -> Relation {
    let empty = BTreeSet::new();

    children
        .iter()
        .map(|(parent, kids)| {
            let direct: BTreeSet<PipelineId> = kids
                .iter()
                .filter(|kid| {
                    parents
                        .get(*kid)
                        .unwrap_or(&empty)
                        .is_disjoint(kids)
                })
                .cloned()
                .collect();
            (parent.clone(), direct)
        })
        .collect()
}

fn check_acyclic(pipelines: &BTreeSet<PipelineId>, direct_children: &Relation) -> VizResult<()> {
    let mut graph: DiGraph<&str, ()> = DiGraph::new();
    let mut index: HashMap<&str, NodeIndex> = HashMap::new();

    for pipeline in pipelines {
        index.insert(pipeline.as_str(), graph.add_node(pipeline.as_str()));
    }

    for (parent, children) in direct_children {
        for child in children {
            graph.add_edge(index[parent.as_str()], index[child.as_str()], ());
        }
    }

    let Err(cycle) = toposort(&graph, None) else {
        return Ok(());
    };

    let mut members: Vec<String> = tarjan_scc(&graph)
        .into_iter()
        .find(|component| component.contains(&cycle.node_id()))
        .unwrap_or_else(|| vec![cycle.node_id()])
        .into_iter()
        .map(|idx| graph[idx].to_string())
        .collect();
    members.sort();

    Err(VizError::DataIntegrity { pipelines: members })
}
