// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeviz contributors

//! Layer sequencing
//!
//! Infers an order over layers from the node-level DAG. Only datasets and
//! parameters carry layers, so the layer graph is derived: a node in
//! layer `L` forces `L` before every layer found anywhere downstream of it.

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use tracing::debug;

use crate::errors::{VizError, VizResult};
use crate::graph::{Graph, NodeId};

/// Dependency graph between layers
pub struct LayerSequencer {
    graph: DiGraph<String, ()>,
    name_to_index: BTreeMap<String, NodeIndex>,
}

impl LayerSequencer {
    /// Build the layer graph from node layers and direct successors.
    ///
    /// `deps[n]` holds the ids `n` points to directly.
    pub fn build(
        layers: &BTreeMap<NodeId, Option<String>>,
        deps: &BTreeMap<NodeId, BTreeSet<NodeId>>,
    ) -> Self {
        let mut graph = DiGraph::new();
        let mut name_to_index = BTreeMap::new();

        let names: BTreeSet<&String> = layers.values().flatten().collect();
        for name in names {
            let idx = graph.add_node(name.clone());
            name_to_index.insert(name.clone(), idx);
        }

        let below = descendant_layers(layers, deps);

        for (node, layer) in layers {
            let Some(layer) = layer else {
                continue;
            };
            let Some(descendants) = below.get(node) else {
                continue;
            };
            let from = name_to_index[layer];
            for descendant in descendants {
                if descendant == layer {
                    continue;
                }
                let to = name_to_index[descendant];
                graph.update_edge(from, to, ());
            }
        }

        debug!(
            layers = graph.node_count(),
            constraints = graph.edge_count(),
            "layer graph built"
        );

        Self {
            graph,
            name_to_index,
        }
    }

    /// Build the layer graph of an extracted graph
    pub fn from_graph(graph: &Graph) -> Self {
        let layers = graph
            .nodes()
            .map(|n| (n.id.clone(), n.layer.clone()))
            .collect();
        Self::build(&layers, &graph.successors())
    }

    /// Topological order of the layers.
    ///
    /// Among layers whose predecessors are all placed, the lexicographically
    /// smallest goes next.
    pub fn sequence(&self) -> VizResult<Vec<String>> {
        let mut in_degree: HashMap<NodeIndex, usize> = self
            .graph
            .node_indices()
            .map(|idx| {
                let degree = self
                    .graph
                    .neighbors_directed(idx, Direction::Incoming)
                    .count();
                (idx, degree)
            })
            .collect();

        let mut ready: BTreeSet<&str> = self
            .name_to_index
            .iter()
            .filter(|(_, idx)| in_degree[*idx] == 0)
            .map(|(name, _)| name.as_str())
            .collect();

        let mut order = Vec::with_capacity(self.name_to_index.len());

        while let Some(name) = ready.pop_first() {
            order.push(name.to_string());
            let idx = self.name_to_index[name];
            for next in self.graph.neighbors_directed(idx, Direction::Outgoing) {
                if let Some(degree) = in_degree.get_mut(&next) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.insert(self.graph[next].as_str());
                    }
                }
            }
        }

        if order.len() < self.name_to_index.len() {
            return Err(VizError::CircularDependency {
                layers: self.cycle_members(),
            });
        }

        Ok(order)
    }

    /// Layers taking part in a cycle, sorted
    fn cycle_members(&self) -> Vec<String> {
        let mut members: Vec<String> = tarjan_scc(&self.graph)
            .into_iter()
            .filter(|component| component.len() > 1)
            .flatten()
            .map(|idx| self.graph[idx].clone())
            .collect();
        members.sort();
        members
    }

    /// Layers that must come directly after `layer`
    pub fn successors(&self, layer: &str) -> Option<Vec<String>> {
        let idx = self.name_to_index.get(layer)?;
        let mut names: Vec<String> = self
            .graph
            .neighbors_directed(*idx, Direction::Outgoing)
            .map(|n| self.graph[n].clone())
            .collect();
        names.sort();
        Some(names)
    }

    /// Number of distinct layers
    pub fn len(&self) -> usize {
        self.name_to_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.name_to_index.is_empty()
    }
}

/// Order the layers of a node graph
pub fn sequence_layers(
    layers: &BTreeMap<NodeId, Option<String>>,
    deps: &BTreeMap<NodeId, BTreeSet<NodeId>>,
) -> VizResult<Vec<String>> {
    LayerSequencer::build(layers, deps).sequence()
}

/// For every node, the set of layers found anywhere downstream of it.
///
/// Iterative post-order traversal; each node is finalised once and its
/// result reused by every predecessor. A node reached again while still
/// open (a cycle in the node graph) contributes nothing.
pub fn descendant_layers(
    layers: &BTreeMap<NodeId, Option<String>>,
    deps: &BTreeMap<NodeId, BTreeSet<NodeId>>,
) -> HashMap<NodeId, BTreeSet<String>> {
    let mut memo: HashMap<&str, BTreeSet<String>> = HashMap::new();
    let mut open: HashSet<&str> = HashSet::new();

    let roots = layers.keys().chain(deps.keys()).map(String::as_str);

    for root in roots {
        if memo.contains_key(root) {
            continue;
        }

        let mut stack: Vec<(&str, bool)> = vec![(root, false)];

        while let Some((node, expanded)) = stack.pop() {
            let children = deps.get(node).into_iter().flatten();

            if expanded {
                let mut found = BTreeSet::new();
                for child in children {
                    if let Some(Some(layer)) = layers.get(child) {
                        found.insert(layer.clone());
                    }
                    if let Some(below) = memo.get(child.as_str()) {
                        found.extend(below.iter().cloned());
                    }
                }
                open.remove(node);
                memo.insert(node, found);
                continue;
            }

            if memo.contains_key(node) || open.contains(node) {
                continue;
            }

            open.insert(node);
            stack.push((node, true));
            for child in children {
                let child = child.as_str();
                if !memo.contains_key(child) && !open.contains(child) {
                    stack.push((child, false));
                }
            }
        }
    }

    memo.into_iter()
        .map(|(node, found)| (node.to_string(), found))
        .collect()
}
