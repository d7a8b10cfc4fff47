// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeviz contributors

//! Sub-pipeline graph collapsing
//!
//! Folds the tasks of pipelines that are not expanded into one synthetic
//! pipeline node per pipeline, and reroutes edges through those nodes.
//! Datasets and parameters are never folded: a dataset whose producers and
//! consumers all fold into the same pipeline node disappears with them,
//! every other dataset stays and connects the pipeline nodes.

use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use super::membership::MembershipIndex;
use super::tree::PipelineTree;
use crate::errors::{VizError, VizResult};
use crate::graph::{Edge, Graph, NodeId, PipelineId};

/// A task → dataset → task hop in the full graph
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct TaskPath {
    pub source: NodeId,
    pub data: NodeId,
    pub target: NodeId,
}

/// Adjacency tables built once per snapshot
#[derive(Debug, Clone, Default)]
pub struct CollapseIndex {
    /// task → datasets it produces
    produces: BTreeMap<NodeId, BTreeSet<NodeId>>,
    /// dataset → tasks producing it
    producers: BTreeMap<NodeId, BTreeSet<NodeId>>,
    /// dataset → tasks consuming it
    consumers: BTreeMap<NodeId, BTreeSet<NodeId>>,
    paths: Vec<TaskPath>,
    /// task → task and dataset → dataset edges
    direct_edges: Vec<Edge>,
    tasks: BTreeSet<NodeId>,
    datasets: BTreeSet<NodeId>,
}

impl CollapseIndex {
    pub fn build(graph: &Graph) -> Self {
        let mut index = Self::default();

        for node in graph.nodes() {
            if node.kind().is_collapsible() {
                index.tasks.insert(node.id.clone());
            } else {
                index.datasets.insert(node.id.clone());
            }
        }

        for edge in graph.edges() {
            let source_is_task = index.tasks.contains(&edge.source);
            let target_is_task = index.tasks.contains(&edge.target);

            match (source_is_task, target_is_task) {
                (true, false) => {
                    index
                        .produces
                        .entry(edge.source.clone())
                        .or_default()
                        .insert(edge.target.clone());
                    index
                        .producers
                        .entry(edge.target.clone())
                        .or_default()
                        .insert(edge.source.clone());
                }
                (false, true) => {
                    index
                        .consumers
                        .entry(edge.source.clone())
                        .or_default()
                        .insert(edge.target.clone());
                }
                _ => index.direct_edges.push(edge.clone()),
            }
        }

        for (task, produced) in &index.produces {
            for data in produced {
                for consumer in index.consumers.get(data).into_iter().flatten() {
                    index.paths.push(TaskPath {
                        source: task.clone(),
                        data: data.clone(),
                        target: consumer.clone(),
                    });
                }
            }
        }

        debug!(
            tasks = index.tasks.len(),
            datasets = index.datasets.len(),
            paths = index.paths.len(),
            "collapse index built"
        );

        index
    }

    /// Task → dataset → task hops, sorted
    pub fn paths(&self) -> &[TaskPath] {
        &self.paths
    }

    /// Datasets consumed but never produced
    pub fn root_datasets(&self) -> impl Iterator<Item = &NodeId> {
        self.consumers
            .keys()
            .filter(move |data| !self.producers.contains_key(*data))
    }

    /// Datasets produced but never consumed
    pub fn leaf_datasets(&self) -> impl Iterator<Item = &NodeId> {
        self.producers
            .keys()
            .filter(move |data| !self.consumers.contains_key(*data))
    }

    /// Datasets with no producer and no consumer task
    fn detached_datasets(&self) -> impl Iterator<Item = &NodeId> {
        self.datasets.iter().filter(move |data| {
            !self.producers.contains_key(*data) && !self.consumers.contains_key(*data)
        })
    }

    pub fn is_task(&self, id: &str) -> bool {
        self.tasks.contains(id)
    }
}

/// A node of a collapsed view
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum CollapsedNode {
    /// A node of the full graph, drawn as itself
    Node(NodeId),
    /// A folded pipeline with the expanded pipelines directly containing it
    Pipeline {
        id: PipelineId,
        parents: BTreeSet<PipelineId>,
    },
}

impl CollapsedNode {
    pub fn id(&self) -> &str {
        match self {
            Self::Node(id) => id,
            Self::Pipeline { id, .. } => id,
        }
    }
}

/// Result of collapsing the full graph
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollapsedGraph {
    /// Sorted by id
    pub nodes: Vec<CollapsedNode>,
    /// Sorted by (source, target)
    pub edges: Vec<Edge>,
}

/// Per-request collapsing over one snapshot
pub struct Collapser<'a> {
    index: &'a CollapseIndex,
    membership: &'a MembershipIndex,
    tree: &'a PipelineTree,
}

impl<'a> Collapser<'a> {
    pub fn new(index: &'a CollapseIndex, membership: &'a MembershipIndex, tree: &'a PipelineTree) -> Self {
        Self {
            index,
            membership,
            tree,
        }
    }

    /// Expanded pipelines plus everything containing them
    fn open_pipelines(&self, expanded: &BTreeSet<PipelineId>) -> BTreeSet<PipelineId> {
        let mut open = BTreeSet::new();
        for id in expanded {
            open.insert(id.clone());
            open.extend(self.tree.ancestors(id));
        }
        open
    }

    /// Pipelines drawn as folded boxes for an expansion request.
    ///
    /// A pipeline is drawn when it is not open and is either a root or a
    /// direct child of an open pipeline. A drawn pipeline that contains
    /// another drawn pipeline is left out.
    pub fn visible_pipelines(&self, expanded: &BTreeSet<PipelineId>) -> BTreeSet<PipelineId> {
        let open = self.open_pipelines(expanded);

        let candidates: BTreeSet<&str> = self
            .tree
            .pipelines()
            .filter(|id| !open.contains(*id))
            .filter(|id| self.tree.is_root(id) || self.tree.parents(id).any(|p| open.contains(p)))
            .collect();

        let ancestors: BTreeMap<&str, BTreeSet<PipelineId>> = candidates
            .iter()
            .map(|id| (*id, self.tree.ancestors(id)))
            .collect();

        candidates
            .iter()
            .filter(|id| {
                !ancestors
                    .iter()
                    .any(|(other, above)| other != *id && above.contains(**id))
            })
            .map(|id| id.to_string())
            .collect()
    }

    /// The id a node is drawn as.
    ///
    /// A task of an expanded pipeline only folds into a box nested under
    /// that pipeline; with no such box it is drawn as itself. Any other task
    /// folds into the smallest box containing it.
    fn resolve(
        &self,
        node: &str,
        visible: &BTreeSet<PipelineId>,
        expanded: &BTreeSet<PipelineId>,
    ) -> NodeId {
        if !self.index.is_task(node) {
            return node.to_string();
        }

        let pipelines: Vec<&PipelineId> = self
            .membership
            .pipelines_of(node)
            .into_iter()
            .flatten()
            .collect();
        let expanded_here: Vec<&str> = pipelines
            .iter()
            .filter(|p| expanded.contains(**p))
            .map(|p| p.as_str())
            .collect();

        pipelines
            .iter()
            .filter(|p| visible.contains(**p))
            .filter(|p| {
                expanded_here.is_empty()
                    || expanded_here.iter().any(|e| self.tree.is_ancestor(e, p))
            })
            .min_by_key(|p| (self.membership.pipeline_size(p), **p))
            .map(|p| p.to_string())
            .unwrap_or_else(|| node.to_string())
    }

    /// Collapse the full graph for a set of expanded pipelines
    pub fn collapse(&self, expanded: &BTreeSet<PipelineId>) -> VizResult<CollapsedGraph> {
        for id in expanded {
            if !self.tree.contains(id) {
                return Err(VizError::PipelineNotFound { id: id.clone() });
            }
        }

        let open = self.open_pipelines(expanded);
        let visible = self.visible_pipelines(expanded);

        let resolved: BTreeMap<&str, NodeId> = self
            .index
            .tasks
            .iter()
            .map(|task| (task.as_str(), self.resolve(task, &visible, expanded)))
            .collect();
        let resolve = |id: &str| -> NodeId {
            resolved
                .get(id)
                .cloned()
                .unwrap_or_else(|| id.to_string())
        };

        let mut shown: BTreeSet<NodeId> = resolved.values().cloned().collect();
        let mut edges: BTreeSet<Edge> = BTreeSet::new();

        for path in &self.index.paths {
            let source = resolve(&path.source);
            let target = resolve(&path.target);
            if source == target {
                continue;
            }
            shown.insert(path.data.clone());
            edges.insert(Edge::new(source, path.data.clone()));
            edges.insert(Edge::new(path.data.clone(), target));
        }

        for data in self.index.root_datasets() {
            shown.insert(data.clone());
            for consumer in self.index.consumers.get(data).into_iter().flatten() {
                edges.insert(Edge::new(data.clone(), resolve(consumer)));
            }
        }

        for data in self.index.leaf_datasets() {
            shown.insert(data.clone());
            for producer in self.index.producers.get(data).into_iter().flatten() {
                edges.insert(Edge::new(resolve(producer), data.clone()));
            }
        }

        for data in self.index.detached_datasets() {
            shown.insert(data.clone());
        }

        for edge in &self.index.direct_edges {
            let source = resolve(&edge.source);
            let target = resolve(&edge.target);
            if source != target {
                shown.insert(source.clone());
                shown.insert(target.clone());
                edges.insert(Edge::new(source, target));
            }
        }

        shown.extend(visible.iter().cloned());

        let nodes = shown
            .into_iter()
            .map(|id| {
                if visible.contains(&id) {
                    let parents = self
                        .tree
                        .parents(&id)
                        .filter(|p| open.contains(*p))
                        .map(str::to_string)
                        .collect();
                    CollapsedNode::Pipeline { id, parents }
                } else {
                    CollapsedNode::Node(id)
                }
            })
            .collect();

        let collapsed = CollapsedGraph {
            nodes,
            edges: edges.into_iter().collect(),
        };

        debug!(
            expanded = expanded.len(),
            boxes = visible.len(),
            nodes = collapsed.nodes.len(),
            edges = collapsed.edges.len(),
            "graph collapsed"
        );

        Ok(collapsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{EdgeDefinition, GraphBuilder, GraphDefinition, NodeDefinition};

    struct Fixture {
        graph: Graph,
        index: CollapseIndex,
        membership: MembershipIndex,
        tree: PipelineTree,
    }

    impl Fixture {
        fn new(nodes: Vec<NodeDefinition>, edges: &[(&str, &str)]) -> Self {
            let definition = GraphDefinition {
                nodes,
                edges: edges
                    .iter()
                    .map(|(s, t)| EdgeDefinition::new(*s, *t))
                    .collect(),
                ..Default::default()
            };
            let graph = GraphBuilder::build(&definition).unwrap();
            let membership = MembershipIndex::from_graph(&graph);
            let tree = PipelineTree::build(membership.pipeline_to_nodes()).unwrap();
            let index = CollapseIndex::build(&graph);
            Self {
                graph,
                index,
                membership,
                tree,
            }
        }

        fn collapse(&self, expanded: &[&str]) -> VizResult<CollapsedGraph> {
            let expanded = expanded.iter().map(|s| s.to_string()).collect();
            Collapser::new(&self.index, &self.membership, &self.tree).collapse(&expanded)
        }
    }

    fn task(id: &str, pipelines: &[&str]) -> NodeDefinition {
        NodeDefinition::task(id).with_id(id).in_pipelines(pipelines)
    }

    fn data(id: &str, pipelines: &[&str]) -> NodeDefinition {
        NodeDefinition::data(id).with_id(id).in_pipelines(pipelines)
    }

    /// all ⊃ {ingest, model}, ingest ⊃ {cleaning}
    ///
    /// raw -> t_clean -> clean -> t_feat -> features -> t_train -> model_out
    fn nested() -> Fixture {
        Fixture::new(
            vec![
                data("raw", &["all", "ingest", "cleaning"]),
                task("t_clean", &["all", "ingest", "cleaning"]),
                data("clean", &["all", "ingest", "cleaning"]),
                task("t_feat", &["all", "ingest"]),
                data("features", &["all", "ingest", "model"]),
                task("t_train", &["all", "model"]),
                data("model_out", &["all", "model"]),
            ],
            &[
                ("raw", "t_clean"),
                ("t_clean", "clean"),
                ("clean", "t_feat"),
                ("t_feat", "features"),
                ("features", "t_train"),
                ("t_train", "model_out"),
            ],
        )
    }

    fn node_ids(collapsed: &CollapsedGraph) -> Vec<&str> {
        collapsed.nodes.iter().map(CollapsedNode::id).collect()
    }

    fn edge_pairs(collapsed: &CollapsedGraph) -> Vec<(&str, &str)> {
        collapsed
            .edges
            .iter()
            .map(|e| (e.source.as_str(), e.target.as_str()))
            .collect()
    }

    fn assert_no_dangling(collapsed: &CollapsedGraph) {
        let ids: BTreeSet<&str> = collapsed.nodes.iter().map(CollapsedNode::id).collect();
        for edge in &collapsed.edges {
            assert!(ids.contains(edge.source.as_str()), "dangling source {}", edge.source);
            assert!(ids.contains(edge.target.as_str()), "dangling target {}", edge.target);
        }
    }

    #[test]
    fn test_index_tables() {
        let fixture = nested();

        assert_eq!(fixture.index.paths().len(), 2);
        assert_eq!(
            fixture.index.root_datasets().collect::<Vec<_>>(),
            vec!["raw"]
        );
        assert_eq!(
            fixture.index.leaf_datasets().collect::<Vec<_>>(),
            vec!["model_out"]
        );
    }

    #[test]
    fn test_empty_request_shows_roots() {
        let fixture = nested();
        let collapsed = fixture.collapse(&[]).unwrap();

        assert_eq!(node_ids(&collapsed), vec!["all", "model_out", "raw"]);
        assert_eq!(
            edge_pairs(&collapsed),
            vec![("all", "model_out"), ("raw", "all")]
        );
        assert!(matches!(
            &collapsed.nodes[0],
            CollapsedNode::Pipeline { parents, .. } if parents.is_empty()
        ));
        assert_no_dangling(&collapsed);
    }

    #[test]
    fn test_expand_root_shows_children() {
        let fixture = nested();
        let collapsed = fixture.collapse(&["all"]).unwrap();

        assert_eq!(
            node_ids(&collapsed),
            vec!["features", "ingest", "model", "model_out", "raw"]
        );
        assert_eq!(
            edge_pairs(&collapsed),
            vec![
                ("features", "model"),
                ("ingest", "features"),
                ("model", "model_out"),
                ("raw", "ingest"),
            ]
        );
        match &collapsed.nodes[1] {
            CollapsedNode::Pipeline { id, parents } => {
                assert_eq!(id, "ingest");
                assert_eq!(parents.iter().collect::<Vec<_>>(), vec!["all"]);
            }
            other => panic!("expected pipeline node, got {:?}", other),
        }
        assert_no_dangling(&collapsed);
    }

    #[test]
    fn test_expanding_child_implies_ancestors() {
        let fixture = nested();
        let collapsed = fixture.collapse(&["ingest"]).unwrap();

        // all is implicitly open; ingest shows its child cleaning and its own task
        assert_eq!(
            node_ids(&collapsed),
            vec!["clean", "cleaning", "features", "model", "model_out", "raw", "t_feat"]
        );
        assert!(edge_pairs(&collapsed).contains(&("cleaning", "clean")));
        assert!(edge_pairs(&collapsed).contains(&("clean", "t_feat")));
        assert!(matches!(
            &collapsed.nodes[1],
            CollapsedNode::Pipeline { parents, .. } if parents.contains("ingest")
        ));
        assert_no_dangling(&collapsed);
    }

    #[test]
    fn test_full_expansion_reproduces_graph() {
        let fixture = nested();
        let leaves: Vec<&str> = fixture.tree.leaves().collect();
        let collapsed = fixture.collapse(&leaves).unwrap();

        let expected_nodes: Vec<&str> = fixture.graph.nodes().map(|n| n.id.as_str()).collect();
        let expected_edges: Vec<(&str, &str)> = fixture
            .graph
            .edges()
            .map(|e| (e.source.as_str(), e.target.as_str()))
            .collect();

        assert_eq!(node_ids(&collapsed), expected_nodes);
        assert_eq!(edge_pairs(&collapsed), expected_edges);
        assert!(collapsed
            .nodes
            .iter()
            .all(|n| matches!(n, CollapsedNode::Node(_))));
    }

    #[test]
    fn test_unknown_pipeline_rejected() {
        let fixture = nested();

        let result = fixture.collapse(&["missing"]);
        assert!(matches!(result, Err(VizError::PipelineNotFound { id }) if id == "missing"));
    }

    #[test]
    fn test_task_outside_pipelines_kept() {
        let fixture = Fixture::new(
            vec![
                data("input", &[]),
                task("inside", &["p"]),
                data("mid", &["p"]),
                task("outside", &[]),
                data("output", &[]),
            ],
            &[
                ("input", "inside"),
                ("inside", "mid"),
                ("mid", "outside"),
                ("outside", "output"),
            ],
        );

        let collapsed = fixture.collapse(&[]).unwrap();

        assert_eq!(
            edge_pairs(&collapsed),
            vec![
                ("input", "p"),
                ("mid", "outside"),
                ("outside", "output"),
                ("p", "mid"),
            ]
        );
        assert_no_dangling(&collapsed);
    }

    #[test]
    fn test_dataset_internal_to_box_hidden() {
        let fixture = Fixture::new(
            vec![
                task("a", &["p"]),
                data("between", &["p"]),
                task("b", &["p"]),
                data("lonely", &[]),
            ],
            &[("a", "between"), ("between", "b")],
        );

        let collapsed = fixture.collapse(&[]).unwrap();

        assert_eq!(node_ids(&collapsed), vec!["lonely", "p"]);
        assert!(collapsed.edges.is_empty());
    }

    #[test]
    fn test_overlapping_box_picks_smallest() {
        let fixture = Fixture::new(
            vec![
                task("a", &["big", "small"]),
                task("b", &["big"]),
                task("c", &["big"]),
                task("d", &["other", "small"]),
                data("x", &["big", "other"]),
            ],
            &[("a", "x"), ("x", "d")],
        );

        // no containment between the three; a lands in small, d ties on size
        let collapsed = fixture.collapse(&[]).unwrap();

        assert_eq!(node_ids(&collapsed), vec!["big", "other", "small", "x"]);
        assert_eq!(edge_pairs(&collapsed), vec![("small", "x"), ("x", "other")]);
        assert_no_dangling(&collapsed);
    }

    #[test]
    fn test_expanded_task_not_hidden_in_sibling_box() {
        // all ⊃ {left, right}; left and right share task b
        let fixture = Fixture::new(
            vec![
                task("a", &["all", "left"]),
                data("x", &["all", "left"]),
                task("b", &["all", "left", "right"]),
                data("y", &["all", "right"]),
                task("c", &["all", "right"]),
            ],
            &[("a", "x"), ("x", "b"), ("b", "y"), ("y", "c")],
        );

        let collapsed = fixture.collapse(&["left"]).unwrap();

        assert_eq!(node_ids(&collapsed), vec!["a", "b", "right", "x", "y"]);
        assert_eq!(
            edge_pairs(&collapsed),
            vec![("a", "x"), ("b", "y"), ("x", "b"), ("y", "right")]
        );
        assert!(matches!(
            &collapsed.nodes[2],
            CollapsedNode::Pipeline { parents, .. } if parents.contains("all")
        ));
        assert_no_dangling(&collapsed);
    }

    #[test]
    fn test_expanded_parent_overlapping_sibling() {
        // all ⊃ {left, right}, left ⊃ {left_inner}; left and right share task b
        let fixture = Fixture::new(
            vec![
                data("w", &["all", "left", "left_inner"]),
                task("a", &["all", "left", "left_inner"]),
                data("x", &["all", "left", "left_inner"]),
                task("b", &["all", "left", "right"]),
                data("y", &["all", "right"]),
                task("c", &["all", "right"]),
                data("z", &["all", "right"]),
            ],
            &[
                ("w", "a"),
                ("a", "x"),
                ("x", "b"),
                ("b", "y"),
                ("y", "c"),
                ("c", "z"),
            ],
        );
        assert_eq!(fixture.tree.children("left").collect::<Vec<_>>(), vec!["left_inner"]);

        let collapsed = fixture.collapse(&["left"]).unwrap();

        // a folds into left's child box, b stays itself, c folds into right
        assert_eq!(
            node_ids(&collapsed),
            vec!["b", "left_inner", "right", "w", "x", "y", "z"]
        );
        assert_eq!(
            edge_pairs(&collapsed),
            vec![
                ("b", "y"),
                ("left_inner", "x"),
                ("right", "z"),
                ("w", "left_inner"),
                ("x", "b"),
                ("y", "right"),
            ]
        );
        assert_no_dangling(&collapsed);
    }

    #[test]
    fn test_output_is_deterministic() {
        let fixture = nested();

        let first = fixture.collapse(&["all"]).unwrap();
        let second = fixture.collapse(&["all"]).unwrap();
        assert_eq!(first, second);
    }
}
