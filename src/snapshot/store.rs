// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeviz contributors

//! Atomic snapshot publication

use arc_swap::ArcSwap;
use std::sync::Arc;
use tracing::info;

use super::{GraphSnapshot, GraphSource};
use crate::errors::VizResult;
use crate::graph::GraphBuilder;

/// Holds the current snapshot; readers never see a partial rebuild
pub struct SnapshotStore {
    current: ArcSwap<GraphSnapshot>,
}

impl SnapshotStore {
    pub fn new(snapshot: GraphSnapshot) -> Self {
        Self {
            current: ArcSwap::from_pointee(snapshot),
        }
    }

    /// Load a source and build the first snapshot
    pub async fn open(source: &dyn GraphSource) -> VizResult<Self> {
        let snapshot = build_from(source).await?;
        Ok(Self::new(snapshot))
    }

    /// The snapshot current at the time of the call
    pub fn load(&self) -> Arc<GraphSnapshot> {
        self.current.load_full()
    }

    /// Publish a new snapshot, returning the previous one
    pub fn replace(&self, snapshot: GraphSnapshot) -> Arc<GraphSnapshot> {
        self.current.swap(Arc::new(snapshot))
    }

    /// Rebuild from a source and swap it in.
    ///
    /// Returns `Ok(false)` when the source content is unchanged. On error the
    /// current snapshot stays in place.
    pub async fn reload(&self, source: &dyn GraphSource) -> VizResult<bool> {
        let loaded = source.load().await?;
        if loaded.fingerprint == self.current.load().fingerprint() {
            return Ok(false);
        }

        let graph = GraphBuilder::build(&loaded.definition)?;
        let snapshot = GraphSnapshot::build(graph, loaded.fingerprint)?;

        info!(
            source = %source.describe(),
            nodes = snapshot.graph().node_count(),
            edges = snapshot.graph().edge_count(),
            "snapshot reloaded"
        );

        self.replace(snapshot);
        Ok(true)
    }
}

async fn build_from(source: &dyn GraphSource) -> VizResult<GraphSnapshot> {
    let loaded = source.load().await?;
    let graph = GraphBuilder::build(&loaded.definition)?;
    GraphSnapshot::build(graph, loaded.fingerprint)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::VizError;
    use crate::graph::GraphDefinition;
    use crate::snapshot::JsonFileSource;
    use tempfile::TempDir;

    const ONE_NODE: &str = r#"{"nodes": [{"id": "d1", "type": "data", "full_name": "a"}]}"#;
    const TWO_NODES: &str = r#"{"nodes": [
        {"id": "d1", "type": "data", "full_name": "a"},
        {"id": "d2", "type": "data", "full_name": "b"}
    ]}"#;

    fn write_source(temp: &TempDir, content: &str) -> JsonFileSource {
        let path = temp.path().join("pipeline.json");
        std::fs::write(&path, content).unwrap();
        JsonFileSource::new(path)
    }

    #[tokio::test]
    async fn test_reload_swaps_on_change() {
        let temp = TempDir::new().unwrap();
        let source = write_source(&temp, ONE_NODE);
        let store = SnapshotStore::open(&source).await.unwrap();

        let before = store.load();
        assert!(!store.reload(&source).await.unwrap());

        write_source(&temp, TWO_NODES);
        assert!(store.reload(&source).await.unwrap());

        assert_eq!(before.graph().node_count(), 1);
        assert_eq!(store.load().graph().node_count(), 2);
    }

    #[tokio::test]
    async fn test_store_from_definition_matches_file_fingerprint() {
        let temp = TempDir::new().unwrap();
        let source = write_source(&temp, ONE_NODE);

        let definition = GraphDefinition::from_json(ONE_NODE).unwrap();
        let store = SnapshotStore::new(GraphSnapshot::from_definition(&definition).unwrap());

        assert!(!store.reload(&source).await.unwrap());

        // reformatting alone is not a change
        write_source(&temp, &definition.to_json().unwrap());
        assert!(!store.reload(&source).await.unwrap());
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_previous() {
        let temp = TempDir::new().unwrap();
        let source = write_source(&temp, ONE_NODE);
        let store = SnapshotStore::open(&source).await.unwrap();

        write_source(
            &temp,
            r#"{"nodes": [{"id": "d1", "type": "data", "full_name": "a"}],
                "edges": [{"source": "d1", "target": "ghost"}]}"#,
        );

        let result = store.reload(&source).await;
        assert!(matches!(result, Err(VizError::InvalidGraph { .. })));
        assert_eq!(store.load().graph().node_count(), 1);
    }

    #[tokio::test]
    async fn test_readers_share_snapshot_across_threads() {
        let temp = TempDir::new().unwrap();
        let source = write_source(&temp, TWO_NODES);
        let store = Arc::new(SnapshotStore::open(&source).await.unwrap());

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.load().graph().node_count() })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap(), 2);
        }
    }
}
