// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeviz contributors

//! # pipeviz - pipeline graph explorer
//!
//! `pipeviz` turns an extracted pipeline graph (tasks, datasets and
//! parameters with their dependency edges) into presentation-ready views.
//!
//! ## Features
//!
//! - **Layer ordering** - Infers an order over dataset layers from the node graph
//! - **Sub-pipeline tree** - Nests pipelines by node-set containment
//! - **Collapsed views** - Folds non-expanded pipelines into single nodes
//! - **Live reload** - Rebuilds and atomically swaps snapshots on change
//!
//! ## Quick Start
//!
//! ```bash
//! # Show the full graph
//! pipeviz graph --snapshot pipeline.json
//!
//! # Collapse everything except one pipeline
//! pipeviz graph --expand data_science --format mermaid
//!
//! # Show the layer order and the pipeline tree
//! pipeviz layers
//! pipeviz tree
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod graph;
pub mod pipeline;
pub mod snapshot;
pub mod utils;

// Re-export commonly used types
pub use api::{GraphQuery, GraphResponse, NodeMetadata};
pub use errors::{VizError, VizResult};
pub use graph::{Graph, GraphBuilder, GraphDefinition};
pub use snapshot::{GraphSnapshot, SnapshotStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
