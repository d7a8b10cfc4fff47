// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeviz contributors

//! Error types
//!
//! Structural errors (layer cycles, impossible containment) abort the
//! snapshot build. Lookup errors are local to a single query.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for pipeviz operations
pub type VizResult<T> = Result<T, VizError>;

/// Main error type for pipeviz
#[derive(Error, Debug, Diagnostic)]
pub enum VizError {
    // ─────────────────────────────────────────────────────────────────────────
    // Structural Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Circular dependency between layers: {}", .layers.join(", "))]
    #[diagnostic(
        code(pipeviz::circular_dependency),
        help("Nodes force these layers to precede each other. Check the layer assigned to datasets on the cycle.")
    )]
    CircularDependency { layers: Vec<String> },

    #[error("Pipeline containment is inconsistent: {}", .pipelines.join(", "))]
    #[diagnostic(
        code(pipeviz::data_integrity),
        help("The containment relation between these pipelines forms a cycle. The snapshot is corrupted.")
    )]
    DataIntegrity { pipelines: Vec<String> },

    #[error("Invalid graph: {reason}")]
    #[diagnostic(code(pipeviz::invalid_graph))]
    InvalidGraph {
        reason: String,
        #[help]
        help: Option<String>,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Query Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Pipeline '{id}' not found")]
    #[diagnostic(
        code(pipeviz::pipeline_not_found),
        help("Run 'pipeviz tree' to list the registered pipelines")
    )]
    PipelineNotFound { id: String },

    #[error("Node '{id}' not found")]
    #[diagnostic(
        code(pipeviz::node_not_found),
        help("Node ids are listed by 'pipeviz graph --format json'")
    )]
    NodeNotFound { id: String },

    // ─────────────────────────────────────────────────────────────────────────
    // File Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Snapshot file not found: {path}")]
    #[diagnostic(
        code(pipeviz::snapshot_not_found),
        help("Pass --snapshot or set 'snapshot' in .pipeviz.yaml")
    )]
    SnapshotNotFound { path: PathBuf },

    #[error("Failed to read file '{path}': {error}")]
    #[diagnostic(code(pipeviz::file_read_error))]
    FileReadError { path: PathBuf, error: String },

    #[error("Failed to write file '{path}': {error}")]
    #[diagnostic(code(pipeviz::file_write_error))]
    FileWriteError { path: PathBuf, error: String },

    #[error("Invalid configuration in '{path}': {message}")]
    #[diagnostic(code(pipeviz::config_error))]
    ConfigError { path: PathBuf, message: String },

    #[error("File watcher failed: {message}")]
    #[diagnostic(code(pipeviz::watch_error))]
    WatchError { message: String },

    // ─────────────────────────────────────────────────────────────────────────
    // IO/System Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("IO error: {message}")]
    #[diagnostic(code(pipeviz::io_error))]
    Io { message: String },

    #[error("JSON parsing error: {message}")]
    #[diagnostic(code(pipeviz::json_error))]
    Json { message: String },

    #[error("YAML parsing error: {message}")]
    #[diagnostic(code(pipeviz::yaml_error))]
    Yaml { message: String },
}

impl From<std::io::Error> for VizError {
    fn from(e: std::io::Error) -> Self {
        Self::Io { message: e.to_string() }
    }
}

impl From<serde_json::Error> for VizError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json { message: e.to_string() }
    }
}

impl From<serde_yaml::Error> for VizError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Yaml { message: e.to_string() }
    }
}

impl From<notify::Error> for VizError {
    fn from(e: notify::Error) -> Self {
        Self::WatchError { message: e.to_string() }
    }
}

impl VizError {
    /// Create an invalid graph error for an edge endpoint that names no node
    pub fn dangling_edge(source: &str, target: &str, missing: &str) -> Self {
        Self::InvalidGraph {
            reason: format!("edge {} -> {} references unknown node '{}'", source, target, missing),
            help: Some("Every edge endpoint must be the id of a node in the snapshot".into()),
        }
    }

    /// Whether this error is local to a single query rather than the snapshot
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::PipelineNotFound { .. } | Self::NodeNotFound { .. })
    }
}
