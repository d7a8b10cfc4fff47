// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeviz contributors

//! CLI command definitions and handlers
//!
//! Defines the command-line interface for pipeviz.

pub mod graph;
pub mod layers;
pub mod metadata;
pub mod tree;
pub mod validate;
pub mod watch;

use clap::{Parser, Subcommand};
use miette::Result;
use std::path::{Path, PathBuf};

use crate::api::OutputFormat;
use crate::config::VizConfig;
use crate::snapshot::{GraphSnapshot, JsonFileSource, SnapshotStore};
use crate::utils::create_spinner;

/// Pipeline graph explorer
///
/// Inspect layers, sub-pipelines and collapsed views of an extracted
/// pipeline graph.
#[derive(Parser, Debug)]
#[clap(
    name = "pipeviz",
    version,
    about = "Explore layers and sub-pipelines of an extracted pipeline graph",
    long_about = None,
    after_help = "Examples:\n\
        pipeviz graph                       Show the full graph\n\
        pipeviz graph --expand data_science Collapse everything outside data_science\n\
        pipeviz layers                      Show layers in dependency order\n\
        pipeviz tree                        Show the sub-pipeline tree\n\
        pipeviz watch                       Rebuild on snapshot changes\n\n\
        See 'pipeviz <command> --help' for more information on a specific command."
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[clap(short, long, global = true)]
    pub verbose: bool,

    /// Change to directory before executing
    #[clap(short = 'C', long, global = true, value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Configuration file (defaults to .pipeviz.yaml)
    #[clap(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the graph, a pipeline's subgraph or a collapsed view
    Graph {
        /// Snapshot file
        #[clap(short, long)]
        snapshot: Option<PathBuf>,

        /// Show only the nodes of this pipeline
        #[clap(short, long, conflicts_with = "expand")]
        pipeline: Option<String>,

        /// Collapse every pipeline except these (repeatable)
        #[clap(short, long)]
        expand: Vec<String>,

        /// Collapse to the root-level view
        #[clap(long, conflicts_with_all = ["pipeline", "expand"])]
        collapsed: bool,

        /// Output format (text, json, dot, mermaid)
        #[clap(short, long)]
        format: Option<OutputFormat>,
    },

    /// Show layers in dependency order
    Layers {
        /// Snapshot file
        #[clap(short, long)]
        snapshot: Option<PathBuf>,
    },

    /// Show the sub-pipeline tree
    Tree {
        /// Snapshot file
        #[clap(short, long)]
        snapshot: Option<PathBuf>,

        /// Output format (text, json)
        #[clap(short, long)]
        format: Option<OutputFormat>,
    },

    /// Show the metadata of one node
    Metadata {
        /// Node id
        node_id: String,

        /// Snapshot file
        #[clap(short, long)]
        snapshot: Option<PathBuf>,
    },

    /// Check that a snapshot builds
    Validate {
        /// Snapshot file
        #[clap(short, long)]
        snapshot: Option<PathBuf>,
    },

    /// Rebuild the snapshot whenever the file changes
    Watch {
        /// Snapshot file
        #[clap(short, long)]
        snapshot: Option<PathBuf>,

        /// Debounce delay in milliseconds
        #[clap(long)]
        debounce: Option<u64>,
    },
}

/// Settings shared by every command
#[derive(Debug, Clone)]
pub struct Context {
    pub config: VizConfig,
    pub verbose: bool,
}

impl Context {
    /// Load configuration for the current directory
    pub fn load(config_path: Option<&Path>, verbose: bool) -> Result<Self> {
        let cwd = std::env::current_dir()
            .map_err(|e| miette::miette!("Failed to get current directory: {}", e))?;
        let config = VizConfig::discover(&cwd, config_path)?;

        Ok(Self { config, verbose })
    }

    /// Snapshot path: the flag wins over the configuration
    pub fn snapshot_path(&self, flag: Option<PathBuf>) -> PathBuf {
        flag.unwrap_or_else(|| self.config.snapshot.clone())
    }

    /// Output format: the flag wins over the configuration
    pub fn format(&self, flag: Option<OutputFormat>) -> OutputFormat {
        flag.unwrap_or(self.config.output.format)
    }

    pub fn source(&self, snapshot: Option<PathBuf>) -> JsonFileSource {
        JsonFileSource::new(self.snapshot_path(snapshot))
            .with_selected_pipeline(self.config.default_pipeline.clone())
    }

    /// Load and build a snapshot
    pub async fn open(&self, snapshot: Option<PathBuf>) -> Result<std::sync::Arc<GraphSnapshot>> {
        let source = self.source(snapshot);
        let spinner = create_spinner(&format!("Loading {}", source.path().display()));
        let store = SnapshotStore::open(&source).await;
        spinner.finish_and_clear();

        Ok(store?.load())
    }
}
