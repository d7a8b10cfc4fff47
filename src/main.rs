// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeviz contributors

//! pipeviz - pipeline graph explorer

use clap::Parser;
use miette::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pipeviz::cli::graph::GraphView;
use pipeviz::cli::{Cli, Commands, Context};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pipeviz=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();

    // Change to specified directory if provided
    if let Some(ref dir) = cli.directory {
        std::env::set_current_dir(dir).map_err(|e| {
            miette::miette!("Failed to change to directory '{}': {}", dir.display(), e)
        })?;
    }

    let ctx = Context::load(cli.config.as_deref(), cli.verbose)?;

    // Dispatch to command handlers
    match cli.command {
        Commands::Graph {
            snapshot,
            pipeline,
            expand,
            collapsed,
            format,
        } => {
            let view = GraphView::from_flags(pipeline, expand, collapsed);
            pipeviz::cli::graph::run(&ctx, snapshot, view, format).await
        }
        Commands::Layers { snapshot } => pipeviz::cli::layers::run(&ctx, snapshot).await,
        Commands::Tree { snapshot, format } => {
            pipeviz::cli::tree::run(&ctx, snapshot, format).await
        }
        Commands::Metadata { node_id, snapshot } => {
            pipeviz::cli::metadata::run(&ctx, node_id, snapshot).await
        }
        Commands::Validate { snapshot } => pipeviz::cli::validate::run(&ctx, snapshot).await,
        Commands::Watch { snapshot, debounce } => {
            pipeviz::cli::watch::run(&ctx, snapshot, debounce).await
        }
    }
}
