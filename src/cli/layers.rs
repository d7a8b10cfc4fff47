// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeviz contributors

//! Layers command - print layers in dependency order

use colored::Colorize;
use miette::Result;
use std::path::PathBuf;

use super::Context;
use crate::pipeline::LayerSequencer;
use crate::utils::{print_header, print_numbered};

/// Run the layers command
pub async fn run(ctx: &Context, snapshot: Option<PathBuf>) -> Result<()> {
    let snapshot = ctx.open(snapshot).await?;
    let layers = snapshot.layers();

    if layers.is_empty() {
        println!("{}", "No node carries a layer.".dimmed());
        return Ok(());
    }

    print_header("Layers");

    let sequencer = ctx.verbose.then(|| LayerSequencer::from_graph(snapshot.graph()));

    for (i, layer) in layers.iter().enumerate() {
        let Some(sequencer) = &sequencer else {
            print_numbered(i + 1, layer);
            continue;
        };

        let count = snapshot
            .graph()
            .nodes()
            .filter(|n| n.layer.as_deref() == Some(layer.as_str()))
            .count();
        let next = sequencer.successors(layer).unwrap_or_default();
        let detail = if next.is_empty() {
            format!("({} nodes)", count)
        } else {
            format!("({} nodes, before {})", count, next.join(", "))
        };
        print_numbered(i + 1, &format!("{} {}", layer, detail.dimmed()));
    }

    Ok(())
}
