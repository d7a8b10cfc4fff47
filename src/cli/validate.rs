// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeviz contributors

//! Validate command - check that a snapshot builds

use colored::Colorize;
use miette::Result;
use std::path::PathBuf;

use super::Context;
use crate::errors::VizError;
use crate::graph::{GraphBuilder, NodeKind};
use crate::pipeline::{LayerSequencer, MembershipIndex, PipelineTree};
use crate::snapshot::GraphSource;
use crate::utils::{kind_label, print_section, print_warning, StageProgress};

/// Run the validate command
pub async fn run(ctx: &Context, snapshot: Option<PathBuf>) -> Result<()> {
    println!("{}", "Validating snapshot...".bold());
    println!();

    let source = ctx.source(snapshot);
    let mut progress = StageProgress::new(vec![
        format!("Read {}", source.describe()),
        "Build graph".to_string(),
        "Sequence layers".to_string(),
        "Build pipeline tree".to_string(),
    ]);

    progress.start();
    let loaded = source.load().await.map_err(|e| fail(&mut progress, e))?;
    progress.complete();

    progress.start();
    let graph = GraphBuilder::build(&loaded.definition).map_err(|e| fail(&mut progress, e))?;
    progress.complete();

    progress.start();
    let layers = LayerSequencer::from_graph(&graph)
        .sequence()
        .map_err(|e| fail(&mut progress, e))?;
    progress.complete();

    progress.start();
    let membership = MembershipIndex::from_graph(&graph);
    let tree = PipelineTree::build(membership.pipeline_to_nodes()).map_err(|e| fail(&mut progress, e))?;
    progress.complete();

    let orphans: Vec<&str> = graph
        .nodes()
        .filter(|n| n.pipelines.is_empty())
        .map(|n| n.id.as_str())
        .collect();
    let empty_pipelines: Vec<&str> = graph
        .pipelines()
        .iter()
        .filter(|p| membership.nodes_of(&p.id).is_none())
        .map(|p| p.id.as_str())
        .collect();

    if !orphans.is_empty() || !empty_pipelines.is_empty() {
        print_section("Warnings");
        for id in &orphans {
            print_warning(&format!("node {} belongs to no pipeline", id));
        }
        for id in &empty_pipelines {
            print_warning(&format!("pipeline {} has no nodes", id));
        }
    }

    if ctx.verbose {
        let count = |kind: NodeKind| graph.nodes().filter(|n| n.kind() == kind).count();

        print_section("Snapshot summary");
        for kind in [NodeKind::Task, NodeKind::Data, NodeKind::Parameters] {
            println!("  {:<12}{}", format!("{}:", kind_label(kind)), count(kind));
        }
        println!("  Edges:      {}", graph.edge_count());
        println!("  Layers:     {}", layers.join(" -> "));
        println!(
            "  Pipelines:  {} ({} root)",
            graph.pipelines().len(),
            tree.roots().count()
        );
    }

    println!();
    println!("{}", "Snapshot is valid!".green().bold());
    Ok(())
}

fn fail(progress: &mut StageProgress, error: VizError) -> miette::Report {
    progress.fail(&error.to_string());
    error.into()
}
