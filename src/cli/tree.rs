// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeviz contributors

//! Tree command - print the sub-pipeline tree

use miette::Result;
use std::path::PathBuf;

use super::Context;
use crate::api::render::tree_to_text;
use crate::api::OutputFormat;

/// Run the tree command
pub async fn run(ctx: &Context, snapshot: Option<PathBuf>, format: Option<OutputFormat>) -> Result<()> {
    let snapshot = ctx.open(snapshot).await?;
    let forest = snapshot.tree().forest();

    match ctx.format(format) {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(forest)
                .map_err(|e| miette::miette!("Failed to serialize tree: {}", e))?;
            println!("{}", json);
        }
        // dot and mermaid have no tree form
        _ => print!("{}", tree_to_text(forest)),
    }

    Ok(())
}
