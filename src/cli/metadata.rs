// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeviz contributors

//! Metadata command - print the metadata of one node

use miette::Result;
use std::path::PathBuf;

use super::Context;
use crate::api::GraphQuery;

/// Run the metadata command
pub async fn run(ctx: &Context, node_id: String, snapshot: Option<PathBuf>) -> Result<()> {
    let snapshot = ctx.open(snapshot).await?;
    let metadata = GraphQuery::new(&snapshot).get_node_metadata(&node_id)?;

    let json = serde_json::to_string_pretty(&metadata)
        .map_err(|e| miette::miette!("Failed to serialize metadata: {}", e))?;
    println!("{}", json);

    Ok(())
}
