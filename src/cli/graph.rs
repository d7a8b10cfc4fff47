// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeviz contributors

//! Graph command - print the full, filtered or collapsed graph

use miette::Result;
use std::path::PathBuf;

use super::Context;
use crate::api::{render, GraphQuery, OutputFormat};

/// Which view of the graph to print
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphView {
    Full,
    Pipeline(String),
    Collapsed(Vec<String>),
}

impl GraphView {
    pub fn from_flags(pipeline: Option<String>, expand: Vec<String>, collapsed: bool) -> Self {
        match pipeline {
            Some(id) => Self::Pipeline(id),
            None if collapsed || !expand.is_empty() => Self::Collapsed(expand),
            None => Self::Full,
        }
    }
}

/// Run the graph command
pub async fn run(
    ctx: &Context,
    snapshot: Option<PathBuf>,
    view: GraphView,
    format: Option<OutputFormat>,
) -> Result<()> {
    let snapshot = ctx.open(snapshot).await?;
    let query = GraphQuery::new(&snapshot);

    let response = match view {
        GraphView::Full => query.get_full_graph(),
        GraphView::Pipeline(id) => query.get_pipeline_graph(&id)?,
        GraphView::Collapsed(expanded) => query.get_collapsed_graph(expanded.as_slice())?,
    };

    let output = render(&response, ctx.format(format))?;
    print!("{}", output);
    if !output.ends_with('\n') {
        println!();
    }

    Ok(())
}
