// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeviz contributors

//! Watch command - rebuild the snapshot on file changes

use colored::Colorize;
use miette::Result;
use notify::{RecursiveMode, Watcher};
use notify_debouncer_mini::{new_debouncer, DebouncedEventKind};
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;
use std::time::{Duration, Instant};
use tracing::warn;

use super::Context;
use crate::errors::VizError;
use crate::snapshot::{GraphSnapshot, JsonFileSource, SnapshotStore};

/// Run the watch command
pub async fn run(ctx: &Context, snapshot: Option<PathBuf>, debounce: Option<u64>) -> Result<()> {
    let debounce_ms = debounce.unwrap_or(ctx.config.watch.debounce_ms);
    let source = ctx.source(snapshot);
    let path = source.path().to_path_buf();

    let store = SnapshotStore::open(&source).await?;

    println!("{}", "Starting watch mode...".bold());
    println!(
        "Watching {} for changes (debounce: {}ms)",
        path.display(),
        debounce_ms
    );
    println!("Press {} to exit.", "Ctrl+C".cyan());
    println!();
    report(&store.load(), Duration::ZERO);

    let (tx, rx) = channel();

    let mut debouncer = new_debouncer(Duration::from_millis(debounce_ms), tx)
        .map_err(VizError::from)?;

    // editors often replace the file, so watch its directory
    let watch_dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    debouncer
        .watcher()
        .watch(watch_dir, RecursiveMode::NonRecursive)
        .map_err(VizError::from)?;

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let changed = events
                    .iter()
                    .filter(|e| matches!(e.kind, DebouncedEventKind::Any))
                    .map(|e| e.path.as_path());
                if !touches(changed, &path) {
                    continue;
                }
                rebuild(&store, &source, ctx.verbose).await;
            }
            Ok(Err(e)) => {
                eprintln!("{}: {:?}", "Watch error".red(), e);
            }
            Err(e) => {
                // Channel closed
                eprintln!("{}: {}", "Channel error".red(), e);
                break;
            }
        }
    }

    Ok(())
}

/// Whether any changed path is the snapshot file
fn touches<'a>(mut changed: impl Iterator<Item = &'a Path>, snapshot: &Path) -> bool {
    let name = snapshot.file_name();
    changed.any(|p| p.file_name() == name)
}

async fn rebuild(store: &SnapshotStore, source: &JsonFileSource, verbose: bool) {
    let start = Instant::now();

    match store.reload(source).await {
        Ok(true) => {
            println!();
            println!("{}", "─".repeat(50).dimmed());
            println!("{}", "Snapshot changed".yellow());
            report(&store.load(), start.elapsed());
        }
        Ok(false) => {
            if verbose {
                println!("{}", "Snapshot content unchanged".dimmed());
            }
        }
        Err(e) => {
            warn!(error = %e, "rebuild failed; keeping previous snapshot");
            eprintln!("{}: {}", "Rebuild failed".red(), e);
            eprintln!("{}", "Keeping the previous snapshot.".dimmed());
        }
    }
}

fn report(snapshot: &GraphSnapshot, elapsed: Duration) {
    let graph = snapshot.graph();
    println!(
        "{} {} nodes, {} edges, {} layers, {} pipelines ({:.2}s)",
        "Snapshot ready:".green(),
        graph.node_count(),
        graph.edge_count(),
        snapshot.layers().len(),
        graph.pipelines().len(),
        elapsed.as_secs_f64()
    );
}
