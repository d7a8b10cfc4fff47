// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeviz contributors

//! Progress indicators

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Create a spinner for indeterminate progress
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
        .template("{spinner:.blue} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Stage-by-stage report; each stage prints a pending line that is
/// rewritten once it completes or fails
pub struct StageProgress {
    pending: std::vec::IntoIter<String>,
    active: Option<String>,
}

// cursor up one line, then clear it
const REWRITE: &str = "\x1b[1A\x1b[2K";

impl StageProgress {
    pub fn new(stages: Vec<String>) -> Self {
        Self {
            pending: stages.into_iter(),
            active: None,
        }
    }

    pub fn start(&mut self) {
        self.active = self.pending.next();
        if let Some(stage) = &self.active {
            println!("  → {}...", stage);
        }
    }

    pub fn complete(&mut self) {
        if let Some(stage) = self.active.take() {
            println!("{}  {} {}", REWRITE, "✓".green(), stage);
        }
    }

    pub fn fail(&mut self, error: &str) {
        if let Some(stage) = self.active.take() {
            println!("{}  {} {} - {}", REWRITE, "✗".red(), stage, error.dimmed());
        }
    }
}
