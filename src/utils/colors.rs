// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeviz contributors

//! Terminal color utilities
//!
//! Consistent styling for node kinds and report lines.

use colored::{ColoredString, Colorize};

use crate::graph::NodeKind;

/// Node kind label, colored per kind
pub fn kind_label(kind: NodeKind) -> ColoredString {
    let label = kind.to_string();
    match kind {
        NodeKind::Task => label.cyan(),
        NodeKind::Data => label.green(),
        NodeKind::Parameters => label.yellow(),
        NodeKind::Pipeline => label.magenta().bold(),
    }
}

/// Print a styled header
pub fn print_header(title: &str) {
    println!("{}", title.bold());
    println!("{}", "═".repeat(title.len().max(40)));
}

/// Print a styled section
pub fn print_section(title: &str) {
    println!();
    println!("{}:", title.bold());
}

/// Print a numbered item
pub fn print_numbered(num: usize, content: &str) {
    println!("  {}. {}", num, content);
}

/// Print a warning
pub fn print_warning(msg: &str) {
    println!("  {} {}", "⚠".yellow(), msg);
}
