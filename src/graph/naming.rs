// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeviz contributors

//! Display names and namespace handling

/// Prefix marking a single-parameter node
pub const PARAMS_PREFIX: &str = "params:";

/// Full name of the node holding every parameter
pub const ALL_PARAMETERS: &str = "parameters";

/// Turn an identifier into a human readable name.
///
/// `-` and `_` become spaces and every word is capitalised, so
/// `__default__` reads as `Default`.
pub fn pretty_name(name: &str) -> String {
    name.replace(['-', '_'], " ")
        .split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Expand a dotted namespace into every enclosing modular pipeline.
///
/// `a.b.c` yields `["a", "a.b", "a.b.c"]`.
pub fn expand_namespace(namespace: &str) -> Vec<String> {
    if namespace.is_empty() {
        return Vec::new();
    }

    let parts: Vec<&str> = namespace.split('.').collect();
    (1..=parts.len()).map(|n| parts[..n].join(".")).collect()
}

/// Namespace of a dataset name: everything before the last dot
pub fn dataset_namespace(full_name: &str) -> Option<&str> {
    let name = full_name.strip_prefix(PARAMS_PREFIX).unwrap_or(full_name);
    name.rfind('.').map(|idx| &name[..idx])
}
