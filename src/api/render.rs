// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeviz contributors

//! Text, DOT and Mermaid rendering of graph responses

use serde::{Deserialize, Serialize};
use std::fmt::Write;

use super::responses::GraphResponse;
use crate::errors::VizResult;
use crate::graph::NodeKind;
use crate::pipeline::TreeNode;

/// Output format for rendered graphs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Dot,
    Mermaid,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "dot" => Ok(Self::Dot),
            "mermaid" => Ok(Self::Mermaid),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

/// Render a response in the requested format
pub fn render(response: &GraphResponse, format: OutputFormat) -> VizResult<String> {
    match format {
        OutputFormat::Text => Ok(to_text(response)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(response)?),
        OutputFormat::Dot => Ok(to_dot(response)),
        OutputFormat::Mermaid => Ok(to_mermaid(response)),
    }
}

/// Plain summary: layers, then nodes and edges by name
pub fn to_text(response: &GraphResponse) -> String {
    let mut out = String::new();

    if let Some(selected) = &response.selected_pipeline {
        let _ = writeln!(out, "Pipeline: {}", selected);
    }
    if !response.layers.is_empty() {
        let _ = writeln!(out, "Layers: {}", response.layers.join(" -> "));
    }

    let _ = writeln!(out, "Nodes ({}):", response.nodes.len());
    for (i, node) in response.nodes.iter().enumerate() {
        let _ = write!(out, "  {}. [{}] {} ({})", i + 1, node.kind, node.name, node.id);
        if let Some(layer) = &node.layer {
            let _ = write!(out, " layer={}", layer);
        }
        if !node.tags.is_empty() {
            let _ = write!(out, " tags={}", node.tags.join(","));
        }
        out.push('\n');
    }

    let _ = writeln!(out, "Edges ({}):", response.edges.len());
    for edge in &response.edges {
        let _ = writeln!(
            out,
            "  {} -> {}",
            response.label(&edge.source),
            response.label(&edge.target)
        );
    }

    out
}

fn dot_shape(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Task => "box",
        NodeKind::Data => "ellipse",
        NodeKind::Parameters => "note",
        NodeKind::Pipeline => "box3d",
    }
}

fn dot_escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Graphviz DOT diagram, one rank per layer
pub fn to_dot(response: &GraphResponse) -> String {
    let mut out = String::from("digraph pipeline {\n");
    out.push_str("    rankdir=TB;\n");
    out.push_str("    node [style=rounded];\n\n");

    for node in &response.nodes {
        let _ = writeln!(
            out,
            "    \"{}\" [label=\"{}\", shape={}];",
            dot_escape(&node.id),
            dot_escape(&node.name),
            dot_shape(node.kind)
        );
    }

    for layer in &response.layers {
        let members: Vec<String> = response
            .nodes
            .iter()
            .filter(|n| n.layer.as_deref() == Some(layer.as_str()))
            .map(|n| format!("\"{}\"", dot_escape(&n.id)))
            .collect();
        if !members.is_empty() {
            let _ = writeln!(out, "    {{ rank=same; {}; }}", members.join("; "));
        }
    }

    if !response.edges.is_empty() {
        out.push('\n');
    }
    for edge in &response.edges {
        let _ = writeln!(
            out,
            "    \"{}\" -> \"{}\";",
            dot_escape(&edge.source),
            dot_escape(&edge.target)
        );
    }

    out.push_str("}\n");
    out
}

fn mermaid_id(id: &str) -> String {
    id.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

fn mermaid_node(kind: NodeKind, id: &str, label: &str) -> String {
    let label = label.replace('"', "#quot;");
    match kind {
        NodeKind::Task => format!("{}[\"{}\"]", id, label),
        NodeKind::Data => format!("{}([\"{}\"])", id, label),
        NodeKind::Parameters => format!("{}{{{{\"{}\"}}}}", id, label),
        NodeKind::Pipeline => format!("{}[[\"{}\"]]", id, label),
    }
}

/// Mermaid flowchart
pub fn to_mermaid(response: &GraphResponse) -> String {
    let mut out = String::from("graph TD\n");

    for node in &response.nodes {
        let _ = writeln!(
            out,
            "    {}",
            mermaid_node(node.kind, &mermaid_id(&node.id), &node.name)
        );
    }

    for edge in &response.edges {
        let _ = writeln!(
            out,
            "    {} --> {}",
            mermaid_id(&edge.source),
            mermaid_id(&edge.target)
        );
    }

    out
}

/// Indented pipeline tree
pub fn tree_to_text(forest: &[TreeNode]) -> String {
    let mut out = String::new();
    let mut stack: Vec<(&TreeNode, usize)> = forest.iter().rev().map(|n| (n, 0)).collect();

    while let Some((node, depth)) = stack.pop() {
        let _ = writeln!(out, "{}{}", "  ".repeat(depth), node.id);
        stack.extend(node.children.iter().rev().map(|child| (child, depth + 1)));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::responses::{NamedEntity, NodeResponse};
    use crate::graph::Edge;

    fn node(id: &str, name: &str, kind: NodeKind, layer: Option<&str>) -> NodeResponse {
        NodeResponse {
            id: id.into(),
            name: name.into(),
            full_name: name.to_lowercase(),
            kind,
            tags: vec![],
            pipelines: vec!["__default__".into()],
            modular_pipelines: vec![],
            layer: layer.map(str::to_string),
            parents: None,
        }
    }

    fn response() -> GraphResponse {
        GraphResponse {
            nodes: vec![
                node("d1", "Companies", NodeKind::Data, Some("raw")),
                node("p.x", "Rate", NodeKind::Parameters, None),
                node("t1", "Preprocess", NodeKind::Task, None),
            ],
            edges: vec![Edge::new("d1", "t1"), Edge::new("p.x", "t1")],
            tags: vec![],
            layers: vec!["raw".into()],
            pipelines: vec![NamedEntity::new("__default__", "Default")],
            modular_pipelines: vec![],
            pipeline_tree: vec![],
            selected_pipeline: Some("__default__".into()),
        }
    }

    #[test]
    fn test_text_output() {
        let text = to_text(&response());

        assert!(text.contains("Layers: raw"));
        assert!(text.contains("1. [data] Companies (d1) layer=raw"));
        assert!(text.contains("Companies -> Preprocess"));
    }

    #[test]
    fn test_dot_output() {
        let dot = to_dot(&response());

        assert!(dot.starts_with("digraph pipeline {"));
        assert!(dot.contains("\"t1\" [label=\"Preprocess\", shape=box];"));
        assert!(dot.contains("{ rank=same; \"d1\"; }"));
        assert!(dot.contains("\"d1\" -> \"t1\";"));
    }

    #[test]
    fn test_mermaid_sanitizes_ids() {
        let mermaid = to_mermaid(&response());

        assert!(mermaid.contains("d1([\"Companies\"])"));
        assert!(mermaid.contains("p_x{{\"Rate\"}}"));
        assert!(mermaid.contains("p_x --> t1"));
    }

    #[test]
    fn test_tree_text_indents_children() {
        let forest = vec![TreeNode {
            id: "__default__".into(),
            children: vec![
                TreeNode {
                    id: "dp".into(),
                    children: vec![],
                },
                TreeNode {
                    id: "ds".into(),
                    children: vec![],
                },
            ],
        }];

        assert_eq!(tree_to_text(&forest), "__default__\n  dp\n  ds\n");
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("DOT".parse::<OutputFormat>(), Ok(OutputFormat::Dot));
        assert!("svg".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_json_render_is_valid() {
        let json = render(&response(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["nodes"][0]["type"], "data");
    }
}
