// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeviz contributors

//! Query surface
//!
//! Read-only queries over a [`GraphSnapshot`](crate::snapshot::GraphSnapshot)
//! and renderers for their results.

mod query;
pub mod render;
mod responses;

pub use query::GraphQuery;
pub use render::{render, OutputFormat};
pub use responses::{GraphResponse, NamedEntity, NodeMetadata, NodeResponse};
