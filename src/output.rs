//! Output types for the rendering layer.
//!
//! These structs are serialized to JSON and handed to the panel that paints
//! nodes and edges.

use std::collections::BTreeMap;
use serde::Serialize;

/// Engine state that produced a placement.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlacementPhase {
    Wave,
    Deferred,
    Forced,
}

/// A tree node pinned to a grid point.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionedNode {
    pub node_id: String,
    pub x: f64,
    pub y: f64,
    pub parent_id: Option<String>,
    pub grid_index: usize,
    pub tier: String,
    pub phase: PlacementPhase,
    /// Occupied neighbors of the grid point when it was reserved.
    #[serde(skip)]
    pub crowding: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolLayout {
    pub nodes: Vec<PositionedNode>,
    pub color: Option<String>,
    pub tree_max_radius: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneInfo {
    pub ring_radius: Option<f64>,
    pub max_grid_radius: f64,
}

/// The combined output sent to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeLayout {
    pub schools: BTreeMap<String, SchoolLayout>,
    pub zone_info: ZoneInfo,
}

/// Error payload returned across the wasm boundary.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorOutput {
    pub error: String,
}
