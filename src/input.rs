//! Input contracts consumed by the placement engine.
//!
//! These structs are deserialized from the JSON produced by the tree builder
//! and by the preview step that lays out grid points and anchors.

use std::collections::BTreeMap;
use serde::Deserialize;

/// The logical prerequisite tree, keyed by school (category) name.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogicalTree {
    #[serde(default)]
    pub schools: BTreeMap<String, SchoolTree>,
}

/// One school's tree: a root id plus a flat node list.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolTree {
    #[serde(alias = "rootId")]
    pub root: String,
    #[serde(default)]
    pub nodes: Vec<TreeNode>,
}

/// A node of the logical tree.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    #[serde(alias = "formId")]
    pub id: String,
    /// Tier label such as "Novice" or "Master"; may be empty.
    #[serde(default, alias = "skillLevel", deserialize_with = "tier_label")]
    pub tier: String,
    #[serde(default, alias = "children")]
    pub child_ids: Vec<String>,
}

impl TreeNode {
    pub fn new(id: &str, tier: &str, child_ids: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            tier: tier.to_string(),
            child_ids: child_ids.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// Tiers arrive either as labels or as 1-based numbers.
fn tier_label<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Label(String),
        Number(i64),
    }
    Ok(match Raw::deserialize(deserializer)? {
        Raw::Label(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}

/// Output of the preview step: grid parameters, anchors and candidate points.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseLayout {
    #[serde(default)]
    pub mode: String,
    #[serde(default)]
    pub grid: GridSpec,
    #[serde(default)]
    pub schools: Vec<SchoolInfo>,
    #[serde(default)]
    pub root_nodes: Vec<PhysicalAnchor>,
    #[serde(default)]
    pub grid_points: Vec<GridPoint>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridSpec {
    pub spacing_unit: f64,
    #[serde(default)]
    pub ring_radius: Option<f64>,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self { spacing_unit: 40.0, ring_radius: None }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SchoolInfo {
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

/// A candidate position tagged with the school it belongs to.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GridPoint {
    pub x: f64,
    pub y: f64,
    #[serde(alias = "school")]
    pub category: String,
}

/// Fixed seed position for a school's tree.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhysicalAnchor {
    pub x: f64,
    pub y: f64,
    #[serde(alias = "school")]
    pub category: String,
    /// Degrees, 0 pointing along +x.
    #[serde(default)]
    pub growth_direction_angle: f64,
}

/// Optional collaborator that knows each spell's skill level.
///
/// Consulted only for nodes whose tier label is empty.
pub trait SpellDataSource {
    fn skill_level(&self, node_id: &str) -> Option<String>;
}

impl SpellDataSource for BTreeMap<String, String> {
    fn skill_level(&self, node_id: &str) -> Option<String> {
        self.get(node_id).cloned()
    }
}
