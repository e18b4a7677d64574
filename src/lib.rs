//! Grid placement engine for spell prerequisite trees.
//!
//! Takes the logical tree of every school, the anchors and candidate grid
//! points produced by the preview step, and the user's layout settings, and
//! pins each tree node onto a grid point. The result is handed to the
//! renderer as JSON.

pub mod error;
pub mod input;
pub mod layout;
pub mod output;
pub mod settings;
mod wasm;

#[cfg(test)]
mod testing;

use std::collections::BTreeMap;

use tracing::{debug, warn};

pub use error::LayoutError;
pub use input::{BaseLayout, GridPoint, LogicalTree, PhysicalAnchor, SpellDataSource};
pub use output::{PlacementPhase, PositionedNode, SchoolLayout, TreeLayout, ZoneInfo};
pub use settings::{LayoutSettings, TierZone};
pub use wasm::compute_tree_layout;

use layout::depth::estimate_depth;
use layout::tree::TreeIndex;
use layout::{PointF, layout_school};

/// Lay out every school of `tree`.
///
/// Never fails: a school without anchors, grid points or a valid root is
/// logged and left out of the result.
pub fn layout_tree(
    tree: &LogicalTree,
    base: &BaseLayout,
    settings: &LayoutSettings,
    source: Option<&dyn SpellDataSource>,
) -> TreeLayout {
    let indices: BTreeMap<&str, TreeIndex> = tree
        .schools
        .iter()
        .map(|(name, school)| (name.as_str(), TreeIndex::build(school, source)))
        .collect();
    let depth = estimate_depth(indices.values());
    debug!(schools = indices.len(), depth, "laying out tree");

    let mut schools: BTreeMap<String, SchoolLayout> = BTreeMap::new();
    let mut max_grid_radius: f64 = 0.0;

    for (name, index) in &indices {
        let anchors: Vec<PhysicalAnchor> = base
            .root_nodes
            .iter()
            .filter(|a| a.category == *name)
            .cloned()
            .collect();
        let points: Vec<PointF> = base
            .grid_points
            .iter()
            .filter(|p| p.category == *name)
            .map(|p| PointF::new(p.x, p.y))
            .collect();

        match layout_school(name, index, &anchors, points, &base.grid, settings, depth) {
            Ok(placement) => {
                max_grid_radius = max_grid_radius.max(placement.max_grid_radius);
                let color = base
                    .schools
                    .iter()
                    .find(|s| s.name == *name)
                    .and_then(|s| s.color.clone());
                schools.insert(
                    name.to_string(),
                    SchoolLayout {
                        nodes: placement.nodes,
                        color,
                        tree_max_radius: placement.tree_max_radius,
                    },
                );
            }
            Err(e) => warn!(school = %name, error = %e, "skipping school"),
        }
    }

    TreeLayout {
        schools,
        zone_info: ZoneInfo { ring_radius: base.grid.ring_radius, max_grid_radius },
    }
}

/// JSON in, JSON out. An empty `settings_json` means default settings.
pub fn compute_tree_layout_json(
    tree_json: &str,
    base_json: &str,
    settings_json: &str,
) -> Result<String, LayoutError> {
    let tree: LogicalTree = serde_json::from_str(tree_json)
        .map_err(|source| LayoutError::InvalidInput { what: "tree", source })?;
    let base: BaseLayout = serde_json::from_str(base_json)
        .map_err(|source| LayoutError::InvalidInput { what: "base layout", source })?;
    let settings: LayoutSettings = if settings_json.trim().is_empty() {
        LayoutSettings::default()
    } else {
        serde_json::from_str(settings_json)
            .map_err(|source| LayoutError::InvalidInput { what: "settings", source })?
    };

    let layout = layout_tree(&tree, &base, &settings, None);
    serde_json::to_string(&layout).map_err(LayoutError::Output)
}
