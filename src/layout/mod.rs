// Spell tree placement.
//
// Pins every node of a school's prerequisite tree onto one of the candidate
// grid points handed over by the preview step.
//
// Goals:
// - Deterministic: the only randomness is a generator seeded from the school name
// - Anchored: each group's lead node sits exactly on its physical anchor
// - Balanced: several anchors grow in lockstep, one wave at a time
// - Complete: nodes that cannot be placed cleanly are reattached or forced
//
// Submodules:
// - spatial_grid: bucketed point lookup
// - grid_graph: nearest-neighbor graph over grid points
// - densify: extra points when a school has more nodes than points
// - tree / depth: indexed logical tree and depth estimate
// - groups: first-level subtrees shared across anchors
// - zones: tier ordering and radial bands
// - slot_search: scored search for open points
// - wave / deferred / force_placement: the placement phases, in order
//
// Output:
// - SchoolPlacement with one PositionedNode per placed tree node.

use tracing::{debug, info, instrument};

use crate::error::LayoutError;
use crate::input::{GridSpec, PhysicalAnchor};
use crate::output::PositionedNode;
use crate::settings::{LayoutSettings, TierZone};

pub mod densify;
pub mod deferred;
pub mod depth;
pub mod force_placement;
pub mod grid_graph;
pub mod groups;
pub mod rng;
pub mod slot_search;
mod spatial_grid;
pub mod state;
pub mod tree;
pub mod wave;
pub mod zones;

use deferred::reattach_deferred;
use densify::densify;
use force_placement::force_fill;
use grid_graph::GridGraph;
use groups::{build_groups, root_is_virtual};
use rng::Lcg;
use slot_search::{SEARCH_DEPTH, ZONED_SEARCH_DEPTH};
use state::PlacementState;
use tree::TreeIndex;
use wave::{run_waves, seed_groups};
use zones::RadialFrame;

#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct PointF {
    pub x: f64,
    pub y: f64,
}

impl PointF {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn add(self, other: PointF) -> PointF {
        PointF::new(self.x + other.x, self.y + other.y)
    }

    pub fn sub(self, other: PointF) -> PointF {
        PointF::new(self.x - other.x, self.y - other.y)
    }

    pub fn scale(self, k: f64) -> PointF {
        PointF::new(self.x * k, self.y * k)
    }

    pub fn dot(self, other: PointF) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Distance from the origin.
    pub fn len(self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn dist_sq(self, other: PointF) -> f64 {
        let d = self.sub(other);
        d.dot(d)
    }

    pub fn midpoint(self, other: PointF) -> PointF {
        self.add(other).scale(0.5)
    }

    /// Unit vector in the same direction, or None for a zero vector.
    pub fn normalized(self) -> Option<PointF> {
        let len = self.len();
        (len > f64::EPSILON).then(|| self.scale(1.0 / len))
    }
}

/// Unit vector for an angle in degrees, 0 along +x.
pub fn direction_from_degrees(degrees: f64) -> PointF {
    let rad = degrees.to_radians();
    PointF::new(rad.cos(), rad.sin())
}

pub fn growth_direction(anchor: &PhysicalAnchor) -> PointF {
    direction_from_degrees(anchor.growth_direction_angle)
}

/// Read-only parameters shared by every phase of one school run.
#[derive(Debug, Clone)]
pub struct LayoutContext<'a> {
    pub graph: &'a GridGraph,
    pub settings: &'a LayoutSettings,
    pub frame: RadialFrame,
    pub min_radius_sq: f64,
    pub density_cap: usize,
    pub radial_bonus: f64,
    pub search_depth: usize,
}

impl<'a> LayoutContext<'a> {
    pub fn new(
        graph: &'a GridGraph,
        settings: &'a LayoutSettings,
        frame: RadialFrame,
        min_radius: f64,
    ) -> Self {
        Self {
            graph,
            settings,
            frame,
            min_radius_sq: min_radius * min_radius,
            density_cap: settings.density_cap(),
            radial_bonus: settings.radial_bonus(),
            search_depth: if settings.has_tier_zones() { ZONED_SEARCH_DEPTH } else { SEARCH_DEPTH },
        }
    }

    pub fn zone_for(&self, tier: &str) -> Option<TierZone> {
        self.settings.zone_for(tier)
    }

    /// Crowding of `idx` if a node may be put there: open, outside the
    /// radius floor and no more crowded than the density cap.
    pub fn open_slot(&self, idx: usize, occupied: &[bool]) -> Option<usize> {
        if occupied[idx] {
            return None;
        }
        let p = self.graph.point(idx);
        if p.dot(p) < self.min_radius_sq {
            return None;
        }
        let crowding = self.graph.occupied_neighbors(idx, occupied);
        (crowding <= self.density_cap).then_some(crowding)
    }
}

/// Result of laying out one school.
#[derive(Debug, Clone, PartialEq)]
pub struct SchoolPlacement {
    pub nodes: Vec<PositionedNode>,
    /// Largest radius of any grid point, densified ones included.
    pub max_grid_radius: f64,
    /// Largest radius of any placed node.
    pub tree_max_radius: f64,
    /// Nodes lost to grid exhaustion.
    pub dropped: usize,
}

/// Lay out one school.
///
/// `depth` is the deepest tree level across all schools and calibrates the
/// tier-zone percentages.
#[instrument(level = "debug", skip_all, fields(school = name))]
pub fn layout_school(
    name: &str,
    index: &TreeIndex,
    anchors: &[PhysicalAnchor],
    points: Vec<PointF>,
    grid: &GridSpec,
    settings: &LayoutSettings,
    depth: usize,
) -> Result<SchoolPlacement, LayoutError> {
    let Some(lead) = anchors.first() else {
        return Err(LayoutError::MissingAnchor(name.to_string()));
    };
    if points.is_empty() {
        return Err(LayoutError::MissingGridPoints(name.to_string()));
    }
    if !index.contains(&index.root) {
        return Err(LayoutError::MissingRoot { category: name.to_string(), root: index.root.clone() });
    }

    let spacing = if grid.spacing_unit > 0.0 { grid.spacing_unit } else { GridSpec::default().spacing_unit };
    let virtual_root = root_is_virtual(anchors.len());
    let expected: Vec<String> = index
        .bfs_order()
        .into_iter()
        .filter(|id| !(virtual_root && *id == index.root))
        .collect();

    let points = if expected.len() > points.len() {
        densify(&points, expected.len(), spacing)
    } else {
        points
    };
    let graph = GridGraph::build(points, spacing);
    let max_grid_radius = graph.max_radius();
    let inner_radius = anchors
        .iter()
        .map(|a| PointF::new(a.x, a.y).len())
        .fold(f64::INFINITY, f64::min);
    let frame = RadialFrame::new(inner_radius, max_grid_radius, depth, spacing);
    let ctx = LayoutContext::new(&graph, settings, frame, settings.min_radius(grid.ring_radius, spacing));
    debug!(points = graph.len(), nodes = expected.len(), growth_range = frame.growth_range, "grid ready");

    let groups = build_groups(index, anchors);
    let directions: Vec<PointF> = groups.iter().map(|g| growth_direction(g.anchor)).collect();
    let mut state = PlacementState::new(graph.len());
    if virtual_root {
        state.exclude(&index.root);
    }
    let mut rng = Lcg::for_school(name);

    let first = seed_groups(&ctx, index, &groups, virtual_root, &mut state);
    let waves = run_waves(&ctx, index, &directions, &mut state, &mut rng, first);
    let reattached = reattach_deferred(&ctx, index, &mut state);
    let report = force_fill(&ctx, index, &mut state, &expected, PointF::new(lead.x, lead.y));

    let tree_max_radius = state
        .positioned
        .iter()
        .map(|n| PointF::new(n.x, n.y).len())
        .fold(0.0, f64::max);
    info!(
        placed = state.positioned.len(),
        expected = expected.len(),
        waves,
        reattached,
        forced = report.forced,
        dropped = report.dropped,
        "school laid out"
    );

    Ok(SchoolPlacement {
        nodes: state.positioned,
        max_grid_radius,
        tree_max_radius,
        dropped: report.dropped,
    })
}
