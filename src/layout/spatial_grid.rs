// Spatial hash over grid point indices.
//
// Neighbor and pair queries only need to look at the 3x3 block of cells
// around a point instead of the whole pool.

use super::PointF;
use std::collections::HashMap;

/// A spatial hash grid of point indices.
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    /// Size of each cell. Queries never reach further than one cell.
    cell_size: f64,
    /// Map from cell coordinates to the indices of points inside that cell.
    cells: HashMap<(i64, i64), Vec<usize>>,
}

impl SpatialGrid {
    /// Create a grid whose cells are `cell_size` wide.
    /// Cell size should be the largest query radius.
    pub fn new(cell_size: f64) -> Self {
        Self {
            cell_size: if cell_size > 0.0 { cell_size } else { 1.0 },
            cells: HashMap::new(),
        }
    }

    /// Build a grid holding every point of `points` under its slice index.
    pub fn from_points(points: &[PointF], cell_size: f64) -> Self {
        let mut grid = Self::new(cell_size);
        for (idx, p) in points.iter().enumerate() {
            grid.insert(idx, *p);
        }
        grid
    }

    fn cell_of(&self, p: PointF) -> (i64, i64) {
        (
            (p.x / self.cell_size).floor() as i64,
            (p.y / self.cell_size).floor() as i64,
        )
    }

    pub fn insert(&mut self, idx: usize, p: PointF) {
        let cell = self.cell_of(p);
        self.cells.entry(cell).or_default().push(idx);
    }

    /// Indices in the cells surrounding `p`.
    /// May include points further than one cell away; caller filters by distance.
    pub fn query(&self, p: PointF) -> Vec<usize> {
        let (cx, cy) = self.cell_of(p);
        let mut result = Vec::new();
        for dx in -1..=1 {
            for dy in -1..=1 {
                // Far-out points share the saturated edge cell
                let cell = (cx.saturating_add(dx), cy.saturating_add(dy));
                if let Some(indices) = self.cells.get(&cell) {
                    result.extend_from_slice(indices);
                }
            }
        }
        result.sort_unstable();
        result
    }
}
