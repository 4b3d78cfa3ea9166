//! Hex coordinate system for the comb (pointy-top, odd-row offset)
//!
//! Sites are addressed by (row, col). Odd rows are shifted half a cell to the
//! right, so neighbor offsets depend on the parity of the row.

use crate::core::types::Vec2;
use serde::{Deserialize, Serialize};

const SQRT3: f32 = 1.732_050_8;

/// Offsets walked around the ring for even rows: E, NE, NW, W, SW, SE
const EVEN_ROW_RING: [(i32, i32); 6] = [(0, 1), (-1, 0), (-1, -1), (0, -1), (1, -1), (1, 0)];

/// Offsets walked around the ring for odd rows: E, NE, NW, W, SW, SE
const ODD_ROW_RING: [(i32, i32); 6] = [(0, 1), (-1, 1), (-1, 0), (0, -1), (1, 0), (1, 1)];

/// Offset hex coordinate of a site
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct SiteCoord {
    pub row: i32,
    pub col: i32,
}

impl SiteCoord {
    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    fn is_odd_row(&self) -> bool {
        self.row.rem_euclid(2) == 1
    }

    /// The 6 neighbors in ring order; consecutive entries (and the last with
    /// the first) touch each other as well as `self`
    pub fn neighbors(&self) -> [SiteCoord; 6] {
        let ring = if self.is_odd_row() { &ODD_ROW_RING } else { &EVEN_ROW_RING };
        ring.map(|(dr, dc)| SiteCoord::new(self.row + dr, self.col + dc))
    }

    /// Adjacent neighbor pairs around the ring
    pub fn neighbor_pairs(&self) -> [(SiteCoord, SiteCoord); 6] {
        let n = self.neighbors();
        [
            (n[0], n[1]),
            (n[1], n[2]),
            (n[2], n[3]),
            (n[3], n[4]),
            (n[4], n[5]),
            (n[5], n[0]),
        ]
    }

    /// World-space center of the hexagon
    pub fn center(&self, origin: Vec2, cell_size: f32) -> Vec2 {
        let shift = if self.is_odd_row() { 1.0 } else { 0.0 };
        Vec2::new(
            origin.x + (self.col as f32 * 2.0 + shift) * cell_size * SQRT3,
            origin.y + self.row as f32 * cell_size * 3.0,
        )
    }
}

impl std::fmt::Display for SiteCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Sites that start buildable in a fresh colony
pub const SEED_SITES: [SiteCoord; 3] = [
    SiteCoord { row: 0, col: 0 },
    SiteCoord { row: 1, col: -1 },
    SiteCoord { row: 1, col: 0 },
];

/// Every coordinate of the square grid `-radius..=radius` in (row, col) order
pub fn grid(radius: i32) -> Vec<SiteCoord> {
    let mut coords = Vec::with_capacity(((2 * radius + 1) * (2 * radius + 1)) as usize);
    for row in -radius..=radius {
        for col in -radius..=radius {
            coords.push(SiteCoord::new(row, col));
        }
    }
    coords
}
