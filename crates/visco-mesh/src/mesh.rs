//! Core interval mesh type.
//!
//! The domain `[origin, origin + base_cells * base_width]` is covered by a
//! uniform base grid. Every cell is addressed by its refinement `level`
//! and its `index` among the cells of that level:
//!
//! ```text
//! level 0:  |-------0-------|-------1-------|
//! level 1:  |---0---|---1---|---2---|---3---|
//! cell (l, k) spans [k, k + 1] * base_width / 2^l
//! ```
//!
//! Cells are stored left to right; node `i` is the left end of cell `i`
//! and the last node closes the domain.

use serde::{Deserialize, Serialize};
use visco_types::{ViscoError, ViscoResult};

/// Deepest refinement level a cell may reach.
pub const MAX_LEVEL: u32 = 30;

/// A cell addressed by refinement level and position within that level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub level: u32,
    pub index: u64,
}

impl Cell {
    /// Returns the two cells produced by bisection.
    pub fn children(self) -> [Cell; 2] {
        let level = self.level + 1;
        [
            Cell {
                level,
                index: 2 * self.index,
            },
            Cell {
                level,
                index: 2 * self.index + 1,
            },
        ]
    }

    /// Returns the cell this one was bisected from, if any.
    pub fn parent(self) -> Option<Cell> {
        (self.level > 0).then(|| Cell {
            level: self.level - 1,
            index: self.index / 2,
        })
    }

    /// True if `other` is the right sibling of `self`.
    pub fn is_left_sibling_of(self, other: Cell) -> bool {
        self.level > 0
            && self.level == other.level
            && self.index % 2 == 0
            && self.index.checked_add(1) == Some(other.index)
    }

    /// True if the cell lies inside a base grid of `base_cells` cells
    /// and its level does not exceed [`MAX_LEVEL`].
    pub fn fits(self, base_cells: usize) -> bool {
        self.level <= MAX_LEVEL
            && (base_cells as u64)
                .checked_mul(1u64 << self.level)
                .is_some_and(|count| self.index < count)
    }

    /// Extent in units of `base_width / 2^level`, widened to `level`.
    /// `None` if `level` is coarser than the cell or the extent overflows.
    fn span_at(self, level: u32) -> Option<(u64, u64)> {
        let scale = 1u64.checked_shl(level.checked_sub(self.level)?)?;
        let left = self.index.checked_mul(scale)?;
        let right = self.index.checked_add(1)?.checked_mul(scale)?;
        Some((left, right))
    }
}

/// A 1-D mesh of bisected intervals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalMesh {
    /// Left end of the domain.
    pub origin: f64,
    /// Width of a level-0 cell.
    pub base_width: f64,
    /// Number of level-0 cells covering the domain.
    pub base_cells: usize,
    /// Active cells, left to right.
    pub cells: Vec<Cell>,
    /// Node coordinates (`cells.len() + 1`), strictly increasing.
    pub nodes: Vec<f64>,
}

impl IntervalMesh {
    /// Builds a mesh from its active cells and computes node coordinates.
    pub fn from_cells(
        origin: f64,
        base_width: f64,
        base_cells: usize,
        cells: Vec<Cell>,
    ) -> ViscoResult<Self> {
        if !(base_width > 0.0 && base_width.is_finite()) || !origin.is_finite() {
            return Err(ViscoError::InvalidMesh(format!(
                "invalid base grid: origin {origin}, width {base_width}"
            )));
        }

        let mut nodes = Vec::with_capacity(cells.len() + 1);
        for cell in &cells {
            if !cell.fits(base_cells) {
                return Err(ViscoError::InvalidMesh(format!(
                    "cell {cell:?} lies outside a base grid of {base_cells} cells \
                     (maximum level {MAX_LEVEL})"
                )));
            }
            nodes.push(origin + base_width * cell.index as f64 / (1u64 << cell.level) as f64);
        }
        nodes.push(origin + base_width * base_cells as f64);

        let mesh = Self {
            origin,
            base_width,
            base_cells,
            cells,
            nodes,
        };
        mesh.validate()?;
        Ok(mesh)
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Total length of the domain.
    pub fn length(&self) -> f64 {
        self.base_width * self.base_cells as f64
    }

    /// Returns `[left, right]` of cell `c`.
    #[inline]
    pub fn cell_bounds(&self, c: usize) -> [f64; 2] {
        [self.nodes[c], self.nodes[c + 1]]
    }

    #[inline]
    pub fn cell_width(&self, c: usize) -> f64 {
        self.nodes[c + 1] - self.nodes[c]
    }

    #[inline]
    pub fn cell_midpoint(&self, c: usize) -> f64 {
        0.5 * (self.nodes[c] + self.nodes[c + 1])
    }

    /// Widths of every cell, left to right.
    pub fn widths(&self) -> Vec<f64> {
        self.nodes.windows(2).map(|w| w[1] - w[0]).collect()
    }

    /// Midpoints of every cell, left to right.
    pub fn midpoints(&self) -> Vec<f64> {
        self.nodes.windows(2).map(|w| 0.5 * (w[0] + w[1])).collect()
    }

    /// Deepest level present.
    pub fn max_level(&self) -> u32 {
        self.cells.iter().map(|c| c.level).max().unwrap_or(0)
    }

    /// Index of the cell containing `x`. Points outside the domain map
    /// to the nearest end cell.
    pub fn locate(&self, x: f64) -> usize {
        let last = self.cell_count().saturating_sub(1);
        self.nodes
            .partition_point(|&n| n <= x)
            .saturating_sub(1)
            .min(last)
    }

    /// Validates mesh integrity.
    ///
    /// Checks:
    /// - At least one cell, one more node than cells
    /// - Cells tile the base grid left to right without gaps or overlap
    /// - Node coordinates strictly increase
    pub fn validate(&self) -> ViscoResult<()> {
        if self.cells.is_empty() {
            return Err(ViscoError::InvalidMesh("mesh has no cells".into()));
        }
        if self.nodes.len() != self.cells.len() + 1 {
            return Err(ViscoError::InvalidMesh(format!(
                "node count ({}) != cell count + 1 ({})",
                self.nodes.len(),
                self.cells.len() + 1
            )));
        }

        let first = self.cells[0];
        if first.index != 0 {
            return Err(ViscoError::InvalidMesh(format!(
                "first cell {first:?} does not start at the origin"
            )));
        }
        let overflow = |cell: Cell| {
            ViscoError::InvalidMesh(format!("cell {cell:?} extent overflows the index range"))
        };
        for (i, pair) in self.cells.windows(2).enumerate() {
            let level = pair[0].level.max(pair[1].level);
            let (_, right) = pair[0].span_at(level).ok_or_else(|| overflow(pair[0]))?;
            let (left, _) = pair[1].span_at(level).ok_or_else(|| overflow(pair[1]))?;
            if right != left {
                return Err(ViscoError::InvalidMesh(format!(
                    "cells {} and {} are not adjacent: {:?}, {:?}",
                    i,
                    i + 1,
                    pair[0],
                    pair[1]
                )));
            }
        }
        let last = self.cells[self.cells.len() - 1];
        let (_, end) = last.span_at(last.level).ok_or_else(|| overflow(last))?;
        if Some(end) != (self.base_cells as u64).checked_mul(1u64 << last.level.min(MAX_LEVEL)) {
            return Err(ViscoError::InvalidMesh(format!(
                "last cell {last:?} does not close a base grid of {} cells",
                self.base_cells
            )));
        }

        for (i, w) in self.nodes.windows(2).enumerate() {
            if !(w[1] > w[0]) {
                return Err(ViscoError::InvalidMesh(format!(
                    "nodes {} and {} are not increasing: {} >= {}",
                    i,
                    i + 1,
                    w[0],
                    w[1]
                )));
            }
        }
        Ok(())
    }
}
