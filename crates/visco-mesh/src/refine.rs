//! Topology change: bisection and sibling merge.
//!
//! [`adapt`] consumes one flag per active cell and returns the new mesh
//! together with a [`CellMap`] recording where every new cell came from.
//! Field transfer is driven entirely by that map.

use tracing::debug;
use visco_types::{ViscoError, ViscoResult};

use crate::mesh::IntervalMesh;

/// Refinement mark for one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellFlag {
    #[default]
    Keep,
    Refine,
    Coarsen,
}

/// Origin of a cell in the adapted mesh, in terms of old cell indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellSource {
    /// Unchanged.
    Same(usize),
    /// One half of a bisected cell.
    Child { parent: usize },
    /// Union of two sibling cells.
    Merged { left: usize, right: usize },
}

/// Old→new cell correspondence, one entry per new cell.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CellMap {
    pub sources: Vec<CellSource>,
}

/// Result of [`adapt`].
#[derive(Debug, Clone)]
pub struct AdaptOutcome {
    pub mesh: IntervalMesh,
    pub map: CellMap,
    /// Cells bisected.
    pub refined: usize,
    /// Sibling pairs merged.
    pub coarsened: usize,
}

/// Applies `flags` to `mesh`.
///
/// - `Refine` bisects a cell unless it is already at `max_level`.
/// - `Coarsen` merges a cell with its sibling only when both are flagged
///   and adjacent in the active set; otherwise the cell is kept.
pub fn adapt(mesh: &IntervalMesh, flags: &[CellFlag], max_level: u32) -> ViscoResult<AdaptOutcome> {
    if flags.len() != mesh.cell_count() {
        return Err(ViscoError::Refinement(format!(
            "flag count ({}) != cell count ({})",
            flags.len(),
            mesh.cell_count()
        )));
    }

    let n = mesh.cell_count();
    let mut cells = Vec::with_capacity(n + n / 2);
    let mut sources = Vec::with_capacity(n + n / 2);
    let mut refined = 0;
    let mut coarsened = 0;

    let mut i = 0;
    while i < n {
        let cell = mesh.cells[i];
        let merge = flags[i] == CellFlag::Coarsen
            && i + 1 < n
            && flags[i + 1] == CellFlag::Coarsen
            && cell.is_left_sibling_of(mesh.cells[i + 1]);

        if merge {
            if let Some(parent) = cell.parent() {
                cells.push(parent);
                sources.push(CellSource::Merged {
                    left: i,
                    right: i + 1,
                });
                coarsened += 1;
                i += 2;
                continue;
            }
        }

        if flags[i] == CellFlag::Refine && cell.level < max_level {
            for child in cell.children() {
                cells.push(child);
                sources.push(CellSource::Child { parent: i });
            }
            refined += 1;
        } else {
            cells.push(cell);
            sources.push(CellSource::Same(i));
        }
        i += 1;
    }

    let adapted = IntervalMesh::from_cells(mesh.origin, mesh.base_width, mesh.base_cells, cells)
        .map_err(|e| ViscoError::Refinement(format!("adapted mesh is invalid: {e}")))?;
    debug!(
        before = n,
        after = adapted.cell_count(),
        refined,
        coarsened,
        "mesh adapted"
    );

    Ok(AdaptOutcome {
        mesh: adapted,
        map: CellMap { sources },
        refined,
        coarsened,
    })
}
