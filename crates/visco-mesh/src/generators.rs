//! Procedural mesh generators.
//!
//! These produce deterministic, resolution-configurable meshes for runs
//! that start without a persisted mesh, and for tests.

use visco_types::{ViscoError, ViscoResult};

use crate::mesh::{Cell, IntervalMesh};

/// Generates `cells` equal level-0 cells covering `[origin, origin + length]`.
///
/// # Example
/// ```
/// use visco_mesh::generators::uniform;
/// let mesh = uniform(0.0, 2.0, 4).unwrap();
/// assert_eq!(mesh.node_count(), 5);
/// assert_eq!(mesh.cell_width(0), 0.5);
/// ```
pub fn uniform(origin: f64, length: f64, cells: usize) -> ViscoResult<IntervalMesh> {
    if cells == 0 {
        return Err(ViscoError::InvalidMesh(
            "uniform mesh needs at least one cell".into(),
        ));
    }
    if !(length > 0.0 && length.is_finite()) {
        return Err(ViscoError::InvalidMesh(format!(
            "uniform mesh length must be positive, got {length}"
        )));
    }

    let base = (0..cells as u64)
        .map(|index| Cell { level: 0, index })
        .collect();
    IntervalMesh::from_cells(origin, length / cells as f64, cells, base)
}

/// Generates a uniform mesh bisected `levels` times everywhere.
pub fn uniform_refined(
    origin: f64,
    length: f64,
    cells: usize,
    levels: u32,
) -> ViscoResult<IntervalMesh> {
    let base = uniform(origin, length, cells)?;
    let mut active: Vec<Cell> = base.cells.clone();
    for _ in 0..levels {
        active = active.into_iter().flat_map(Cell::children).collect();
    }
    IntervalMesh::from_cells(base.origin, base.base_width, base.base_cells, active)
}
