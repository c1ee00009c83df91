//! Field transfer across a topology change.
//!
//! Cell fields follow the [`CellMap`]: kept and bisected cells copy the
//! old value, merged cells take the width-weighted average (so the
//! integral over the domain is preserved). Node fields are interpolated
//! linearly from the old mesh, which is exact at every surviving node.

use visco_types::{ViscoError, ViscoResult};

use crate::mesh::IntervalMesh;
use crate::refine::{CellMap, CellSource};

/// Transfers a per-cell field from `old` onto the mesh described by `map`.
pub fn transfer_cells(map: &CellMap, old: &IntervalMesh, values: &[f64]) -> ViscoResult<Vec<f64>> {
    if values.len() != old.cell_count() {
        return Err(ViscoError::Refinement(format!(
            "cell field length ({}) != old cell count ({})",
            values.len(),
            old.cell_count()
        )));
    }

    Ok(map
        .sources
        .iter()
        .map(|source| match *source {
            CellSource::Same(c) | CellSource::Child { parent: c } => values[c],
            CellSource::Merged { left, right } => {
                let wl = old.cell_width(left);
                let wr = old.cell_width(right);
                (wl * values[left] + wr * values[right]) / (wl + wr)
            }
        })
        .collect())
}

/// Interpolates a per-node field from `old` onto the nodes of `new`.
pub fn transfer_nodes(old: &IntervalMesh, new: &IntervalMesh, values: &[f64]) -> ViscoResult<Vec<f64>> {
    if values.len() != old.node_count() {
        return Err(ViscoError::Refinement(format!(
            "node field length ({}) != old node count ({})",
            values.len(),
            old.node_count()
        )));
    }

    Ok(new
        .nodes
        .iter()
        .map(|&x| {
            let c = old.locate(x);
            let [a, b] = old.cell_bounds(c);
            let s = ((x - a) / (b - a)).clamp(0.0, 1.0);
            (1.0 - s) * values[c] + s * values[c + 1]
        })
        .collect())
}
