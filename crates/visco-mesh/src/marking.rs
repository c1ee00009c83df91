//! Cell marking from a per-cell error indicator.

use visco_types::{ViscoError, ViscoResult};

use crate::refine::CellFlag;

/// Marks the `refine_fraction` share of cells with the largest indicator
/// for refinement and the `coarsen_fraction` share with the smallest for
/// coarsening. Counts round down; ties keep cell order.
pub fn mark_fixed_fraction(
    indicator: &[f64],
    refine_fraction: f64,
    coarsen_fraction: f64,
) -> ViscoResult<Vec<CellFlag>> {
    for (name, f) in [
        ("refine_fraction", refine_fraction),
        ("coarsen_fraction", coarsen_fraction),
    ] {
        if !(0.0..=1.0).contains(&f) {
            return Err(ViscoError::Refinement(format!(
                "{name} must lie in [0, 1], got {f}"
            )));
        }
    }
    if refine_fraction + coarsen_fraction > 1.0 {
        return Err(ViscoError::Refinement(format!(
            "refine_fraction + coarsen_fraction exceeds 1 ({refine_fraction} + {coarsen_fraction})"
        )));
    }
    if let Some(c) = indicator.iter().position(|v| !v.is_finite()) {
        return Err(ViscoError::Refinement(format!(
            "indicator is not finite on cell {c}: {}",
            indicator[c]
        )));
    }

    let n = indicator.len();
    let n_refine = (refine_fraction * n as f64).floor() as usize;
    let n_coarsen = (coarsen_fraction * n as f64).floor() as usize;

    // Largest first; the sort is stable so equal values keep cell order.
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| indicator[b].total_cmp(&indicator[a]));

    let mut flags = vec![CellFlag::Keep; n];
    for &c in &order[..n_refine] {
        flags[c] = CellFlag::Refine;
    }
    for &c in &order[n - n_coarsen..] {
        flags[c] = CellFlag::Coarsen;
    }
    Ok(flags)
}
