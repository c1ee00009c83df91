//! JSON snapshots.
//!
//! Each snapshot is written to `<dir>/<label>json`; labels end in `.`
//! so the file becomes e.g. `solution_12.json`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use visco_solver::ProblemData;
use visco_types::{ViscoError, ViscoResult};

use crate::analytic::MaxwellShearProfile;
use crate::problem::ShearProblem;
use crate::solution::ShearSolution;

/// One written snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShearSnapshot {
    pub label: String,
    pub generation: u32,
    /// Node coordinates.
    pub nodes: Vec<f64>,
    pub velocity: Vec<f64>,
    pub reference_velocity: Vec<f64>,
    /// Cell stress, left to right.
    pub stress: Vec<f64>,
    /// Uniform stress of the reference solution.
    pub reference_stress: f64,
    /// Discrete L2 norm of `velocity − reference_velocity`.
    pub l2_error: f64,
}

/// Path of the snapshot with `label` under `dir`.
pub fn snapshot_path(dir: &Path, label: &str) -> PathBuf {
    dir.join(format!("{label}json"))
}

/// Trapezoidal L2 norm of a nodal field.
pub fn l2_norm(nodes: &[f64], values: &[f64]) -> f64 {
    nodes
        .windows(2)
        .zip(values.windows(2))
        .map(|(x, v)| 0.5 * (x[1] - x[0]) * (v[0] * v[0] + v[1] * v[1]))
        .sum::<f64>()
        .sqrt()
}

pub(crate) fn write_snapshot(
    problem: &ShearProblem,
    solution: &ShearSolution,
    dir: &Path,
    label: &str,
    reference: &MaxwellShearProfile,
) -> ViscoResult<()> {
    let mesh = problem.mesh();
    let origin = mesh.origin;
    let velocity = solution.velocity.current.clone();
    let reference_velocity: Vec<f64> = mesh
        .nodes
        .iter()
        .map(|&x| reference.velocity_at(x - origin))
        .collect();
    let error: Vec<f64> = velocity
        .iter()
        .zip(&reference_velocity)
        .map(|(v, r)| v - r)
        .collect();

    let snapshot = ShearSnapshot {
        label: label.to_string(),
        generation: problem.generation().0,
        nodes: mesh.nodes.clone(),
        l2_error: l2_norm(&mesh.nodes, &error),
        velocity,
        reference_velocity,
        stress: solution.stress.current.clone(),
        reference_stress: reference.stress(),
    };

    std::fs::create_dir_all(dir)?;
    let mut out = BufWriter::new(File::create(snapshot_path(dir, label))?);
    serde_json::to_writer_pretty(&mut out, &snapshot)
        .map_err(|e| ViscoError::Serialization(format!("snapshot '{label}': {e}")))?;
    out.flush()?;
    Ok(())
}

/// Reads a snapshot back.
pub fn read_snapshot(path: &Path) -> ViscoResult<ShearSnapshot> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content)
        .map_err(|e| ViscoError::Serialization(format!("snapshot '{}': {e}", path.display())))
}
