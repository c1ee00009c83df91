//! Time-leveled velocity (per node) and stress (per cell).

use std::path::Path;

use visco_mesh::transfer::{transfer_cells, transfer_nodes};
use visco_solver::SolutionFields;
use visco_types::{ViscoError, ViscoResult};

use crate::analytic::{DynProfile, MaxwellShearProfile, Profile};
use crate::output;
use crate::problem::ShearProblem;
use crate::ShearEngine;

/// Three time levels of one field: `n+1` (current), `n`, `n−1`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeLevels {
    pub current: Vec<f64>,
    pub old: Vec<f64>,
    pub older: Vec<f64>,
}

impl TimeLevels {
    pub fn zeros(len: usize) -> Self {
        Self {
            current: vec![0.0; len],
            old: vec![0.0; len],
            older: vec![0.0; len],
        }
    }

    /// `older ← old`, `old ← current`. `current` is left as is.
    pub fn rotate(&mut self) {
        std::mem::swap(&mut self.older, &mut self.old);
        self.old.clone_from(&self.current);
    }

    fn try_map(&self, mut f: impl FnMut(&[f64]) -> ViscoResult<Vec<f64>>) -> ViscoResult<Self> {
        Ok(Self {
            current: f(&self.current)?,
            old: f(&self.old)?,
            older: f(&self.older)?,
        })
    }
}

/// Fields captured before a topology change.
struct Captured {
    velocity: TimeLevels,
    stress: TimeLevels,
}

pub struct ShearSolution {
    pub velocity: TimeLevels,
    pub stress: TimeLevels,
    captured: Option<Captured>,
}

impl ShearSolution {
    fn sample_nodes(problem: &ShearProblem, profile: &dyn Profile) -> Vec<f64> {
        let origin = problem.mesh().origin;
        problem
            .mesh()
            .nodes
            .iter()
            .map(|&x| profile.value(x - origin))
            .collect()
    }

    fn sample_cells(problem: &ShearProblem, profile: &dyn Profile) -> Vec<f64> {
        let origin = problem.mesh().origin;
        problem
            .mesh()
            .midpoints()
            .into_iter()
            .map(|y| profile.value(y - origin))
            .collect()
    }
}

impl SolutionFields<ShearEngine> for ShearSolution {
    fn new(problem: &ShearProblem) -> ViscoResult<Self> {
        let mesh = problem.mesh();
        Ok(Self {
            velocity: TimeLevels::zeros(mesh.node_count()),
            stress: TimeLevels::zeros(mesh.cell_count()),
            captured: None,
        })
    }

    fn current_velocity(&self) -> &[f64] {
        &self.velocity.current
    }

    fn begin_timestep(&mut self) {
        self.velocity.rotate();
        self.stress.rotate();
    }

    fn apply_initial_condition(
        &mut self,
        problem: &ShearProblem,
        stress: &DynProfile,
        velocity: &DynProfile,
    ) -> ViscoResult<()> {
        self.stress.current = Self::sample_cells(problem, stress);
        self.velocity.current = Self::sample_nodes(problem, velocity);
        Ok(())
    }

    fn init_multistep(
        &mut self,
        problem: &ShearProblem,
        stress: &DynProfile,
        velocity: &DynProfile,
    ) -> ViscoResult<()> {
        self.stress.old = Self::sample_cells(problem, stress);
        self.velocity.old = Self::sample_nodes(problem, velocity);
        Ok(())
    }

    fn begin_refine(&mut self, _problem: &ShearProblem) -> ViscoResult<()> {
        self.captured = Some(Captured {
            velocity: self.velocity.clone(),
            stress: self.stress.clone(),
        });
        Ok(())
    }

    fn reinitialize_after_refine(&mut self, problem: &ShearProblem) -> ViscoResult<()> {
        let mesh = problem.mesh();
        self.velocity = TimeLevels::zeros(mesh.node_count());
        self.stress = TimeLevels::zeros(mesh.cell_count());
        Ok(())
    }

    fn transfer_fields(&mut self, problem: &ShearProblem) -> ViscoResult<()> {
        let captured = self.captured.take().ok_or_else(|| {
            ViscoError::Refinement("transfer_fields called without captured fields".into())
        })?;
        let transition = problem.transition().ok_or_else(|| {
            ViscoError::Refinement("transfer_fields called before the mesh changed".into())
        })?;

        self.velocity = captured
            .velocity
            .try_map(|v| transfer_nodes(&transition.previous, problem.mesh(), v))?;
        self.stress = captured
            .stress
            .try_map(|s| transfer_cells(&transition.map, &transition.previous, s))?;
        Ok(())
    }

    fn write_output(
        &self,
        problem: &ShearProblem,
        dir: &Path,
        label: &str,
        reference: &MaxwellShearProfile,
    ) -> ViscoResult<()> {
        output::write_snapshot(problem, self, dir, label, reference)
    }
}
