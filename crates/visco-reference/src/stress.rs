//! Maxwell stress update around the velocity solve.
//!
//! ```text
//! predict:  σ* = h0 σⁿ + h1 σⁿ⁻¹ + rate·dt·(μ g(vⁿ) − μ η⁻¹ σⁿ)
//! correct:  σⁿ⁺¹ = σ* + rate·dt·μ (g(vⁿ⁺¹) − g(vⁿ))
//! ```
//!
//! `g` is the shear strain rate per cell, `(v_right − v_left) / h`.

use visco_solver::{Scheme, StressSolver};
use visco_types::{ViscoError, ViscoResult};

use crate::problem::ShearProblem;
use crate::scheme::coefficients;
use crate::solution::ShearSolution;
use crate::ShearEngine;

/// Strain rate per cell from a nodal velocity.
pub fn strain_rate(widths: &[f64], velocity: &[f64]) -> Vec<f64> {
    velocity
        .windows(2)
        .zip(widths)
        .map(|(v, h)| (v[1] - v[0]) / h)
        .collect()
}

pub struct ShearStressSolver {
    shear_modulus: f64,
    widths: Vec<f64>,
}

impl ShearStressSolver {
    fn check_sizes(&self, solution: &ShearSolution) -> ViscoResult<()> {
        let cells = self.widths.len();
        if solution.stress.current.len() != cells || solution.velocity.old.len() != cells + 1 {
            return Err(ViscoError::SolverFailure(format!(
                "stress solver built for {cells} cells, solution has {} stress / {} velocity values",
                solution.stress.current.len(),
                solution.velocity.old.len()
            )));
        }
        Ok(())
    }
}

impl StressSolver<ShearEngine> for ShearStressSolver {
    fn new(problem: &ShearProblem) -> ViscoResult<Self> {
        Ok(Self {
            shear_modulus: problem.shear_modulus(),
            widths: problem.mesh().widths(),
        })
    }

    fn predict(
        &mut self,
        solution: &mut ShearSolution,
        scheme: &Scheme<ShearEngine>,
        time_step: f64,
    ) -> ViscoResult<()> {
        self.check_sizes(solution)?;
        let c = coefficients(scheme);
        let [h0, h1] = c.history;
        let a = c.rate * time_step;
        let mu = self.shear_modulus;

        let g = strain_rate(&self.widths, &solution.velocity.old);
        let stress = &mut solution.stress;
        for (cell, sigma) in stress.current.iter_mut().enumerate() {
            let old = stress.old[cell];
            *sigma = h0 * old
                + h1 * stress.older[cell]
                + a * (mu * g[cell] - c.relaxation[cell] * old);
        }
        Ok(())
    }

    fn correct(
        &mut self,
        solution: &mut ShearSolution,
        scheme: &Scheme<ShearEngine>,
        time_step: f64,
    ) -> ViscoResult<()> {
        self.check_sizes(solution)?;
        let a = coefficients(scheme).rate * time_step * self.shear_modulus;

        let g_new = strain_rate(&self.widths, &solution.velocity.current);
        let g_old = strain_rate(&self.widths, &solution.velocity.old);
        for (cell, sigma) in solution.stress.current.iter_mut().enumerate() {
            *sigma += a * (g_new[cell] - g_old[cell]);
        }
        Ok(())
    }

    fn reinitialize(&mut self, problem: &ShearProblem) -> ViscoResult<()> {
        self.shear_modulus = problem.shear_modulus();
        self.widths = problem.mesh().widths();
        Ok(())
    }
}
