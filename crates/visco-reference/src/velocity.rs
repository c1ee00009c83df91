//! Velocity solve.
//!
//! Quasi-static equilibrium `∂σ/∂y = 0` asks for equal corrected stress
//! in the two cells around every interior node. With
//! `a = rate · dt · μ` and the corrected stress
//! `σ_c = σ*_c + a (g_c(v) − g_c(vⁿ))` this gives, at interior node `i`
//! between cells `i−1` and `i`:
//!
//! ```text
//! K v = −R / a,   R_i = a (g_i(vⁿ) − g_{i−1}(vⁿ)) − (σ*_i − σ*_{i−1})
//! K   = tridiag(−1/h_{i−1},  1/h_{i−1} + 1/h_i,  −1/h_i)
//! ```
//!
//! `K` depends only on the mesh, so it is factorized once per mesh
//! generation. Dirichlet values enter the first and last rows.

use visco_solver::{Scheme, VelocitySolver};
use visco_types::{ViscoError, ViscoResult};

use crate::analytic::ShearBoundary;
use crate::linalg::CholeskySolver;
use crate::problem::ShearProblem;
use crate::scheme::coefficients;
use crate::solution::ShearSolution;
use crate::stress::strain_rate;
use crate::ShearEngine;

pub struct ShearVelocitySolver {
    shear_modulus: f64,
    widths: Vec<f64>,
    /// `(bottom, top)` Dirichlet values.
    boundary: (f64, f64),
    stiffness: CholeskySolver,
}

impl ShearVelocitySolver {
    /// Triplets of the interior-node stiffness matrix.
    fn assemble(widths: &[f64]) -> (usize, Vec<(usize, usize, f64)>) {
        let dimension = widths.len().saturating_sub(1);
        let mut triplets = Vec::with_capacity(3 * dimension);
        for j in 0..dimension {
            let left = 1.0 / widths[j];
            let right = 1.0 / widths[j + 1];
            triplets.push((j, j, left + right));
            if j > 0 {
                triplets.push((j, j - 1, -left));
            }
            if j + 1 < dimension {
                triplets.push((j, j + 1, -right));
            }
        }
        (dimension, triplets)
    }

    fn rebuild(&mut self, problem: &ShearProblem) -> ViscoResult<()> {
        self.shear_modulus = problem.shear_modulus();
        self.widths = problem.mesh().widths();
        let (dimension, triplets) = Self::assemble(&self.widths);
        self.stiffness.factorize(dimension, &triplets)
    }
}

impl VelocitySolver<ShearEngine> for ShearVelocitySolver {
    fn new(
        problem: &ShearProblem,
        _solution: &ShearSolution,
        boundary: &ShearBoundary,
        _scheme: &Scheme<ShearEngine>,
    ) -> ViscoResult<Self> {
        let mut solver = Self {
            shear_modulus: 0.0,
            widths: Vec::new(),
            boundary: boundary.values(),
            stiffness: CholeskySolver::new(),
        };
        solver.rebuild(problem)?;
        Ok(solver)
    }

    fn solve(
        &mut self,
        solution: &mut ShearSolution,
        scheme: &Scheme<ShearEngine>,
        time_step: f64,
    ) -> ViscoResult<()> {
        let a = coefficients(scheme).rate * time_step * self.shear_modulus;
        if !(a > 0.0 && a.is_finite()) {
            return Err(ViscoError::SolverFailure(format!(
                "velocity system is singular for time step {time_step}"
            )));
        }
        let cells = self.widths.len();
        if solution.stress.current.len() != cells || solution.velocity.old.len() != cells + 1 {
            return Err(ViscoError::SolverFailure(format!(
                "velocity solver built for {cells} cells, solution does not match"
            )));
        }

        let g = strain_rate(&self.widths, &solution.velocity.old);
        let sigma = &solution.stress.current;
        let (bottom, top) = self.boundary;
        let mut rhs: Vec<f64> = (1..cells)
            .map(|i| {
                let r = a * (g[i] - g[i - 1]) - (sigma[i] - sigma[i - 1]);
                -r / a
            })
            .collect();
        if let Some(first) = rhs.first_mut() {
            *first += bottom / self.widths[0];
        }
        if let Some(last) = rhs.last_mut() {
            *last += top / self.widths[cells - 1];
        }

        let interior = self.stiffness.solve(&rhs)?;
        let velocity = &mut solution.velocity.current;
        velocity.clear();
        velocity.push(bottom);
        velocity.extend(interior);
        velocity.push(top);
        Ok(())
    }

    fn refresh_boundary(
        &mut self,
        boundary: &ShearBoundary,
        _scheme: &Scheme<ShearEngine>,
    ) -> ViscoResult<()> {
        self.boundary = boundary.values();
        Ok(())
    }

    fn reinitialize(
        &mut self,
        problem: &ShearProblem,
        _solution: &ShearSolution,
        boundary: &ShearBoundary,
        _scheme: &Scheme<ShearEngine>,
    ) -> ViscoResult<()> {
        self.boundary = boundary.values();
        self.rebuild(problem)
    }
}
