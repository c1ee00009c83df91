//! Time-integration coefficients.
//!
//! Both families update stress as
//!
//! ```text
//! σ* = h0 σⁿ + h1 σⁿ⁻¹ + rate · dt · (μ g(vⁿ) − μ η⁻¹ σⁿ)
//! ```
//!
//! | Family       | h0  | h1   | rate |
//! |--------------|-----|------|------|
//! | forward Euler| 1   | 0    | 1    |
//! | BDF2         | 4/3 | −1/3 | 2/3  |
//!
//! The per-cell relaxation `μ η⁻¹` depends on the mesh and is rebuilt
//! after every refinement.

use visco_solver::{IntegrationScheme, Scheme};
use visco_types::ViscoResult;

use crate::problem::ShearProblem;
use crate::ShearEngine;

/// Coefficients shared by both scheme families.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemeCoefficients {
    /// Weights of `σⁿ` and `σⁿ⁻¹`.
    pub history: [f64; 2],
    /// Multiplier of `dt` on the rate terms.
    pub rate: f64,
    /// `μ η⁻¹` per cell.
    pub relaxation: Vec<f64>,
}

impl SchemeCoefficients {
    fn build(history: [f64; 2], rate: f64, problem: &ShearProblem) -> Self {
        Self {
            history,
            rate,
            relaxation: relaxation(problem),
        }
    }
}

fn relaxation(problem: &ShearProblem) -> Vec<f64> {
    let mu = problem.shear_modulus();
    problem.inverse_viscosity().iter().map(|iv| mu * iv).collect()
}

/// First-order single-step scheme.
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardEuler {
    coefficients: SchemeCoefficients,
}

impl IntegrationScheme<ShearEngine> for ForwardEuler {
    fn new(problem: &ShearProblem) -> ViscoResult<Self> {
        Ok(Self {
            coefficients: SchemeCoefficients::build([1.0, 0.0], 1.0, problem),
        })
    }

    fn reinitialize(&mut self, problem: &ShearProblem) -> ViscoResult<()> {
        self.coefficients.relaxation = relaxation(problem);
        Ok(())
    }
}

/// Second-order backward differentiation.
#[derive(Debug, Clone, PartialEq)]
pub struct Bdf2 {
    coefficients: SchemeCoefficients,
}

impl IntegrationScheme<ShearEngine> for Bdf2 {
    fn new(problem: &ShearProblem) -> ViscoResult<Self> {
        Ok(Self {
            coefficients: SchemeCoefficients::build([4.0 / 3.0, -1.0 / 3.0], 2.0 / 3.0, problem),
        })
    }

    fn reinitialize(&mut self, problem: &ShearProblem) -> ViscoResult<()> {
        self.coefficients.relaxation = relaxation(problem);
        Ok(())
    }
}

/// Coefficients of whichever family is active.
pub fn coefficients(scheme: &Scheme<ShearEngine>) -> &SchemeCoefficients {
    match scheme {
        Scheme::SingleStep(s) => &s.coefficients,
        Scheme::Multistep(m) => &m.coefficients,
    }
}
