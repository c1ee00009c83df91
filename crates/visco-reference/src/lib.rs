//! # visco-reference
//!
//! A concrete engine for the visco controller: antiplane Maxwell shear
//! across a layer `y ∈ [0, L]`.
//!
//! ```text
//! ∂σ/∂t = μ ∂v/∂y − μ η⁻¹ σ      (Maxwell rheology, σ per cell)
//! ∂σ/∂y = 0                       (quasi-static equilibrium, v per node)
//! ```
//!
//! Velocity is prescribed at both ends by a [`ShearBoundary`]. Output is
//! measured against the continuum solution [`MaxwellShearProfile`]; for
//! a uniform viscosity the discrete velocity matches it exactly.

pub mod analytic;
pub mod linalg;
pub mod model;
pub mod output;
pub mod problem;
pub mod scheme;
pub mod setup;
pub mod solution;
pub mod stress;
pub mod velocity;

use visco_solver::Engine;

pub use analytic::{
    BoundaryConfig, DynProfile, InitialProfile, MaxwellShearProfile, Profile, ShearBoundary,
};
pub use model::{ModelConfig, RefinementConfig, ViscosityProfile};
pub use problem::ShearProblem;
pub use scheme::{Bdf2, ForwardEuler};
pub use setup::{simulate, Observers, ReferenceSetup, RunOutcome};
pub use solution::ShearSolution;
pub use stress::ShearStressSolver;
pub use velocity::ShearVelocitySolver;

/// The reference shear engine.
pub struct ShearEngine;

impl Engine for ShearEngine {
    type Coefficients = ModelConfig;
    type VelocityField = [f64];
    type InitialStress = DynProfile;
    type InitialVelocity = DynProfile;
    type Boundary = ShearBoundary;
    type Reference = MaxwellShearProfile;
    type Problem = ShearProblem;
    type Solution = ShearSolution;
    type SingleStep = ForwardEuler;
    type Multistep = Bdf2;
    type Velocity = ShearVelocitySolver;
    type Stress = ShearStressSolver;
}
