//! # visco-solver
//!
//! Time-integration control for coupled velocity/stress simulations of
//! viscoelastic flow on an adaptively refined mesh.
//!
//! The finite-element work itself (assembly, linear solves, mesh
//! mechanics) is delegated to an [`Engine`]. This crate owns the
//! sequencing: one predictor-corrector step, one refinement cycle, the
//! initial adaptive bootstrap, and the full run with sub-stepping and
//! the one-time scheme switch.
//!
//! ## Key Types
//!
//! - [`Engine`]: Bundles the collaborator types an engine provides
//! - [`Scheme`]: Tagged single-step / multistep integration scheme
//! - [`SchemePhase`]: `Bootstrapping → Stepping` state machine
//! - [`Controller`]: Owns the collaborators and sequences a run
//! - [`RunSummary`]: What a completed run did

pub mod controller;
pub mod engine;
pub mod phase;
pub mod schedule;
pub mod scheme;

pub use controller::{Controller, RunSummary};
pub use engine::{
    Engine, IntegrationScheme, ProblemData, SolutionFields, StressSolver, TimeFunction,
    VelocitySolver,
};
pub use phase::{SchemePhase, SchemeSwitch};
pub use scheme::{Scheme, SchemeFamily};
