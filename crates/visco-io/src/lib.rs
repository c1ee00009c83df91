//! # visco-io
//!
//! Simulation parameter contract, parameter validation, and the
//! snapshot naming convention downstream tooling depends on.
//!
//! Defines the boundary types that external systems (CLI, config files,
//! post-processing scripts) use to communicate with the controller.

pub mod contract;
pub mod labels;
pub mod validator;

pub use contract::SimulationParameters;
pub use validator::validate_parameters;
