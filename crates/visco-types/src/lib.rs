//! # visco-types
//!
//! Shared types, identifiers, error types, and constants for the visco
//! viscoelastic time-integration controller.
//!
//! This crate has zero domain logic. It defines the vocabulary
//! that all other visco crates share.

pub mod constants;
pub mod error;
pub mod ids;

pub use error::{ViscoError, ViscoResult};
pub use ids::{MeshGeneration, StepIndex};
