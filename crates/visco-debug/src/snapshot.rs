//! Controller snapshot serialization.
//!
//! A snapshot captures the controller's clock, scheme phase and mesh
//! generation. It does not capture field state; that lives in the
//! engine's own output.

use serde::{Deserialize, Serialize};
use visco_types::{ViscoError, ViscoResult};

/// Controller state at a point in a run.
///
/// Serialized with `bincode` for compact binary output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerSnapshot {
    /// Index of the next macro step to run.
    pub step_index: u64,
    /// Simulated time.
    pub sim_time: f64,
    /// Sub-steps per macro step in the current phase.
    pub sub_timesteps: u32,
    /// Active scheme family name.
    pub scheme_family: String,
    /// Current mesh generation.
    pub generation: u32,
    /// Refinement cycles performed so far (bootstrap included).
    pub refinements: u32,
}

impl ControllerSnapshot {
    /// Serializes to compact binary format.
    pub fn to_bytes(&self) -> ViscoResult<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| ViscoError::Serialization(format!("Snapshot serialization failed: {e}")))
    }

    /// Deserializes from binary format.
    pub fn from_bytes(data: &[u8]) -> ViscoResult<Self> {
        bincode::deserialize(data)
            .map_err(|e| ViscoError::Serialization(format!("Snapshot deserialization failed: {e}")))
    }
}
