//! Strongly-typed counters for mesh versions and time levels.
//!
//! Newtype wrappers prevent accidental mixing of a mesh generation
//! with a macro step index.

use serde::{Deserialize, Serialize};

/// One mesh topology version. Starts at 0 and increments on every
/// executed refinement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MeshGeneration(pub u32);

/// 1-based index of a macro step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StepIndex(pub u64);

impl MeshGeneration {
    /// The generation that follows this one.
    #[inline]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl StepIndex {
    /// The first macro step.
    pub const FIRST: StepIndex = StepIndex(1);

    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }

    #[inline]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl Default for StepIndex {
    fn default() -> Self {
        Self::FIRST
    }
}

impl std::fmt::Display for MeshGeneration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "gen{}", self.0)
    }
}

impl std::fmt::Display for StepIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for MeshGeneration {
    fn from(val: u32) -> Self {
        Self(val)
    }
}

impl From<u64> for StepIndex {
    fn from(val: u64) -> Self {
        Self(val)
    }
}
