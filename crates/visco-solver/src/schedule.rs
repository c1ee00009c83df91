//! Interval checks for output and refinement cadence.

use visco_types::{StepIndex, ViscoError, ViscoResult};

/// `step_index % interval == 0`, with a zero interval reported as a
/// configuration error naming `key`.
pub fn is_due(step_index: StepIndex, interval: u64, key: &str) -> ViscoResult<bool> {
    step_index
        .get()
        .checked_rem(interval)
        .map(|rem| rem == 0)
        .ok_or_else(|| ViscoError::InvalidConfig(format!("{key} must be non-zero")))
}
