//! Parameter validation.
//!
//! Validates a parameter set before a run, catching values that would
//! make the controller loop forever or divide by zero. The controller
//! itself never calls this; callers opt in.

use visco_types::{ViscoError, ViscoResult};

use crate::contract::SimulationParameters;

/// Validates a complete parameter set.
///
/// Checks:
/// - `time_step` is finite and positive (otherwise `t` never reaches `t_max`)
/// - `t_max` is finite
/// - `first_substeps`, `output_interval`, `refine_interval` are at least 1
/// - `secs_in_a_year` is finite and positive
pub fn validate_parameters(params: &SimulationParameters) -> ViscoResult<()> {
    if !params.time_step.is_finite() || params.time_step <= 0.0 {
        return Err(ViscoError::InvalidConfig(format!(
            "time_step must be finite and positive, got {}",
            params.time_step
        )));
    }
    if !params.t_max.is_finite() {
        return Err(ViscoError::InvalidConfig("t_max must be finite".into()));
    }
    if params.first_substeps == 0 {
        return Err(ViscoError::InvalidConfig(
            "first_substeps must be >= 1".into(),
        ));
    }
    if params.output_interval == 0 {
        return Err(ViscoError::InvalidConfig(
            "output_interval must be >= 1".into(),
        ));
    }
    if params.refine_interval == 0 {
        return Err(ViscoError::InvalidConfig(
            "refine_interval must be >= 1".into(),
        ));
    }
    if !params.secs_in_a_year.is_finite() || params.secs_in_a_year <= 0.0 {
        return Err(ViscoError::InvalidConfig(
            "secs_in_a_year must be finite and positive".into(),
        ));
    }

    // The probe step divides by first_substeps; a sub-step below the
    // float resolution of t_max would stall the clock as well.
    let smallest = params.sub_step_size(params.first_substeps);
    if params.t_max > 0.0 && params.t_max + smallest == params.t_max {
        return Err(ViscoError::InvalidConfig(format!(
            "sub-step {smallest:e} does not advance t at t_max = {:e}",
            params.t_max
        )));
    }

    Ok(())
}
