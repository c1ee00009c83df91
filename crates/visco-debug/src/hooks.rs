//! Per-macro-step hooks.
//!
//! Hooks are injected into the controller and called once after every
//! completed macro step (never per sub-step). They are the seam for
//! caller-defined behavior such as convergence checks or diagnostics.

use visco_types::{MeshGeneration, StepIndex};

/// What the controller knows about a macro step that just completed.
#[derive(Debug, Clone, PartialEq)]
pub struct MacroStepReport {
    /// Index of the completed macro step.
    pub step_index: StepIndex,
    /// Simulated time after the step.
    pub sim_time: f64,
    /// Number of sub-steps the macro step was divided into.
    pub sub_steps: u32,
    /// Size of each sub-step.
    pub sub_step_size: f64,
    /// Mesh generation after the step (refinement may have occurred).
    pub generation: MeshGeneration,
    /// Whether the scheme family switched at the end of this step.
    pub switched_scheme: bool,
    /// Wall-clock time for the macro step (seconds).
    pub wall_time: f64,
}

/// Trait for caller-defined per-macro-step behavior.
///
/// # Lifecycle
///
/// ```text
/// for each macro step:
///   for each sub-step: (no hook calls)
///   hook.after_timestep(report)
/// hook.on_simulation_end()
/// ```
///
/// Every method except `name` has a no-op default.
pub trait TimestepHook {
    /// Called once after each completed macro step.
    fn after_timestep(&mut self, report: &MacroStepReport) {
        let _ = report;
    }

    /// Called once when `run` finishes.
    fn on_simulation_end(&mut self) {}

    /// Returns the hook's name for logging.
    fn name(&self) -> &str;
}

/// The default hook. Does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHook;

impl TimestepHook for NoopHook {
    fn name(&self) -> &str {
        "noop_hook"
    }
}
