//! Controller event types.
//!
//! Structured events emitted by the controller at each stage of a run.
//! Events are lightweight value types that carry just enough data to be
//! useful for monitoring and post-run auditing.

use serde::{Deserialize, Serialize};

/// A controller event.
///
/// Tagged with the macro step index active when it was emitted
/// (0 during the initial adaptive bootstrap).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationEvent {
    /// Macro step index (1-based; 0 before the first macro step).
    pub timestep: u64,
    /// Event payload.
    pub kind: EventKind,
}

/// Event payload variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventKind {
    /// A sub-step of a macro step started.
    SubstepBegin {
        /// Simulated time at the end of this sub-step.
        sim_time: f64,
        /// Sub-step size.
        time_step: f64,
    },

    /// A bootstrap probe step was taken.
    ProbeStep {
        /// Probe iteration (0-based).
        iteration: u32,
        /// Probe duration.
        time_step: f64,
    },

    /// A refinement cycle completed.
    Refinement {
        /// Mesh generation after the cycle.
        generation: u32,
    },

    /// The mesh was persisted.
    MeshPersisted {
        /// Target path as given to the problem data.
        path: String,
    },

    /// A solution snapshot was written.
    OutputWritten {
        /// Snapshot label.
        label: String,
    },

    /// The scheme family switched from single-step to multistep.
    SchemeSwitched {
        /// Name of the new family.
        family: String,
    },

    /// The initial adaptive bootstrap finished.
    BootstrapComplete {
        /// Number of refine cycles performed.
        refinements: u32,
    },

    /// A macro step completed.
    MacroStepEnd {
        /// Simulated time after the step.
        sim_time: f64,
        /// Number of sub-steps taken.
        sub_steps: u32,
        /// Wall-clock time for the macro step (seconds).
        wall_time: f64,
    },
}

impl SimulationEvent {
    /// Creates a new event for the given macro step.
    pub fn new(timestep: u64, kind: EventKind) -> Self {
        Self { timestep, kind }
    }
}
