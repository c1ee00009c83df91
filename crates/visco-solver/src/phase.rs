//! Scheme phase state machine.
//!
//! ```text
//! Bootstrapping { sub_timesteps = first_substeps } ──(first macro step done)──▶ Stepping
//! ```
//!
//! There is exactly one transition. [`SchemePhase::complete_first_step`]
//! hands out a [`SchemeSwitch`] the one time it is taken; the controller
//! needs that token to replace the scheme, so the switch cannot happen
//! twice.

/// Which scheme regime the run is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemePhase {
    /// First macro step: single-step scheme, split into `sub_timesteps`.
    Bootstrapping { sub_timesteps: u32 },
    /// Every later macro step: multistep scheme, one sub-step.
    Stepping,
}

/// Proof that the one-time scheme switch is due.
#[derive(Debug)]
#[must_use = "the scheme switch must be applied"]
pub struct SchemeSwitch {
    _private: (),
}

impl SchemePhase {
    pub fn new(first_substeps: u32) -> Self {
        SchemePhase::Bootstrapping {
            sub_timesteps: first_substeps,
        }
    }

    /// Sub-steps per macro step in this phase.
    pub fn sub_timesteps(&self) -> u32 {
        match *self {
            SchemePhase::Bootstrapping { sub_timesteps } => sub_timesteps,
            SchemePhase::Stepping => 1,
        }
    }

    /// Marks a macro step complete. Returns the switch token only on the
    /// `Bootstrapping → Stepping` transition.
    pub fn complete_first_step(&mut self) -> Option<SchemeSwitch> {
        match self {
            SchemePhase::Bootstrapping { .. } => {
                *self = SchemePhase::Stepping;
                Some(SchemeSwitch { _private: () })
            }
            SchemePhase::Stepping => None,
        }
    }
}
