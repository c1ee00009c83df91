//! Integration scheme as a tagged variant.
//!
//! A refinement reinitializes whichever variant is active in place.
//! The family change is a replacement: a new `Multistep` value is built
//! from the problem data and the `SingleStep` value is dropped.

use serde::{Deserialize, Serialize};
use visco_types::ViscoResult;

use crate::engine::{Engine, IntegrationScheme};

/// Order/history discipline of time integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchemeFamily {
    /// Single-step explicit (e.g. forward Euler).
    SingleStep,
    /// Second-order multistep (e.g. BDF2).
    Multistep,
}

impl SchemeFamily {
    /// Stable name used in telemetry and snapshots.
    pub fn name(self) -> &'static str {
        match self {
            SchemeFamily::SingleStep => "single_step",
            SchemeFamily::Multistep => "multistep",
        }
    }
}

impl std::fmt::Display for SchemeFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The active integration scheme.
pub enum Scheme<E: Engine> {
    SingleStep(E::SingleStep),
    Multistep(E::Multistep),
}

impl<E: Engine> Scheme<E> {
    /// Builds a scheme of the given family against the problem data.
    pub fn build(family: SchemeFamily, problem: &E::Problem) -> ViscoResult<Self> {
        Ok(match family {
            SchemeFamily::SingleStep => {
                Scheme::SingleStep(<E::SingleStep as IntegrationScheme<E>>::new(problem)?)
            }
            SchemeFamily::Multistep => {
                Scheme::Multistep(<E::Multistep as IntegrationScheme<E>>::new(problem)?)
            }
        })
    }

    pub fn family(&self) -> SchemeFamily {
        match self {
            Scheme::SingleStep(_) => SchemeFamily::SingleStep,
            Scheme::Multistep(_) => SchemeFamily::Multistep,
        }
    }

    /// Reinitializes the active variant after a refinement.
    pub fn reinitialize(&mut self, problem: &E::Problem) -> ViscoResult<()> {
        match self {
            Scheme::SingleStep(s) => s.reinitialize(problem),
            Scheme::Multistep(m) => m.reinitialize(problem),
        }
    }
}
