//! Complete run description and a one-call driver.
//!
//! ```toml
//! [simulation]
//! time_step = 1.0
//! t_max = 10.0
//! # ... every SimulationParameters key
//!
//! [model]
//! length = 1.0
//! base_cells = 8
//! shear_modulus = 1.0
//! viscosity = { kind = "uniform", viscosity = 10.0 }
//!
//! [boundary]
//! bottom = 0.0
//! top = 1.0
//!
//! [initial]
//! stress = { kind = "constant", value = 0.0 }
//! velocity = { kind = "linear", intercept = 0.0, slope = 1.0 }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;
use visco_debug::hooks::TimestepHook;
use visco_debug::snapshot::ControllerSnapshot;
use visco_io::{validate_parameters, SimulationParameters};
use visco_solver::{Controller, RunSummary};
use visco_telemetry::sinks::EventSink;
use visco_types::{ViscoError, ViscoResult};

use crate::analytic::{BoundaryConfig, InitialProfile, MaxwellShearProfile, ShearBoundary};
use crate::model::ModelConfig;
use crate::ShearEngine;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InitialConfig {
    pub stress: InitialProfile,
    pub velocity: InitialProfile,
}

/// Everything needed to run the reference engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceSetup {
    pub simulation: SimulationParameters,
    pub model: ModelConfig,
    pub boundary: BoundaryConfig,
    pub initial: InitialConfig,
}

impl ReferenceSetup {
    pub fn from_toml_str(content: &str) -> ViscoResult<Self> {
        toml::from_str(content).map_err(|e| ViscoError::InvalidConfig(format!("TOML setup: {e}")))
    }

    pub fn from_json_str(content: &str) -> ViscoResult<Self> {
        serde_json::from_str(content)
            .map_err(|e| ViscoError::InvalidConfig(format!("JSON setup: {e}")))
    }

    /// Loads a setup from a `.toml` or `.json` file.
    pub fn load(path: &Path) -> ViscoResult<Self> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_str(&content),
            Some("json") => Self::from_json_str(&content),
            _ => Err(ViscoError::InvalidConfig(format!(
                "Unsupported setup file '{}': expected .toml or .json",
                path.display()
            ))),
        }
    }

    /// Validates run parameters and the material model.
    pub fn validate(&self) -> ViscoResult<()> {
        validate_parameters(&self.simulation)?;
        self.model.validate()
    }
}

/// Optional observers attached to the controller for one run.
#[derive(Default)]
pub struct Observers {
    pub hook: Option<Box<dyn TimestepHook>>,
    pub sinks: Vec<Box<dyn EventSink>>,
}

/// What [`simulate`] returns.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub summary: RunSummary,
    pub snapshot: ControllerSnapshot,
    /// Active cells at the end of the run.
    pub cells: usize,
}

/// Validates `setup`, builds a controller over [`ShearEngine`] and runs it.
pub fn simulate(setup: &ReferenceSetup, observers: Observers) -> ViscoResult<RunOutcome> {
    setup.validate()?;

    let mut boundary = ShearBoundary::new(setup.boundary);
    let mut reference =
        MaxwellShearProfile::new(&setup.model, setup.boundary, &setup.initial.stress);

    let mut controller =
        Controller::<ShearEngine>::new(setup.simulation.clone(), setup.model.clone(), &mut boundary)?;
    if let Some(hook) = observers.hook {
        controller = controller.with_hook(hook);
    }
    for sink in observers.sinks {
        controller.telemetry_mut().add_sink(sink);
    }

    let summary = controller.run(&setup.initial.stress, &setup.initial.velocity, &mut reference)?;
    let cells = controller.problem().mesh().cell_count();
    info!(
        macro_steps = summary.macro_steps,
        refinements = summary.refinements,
        cells,
        "reference run complete"
    );

    Ok(RunOutcome {
        snapshot: controller.snapshot(),
        summary,
        cells,
    })
}
