//! Simulation parameter contract.
//!
//! These types define the configuration boundary of the controller.
//! They are serializable for CLI configuration and scripting.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use visco_types::{ViscoError, ViscoResult};

/// Immutable configuration for one run.
///
/// Every key is required. A missing key or a value of the wrong shape
/// is reported as [`ViscoError::InvalidConfig`] at load time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationParameters {
    /// Macro time step size.
    pub time_step: f64,
    /// Simulation horizon. Stepping continues while `t < t_max`.
    pub t_max: f64,
    /// Sub-step count used only for the very first macro step.
    pub first_substeps: u32,
    /// Number of probe-step + refine cycles before the real run.
    pub initial_adaptive_refines: u32,
    /// Whether snapshots are written at all.
    pub output: bool,
    /// Snapshot cadence in macro steps.
    pub output_interval: u64,
    /// Refinement cadence in macro steps.
    pub refine_interval: u64,
    /// Unit conversion used only for reporting simulated time.
    pub secs_in_a_year: f64,
    /// Directory for snapshots and the persisted mesh.
    pub data_dir: PathBuf,
    /// Skip the initial adaptive bootstrap and load a persisted mesh.
    pub load_mesh: bool,
}

impl SimulationParameters {
    /// Parses parameters from a TOML document.
    pub fn from_toml_str(content: &str) -> ViscoResult<Self> {
        toml::from_str(content)
            .map_err(|e| ViscoError::InvalidConfig(format!("TOML parameters: {e}")))
    }

    /// Parses parameters from a JSON document.
    pub fn from_json_str(content: &str) -> ViscoResult<Self> {
        serde_json::from_str(content)
            .map_err(|e| ViscoError::InvalidConfig(format!("JSON parameters: {e}")))
    }

    /// Loads parameters from a `.toml` or `.json` file.
    pub fn load(path: &Path) -> ViscoResult<Self> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_str(&content),
            Some("json") => Self::from_json_str(&content),
            _ => Err(ViscoError::InvalidConfig(format!(
                "Unsupported parameter file '{}': expected .toml or .json",
                path.display()
            ))),
        }
    }

    /// Sub-step size for a macro step divided into `sub_timesteps` parts.
    #[inline]
    pub fn sub_step_size(&self, sub_timesteps: u32) -> f64 {
        self.time_step / f64::from(sub_timesteps)
    }

    /// Simulated time expressed in years, for reporting.
    #[inline]
    pub fn in_years(&self, t: f64) -> f64 {
        t / self.secs_in_a_year
    }
}
