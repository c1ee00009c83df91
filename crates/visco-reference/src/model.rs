//! Material model and refinement settings for the shear layer.
//!
//! The layer spans `y ∈ [0, length]` with `y = 0` at the base. Viscosity
//! is either uniform or split into an upper and a lower layer; an
//! infinite upper viscosity gives an elastic lid.

use serde::{Deserialize, Serialize};
use visco_types::{ViscoError, ViscoResult};

/// Viscosity distribution across the layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViscosityProfile {
    Uniform { viscosity: f64 },
    /// `upper` applies within `depth` of the top surface, `lower` below.
    TwoLayer { depth: f64, upper: f64, lower: f64 },
}

impl ViscosityProfile {
    /// Inverse viscosity at height `y` in a layer of thickness `length`.
    pub fn inverse_at(&self, y: f64, length: f64) -> f64 {
        let viscosity = match *self {
            ViscosityProfile::Uniform { viscosity } => viscosity,
            ViscosityProfile::TwoLayer {
                depth,
                upper,
                lower,
            } => {
                if y > length - depth {
                    upper
                } else {
                    lower
                }
            }
        };
        viscosity.recip()
    }

    /// `∫₀^y η⁻¹ dy'` in a layer of thickness `length`, with `y` clamped
    /// to the layer.
    pub fn integrated_inverse(&self, y: f64, length: f64) -> f64 {
        let y = y.max(0.0).min(length);
        match *self {
            ViscosityProfile::Uniform { viscosity } => y / viscosity,
            ViscosityProfile::TwoLayer {
                depth,
                upper,
                lower,
            } => {
                let interface = length - depth.max(0.0).min(length);
                y.min(interface) / lower + (y - interface).max(0.0) / upper
            }
        }
    }
}

/// Fixed-fraction marking parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RefinementConfig {
    /// Share of cells with the largest velocity jump that are bisected.
    pub refine_fraction: f64,
    /// Share of cells with the smallest velocity jump that are merged.
    pub coarsen_fraction: f64,
    /// Deepest refinement level.
    pub max_level: u32,
}

impl Default for RefinementConfig {
    fn default() -> Self {
        Self {
            refine_fraction: 0.3,
            coarsen_fraction: 0.03,
            max_level: 6,
        }
    }
}

/// The coefficient field handed to the problem data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Layer thickness.
    pub length: f64,
    /// Level-0 cell count.
    pub base_cells: usize,
    /// Shear modulus μ.
    pub shear_modulus: f64,
    pub viscosity: ViscosityProfile,
    #[serde(default)]
    pub refinement: RefinementConfig,
}

impl ModelConfig {
    pub fn validate(&self) -> ViscoResult<()> {
        let mut errors = Vec::new();

        if !(self.length > 0.0 && self.length.is_finite()) {
            errors.push(format!("length must be positive, got {}", self.length));
        }
        if self.base_cells == 0 {
            errors.push("base_cells must be at least 1".to_string());
        }
        if !(self.shear_modulus > 0.0 && self.shear_modulus.is_finite()) {
            errors.push(format!(
                "shear_modulus must be positive, got {}",
                self.shear_modulus
            ));
        }
        match self.viscosity {
            ViscosityProfile::Uniform { viscosity } => {
                if !(viscosity > 0.0) {
                    errors.push(format!("viscosity must be positive, got {viscosity}"));
                }
            }
            ViscosityProfile::TwoLayer {
                depth,
                upper,
                lower,
            } => {
                if !(depth >= 0.0 && depth <= self.length) {
                    errors.push(format!("depth must lie in [0, length], got {depth}"));
                }
                if !(upper > 0.0 && lower > 0.0) {
                    errors.push(format!(
                        "layer viscosities must be positive, got {upper} / {lower}"
                    ));
                }
            }
        }

        let r = &self.refinement;
        if !(0.0..=1.0).contains(&r.refine_fraction)
            || !(0.0..=1.0).contains(&r.coarsen_fraction)
            || r.refine_fraction + r.coarsen_fraction > 1.0
        {
            errors.push(format!(
                "refinement fractions must lie in [0, 1] and sum to at most 1, got {} / {}",
                r.refine_fraction, r.coarsen_fraction
            ));
        }
        if r.max_level > visco_mesh::MAX_LEVEL {
            errors.push(format!(
                "max_level must be at most {}, got {}",
                visco_mesh::MAX_LEVEL,
                r.max_level
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ViscoError::InvalidConfig(errors.join("; ")))
        }
    }
}
