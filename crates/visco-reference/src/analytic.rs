//! Boundary data, reference solution and initial profiles.

use serde::{Deserialize, Serialize};
use visco_solver::TimeFunction;

use crate::model::{ModelConfig, ViscosityProfile};

/// A scalar profile across the layer, `y ↦ value`.
///
/// Any `Fn(f64) -> f64` is a profile, so tests can pass closures.
pub trait Profile {
    fn value(&self, y: f64) -> f64;
}

impl<F: Fn(f64) -> f64> Profile for F {
    fn value(&self, y: f64) -> f64 {
        self(y)
    }
}

/// Initial-condition type handed to the controller.
pub type DynProfile = dyn Profile + 'static;

/// Configurable initial profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InitialProfile {
    Constant { value: f64 },
    /// `intercept + slope * y`
    Linear { intercept: f64, slope: f64 },
}

impl InitialProfile {
    /// Average over `y ∈ [0, length]`.
    pub fn mean(&self, length: f64) -> f64 {
        match *self {
            InitialProfile::Constant { value } => value,
            InitialProfile::Linear { intercept, slope } => intercept + 0.5 * slope * length,
        }
    }
}

impl Profile for InitialProfile {
    fn value(&self, y: f64) -> f64 {
        match *self {
            InitialProfile::Constant { value } => value,
            InitialProfile::Linear { intercept, slope } => intercept + slope * y,
        }
    }
}

/// Prescribed boundary velocities.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundaryConfig {
    /// Velocity at `y = 0`.
    pub bottom: f64,
    /// Velocity at `y = length`.
    pub top: f64,
    /// Linear ramp-up duration. Zero applies full values from `t = 0`.
    #[serde(default)]
    pub ramp_time: f64,
}

/// Dirichlet velocity data at both ends of the layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShearBoundary {
    pub config: BoundaryConfig,
    time: f64,
}

impl ShearBoundary {
    pub fn new(config: BoundaryConfig) -> Self {
        Self { config, time: 0.0 }
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    /// `(bottom, top)` velocities at the current time.
    pub fn values(&self) -> (f64, f64) {
        let ramp = if self.config.ramp_time > 0.0 {
            (self.time / self.config.ramp_time).clamp(0.0, 1.0)
        } else {
            1.0
        };
        (ramp * self.config.bottom, ramp * self.config.top)
    }
}

impl TimeFunction for ShearBoundary {
    fn advance_to(&mut self, time: f64) {
        self.time = time;
    }
}

/// Quasi-static Maxwell shear of a layered column.
///
/// Equilibrium keeps the stress uniform across the layer, so it obeys
/// the scalar relaxation law
///
/// ```text
/// σ' = (μ / L) (ΔV(t) − Φ σ),   Φ = ∫₀^L η⁻¹ dy
/// v(y) = v_bottom + y σ' / μ + σ ∫₀^y η⁻¹
/// ```
///
/// which is integrated in closed form across the boundary ramp. The
/// result is exact for a uniform initial stress; a linear initial stress
/// enters through its layer average. For a uniform viscosity the
/// velocity is the straight line between the boundary values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaxwellShearProfile {
    length: f64,
    shear_modulus: f64,
    viscosity: ViscosityProfile,
    boundary: ShearBoundary,
    initial_stress: f64,
    stress: f64,
    stress_rate: f64,
}

impl MaxwellShearProfile {
    pub fn new(model: &ModelConfig, boundary: BoundaryConfig, initial: &InitialProfile) -> Self {
        let mut profile = Self {
            length: model.length,
            shear_modulus: model.shear_modulus,
            viscosity: model.viscosity,
            boundary: ShearBoundary::new(boundary),
            initial_stress: initial.mean(model.length),
            stress: 0.0,
            stress_rate: 0.0,
        };
        profile.advance_to(0.0);
        profile
    }

    /// Uniform stress at the current time.
    pub fn stress(&self) -> f64 {
        self.stress
    }

    pub fn velocity_at(&self, y: f64) -> f64 {
        let (bottom, _) = self.boundary.values();
        bottom
            + y * self.stress_rate / self.shear_modulus
            + self.stress * self.viscosity.integrated_inverse(y, self.length)
    }

    /// Relaxation rate `μ Φ / L` and full-ramp forcing `μ ΔV / L`.
    fn rates(&self) -> (f64, f64) {
        let scale = self.shear_modulus / self.length;
        let config = &self.boundary.config;
        (
            scale * self.viscosity.integrated_inverse(self.length, self.length),
            scale * (config.top - config.bottom),
        )
    }
}

/// `∫₀^τ e^{−k s} ds`
fn decay_integral(k: f64, tau: f64) -> f64 {
    let x = k * tau;
    if x.abs() < 1e-8 {
        tau * (1.0 - 0.5 * x)
    } else {
        -(-x).exp_m1() / k
    }
}

/// `∫₀^τ s e^{−k (τ − s)} ds`
fn ramp_integral(k: f64, tau: f64) -> f64 {
    let x = k * tau;
    if x.abs() < 1e-3 {
        tau * tau * (0.5 - x / 6.0 + x * x / 24.0 - x * x * x / 120.0)
    } else {
        (x + (-x).exp_m1()) / (k * k)
    }
}

impl TimeFunction for MaxwellShearProfile {
    fn advance_to(&mut self, time: f64) {
        self.boundary.advance_to(time);
        let t = time.max(0.0);
        let (k, forcing) = self.rates();
        let ramp_time = self.boundary.config.ramp_time;

        self.stress = if ramp_time > 0.0 {
            let ramped = t.min(ramp_time);
            let at_ramp_end = self.initial_stress * (-k * ramped).exp()
                + forcing / ramp_time * ramp_integral(k, ramped);
            let held = t - ramped;
            at_ramp_end * (-k * held).exp() + forcing * decay_integral(k, held)
        } else {
            self.initial_stress * (-k * t).exp() + forcing * decay_integral(k, t)
        };

        let (bottom, top) = self.boundary.values();
        self.stress_rate =
            self.shear_modulus / self.length * (top - bottom) - k * self.stress;
    }
}
