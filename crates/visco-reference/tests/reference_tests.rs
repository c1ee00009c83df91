//! Integration tests for visco-reference.
//!
//! End-to-end runs write into a per-test `tempfile` directory.

use std::path::Path;

use tempfile::tempdir;
use visco_io::SimulationParameters;
use visco_reference::linalg::CholeskySolver;
use visco_reference::output::{l2_norm, read_snapshot};
use visco_reference::stress::strain_rate;
use visco_reference::{
    simulate, BoundaryConfig, InitialProfile, MaxwellShearProfile, ModelConfig, Observers,
    Profile, RefinementConfig, ReferenceSetup, ShearBoundary, ShearEngine, ViscosityProfile,
};
use visco_reference::setup::InitialConfig;
use visco_solver::{Controller, TimeFunction};
use visco_types::ViscoError;

// ─── Helpers ──────────────────────────────────────────────────

const MU: f64 = 2.0;
const VISCOSITY: f64 = 4.0;
const SIGMA0: f64 = 0.2;

/// Uniform layer of unit thickness sheared at unit velocity.
fn uniform_setup(dir: &Path) -> ReferenceSetup {
    ReferenceSetup {
        simulation: SimulationParameters {
            time_step: 0.125,
            t_max: 1.0,
            first_substeps: 2,
            initial_adaptive_refines: 0,
            output: false,
            output_interval: 1,
            refine_interval: 1000,
            secs_in_a_year: 1.0,
            data_dir: dir.to_path_buf(),
            load_mesh: false,
        },
        model: ModelConfig {
            length: 1.0,
            base_cells: 8,
            shear_modulus: MU,
            viscosity: ViscosityProfile::Uniform {
                viscosity: VISCOSITY,
            },
            refinement: RefinementConfig {
                refine_fraction: 0.25,
                coarsen_fraction: 0.1,
                max_level: 2,
            },
        },
        boundary: BoundaryConfig {
            bottom: 0.0,
            top: 1.0,
            ramp_time: 0.0,
        },
        initial: InitialConfig {
            stress: InitialProfile::Constant { value: SIGMA0 },
            velocity: InitialProfile::Linear {
                intercept: 0.0,
                slope: 1.0,
            },
        },
    }
}

/// Scalar Maxwell recursion the uniform layer must follow: forward Euler
/// over the split first macro step, then BDF2 seeded with the initial
/// stress.
fn expected_uniform_stress(params: &SimulationParameters, strain_rate: f64) -> f64 {
    let relax = MU / VISCOSITY;
    let forcing = |sigma: f64| MU * strain_rate - relax * sigma;

    let mut t = 0.0;
    let mut sigma = SIGMA0;
    let dt = params.time_step / f64::from(params.first_substeps);
    for _ in 0..params.first_substeps {
        t += dt;
        sigma += dt * forcing(sigma);
    }

    let mut previous = SIGMA0;
    let dt = params.time_step;
    while t < params.t_max {
        t += dt;
        let next = 4.0 / 3.0 * sigma - 1.0 / 3.0 * previous + 2.0 / 3.0 * dt * forcing(sigma);
        previous = sigma;
        sigma = next;
    }
    sigma
}

fn run_controller(setup: &ReferenceSetup) -> (Vec<f64>, Vec<f64>, Vec<f64>, u64) {
    let mut boundary = ShearBoundary::new(setup.boundary);
    let mut reference =
        MaxwellShearProfile::new(&setup.model, setup.boundary, &setup.initial.stress);
    let mut controller = Controller::<ShearEngine>::new(
        setup.simulation.clone(),
        setup.model.clone(),
        &mut boundary,
    )
    .unwrap();
    let summary = controller
        .run(&setup.initial.stress, &setup.initial.velocity, &mut reference)
        .unwrap();

    let solution = controller.solution();
    (
        controller.problem().mesh().nodes.clone(),
        solution.velocity.current.clone(),
        solution.stress.current.clone(),
        summary.macro_steps,
    )
}

// ─── Physics Tests ────────────────────────────────────────────

#[test]
fn uniform_layer_follows_maxwell_recursion() {
    let dir = tempdir().unwrap();
    let setup = uniform_setup(dir.path());

    let (nodes, velocity, stress, macro_steps) = run_controller(&setup);

    assert_eq!(macro_steps, 8);
    let expected = expected_uniform_stress(&setup.simulation, 1.0);
    for sigma in &stress {
        assert!((sigma - expected).abs() < 1e-10, "{sigma} vs {expected}");
    }
    for (y, v) in nodes.iter().zip(&velocity) {
        assert!((v - y).abs() < 1e-12, "v({y}) = {v}");
    }
}

#[test]
fn refinement_preserves_uniform_state() {
    let dir = tempdir().unwrap();
    let mut setup = uniform_setup(dir.path());
    setup.simulation.refine_interval = 1;

    let (nodes, velocity, stress, _) = run_controller(&setup);

    assert_ne!(nodes.len(), 9, "mesh should have been adapted");
    let expected = expected_uniform_stress(&setup.simulation, 1.0);
    for sigma in &stress {
        assert!((sigma - expected).abs() < 1e-10, "{sigma} vs {expected}");
    }
    for (y, v) in nodes.iter().zip(&velocity) {
        assert!((v - y).abs() < 1e-12);
    }
    assert!(dir.path().join("saved_mesh.msh").exists());
}

#[test]
fn elastic_lid_keeps_stress_in_equilibrium() {
    let dir = tempdir().unwrap();
    let mut setup = uniform_setup(dir.path());
    setup.model.viscosity = ViscosityProfile::TwoLayer {
        depth: 0.25,
        upper: f64::INFINITY,
        lower: 1.0,
    };
    setup.simulation.refine_interval = 2;

    let (_, velocity, stress, _) = run_controller(&setup);

    let max = stress.iter().cloned().fold(f64::MIN, f64::max);
    let min = stress.iter().cloned().fold(f64::MAX, f64::min);
    assert!(max - min < 1e-9 * max.abs().max(1.0), "stress spread {min}..{max}");
    assert_eq!(velocity.first(), Some(&0.0));
    assert_eq!(velocity.last(), Some(&1.0));
}

#[test]
fn two_layer_output_error_is_measured_against_layered_solution() {
    let dir = tempdir().unwrap();
    let mut setup = uniform_setup(dir.path());
    setup.model.viscosity = ViscosityProfile::TwoLayer {
        depth: 0.25,
        upper: f64::INFINITY,
        lower: 1.0,
    };
    setup.simulation.output = true;
    setup.simulation.output_interval = 8;

    simulate(&setup, Observers::default()).unwrap();

    let snapshot = read_snapshot(&dir.path().join("after_solution_8.json")).unwrap();
    let linear: Vec<f64> = snapshot
        .velocity
        .iter()
        .zip(&snapshot.nodes)
        .map(|(v, y)| v - y)
        .collect();
    assert!(snapshot.l2_error < 0.01, "l2 error {}", snapshot.l2_error);
    assert!(l2_norm(&snapshot.nodes, &linear) > 0.1);
    assert!((snapshot.reference_stress - 1.0805).abs() < 1e-3);
}

// ─── Driver Tests ─────────────────────────────────────────────

#[test]
fn outputs_are_written_as_json() {
    let dir = tempdir().unwrap();
    let mut setup = uniform_setup(dir.path());
    setup.simulation.t_max = 0.5;
    setup.simulation.output = true;
    setup.simulation.output_interval = 2;
    setup.simulation.initial_adaptive_refines = 2;

    let outcome = simulate(&setup, Observers::default()).unwrap();

    assert_eq!(
        outcome.summary.outputs,
        vec![
            "init_refinement_0.",
            "init_refinement_1.",
            "solution_2.",
            "after_solution_2.",
            "solution_4.",
            "after_solution_4.",
        ]
    );
    for label in &outcome.summary.outputs {
        assert!(dir.path().join(format!("{label}json")).exists(), "{label}");
    }

    let snapshot = read_snapshot(&dir.path().join("solution_4.json")).unwrap();
    assert_eq!(snapshot.label, "solution_4.");
    assert_eq!(snapshot.generation, 2);
    assert_eq!(snapshot.nodes.len(), snapshot.velocity.len());
    assert_eq!(snapshot.stress.len() + 1, snapshot.nodes.len());
    assert!(snapshot.l2_error < 1e-12);
}

#[test]
fn persisted_mesh_is_reloaded() {
    let dir = tempdir().unwrap();
    let mut setup = uniform_setup(dir.path());
    setup.simulation.initial_adaptive_refines = 2;

    let first = simulate(&setup, Observers::default()).unwrap();
    assert_eq!(first.summary.bootstrap_refinements, 2);
    assert!(dir.path().join("saved_mesh.msh").exists());

    setup.simulation.load_mesh = true;
    let second = simulate(&setup, Observers::default()).unwrap();
    assert_eq!(second.summary.bootstrap_refinements, 0);
    assert_eq!(second.cells, first.cells);
    assert_eq!(second.snapshot.generation, 0);
}

#[test]
fn missing_persisted_mesh_is_io_error() {
    let dir = tempdir().unwrap();
    let mut setup = uniform_setup(dir.path());
    setup.simulation.load_mesh = true;

    let err = simulate(&setup, Observers::default()).unwrap_err();
    assert!(matches!(err, ViscoError::Io(_)));
}

#[test]
fn simulate_validates_setup() {
    let dir = tempdir().unwrap();
    let mut setup = uniform_setup(dir.path());
    setup.model.base_cells = 0;
    assert!(matches!(
        simulate(&setup, Observers::default()),
        Err(ViscoError::InvalidConfig(_))
    ));

    let mut setup = uniform_setup(dir.path());
    setup.simulation.time_step = 0.0;
    assert!(matches!(
        simulate(&setup, Observers::default()),
        Err(ViscoError::InvalidConfig(_))
    ));
}

#[test]
fn snapshot_reports_multistep_after_run() {
    let dir = tempdir().unwrap();
    let setup = uniform_setup(dir.path());
    let outcome = simulate(&setup, Observers::default()).unwrap();
    assert_eq!(outcome.snapshot.scheme_family, "multistep");
    assert_eq!(outcome.snapshot.step_index, 9);
    assert_eq!(outcome.snapshot.sub_timesteps, 1);
}

// ─── Setup Tests ──────────────────────────────────────────────

const SETUP_TOML: &str = r#"
[simulation]
time_step = 0.5
t_max = 4.0
first_substeps = 4
initial_adaptive_refines = 1
output = false
output_interval = 1
refine_interval = 2
secs_in_a_year = 31557600.0
data_dir = "out"
load_mesh = false

[model]
length = 2.0
base_cells = 4
shear_modulus = 3.0
viscosity = { kind = "two_layer", depth = 0.5, upper = inf, lower = 10.0 }

[boundary]
bottom = 0.0
top = 1.0

[initial]
stress = { kind = "constant", value = 0.0 }
velocity = { kind = "linear", intercept = 0.0, slope = 0.5 }
"#;

#[test]
fn setup_parses_from_toml() {
    let setup = ReferenceSetup::from_toml_str(SETUP_TOML).unwrap();
    assert_eq!(setup.simulation.first_substeps, 4);
    assert_eq!(setup.model.base_cells, 4);
    match setup.model.viscosity {
        ViscosityProfile::TwoLayer { upper, lower, .. } => {
            assert!(upper.is_infinite());
            assert_eq!(lower, 10.0);
        }
        other => panic!("unexpected viscosity {other:?}"),
    }
    assert_eq!(setup.model.refinement, RefinementConfig::default());
    assert_eq!(setup.boundary.ramp_time, 0.0);
    assert!(setup.validate().is_ok());
}

#[test]
fn setup_rejects_missing_section() {
    let truncated = SETUP_TOML.split("[initial]").next().unwrap();
    assert!(matches!(
        ReferenceSetup::from_toml_str(truncated),
        Err(ViscoError::InvalidConfig(_))
    ));
}

#[test]
fn setup_json_matches_toml() {
    let setup = ReferenceSetup::from_toml_str(SETUP_TOML).unwrap();
    let mut json_setup = setup.clone();
    json_setup.model.viscosity = ViscosityProfile::Uniform { viscosity: 1.0 };
    let json = serde_json::to_string(&json_setup).unwrap();
    assert_eq!(ReferenceSetup::from_json_str(&json).unwrap(), json_setup);
}

// ─── Model Tests ──────────────────────────────────────────────

#[test]
fn two_layer_inverse_viscosity() {
    let profile = ViscosityProfile::TwoLayer {
        depth: 2.0,
        upper: f64::INFINITY,
        lower: 4.0,
    };
    assert_eq!(profile.inverse_at(9.0, 10.0), 0.0);
    assert_eq!(profile.inverse_at(1.0, 10.0), 0.25);
}

#[test]
fn model_validation_collects_problems() {
    let mut model = uniform_setup(Path::new(".")).model;
    model.length = -1.0;
    model.shear_modulus = 0.0;
    match model.validate() {
        Err(ViscoError::InvalidConfig(msg)) => {
            assert!(msg.contains("length"));
            assert!(msg.contains("shear_modulus"));
        }
        other => panic!("expected InvalidConfig, got {other:?}"),
    }
}

#[test]
fn boundary_ramps_linearly() {
    let mut boundary = ShearBoundary::new(BoundaryConfig {
        bottom: -2.0,
        top: 4.0,
        ramp_time: 2.0,
    });
    assert_eq!(boundary.values(), (0.0, 0.0));
    boundary.advance_to(1.0);
    assert_eq!(boundary.values(), (-1.0, 2.0));
    boundary.advance_to(5.0);
    assert_eq!(boundary.values(), (-2.0, 4.0));
}

#[test]
fn uniform_reference_is_linear() {
    let model = uniform_setup(Path::new(".")).model;
    let config = BoundaryConfig {
        bottom: 1.0,
        top: 3.0,
        ramp_time: 0.0,
    };
    let mut profile =
        MaxwellShearProfile::new(&model, config, &InitialProfile::Constant { value: 0.5 });
    profile.advance_to(0.7);
    for y in [0.0, 0.25, 0.5, 1.0] {
        assert!((profile.velocity_at(y) - (1.0 + 2.0 * y)).abs() < 1e-12, "v({y})");
    }
}

#[test]
fn reference_stress_relaxes_to_steady_state() {
    let model = uniform_setup(Path::new(".")).model;
    let config = BoundaryConfig {
        bottom: 0.0,
        top: 1.0,
        ramp_time: 0.0,
    };
    let mut profile =
        MaxwellShearProfile::new(&model, config, &InitialProfile::Constant { value: SIGMA0 });
    assert!((profile.stress() - SIGMA0).abs() < 1e-15);

    // k = μ/η = 0.5, steady stress η ΔV / L = 4.
    profile.advance_to(2.0);
    let expected = 4.0 + (SIGMA0 - 4.0) * (-1.0f64).exp();
    assert!((profile.stress() - expected).abs() < 1e-12);
    profile.advance_to(200.0);
    assert!((profile.stress() - 4.0).abs() < 1e-9);
}

#[test]
fn elastic_reference_loads_linearly_through_ramp() {
    let mut model = uniform_setup(Path::new(".")).model;
    model.viscosity = ViscosityProfile::Uniform {
        viscosity: f64::INFINITY,
    };
    let config = BoundaryConfig {
        bottom: 0.0,
        top: 1.0,
        ramp_time: 2.0,
    };
    let mut profile =
        MaxwellShearProfile::new(&model, config, &InitialProfile::Constant { value: 0.0 });

    // σ' = μ ΔV(t) / L with ΔV ramping over 2 time units.
    profile.advance_to(1.0);
    assert!((profile.stress() - MU * 0.25).abs() < 1e-12);
    profile.advance_to(3.0);
    assert!((profile.stress() - MU * 2.0).abs() < 1e-12);
}

#[test]
fn two_layer_reference_bends_at_interface() {
    let mut model = uniform_setup(Path::new(".")).model;
    model.viscosity = ViscosityProfile::TwoLayer {
        depth: 0.25,
        upper: f64::INFINITY,
        lower: 1.0,
    };
    let config = BoundaryConfig {
        bottom: 0.0,
        top: 1.0,
        ramp_time: 0.0,
    };
    let mut profile =
        MaxwellShearProfile::new(&model, config, &InitialProfile::Constant { value: SIGMA0 });
    profile.advance_to(1.0);

    // k = μ Φ / L = 1.5, forcing μ ΔV / L = 2.
    let k: f64 = 1.5;
    let sigma = SIGMA0 * (-k).exp() + 2.0 / k * (1.0 - (-k).exp());
    let rate = 2.0 - k * sigma;
    assert!((profile.stress() - sigma).abs() < 1e-12);
    assert!((profile.velocity_at(0.75) - (0.75 * rate / MU + 0.75 * sigma)).abs() < 1e-12);
    assert!((profile.velocity_at(1.0) - 1.0).abs() < 1e-12);
    assert!((profile.velocity_at(0.75) - 0.75).abs() > 0.1);
}

#[test]
fn closures_are_profiles() {
    let profile = |y: f64| 2.0 * y;
    assert_eq!(profile.value(1.5), 3.0);
    let linear = InitialProfile::Linear {
        intercept: 1.0,
        slope: -1.0,
    };
    assert_eq!(linear.value(3.0), -2.0);
}

// ─── Numerics Tests ───────────────────────────────────────────

#[test]
fn strain_rate_per_cell() {
    assert_eq!(strain_rate(&[0.5, 1.0], &[0.0, 1.0, 3.0]), vec![2.0, 2.0]);
}

#[test]
fn cholesky_solves_spd_system() {
    let mut solver = CholeskySolver::new();
    let triplets = [(0, 0, 2.0), (0, 1, -1.0), (1, 0, -1.0), (1, 1, 2.0)];
    solver.factorize(2, &triplets).unwrap();
    let x = solver.solve(&[1.0, 1.0]).unwrap();
    assert!((x[0] - 1.0).abs() < 1e-12);
    assert!((x[1] - 1.0).abs() < 1e-12);
}

#[test]
fn cholesky_empty_system() {
    let mut solver = CholeskySolver::new();
    solver.factorize(0, &[]).unwrap();
    assert_eq!(solver.solve(&[]).unwrap(), Vec::<f64>::new());
}

#[test]
fn cholesky_rejects_wrong_rhs_length() {
    let mut solver = CholeskySolver::new();
    solver.factorize(1, &[(0, 0, 1.0)]).unwrap();
    assert!(matches!(
        solver.solve(&[1.0, 2.0]),
        Err(ViscoError::SolverFailure(_))
    ));
}
