//! CLI command implementations.

use std::path::Path;

use visco_debug::snapshot::ControllerSnapshot;
use visco_io::{validate_parameters, SimulationParameters};
use visco_reference::{simulate, Observers, ReferenceSetup};
use visco_telemetry::sinks::TracingSink;
use visco_types::constants::CONTROLLER_SNAPSHOT_FILE;

/// Run the reference engine from a setup file.
pub fn run(config_path: &str, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    println!("visco Run");
    println!("─────────");
    println!("Config: {config_path}");
    println!();

    let setup = ReferenceSetup::load(Path::new(config_path))?;

    let mut observers = Observers::default();
    if verbose {
        observers
            .sinks
            .push(Box::new(TracingSink::new(tracing::Level::DEBUG)));
    }

    let outcome = simulate(&setup, observers)?;
    let summary = &outcome.summary;
    let params = &setup.simulation;

    println!("Macro steps:     {}", summary.macro_steps);
    println!("Sub-steps:       {}", summary.sub_steps);
    println!("Refinements:     {}", summary.refinements);
    println!("Bootstrap:       {}", summary.bootstrap_refinements);
    println!("Final cells:     {}", outcome.cells);
    println!(
        "Final time:      {:.6e} ({:.4} years)",
        summary.final_time,
        params.in_years(summary.final_time)
    );
    println!("Scheme:          {}", outcome.snapshot.scheme_family);
    println!("Outputs:         {}", summary.outputs.len());
    for label in &summary.outputs {
        println!("  {label}");
    }

    std::fs::create_dir_all(&params.data_dir)?;
    let snapshot_path = params.data_dir.join(CONTROLLER_SNAPSHOT_FILE);
    std::fs::write(&snapshot_path, outcome.snapshot.to_bytes()?)?;
    println!();
    println!("Snapshot written to: {}", snapshot_path.display());

    Ok(())
}

/// Validate a setup file, falling back to a bare parameter file.
pub fn validate(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    println!("visco Validator");
    println!("───────────────");
    println!();

    let file = Path::new(path);
    match ReferenceSetup::load(file) {
        Ok(setup) => {
            println!("Validating setup: {path}");
            setup.validate()?;
            println!(
                "Model:       {} base cells over length {}",
                setup.model.base_cells, setup.model.length
            );
        }
        Err(setup_err) => {
            let params = SimulationParameters::load(file).map_err(|params_err| {
                format!("not a setup ({setup_err}) nor a parameter file ({params_err})")
            })?;
            println!("Validating parameters: {path}");
            validate_parameters(&params)?;
        }
    }
    println!("✅ Config is valid.");
    Ok(())
}

/// Inspect a controller snapshot.
pub fn inspect(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    println!("visco Snapshot Inspector");
    println!("────────────────────────");
    println!();

    let data = std::fs::read(path)?;
    let snapshot = ControllerSnapshot::from_bytes(&data)
        .map_err(|e| format!("Failed to read snapshot: {e}"))?;

    println!("Step index:   {}", snapshot.step_index);
    println!("Sim time:     {:.6e}", snapshot.sim_time);
    println!("Sub-steps:    {}", snapshot.sub_timesteps);
    println!("Scheme:       {}", snapshot.scheme_family);
    println!("Generation:   {}", snapshot.generation);
    println!("Refinements:  {}", snapshot.refinements);

    Ok(())
}
