//! visco CLI: run, validate and inspect controller runs.

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod commands;

#[derive(Parser)]
#[command(name = "visco")]
#[command(version, about = "visco: adaptive time-integration controller for viscoelastic runs")]
struct Cli {
    /// Log at debug level and trace every controller event.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the reference shear engine from a setup file.
    Run {
        /// Path to the setup file (TOML or JSON).
        #[arg(short, long, default_value = "visco.toml")]
        config: String,
    },

    /// Validate a setup file or a bare parameter file.
    Validate {
        /// Path to the file.
        path: String,
    },

    /// Inspect a controller snapshot file.
    Inspect {
        /// Path to snapshot file.
        path: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Warning: failed to install log subscriber: {e}");
    }

    let result = match cli.command {
        Commands::Run { config } => commands::run(&config, cli.verbose),
        Commands::Validate { path } => commands::validate(&path),
        Commands::Inspect { path } => commands::inspect(&path),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
