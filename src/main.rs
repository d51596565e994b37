//! stepgen CLI - Command-line interface
//!
//! Commands:
//!   generate - Write step builders for descriptors
//!   check    - Validate descriptors without writing anything
//!   schema   - Print the descriptor JSON schema

use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use stepgen::{Build, Error, GeneratorConfig, Result, Unit};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "stepgen",
    version,
    about = "Step builder generator for Java classes",
    long_about = "Generates type-guided fluent builders and updaters from class descriptors.\n\n\
                  Every goal becomes a chain of single-method interfaces, so arguments\n\
                  are supplied one at a time and in order."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log verbosity (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate builders for one or more descriptors
    Generate {
        /// Descriptor files (.yaml, .yml or .json)
        #[arg(required = true)]
        descriptors: Vec<PathBuf>,

        /// Output root; files are placed in package directories below it
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Configuration file (default: ./stepgen.yaml if present)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Analyse descriptors and report problems without writing files
    Check {
        #[arg(required = true)]
        descriptors: Vec<PathBuf>,

        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print the JSON schema of the descriptor format
    Schema,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Generate {
            descriptors,
            output,
            config,
        } => cmd_generate(&descriptors, &output, config.as_deref()),
        Commands::Check {
            descriptors,
            config,
        } => cmd_check(&descriptors, config.as_deref()),
        Commands::Schema => cmd_schema(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::from(1)
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("stepgen={}", level)));
    // a subscriber may already be installed when embedded
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn load_config(path: Option<&Path>) -> Result<GeneratorConfig> {
    match path {
        Some(path) => GeneratorConfig::load(path),
        None => GeneratorConfig::discover(Path::new(".")),
    }
}

fn load_unit(path: &Path) -> Result<Unit> {
    Unit::from_file(path).map_err(|e| at(path, e))
}

/// Prefix an error with the descriptor it came from
fn at(path: &Path, e: Error) -> Error {
    Error::Other(format!("{}: {}", path.display(), e))
}

fn cmd_generate(descriptors: &[PathBuf], output: &Path, config: Option<&Path>) -> Result<()> {
    let mut build = Build::new(load_config(config)?);
    // render everything first so a failing descriptor leaves no partial output
    let mut files = Vec::new();
    for path in descriptors {
        let unit = load_unit(path)?;
        files.push(build.render(&unit).map_err(|e| at(path, e))?);
    }

    for file in files {
        let target = output.join(&file.path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, &file.contents)?;
        tracing::info!(path = %target.display(), "wrote");
        println!("{}", target.display());
    }
    Ok(())
}

fn cmd_check(descriptors: &[PathBuf], config: Option<&Path>) -> Result<()> {
    let build = Build::new(load_config(config)?);
    for path in descriptors {
        let unit = load_unit(path)?;
        let analysis = build.check(&unit).map_err(|e| at(path, e))?;
        println!(
            "ok {} -> {} ({} goals)",
            analysis.source.qualified(),
            analysis.generated.qualified(),
            analysis.goals.len()
        );
    }
    Ok(())
}

fn cmd_schema() -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&stepgen::schema())?);
    Ok(())
}
