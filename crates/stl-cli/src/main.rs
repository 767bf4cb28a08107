//! `stl-fix`: repair zero normals in binary STL files.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Unit option as spelled on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum UnitArg {
    Meter,
    Millimeter,
}

impl From<UnitArg> for stl_repair::UnitScale {
    fn from(unit: UnitArg) -> Self {
        match unit {
            UnitArg::Meter => stl_repair::UnitScale::Meter,
            UnitArg::Millimeter => stl_repair::UnitScale::Millimeter,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "stl-fix", version, about = "Repair zero normals in binary STL files")]
pub struct Cli {
    /// Output format.
    #[arg(long, value_enum, global = true, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Suppress normal output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Recompute zero normals and patch the files in place.
    Repair(RepairArgs),

    /// Report header and normal statistics without modifying the file.
    Info {
        /// STL file to inspect.
        file: PathBuf,
    },
}

#[derive(Debug, clap::Args)]
pub struct RepairArgs {
    /// STL files to repair.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Load repair options from a TOML file. Flags override it.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Coordinate unit of the mesh.
    #[arg(long, value_enum)]
    pub unit: Option<UnitArg>,

    /// Disable print-orientation correction.
    #[arg(long)]
    pub no_print_correction: bool,

    /// Reject files whose triangle count disagrees with their length.
    #[arg(long)]
    pub strict: bool,

    /// Write through a temporary file and rename it into place.
    #[arg(long)]
    pub atomic: bool,

    /// Scan records on all cores.
    #[arg(long)]
    pub parallel: bool,
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match &cli.command {
        Command::Repair(args) => commands::repair::run(args, cli.format, cli.quiet),
        Command::Info { file } => commands::info::run(file, cli.format, cli.quiet),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}
