//! `stl-fix repair`: patch zero normals in one or more files.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use serde::Serialize;
use stl_repair::{repair_stl_normals, RepairOptions, RepairReport, ValidationMode, WriteMode};
use tracing::debug;

use crate::output;
use crate::{OutputFormat, RepairArgs};

/// Result for one input file.
#[derive(Debug, Serialize)]
struct FileOutcome {
    path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<RepairReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Resolve repair options from an optional config file plus command-line flags.
pub fn build_options(args: &RepairArgs) -> anyhow::Result<RepairOptions> {
    let mut options = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            RepairOptions::from_toml(&text)
                .with_context(|| format!("failed to parse config {}", path.display()))?
        }
        None => RepairOptions::default(),
    };

    if let Some(unit) = args.unit {
        options.unit_scale = unit.into();
    }
    if args.no_print_correction {
        options.correct_for_printing = false;
    }
    if args.strict {
        options.validation = ValidationMode::Strict;
    }
    if args.atomic {
        options.write_mode = WriteMode::AtomicRename;
    }
    if args.parallel {
        options.parallel = true;
    }

    Ok(options)
}

pub fn run(args: &RepairArgs, format: OutputFormat, quiet: bool) -> anyhow::Result<ExitCode> {
    let options = build_options(args)?;
    debug!("Resolved options: {:?}", options);

    let mut outcomes = Vec::with_capacity(args.files.len());
    let mut failed = 0usize;

    for path in &args.files {
        match repair_stl_normals(path, &options) {
            Ok(report) => {
                let msg = format!("{}: {}", path.display(), report);
                if report.modified {
                    output::success(&msg, format, quiet);
                } else {
                    output::info(&msg, format, quiet);
                }
                outcomes.push(FileOutcome {
                    path: path.clone(),
                    report: Some(report),
                    error: None,
                });
            }
            Err(e) => {
                failed += 1;
                output::failure(&format!("{}: {}", path.display(), e));
                outcomes.push(FileOutcome {
                    path: path.clone(),
                    report: None,
                    error: Some(e.to_string()),
                });
            }
        }
    }

    output::print(&outcomes, format, quiet);

    Ok(if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
