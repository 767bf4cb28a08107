//! `stl-fix info`: read-only inspection.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use serde::Serialize;
use stl_repair::{inspect_stl, StlReport};

use crate::output;
use crate::OutputFormat;

/// Inspection result for one file.
#[derive(Debug, Serialize)]
struct FileInfo {
    path: PathBuf,
    #[serde(flatten)]
    report: StlReport,
}

pub fn run(file: &Path, format: OutputFormat, quiet: bool) -> anyhow::Result<ExitCode> {
    let report =
        inspect_stl(file).with_context(|| format!("failed to inspect {}", file.display()))?;

    output::info(&format!("{}", file.display()), format, quiet);
    output::info(report.to_string().trim_end(), format, quiet);
    output::print(
        &FileInfo {
            path: file.to_path_buf(),
            report,
        },
        format,
        quiet,
    );

    Ok(ExitCode::SUCCESS)
}
