//! Output formatting utilities for the CLI.

use serde::Serialize;

use crate::OutputFormat;

/// Print output in the specified format.
pub fn print<T: Serialize>(value: &T, format: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }

    match format {
        OutputFormat::Text => {
            // Text output is handled by the caller
        }
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string_pretty(value) {
                println!("{}", json);
            }
        }
    }
}

/// Print a success message.
pub fn success(msg: &str, format: OutputFormat, quiet: bool) {
    if quiet || format == OutputFormat::Json {
        return;
    }

    use colored::Colorize;
    println!("{} {}", "✓".green().bold(), msg);
}

/// Print an info message.
pub fn info(msg: &str, format: OutputFormat, quiet: bool) {
    if quiet || format == OutputFormat::Json {
        return;
    }

    println!("{}", msg);
}

/// Print a per-file failure. Shown even in quiet and JSON modes.
pub fn failure(msg: &str) {
    use colored::Colorize;
    eprintln!("{} {}", "✗".red().bold(), msg);
}

/// Print a fatal error.
pub fn error(msg: &str) {
    use colored::Colorize;
    eprintln!("{} {}", "error:".red().bold(), msg);
}
