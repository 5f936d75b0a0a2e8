// commands/check.rs

use std::path::Path;
use std::process::ExitCode;

use crate::cli::ColorMode;

use super::common::run_front_end;

/// Parse and type-check the project without producing any output.
pub fn check(root: &Path, color: ColorMode) -> ExitCode {
    match run_front_end(root, color) {
        Ok(_) => ExitCode::SUCCESS,
        Err(()) => ExitCode::FAILURE, // diagnostics already rendered
    }
}
