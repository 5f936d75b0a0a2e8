// commands/build.rs

use std::fs;
use std::path::Path;
use std::process::ExitCode;

use crate::cli::ColorMode;

use super::common::run_front_end;

/// Run the front end and prepare the build directory for the backend.
pub fn build(root: &Path, color: ColorMode) -> ExitCode {
    let analyzer = match run_front_end(root, color) {
        Ok(analyzer) => analyzer,
        Err(()) => return ExitCode::FAILURE,
    };

    let build_dir = root.join("build");
    if let Err(e) = fs::create_dir_all(&build_dir) {
        eprintln!("error: could not create '{}': {}", build_dir.display(), e);
        return ExitCode::FAILURE;
    }

    tracing::info!(
        modules = analyzer.program.modules.len(),
        build_dir = %build_dir.display(),
        "checked program handed to the backend"
    );
    ExitCode::SUCCESS
}
