// cli.rs

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Color output mode
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect based on terminal
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Marten programming language compiler
#[derive(Parser)]
#[command(name = "marten")]
#[command(version = "0.1.0")]
#[command(about = "Marten programming language", long_about = None)]
pub struct Cli {
    /// Color output: auto, always, never
    #[arg(long, global = true, value_enum, default_value_t = ColorMode::Auto)]
    pub color: ColorMode,

    /// Project root; sources are read from <root>/src
    #[arg(long, global = true, value_name = "DIR", default_value = ".")]
    pub root: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check the project for errors without producing output
    Check,
    /// Check the project and prepare the build directory for the backend
    Build,
}
