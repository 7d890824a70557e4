// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `querydag`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "querydag",
    version,
    about = "Validate and simulate sub-question DAG plans.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the numbered question list (one "<id>. <question>" per line).
    #[arg(long, value_name = "PATH")]
    pub questions: String,

    /// Path to the dependency list (one "<id>" or "<from> -> <to>" per line).
    #[arg(long, value_name = "PATH")]
    pub deps: String,

    /// Path to a scheduler config file (TOML). Defaults apply when omitted.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `QUERYDAG_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the plan, but don't execute anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
