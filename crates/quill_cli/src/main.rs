//! Quill CLI: inspect dependency graphs and verify dependency annotations.
//!
//! `quill dump` prints a persisted dependency graph, `quill diff` compares two
//! of them and lists the files an incremental build would recompile, and
//! `quill verify` checks `expected-*` annotations in sources against recorded
//! dependencies.

#![warn(missing_docs)]

mod diff;
mod dump;
mod pipeline;
mod verify;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Incremental dependency tooling.
#[derive(Parser, Debug)]
#[command(name = "quill", version, about = "Quill incremental dependency tools")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Control colored output.
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Path to a custom `quill.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the nodes and external dependencies of a graph file.
    Dump(DumpArgs),
    /// Compare two graph files and list the files to recompile.
    Diff(DiffArgs),
    /// Check `expected-*` annotations against recorded dependencies.
    Verify(VerifyArgs),
}

/// Arguments for `quill dump`.
#[derive(Parser, Debug)]
pub struct DumpArgs {
    /// The graph file.
    pub graph: PathBuf,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Arguments for `quill diff`.
#[derive(Parser, Debug)]
pub struct DiffArgs {
    /// The previous build's graph. A missing or unreadable file means
    /// everything is stale.
    pub old: PathBuf,

    /// The current build's graph.
    pub new: PathBuf,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Arguments for `quill verify`.
#[derive(Parser, Debug)]
pub struct VerifyArgs {
    /// JSON object mapping each source path to its recorded dependencies.
    #[arg(long)]
    pub uses: PathBuf,

    /// Rewrite sources with the suggested annotations.
    #[arg(long)]
    pub fix: bool,

    /// Sources to verify. Defaults to `[verify] files` from `quill.toml`.
    pub files: Vec<PathBuf>,
}

/// Controls whether colored output is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Detect from terminal capabilities.
    Auto,
    /// Always produce colored output.
    Always,
    /// Never produce colored output.
    Never,
}

/// Output format for reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Whether to use colored output.
    pub color: bool,
    /// Optional path to a custom config file.
    pub config: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    let color = match cli.color {
        ColorChoice::Auto => std::io::stderr().is_terminal(),
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    };

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        color,
        config: cli.config,
    };

    let config = match pipeline::resolve_config(&global) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };
    init_tracing(&global, config.log.filter.as_deref());

    let result = match cli.command {
        Command::Dump(ref args) => dump::run(args),
        Command::Diff(ref args) => diff::run(args, &config, &global),
        Command::Verify(ref args) => verify::run(args, &config, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// The log filter directive: `-v` wins, then `RUST_LOG`, then the config
/// file, then `warn` (`error` under `-q`).
fn log_directive(global: &GlobalArgs, env: Option<&str>, config_filter: Option<&str>) -> String {
    if global.verbose {
        return "debug".to_string();
    }
    if let Some(env) = env.filter(|e| !e.trim().is_empty()) {
        return env.to_string();
    }
    match config_filter {
        Some(filter) => filter.to_string(),
        None if global.quiet => "error".to_string(),
        None => "warn".to_string(),
    }
}

fn init_tracing(global: &GlobalArgs, config_filter: Option<&str>) {
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let directive = log_directive(global, env.as_deref(), config_filter);
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true).without_time())
        .with(filter)
        .try_init();
}
