use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use ctxslim_intent::BackendKind;

mod commands;
mod workflow;

#[derive(Parser)]
#[command(name = "ctxslim")]
#[command(about = "Minimal-context assistant for AI coding sessions", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings and errors
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Index the codebase (run again after big changes)
    Index {
        /// Project directory
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Smart change mode: classify a change, assemble minimal context
    Change {
        /// Project directory
        #[arg(default_value = ".")]
        path: PathBuf,

        /// What you want to change
        #[arg(short, long)]
        describe: String,

        /// AI backend: claude or gemini (default from CTXSLIM_BACKEND)
        #[arg(short, long)]
        backend: Option<String>,

        /// Write the rendered context package here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Manage the project memory file
    Memory {
        #[command(subcommand)]
        command: MemoryCommands,
    },

    /// Token savings dashboard across all recorded changes
    Savings {
        /// Project directory
        #[arg(default_value = ".")]
        path: PathBuf,
    },
}

#[derive(Subcommand)]
enum MemoryCommands {
    /// Print the memory record as pretty JSON
    Show {
        /// Project directory
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Clear all state and re-index the codebase
    Reset {
        /// Project directory
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Skip the confirmation check
        #[arg(long)]
        yes: bool,
    },
}

fn init_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        "warn"
    } else if verbose {
        "debug"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Index { path } => commands::index(&path),
        Commands::Change {
            path,
            describe,
            backend,
            out,
        } => {
            let kind = resolve_backend(backend.as_deref())?;
            workflow::run_change(&path, &describe, kind, out.as_deref()).await
        }
        Commands::Memory { command } => match command {
            MemoryCommands::Show { path } => commands::memory_show(&path),
            MemoryCommands::Reset { path, yes } => commands::memory_reset(&path, yes),
        },
        Commands::Savings { path } => commands::savings(&path),
    }
}

fn resolve_backend(flag: Option<&str>) -> Result<BackendKind> {
    let raw = match flag {
        Some(raw) => raw.to_string(),
        None => std::env::var("CTXSLIM_BACKEND").unwrap_or_else(|_| "claude".to_string()),
    };
    raw.parse::<BackendKind>().map_err(anyhow::Error::msg)
}
