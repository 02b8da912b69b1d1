use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "import-guard")]
#[command(
    author,
    version,
    about = "Dependency-boundary firewall for component loads",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(short, long, global = true, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Path to the guard configuration
    #[arg(
        short,
        long,
        global = true,
        env = "IMPORT_GUARD_CONFIG",
        default_value = "import-guard.toml"
    )]
    pub config: PathBuf,
}

/// Output format for CLI results.
#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check whether a caller may load a component
    Check {
        /// Component issuing the load
        caller: String,

        /// Component being loaded
        imported: String,

        /// Treat the load as deferred into a function body
        #[arg(long)]
        lazy: bool,

        /// Treat the load as a wildcard import
        #[arg(long)]
        star: bool,
    },

    /// Replay recorded load events (one JSON object per line)
    Replay {
        /// Events file
        events: PathBuf,
    },

    /// List declared rules
    Rules {
        /// Only rules at or below this component
        prefix: Option<String>,
    },
}
