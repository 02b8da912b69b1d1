//! Command-line interface definitions.
//!
//! - `Cli`, `Commands`: CLI argument definitions via clap
//! - `LoadEvent`: One recorded load event for `replay`

mod commands;
mod events;

pub use commands::{Cli, Commands, OutputFormat};
pub use events::{LoadEvent, read_events};
