//! CLI result rendering.

mod writer;

pub use writer::{CheckOutput, OutputWriter, RuleOutput};
