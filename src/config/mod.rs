//! Configuration types and loading.
//!
//! - `GuardConfig`: TOML configuration with validation
//! - `parse_rules`: Dynamic rule values to matchers
//! - `HookRegistry`: Named predicates referenced by `hook = "..."` rules

mod rules;
mod settings;

pub use rules::{HookRegistry, parse_rule_value, parse_rules};
pub use settings::{GuardConfig, InterceptConfig};
