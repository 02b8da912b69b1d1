use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::rules::{HookRegistry, parse_rules};
use crate::error::{GuardError, Result};
use crate::guard::{Guard, InterceptFilter};
use crate::host::ChainBuilder;
use crate::observer::TracingObserver;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// Abort violating loads instead of warning.
    pub strict: bool,
    /// Boundary file beyond which caller chains are not walked.
    pub entrypoint: Option<String>,
    /// Register the tracing observer.
    pub trace: bool,
    pub intercept: InterceptConfig,
    /// Deny rules keyed by dotted component path.
    pub rules: toml::Table,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InterceptConfig {
    /// Components never intercepted.
    pub skip: Vec<String>,
    /// Skip components whose name starts with `_`.
    pub skip_private: bool,
    /// Frame file prefixes dropped from caller chains.
    pub internal_frames: Vec<String>,
}

impl Default for InterceptConfig {
    fn default() -> Self {
        Self {
            skip: Vec::new(),
            skip_private: true,
            internal_frames: Vec::new(),
        }
    }
}

impl GuardConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        debug!(path = %path.display(), rules = config.rules.len(), "Loaded guard config");
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        for path in self.rules.keys() {
            if path.is_empty() || path.split('.').any(str::is_empty) {
                errors.push(format!("rule key `{}` is not a dotted component path", path));
            }
        }
        if self.intercept.internal_frames.iter().any(String::is_empty) {
            errors.push("intercept.internal_frames entries must not be empty".to_string());
        }
        if self.entrypoint.as_deref().is_some_and(str::is_empty) {
            errors.push("entrypoint must not be empty when set".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(GuardError::Config(errors.join("; ")))
        }
    }

    pub fn intercept_filter(&self) -> InterceptFilter {
        InterceptFilter::new()
            .with_skip(self.intercept.skip.iter().cloned())
            .with_skip_private(self.intercept.skip_private)
    }

    pub fn chain_builder(&self) -> ChainBuilder {
        ChainBuilder::new()
            .with_internal_prefixes(self.intercept.internal_frames.iter().cloned())
            .with_entrypoint(self.entrypoint.clone())
    }

    /// Build a guard with rules, filter and tracer installed.
    ///
    /// The guard is returned disabled; the host enables it once its
    /// interception point is in place.
    pub fn build_guard(&self, hooks: &HookRegistry) -> Result<Guard> {
        let rules = parse_rules(&self.rules, hooks)?;
        let guard = Guard::new();
        if self.trace {
            guard.register(Arc::new(TracingObserver::new()));
        }
        guard.set_deny_rules(rules);
        guard.set_filter(self.intercept_filter());
        Ok(guard)
    }

    pub fn enable(&self, guard: &Guard) {
        guard.enable(self.strict, self.entrypoint.clone());
    }
}
