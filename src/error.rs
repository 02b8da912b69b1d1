use std::fmt;

use thiserror::Error;

use crate::descriptor::Location;

/// A load that violates a declared deny rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForbiddenImport {
    pub imported: String,
    pub caller: String,
    pub caller_function: String,
    pub depth: usize,
    pub chain: Vec<Location>,
}

impl fmt::Display for ForbiddenImport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let chain = self
            .chain
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" -> ");
        write!(
            f,
            "Importing `{}` from `{}` is not allowed [{}] ({})",
            self.imported, self.caller, self.depth, chain
        )
    }
}

#[derive(Error, Debug)]
pub enum GuardError {
    #[error("{0}")]
    ForbiddenImport(ForbiddenImport),

    #[error("Unsupported rule value for `{path}`: {found}")]
    UnsupportedRuleValue { path: String, found: String },

    #[error("Invalid hook predicate: `{0}` is not a registered hook")]
    InvalidHookPredicate(String),

    #[error("Invalid rule pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("Relative import `{name}` at level {level} goes beyond top-level package `{package}`")]
    RelativeImportBeyondTopLevel {
        name: String,
        package: String,
        level: u32,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GuardError {
    pub fn is_forbidden_import(&self) -> bool {
        matches!(self, Self::ForbiddenImport(_))
    }

    /// The violation carried by a strict-mode failure.
    pub fn as_forbidden_import(&self) -> Option<&ForbiddenImport> {
        match self {
            Self::ForbiddenImport(violation) => Some(violation),
            _ => None,
        }
    }
}

impl From<ForbiddenImport> for GuardError {
    fn from(violation: ForbiddenImport) -> Self {
        Self::ForbiddenImport(violation)
    }
}

pub type Result<T> = std::result::Result<T, GuardError>;
