use std::fmt;
use std::ops::{BitAnd, BitOr, Not};
use std::sync::Arc;

use regex::Regex;

use crate::descriptor::{CallerFrame, ImportDescriptor};
use crate::error::Result;

/// Signature of a user-supplied predicate.
pub type HookFn = dyn Fn(&ImportDescriptor, &CallerFrame) -> bool + Send + Sync;

/// Named user predicate.
#[derive(Clone)]
pub struct Hook {
    name: String,
    predicate: Arc<HookFn>,
}

impl Hook {
    pub fn new<F>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&ImportDescriptor, &CallerFrame) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            predicate: Arc::new(predicate),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, import: &ImportDescriptor, caller: &CallerFrame) -> bool {
        (self.predicate)(import, caller)
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hook").field("name", &self.name).finish()
    }
}

/// Regex tested against the start of a component path.
#[derive(Debug, Clone)]
pub struct PrefixPattern {
    source: Regex,
    /// `^(?:source)`, present when compiled from a pattern string.
    anchored: Option<Regex>,
}

impl PrefixPattern {
    pub fn new(pattern: &str) -> Result<Self> {
        Ok(Self {
            source: Regex::new(pattern)?,
            anchored: Some(Regex::new(&format!("^(?:{})", pattern))?),
        })
    }

    pub fn as_str(&self) -> &str {
        self.source.as_str()
    }

    pub fn is_prefix_match(&self, path: &str) -> bool {
        match &self.anchored {
            Some(anchored) => anchored.is_match(path),
            None => self.source.find(path).is_some_and(|m| m.start() == 0),
        }
    }
}

/// A caller-built regex keeps its own builder flags, so it is checked by
/// leftmost match rather than recompiled.
impl From<Regex> for PrefixPattern {
    fn from(source: Regex) -> Self {
        Self {
            source,
            anchored: None,
        }
    }
}

/// Pure predicate over an import and the frame it is checked against.
#[derive(Debug, Clone)]
pub enum Matcher {
    /// Component path equals the name.
    Exact(String),
    /// Regex matches at the start of the component path.
    Regex(PrefixPattern),
    /// Caller frame is not lazy.
    TopLevel,
    /// Caller frame depth is at most the bound.
    Depth(usize),
    /// Wildcard present among the requested sub-names.
    StarImport,
    Hook(Hook),
    Invert(Box<Matcher>),
    Any(Vec<Matcher>),
    All(Vec<Matcher>),
}

impl Matcher {
    pub fn matches(&self, import: &ImportDescriptor, caller: &CallerFrame) -> bool {
        match self {
            Self::Exact(name) => *name == import.component_path,
            Self::Regex(pattern) => pattern.is_prefix_match(&import.component_path),
            Self::TopLevel => !caller.is_lazy(),
            Self::Depth(max) => caller.depth <= *max,
            Self::StarImport => import.is_star_import(),
            Self::Hook(hook) => hook.call(import, caller),
            Self::Invert(inner) => !inner.matches(import, caller),
            Self::Any(members) => members.iter().any(|m| m.matches(import, caller)),
            Self::All(members) => members.iter().all(|m| m.matches(import, caller)),
        }
    }
}

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(name) => write!(f, "'{}'", name),
            Self::Regex(pattern) => write!(f, "re('{}')", pattern.as_str()),
            Self::TopLevel => f.write_str("TopLevel"),
            Self::Depth(max) => write!(f, "Depth({})", max),
            Self::StarImport => f.write_str("StarImport"),
            Self::Hook(hook) => write!(f, "hook({})", hook.name()),
            Self::Invert(inner) => write!(f, "(not {})", inner),
            Self::Any(members) => write_joined(f, members, " | "),
            Self::All(members) => write_joined(f, members, " & "),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, members: &[Matcher], sep: &str) -> fmt::Result {
    f.write_str("(")?;
    for (i, member) in members.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{}", member)?;
    }
    f.write_str(")")
}

impl Not for Matcher {
    type Output = Matcher;

    fn not(self) -> Matcher {
        Matcher::Invert(Box::new(self))
    }
}

impl BitOr for Matcher {
    type Output = Matcher;

    fn bitor(self, rhs: Matcher) -> Matcher {
        Matcher::Any(vec![self, rhs])
    }
}

impl BitAnd for Matcher {
    type Output = Matcher;

    fn bitand(self, rhs: Matcher) -> Matcher {
        Matcher::All(vec![self, rhs])
    }
}
