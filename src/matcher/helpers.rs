use regex::Regex;

use super::types::{Hook, Matcher, PrefixPattern};
use super::value::{RuleValue, wrap};
use crate::descriptor::{CallerFrame, ImportDescriptor};
use crate::error::Result;

pub fn exact(name: impl Into<String>) -> Matcher {
    Matcher::Exact(name.into())
}

/// Compile `pattern` into a prefix-anchored regex matcher.
pub fn matches(pattern: &str) -> Result<Matcher> {
    Ok(Matcher::Regex(PrefixPattern::new(pattern)?))
}

pub fn regex(pattern: Regex) -> Matcher {
    Matcher::Regex(pattern.into())
}

/// Deny `m` only when the checked frame loads eagerly.
pub fn top_level(m: impl Into<RuleValue>) -> Matcher {
    Matcher::All(vec![wrap(m), Matcher::TopLevel])
}

/// Deny `m` only when the rule's own component loads it directly.
pub fn explicit(m: impl Into<RuleValue>) -> Matcher {
    depth(0, m)
}

pub fn depth(max_depth: usize, m: impl Into<RuleValue>) -> Matcher {
    Matcher::All(vec![Matcher::Depth(max_depth), wrap(m)])
}

/// Deny wildcard loads of `m`.
pub fn star(m: impl Into<RuleValue>) -> Matcher {
    Matcher::All(vec![Matcher::StarImport, wrap(m)])
}

pub fn negate(m: impl Into<RuleValue>) -> Matcher {
    Matcher::Invert(Box::new(wrap(m)))
}

pub fn any_of<I, T>(members: I) -> Matcher
where
    I: IntoIterator<Item = T>,
    T: Into<RuleValue>,
{
    Matcher::Any(members.into_iter().map(wrap).collect())
}

pub fn all_of<I, T>(members: I) -> Matcher
where
    I: IntoIterator<Item = T>,
    T: Into<RuleValue>,
{
    Matcher::All(members.into_iter().map(wrap).collect())
}

pub fn hook<F>(name: impl Into<String>, predicate: F) -> Matcher
where
    F: Fn(&ImportDescriptor, &CallerFrame) -> bool + Send + Sync + 'static,
{
    Matcher::Hook(Hook::new(name, predicate))
}
