use regex::Regex;

use super::types::Matcher;

/// Convenience inputs accepted wherever a matcher is expected.
#[derive(Debug, Clone)]
pub enum RuleValue {
    /// Exact component name.
    Name(String),
    /// Implicit disjunction of the members.
    List(Vec<RuleValue>),
    /// Prefix-anchored regular expression.
    Pattern(Regex),
    Matcher(Matcher),
}

/// Normalize a rule value into a matcher.
pub fn wrap(value: impl Into<RuleValue>) -> Matcher {
    match value.into() {
        RuleValue::Name(name) => Matcher::Exact(name),
        RuleValue::List(members) => Matcher::Any(members.into_iter().map(wrap).collect()),
        RuleValue::Pattern(pattern) => Matcher::Regex(pattern.into()),
        RuleValue::Matcher(matcher) => matcher,
    }
}

impl From<&str> for RuleValue {
    fn from(value: &str) -> Self {
        Self::Name(value.to_string())
    }
}

impl From<String> for RuleValue {
    fn from(value: String) -> Self {
        Self::Name(value)
    }
}

impl From<&String> for RuleValue {
    fn from(value: &String) -> Self {
        Self::Name(value.clone())
    }
}

impl From<Regex> for RuleValue {
    fn from(value: Regex) -> Self {
        Self::Pattern(value)
    }
}

impl From<Matcher> for RuleValue {
    fn from(value: Matcher) -> Self {
        Self::Matcher(value)
    }
}

impl<T: Into<RuleValue>> From<Vec<T>> for RuleValue {
    fn from(value: Vec<T>) -> Self {
        Self::List(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<RuleValue>, const N: usize> From<[T; N]> for RuleValue {
    fn from(value: [T; N]) -> Self {
        Self::List(value.into_iter().map(Into::into).collect())
    }
}

impl From<&str> for Matcher {
    fn from(value: &str) -> Self {
        wrap(value)
    }
}

impl From<String> for Matcher {
    fn from(value: String) -> Self {
        wrap(value)
    }
}

impl From<Regex> for Matcher {
    fn from(value: Regex) -> Self {
        wrap(value)
    }
}

impl From<RuleValue> for Matcher {
    fn from(value: RuleValue) -> Self {
        wrap(value)
    }
}
