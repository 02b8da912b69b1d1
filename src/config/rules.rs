use std::collections::HashMap;

use toml::Value;

use crate::descriptor::{CallerFrame, ImportDescriptor};
use crate::error::{GuardError, Result};
use crate::matcher::{Hook, Matcher, PrefixPattern, depth, explicit, star, top_level};

/// Predicates a host makes available to configuration by name.
#[derive(Debug, Clone, Default)]
pub struct HookRegistry {
    hooks: HashMap<String, Hook>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, name: impl Into<String>, predicate: F)
    where
        F: Fn(&ImportDescriptor, &CallerFrame) -> bool + Send + Sync + 'static,
    {
        let name = name.into();
        self.hooks.insert(name.clone(), Hook::new(name, predicate));
    }

    pub fn get(&self, name: &str) -> Option<&Hook> {
        self.hooks.get(name)
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

/// Convert a `[rules]` table into `(path, matcher)` pairs.
pub fn parse_rules(table: &toml::Table, hooks: &HookRegistry) -> Result<Vec<(String, Matcher)>> {
    table
        .iter()
        .map(|(path, value)| Ok((path.clone(), parse_rule_value(path, value, hooks)?)))
        .collect()
}

/// Convert one dynamic rule value into a matcher.
///
/// `path` is only used in error messages.
pub fn parse_rule_value(path: &str, value: &Value, hooks: &HookRegistry) -> Result<Matcher> {
    match value {
        Value::String(name) => Ok(Matcher::Exact(name.clone())),
        Value::Array(members) => Ok(Matcher::Any(parse_members(path, members, hooks)?)),
        Value::Table(table) => {
            let mut entries = table.iter();
            let (Some((key, inner)), None) = (entries.next(), entries.next()) else {
                return Err(unsupported(
                    path,
                    format!("table with {} keys (expected exactly one)", table.len()),
                ));
            };
            parse_expression(path, key, inner, hooks)
        }
        other => Err(unsupported(path, other.type_str().to_string())),
    }
}

fn parse_expression(path: &str, key: &str, value: &Value, hooks: &HookRegistry) -> Result<Matcher> {
    let nested = |v: &Value| parse_rule_value(path, v, hooks);

    match key {
        "matches" | "regex" => {
            let pattern = expect_str(path, key, value)?;
            Ok(Matcher::Regex(PrefixPattern::new(pattern)?))
        }
        "not" => Ok(Matcher::Invert(Box::new(nested(value)?))),
        "any" => Ok(Matcher::Any(parse_members(path, expect_array(path, key, value)?, hooks)?)),
        "all" => Ok(Matcher::All(parse_members(path, expect_array(path, key, value)?, hooks)?)),
        "top_level" => Ok(top_level(nested(value)?)),
        "explicit" => Ok(explicit(nested(value)?)),
        "star" => Ok(star(nested(value)?)),
        "depth" => {
            let Value::Table(bounds) = value else {
                return Err(unsupported(path, format!("depth = {}", value.type_str())));
            };
            let max = bounds
                .get("max")
                .map(|v| expect_depth(path, v))
                .transpose()?
                .ok_or_else(|| unsupported(path, "depth without `max`".to_string()))?;
            let rule = bounds
                .get("rule")
                .ok_or_else(|| unsupported(path, "depth without `rule`".to_string()))?;
            Ok(depth(max, nested(rule)?))
        }
        "max_depth" => Ok(Matcher::Depth(expect_depth(path, value)?)),
        "flag" => match expect_str(path, key, value)? {
            "top_level" => Ok(Matcher::TopLevel),
            "star_import" => Ok(Matcher::StarImport),
            other => Err(unsupported(path, format!("flag `{}`", other))),
        },
        "hook" => {
            let name = expect_str(path, key, value)?;
            hooks
                .get(name)
                .cloned()
                .map(Matcher::Hook)
                .ok_or_else(|| GuardError::InvalidHookPredicate(name.to_string()))
        }
        other => Err(unsupported(path, format!("table key `{}`", other))),
    }
}

fn parse_members(path: &str, members: &[Value], hooks: &HookRegistry) -> Result<Vec<Matcher>> {
    members
        .iter()
        .map(|m| parse_rule_value(path, m, hooks))
        .collect()
}

fn expect_str<'a>(path: &str, key: &str, value: &'a Value) -> Result<&'a str> {
    value
        .as_str()
        .ok_or_else(|| unsupported(path, format!("{} = {}", key, value.type_str())))
}

fn expect_array<'a>(path: &str, key: &str, value: &'a Value) -> Result<&'a [Value]> {
    value
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| unsupported(path, format!("{} = {}", key, value.type_str())))
}

fn expect_depth(path: &str, value: &Value) -> Result<usize> {
    value
        .as_integer()
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| unsupported(path, format!("depth bound {}", value)))
}

fn unsupported(path: &str, found: String) -> GuardError {
    GuardError::UnsupportedRuleValue {
        path: path.to_string(),
        found,
    }
}
