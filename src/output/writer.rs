use std::io::{self, Write};

use serde::Serialize;

use crate::cli::OutputFormat;
use crate::error::ForbiddenImport;

#[derive(Debug, Clone, Serialize)]
pub struct CheckOutput {
    pub caller: String,
    pub imported: String,
    pub lazy: bool,
    pub allowed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RuleOutput {
    pub path: String,
    pub rule: String,
}

#[derive(Serialize)]
struct ViolationOutput<'a> {
    imported: &'a str,
    caller: &'a str,
    caller_function: &'a str,
    depth: usize,
    message: String,
}

impl<'a> From<&'a ForbiddenImport> for ViolationOutput<'a> {
    fn from(v: &'a ForbiddenImport) -> Self {
        Self {
            imported: &v.imported,
            caller: &v.caller,
            caller_function: &v.caller_function,
            depth: v.depth,
            message: v.to_string(),
        }
    }
}

/// Writes command results in the selected format.
pub struct OutputWriter {
    format: OutputFormat,
}

impl OutputWriter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn emit_check(&self, result: &CheckOutput) {
        match self.format {
            OutputFormat::Text => {
                let verdict = if result.allowed { "allowed" } else { "denied" };
                println!(
                    "{}: {} -> {}{}",
                    verdict,
                    result.caller,
                    result.imported,
                    if result.lazy { " (lazy)" } else { "" }
                );
            }
            OutputFormat::Json => self.write_json(result),
        }
    }

    pub fn emit_violations(&self, violations: &[ForbiddenImport]) {
        match self.format {
            OutputFormat::Text => {
                if violations.is_empty() {
                    println!("No violations.");
                    return;
                }
                for violation in violations {
                    println!("{}", violation);
                }
                println!();
                println!("{} violation(s)", violations.len());
            }
            OutputFormat::Json => {
                let list: Vec<ViolationOutput<'_>> =
                    violations.iter().map(ViolationOutput::from).collect();
                self.write_json(&list);
            }
        }
    }

    pub fn emit_rules(&self, rules: &[RuleOutput]) {
        match self.format {
            OutputFormat::Text => {
                if rules.is_empty() {
                    println!("No rules.");
                }
                let width = rules.iter().map(|r| r.path.len()).max().unwrap_or(0);
                for rule in rules {
                    println!("{:width$}  {}", rule.path, rule.rule, width = width);
                }
            }
            OutputFormat::Json => self.write_json(&rules),
        }
    }

    fn write_json<T: Serialize>(&self, value: &T) {
        if let Ok(json) = serde_json::to_string(value) {
            let mut stdout = io::stdout().lock();
            let _ = writeln!(stdout, "{}", json);
            let _ = stdout.flush();
        }
    }
}
