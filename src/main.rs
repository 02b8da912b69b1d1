use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use import_guard::cli::{Cli, Commands, read_events};
use import_guard::config::{GuardConfig, HookRegistry};
use import_guard::descriptor::{ImportDescriptor, WILDCARD};
use import_guard::error::{GuardError, Result};
use import_guard::guard::Guard;
use import_guard::output::{CheckOutput, OutputWriter, RuleOutput};

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(2)
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("import_guard=debug")
    } else {
        EnvFilter::new("import_guard=info")
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = GuardConfig::load(&cli.config)?;
    let guard = config.build_guard(&HookRegistry::new())?;
    let writer = OutputWriter::new(cli.output);

    match cli.command {
        Commands::Check {
            caller,
            imported,
            lazy,
            star,
        } => Ok(cmd_check(&guard, &writer, caller, imported, lazy, star)),
        Commands::Replay { events } => cmd_replay(&config, &guard, &writer, &events),
        Commands::Rules { prefix } => Ok(cmd_rules(&guard, &writer, prefix.as_deref())),
    }
}

fn cmd_check(
    guard: &Guard,
    writer: &OutputWriter,
    caller: String,
    imported: String,
    lazy: bool,
    star: bool,
) -> ExitCode {
    let mut import = ImportDescriptor::new(imported.clone());
    if star {
        import = import.with_sub_names([WILDCARD]);
    }

    let allowed = guard.is_import_allowed(caller.as_str(), import, !lazy);
    writer.emit_check(&CheckOutput {
        caller,
        imported,
        lazy,
        allowed,
    });

    if allowed {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}

fn cmd_replay(
    config: &GuardConfig,
    guard: &Guard,
    writer: &OutputWriter,
    events: &Path,
) -> Result<ExitCode> {
    let events = read_events(events)?;
    config.enable(guard);

    let mut violations = Vec::new();
    for event in &events {
        let chain = event.caller_chain();
        match guard.intercept(&event.import, &chain, || Ok(())) {
            Ok(()) => {}
            Err(GuardError::ForbiddenImport(violation)) => {
                violations.push(violation);
                break;
            }
            Err(e) => return Err(e),
        }
    }
    guard.disable();

    let mut reported = guard.take_warnings();
    reported.append(&mut violations);
    writer.emit_violations(&reported);

    Ok(if reported.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

fn cmd_rules(guard: &Guard, writer: &OutputWriter, prefix: Option<&str>) -> ExitCode {
    let rules: Vec<RuleOutput> = guard
        .rules_under(prefix.unwrap_or_default())
        .into_iter()
        .map(|(path, rule)| RuleOutput { path, rule })
        .collect();
    writer.emit_rules(&rules);
    ExitCode::SUCCESS
}
