use std::path::{Path, PathBuf};

use crate::audit::{AuditEnv, AuditOptions, AuditReport, run_audit};
use crate::cli::{AuditArgs, Cli};
use crate::error::{Result, TinaError};
use crate::output::{ColorMode, ErrorOutput, JsonFormatter, OutputFormat, Reporter};
use crate::prompt::{AssumeYes, Confirm, StdinConfirm};
use crate::telemetry::Telemetry;
use crate::{EXIT_AUDIT_FAILED, EXIT_RUNTIME_ERROR, EXIT_SUCCESS};

#[must_use]
pub fn run_audit_command(args: &AuditArgs, cli: &Cli) -> i32 {
    match run_audit_impl(args, cli) {
        Ok(exit_code) => exit_code,
        Err(e) => {
            ErrorOutput::new(ColorMode::from(cli.color)).print_error(&e);
            EXIT_RUNTIME_ERROR
        }
    }
}

/// Run the audit described by `args` and print its report.
///
/// # Errors
/// Returns an error if the root or schema cannot be loaded, or the content
/// store fails.
pub fn run_audit_impl(args: &AuditArgs, cli: &Cli) -> Result<i32> {
    let options = AuditOptions {
        clean: args.clean,
        use_default_values: args.use_default_values,
    };
    let confirm: Box<dyn Confirm> = if args.yes {
        Box::new(AssumeYes)
    } else {
        Box::new(StdinConfirm)
    };
    let env = AuditEnv {
        root: resolve_root(args.root.as_deref())?,
        schema_path: args.schema.clone(),
        telemetry: Telemetry::from_env(args.no_telemetry),
        confirm,
    };

    let mut reporter = Reporter::new(ColorMode::from(cli.color), args.format, cli.quiet);
    let report = run_audit(options, env, &mut reporter)?;

    if args.format == OutputFormat::Json {
        println!("{}", JsonFormatter.format(&report)?);
    }
    Ok(exit_code(&report))
}

/// Errors fail the run; warnings and a declined confirmation do not.
#[must_use]
pub const fn exit_code(report: &AuditReport) -> i32 {
    if report.outcome.error {
        EXIT_AUDIT_FAILED
    } else {
        EXIT_SUCCESS
    }
}

fn resolve_root(root: Option<&Path>) -> Result<PathBuf> {
    let root = match root {
        Some(root) => root.to_path_buf(),
        None => std::env::current_dir()?,
    };
    dunce::canonicalize(&root).map_err(|source| TinaError::FileRead { path: root, source })
}

#[cfg(test)]
#[path = "audit_tests.rs"]
mod tests;
