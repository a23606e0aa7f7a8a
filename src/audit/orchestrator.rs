//! The audit run as an explicit stage pipeline:
//! telemetry, confirmation gate, flag check, audit, report.

use std::path::PathBuf;

use crate::database::Database;
use crate::datalayer::{Bridge, FilesystemBridge, WriteMode};
use crate::error::Result;
use crate::prompt::Confirm;
use crate::schema::FileSchemaLoader;
use crate::telemetry::{Telemetry, TelemetryEvent};

use super::pipeline::{Flow, Pipeline, Stage};
use super::validate::{ValidatorRegistry, builtin_validators};
use super::{
    AuditOptions, AuditReport, AuditTarget, Finding, FindingSink, audit_collection,
    audit_documents,
};

pub const CLEAN_TREE_ADVISORY: &str = "You are using the `--clean` option. This will modify \
    your content as if a user is submitting a form. Before running this you should have a \
    clean git tree so unwanted changes can be undone.";

pub const CONFIRM_PROMPT: &str = "Do you want to continue?";

pub const NOOP_DEFAULTS_WARNING: &str = "WARNING: using the `--useDefaultValues` without the \
    `--clean` flag has no effect. Please re-run audit and add the `--clean` flag";

/// Operator-facing side of an audit run.
pub trait AuditReporter: FindingSink {
    fn info(&mut self, message: &str);

    fn warn(&mut self, message: &str);

    /// Called exactly once, after the run completed or was aborted at the gate.
    fn finish(&mut self, report: &AuditReport);
}

/// Collaborators of a run that live outside the content root.
pub struct AuditEnv {
    pub root: PathBuf,
    pub schema_path: Option<PathBuf>,
    pub telemetry: Telemetry,
    pub confirm: Box<dyn Confirm>,
}

struct AuditContext<'r, R: AuditReporter> {
    root: PathBuf,
    schema_path: Option<PathBuf>,
    telemetry: Telemetry,
    reporter: &'r mut R,
    report: AuditReport,
}

/// Run a complete audit.
///
/// Declining the confirmation gate is not an error: the report comes back
/// with `aborted` set and a clean outcome.
///
/// The usage event is flushed before returning, whatever the outcome.
///
/// # Errors
/// Returns an error if the schema cannot be loaded or the content store
/// fails (I/O, serialization). Content problems are findings in the report.
pub fn run_audit<R: AuditReporter>(
    options: AuditOptions,
    env: AuditEnv,
    reporter: &mut R,
) -> Result<AuditReport> {
    let AuditEnv {
        root,
        schema_path,
        telemetry,
        confirm,
    } = env;

    let mut pipeline = Pipeline::new()
        .stage(TelemetryStage)
        .stage(ConfirmStage { confirm })
        .stage(FlagCheckStage)
        .stage(AuditStage {
            validators: builtin_validators()?,
        })
        .stage(ReportStage);

    let mut ctx = AuditContext {
        root,
        schema_path,
        telemetry,
        reporter,
        report: AuditReport {
            options,
            ..AuditReport::default()
        },
    };
    let stopped = pipeline.run(&mut ctx);
    ctx.telemetry.flush();
    if let Some(stage) = stopped? {
        tracing::info!(stage, "audit stopped early");
    }
    Ok(ctx.report)
}

struct TelemetryStage;

impl<R: AuditReporter> Stage<AuditContext<'_, R>> for TelemetryStage {
    fn name(&self) -> &'static str {
        "telemetry"
    }

    fn run(&mut self, ctx: &mut AuditContext<'_, R>) -> Result<Flow> {
        let options = ctx.report.options;
        ctx.telemetry.submit_record(TelemetryEvent::audit_invoked(
            options.clean,
            options.use_default_values,
        ));
        Ok(Flow::Continue)
    }
}

struct ConfirmStage {
    confirm: Box<dyn Confirm>,
}

impl<R: AuditReporter> Stage<AuditContext<'_, R>> for ConfirmStage {
    fn name(&self) -> &'static str {
        "confirm"
    }

    fn run(&mut self, ctx: &mut AuditContext<'_, R>) -> Result<Flow> {
        if !ctx.report.options.clean {
            return Ok(Flow::Continue);
        }
        ctx.reporter.info(CLEAN_TREE_ADVISORY);
        if self.confirm.confirm(CONFIRM_PROMPT)? {
            return Ok(Flow::Continue);
        }
        ctx.report.aborted = true;
        ctx.reporter.finish(&ctx.report);
        Ok(Flow::Stop)
    }
}

struct FlagCheckStage;

impl<R: AuditReporter> Stage<AuditContext<'_, R>> for FlagCheckStage {
    fn name(&self) -> &'static str {
        "flag-check"
    }

    fn run(&mut self, ctx: &mut AuditContext<'_, R>) -> Result<Flow> {
        let options = ctx.report.options;
        if options.use_default_values && !options.clean {
            ctx.reporter.warn(NOOP_DEFAULTS_WARNING);
        }
        Ok(Flow::Continue)
    }
}

struct AuditStage {
    validators: ValidatorRegistry,
}

impl<R: AuditReporter> Stage<AuditContext<'_, R>> for AuditStage {
    fn name(&self) -> &'static str {
        "audit"
    }

    fn run(&mut self, ctx: &mut AuditContext<'_, R>) -> Result<Flow> {
        let options = ctx.report.options;
        let bridge = FilesystemBridge::new(ctx.root.clone(), WriteMode::for_clean(options.clean));
        let loader = FileSchemaLoader::new().with_root(ctx.root.clone());
        let database = Database::create(bridge, &loader, ctx.schema_path.as_deref())?;
        let collections = database.get_schema().collections();

        let report = &mut ctx.report;
        let mut sink = Recording {
            findings: &mut report.findings,
            reporter: &mut *ctx.reporter,
        };
        for collection in collections {
            let target = AuditTarget {
                collection,
                database: &database,
                root_path: &ctx.root,
                use_default_values: options.use_default_values,
                validators: &self.validators,
            };
            let warning = audit_collection(&target, &mut sink);
            let error = audit_documents(&target, &mut sink)?;
            report.outcome = report.outcome.merge(warning, error);
            report.summary.documents += database.documents(collection).map_or(0, |d| d.len());
        }
        report.summary.collections = collections.len();
        report.summary.rewrites = database.bridge().written().len();
        tracing::info!(
            collections = report.summary.collections,
            documents = report.summary.documents,
            rewrites = report.summary.rewrites,
            warning = report.outcome.warning,
            error = report.outcome.error,
            "audit complete"
        );
        Ok(Flow::Continue)
    }
}

struct ReportStage;

impl<R: AuditReporter> Stage<AuditContext<'_, R>> for ReportStage {
    fn name(&self) -> &'static str {
        "report"
    }

    fn run(&mut self, ctx: &mut AuditContext<'_, R>) -> Result<Flow> {
        ctx.reporter.finish(&ctx.report);
        Ok(Flow::Continue)
    }
}

/// Keeps every finding for the report while forwarding it to the reporter.
struct Recording<'a, R: AuditReporter> {
    findings: &'a mut Vec<Finding>,
    reporter: &'a mut R,
}

impl<R: AuditReporter> FindingSink for Recording<'_, R> {
    fn record(&mut self, finding: Finding) {
        self.findings.push(finding.clone());
        self.reporter.record(finding);
    }

    fn begin_documents(&mut self, collection: &str, total: usize) {
        self.reporter.begin_documents(collection, total);
    }

    fn document_done(&mut self) {
        self.reporter.document_done();
    }

    fn end_documents(&mut self) {
        self.reporter.end_documents();
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
