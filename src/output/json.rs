use serde::Serialize;

use crate::audit::{AuditOutcome, AuditReport, AuditSummary, Finding, Severity};
use crate::error::Result;

pub struct JsonFormatter;

#[derive(Serialize)]
struct JsonOutput<'a> {
    status: &'static str,
    mode: &'static str,
    outcome: AuditOutcome,
    summary: Summary,
    findings: &'a [Finding],
}

#[derive(Serialize)]
struct Summary {
    collections: usize,
    documents: usize,
    warnings: usize,
    errors: usize,
    rewrites: usize,
}

impl JsonFormatter {
    /// Pretty-printed report with findings in the order they were produced.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn format(&self, report: &AuditReport) -> Result<String> {
        let AuditSummary {
            collections,
            documents,
            rewrites,
        } = report.summary;
        let errors = report.findings.iter().filter(|f| f.is_error()).count();

        let output = JsonOutput {
            status: status(report),
            mode: if report.options.clean { "clean" } else { "dry-run" },
            outcome: report.outcome,
            summary: Summary {
                collections,
                documents,
                warnings: report.findings.len() - errors,
                errors,
                rewrites,
            },
            findings: &report.findings,
        };
        Ok(serde_json::to_string_pretty(&output)?)
    }
}

fn status(report: &AuditReport) -> &'static str {
    if report.aborted {
        return "aborted";
    }
    match report.outcome.severity() {
        Some(Severity::Error) => "failed",
        Some(Severity::Warning) => "warning",
        None => "passed",
    }
}

#[cfg(test)]
#[path = "json_tests.rs"]
mod tests;
