//! Content audit: collection and document auditors, field validation and the
//! stage pipeline that drives them.

mod collection;
mod document;
mod finding;
mod orchestrator;
mod pipeline;
mod validate;

use std::path::Path;

use serde::Serialize;

pub use collection::audit_collection;
pub use document::audit_documents;
pub use finding::{Finding, FindingSink, Severity};
pub use orchestrator::{
    AuditEnv, AuditReporter, CLEAN_TREE_ADVISORY, CONFIRM_PROMPT, NOOP_DEFAULTS_WARNING, run_audit,
};
pub use pipeline::{Flow, Pipeline, Stage};
pub use validate::{
    FieldChecker, FieldIssue, FieldValidator, IssueKind, PatternCache, ValidationContext,
    ValidatorRegistry, apply_defaults, builtin_validators,
};

use crate::database::Database;
use crate::datalayer::Bridge;
use crate::schema::Collection;

/// Everything an auditor needs to look at one collection.
pub struct AuditTarget<'a, B: Bridge> {
    pub collection: &'a Collection,
    pub database: &'a Database<B>,
    pub root_path: &'a Path,
    pub use_default_values: bool,
    pub validators: &'a ValidatorRegistry,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuditOptions {
    pub clean: bool,
    pub use_default_values: bool,
}

/// Aggregated result of an audit run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AuditOutcome {
    pub warning: bool,
    pub error: bool,
}

impl AuditOutcome {
    #[must_use]
    pub const fn merge(self, warning: bool, error: bool) -> Self {
        Self {
            warning: self.warning || warning,
            error: self.error || error,
        }
    }

    /// Worst severity reached, if any.
    #[must_use]
    pub const fn severity(&self) -> Option<Severity> {
        if self.error {
            Some(Severity::Error)
        } else if self.warning {
            Some(Severity::Warning)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AuditSummary {
    pub collections: usize,
    pub documents: usize,
    /// Documents whose saved form differs from what is stored. Written to
    /// disk in clean mode, only recorded in a dry run.
    pub rewrites: usize,
}

/// Everything a finished (or aborted) run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditReport {
    pub options: AuditOptions,
    pub outcome: AuditOutcome,
    pub aborted: bool,
    pub summary: AuditSummary,
    pub findings: Vec<Finding>,
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
