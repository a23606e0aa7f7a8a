use std::path::PathBuf;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

/// A single reported problem.
///
/// `path` is the document path for document findings and the collection
/// directory for collection findings, both relative to the content root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub severity: Severity,
    pub collection: String,
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub message: String,
}

impl Finding {
    pub fn warning(
        collection: impl Into<String>,
        path: impl Into<PathBuf>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity: Severity::Warning,
            collection: collection.into(),
            path: path.into(),
            field: None,
            message: message.into(),
        }
    }

    pub fn error(
        collection: impl Into<String>,
        path: impl Into<PathBuf>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity: Severity::Error,
            collection: collection.into(),
            path: path.into(),
            field: None,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self.severity, Severity::Error)
    }
}

/// Receives findings and progress as the auditors produce them.
pub trait FindingSink {
    fn record(&mut self, finding: Finding);

    /// A collection's document pass is starting. `collection` is the
    /// collection's display name.
    fn begin_documents(&mut self, _collection: &str, _total: usize) {}

    /// One document has been fully processed.
    fn document_done(&mut self) {}

    fn end_documents(&mut self) {}
}

impl FindingSink for Vec<Finding> {
    fn record(&mut self, finding: Finding) {
        self.push(finding);
    }
}
