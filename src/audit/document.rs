//! Document-level content checks, and the clean pass that rewrites documents
//! through the database save path.

use std::path::Path;

use crate::database::Database;
use crate::datalayer::Bridge;
use crate::error::{Result, TinaError};
use crate::schema::{Collection, TEMPLATE_KEY};

use super::validate::{FieldChecker, apply_defaults};
use super::{AuditTarget, Finding, FindingSink};

/// Audit every document of `target.collection`.
///
/// Each document is resubmitted through [`Database::submit_document`]; whether
/// that reaches disk depends on the bridge's write mode. In a mutating run the
/// findings describe the document as written, otherwise as stored. Returns
/// true if any document has an error.
///
/// # Errors
/// Returns an error on I/O or serialization failures. Content problems are
/// findings, never errors.
pub fn audit_documents<B: Bridge>(
    target: &AuditTarget<'_, B>,
    sink: &mut dyn FindingSink,
) -> Result<bool> {
    let collection = target.collection;
    let database = target.database;

    let documents = match database.documents(collection) {
        Ok(documents) => documents,
        Err(TinaError::InvalidPattern { pattern, .. }) => {
            // Already reported by the collection audit.
            tracing::debug!(collection = %collection.name, %pattern, "skipping documents");
            return Ok(false);
        }
        Err(e) => return Err(e),
    };
    tracing::info!(
        collection = %collection.name,
        documents = documents.len(),
        root = %target.root_path.display(),
        "auditing documents"
    );

    let checker = FieldChecker::new(target.validators, database);
    let pass = DocumentPass {
        collection,
        database,
        checker: &checker,
        use_default_values: target.use_default_values && database.bridge().mode().is_mutating(),
        mutating: database.bridge().mode().is_mutating(),
    };

    sink.begin_documents(collection.display_name(), documents.len());
    let mut error = false;
    for path in &documents {
        let result = pass.audit(path, sink);
        sink.document_done();
        error |= result?;
    }
    sink.end_documents();
    Ok(error)
}

struct DocumentPass<'a, B: Bridge> {
    collection: &'a Collection,
    database: &'a Database<B>,
    checker: &'a FieldChecker<'a>,
    use_default_values: bool,
    mutating: bool,
}

impl<B: Bridge> DocumentPass<'_, B> {
    fn audit(&self, path: &Path, sink: &mut dyn FindingSink) -> Result<bool> {
        let collection = self.collection;
        let error_at = |message: String| Finding::error(&collection.name, path, message);

        let document = match self.database.get_document(collection, path) {
            Ok(document) => document,
            Err(TinaError::DocumentParse { message, .. }) => {
                sink.record(error_at(format!("cannot be parsed: {message}")));
                return Ok(true);
            }
            Err(e) => return Err(e),
        };

        let mut error = false;
        let template = document.template();
        if collection.is_templated() {
            match template {
                None => {
                    sink.record(
                        error_at("document does not name a template".to_string())
                            .with_field(TEMPLATE_KEY),
                    );
                    error = true;
                }
                Some(name) if collection.template(name).is_none() => {
                    sink.record(
                        error_at(format!("unknown template '{name}'")).with_field(TEMPLATE_KEY),
                    );
                    error = true;
                }
                Some(_) => {}
            }
        }
        let fields = collection.field_set(template);

        let mut values = document.values.clone();
        if self.use_default_values
            && let Some(fields) = fields
        {
            let applied = apply_defaults(self.checker, fields, &mut values);
            if !applied.is_empty() {
                tracing::debug!(path = %path.display(), fields = ?applied, "applied default values");
            }
        }

        let outcome = self.database.submit_document(collection, &document, &values)?;
        if outcome.changed {
            tracing::debug!(path = %path.display(), mutating = self.mutating, "document differs from a save");
        }

        let Some(fields) = fields else {
            return Ok(error);
        };
        let checked = if self.mutating {
            &outcome.values
        } else {
            &document.values
        };
        for issue in self.checker.check_document(fields, checked) {
            sink.record(error_at(issue.message).with_field(issue.field));
            error = true;
        }
        Ok(error)
    }
}

#[cfg(test)]
#[path = "document_tests.rs"]
mod tests;
