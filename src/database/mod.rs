//! Schema-aware access to the content store.
//!
//! The database resolves collections and their documents through a [`Bridge`],
//! and owns the write path every document save goes through.

mod submit;

pub use submit::{Submission, normalize, passthrough};

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::datalayer::{Bridge, CollectionFilter, FileFilter, ParsedContent, store};
use crate::error::Result;
use crate::schema::{Collection, DocumentFormat, Schema, SchemaLoader, TEMPLATE_KEY};

/// A document as stored, with its field values resolved against the schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Path relative to the content root.
    pub path: PathBuf,
    pub raw: String,
    /// Field values; the markdown body appears under the collection's body field.
    pub values: Map<String, Value>,
    pub body: Option<String>,
}

impl Document {
    /// Template named by the document's `_template` key.
    #[must_use]
    pub fn template(&self) -> Option<&str> {
        self.values.get(TEMPLATE_KEY).and_then(Value::as_str)
    }
}

/// Result of pushing a document through the save path.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitOutcome {
    /// Values as they were written (body field included).
    pub values: Map<String, Value>,
    /// Written content differs from what was read.
    pub changed: bool,
}

/// Reference lookups used by field validation.
pub trait ReferenceResolver {
    /// True if `reference` names a document of one of `collections`.
    fn resolves(&self, collections: &[String], reference: &str) -> bool;
}

/// Where a collection's documents live. Collections at the same location
/// list the same files, whatever their names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Location {
    path: String,
    format: DocumentFormat,
    match_pattern: Option<String>,
}

impl Location {
    fn of(collection: &Collection) -> Self {
        Self {
            path: collection.path.clone(),
            format: collection.format,
            match_pattern: collection.match_pattern.clone(),
        }
    }
}

pub struct Database<B: Bridge> {
    bridge: B,
    schema: Schema,
    listings: RefCell<HashMap<Location, Vec<PathBuf>>>,
}

impl<B: Bridge> Database<B> {
    #[must_use]
    pub fn new(bridge: B, schema: Schema) -> Self {
        Self {
            bridge,
            schema,
            listings: RefCell::new(HashMap::new()),
        }
    }

    /// Build a database over `bridge`, loading the schema with `loader`.
    ///
    /// # Errors
    /// Returns an error if the schema cannot be loaded.
    pub fn create(bridge: B, loader: &impl SchemaLoader, schema_path: Option<&Path>) -> Result<Self> {
        let schema = match schema_path {
            Some(path) => loader.load_from_path(path)?,
            None => loader.load()?,
        };
        Ok(Self::new(bridge, schema))
    }

    #[must_use]
    pub const fn get_schema(&self) -> &Schema {
        &self.schema
    }

    #[must_use]
    pub const fn bridge(&self) -> &B {
        &self.bridge
    }

    /// Documents of `collection`, relative to the root, in sorted order.
    ///
    /// # Errors
    /// Returns an error if the collection's match glob is invalid or the
    /// directory cannot be walked.
    pub fn documents(&self, collection: &Collection) -> Result<Vec<PathBuf>> {
        let location = Location::of(collection);
        if let Some(cached) = self.listings.borrow().get(&location) {
            return Ok(cached.clone());
        }

        let filter = CollectionFilter::new(collection)?;
        let dir = Path::new(&collection.path);
        let documents: Vec<PathBuf> = self
            .bridge
            .list(dir)?
            .into_iter()
            .filter(|path| {
                path.strip_prefix(dir)
                    .is_ok_and(|relative| filter.should_include(relative))
            })
            .collect();

        self.listings.borrow_mut().insert(location, documents.clone());
        Ok(documents)
    }

    /// Read and parse one document.
    ///
    /// # Errors
    /// Returns [`crate::TinaError::DocumentParse`] for unparsable content, or an
    /// I/O error if the file cannot be read.
    pub fn get_document(&self, collection: &Collection, path: &Path) -> Result<Document> {
        let raw = self.bridge.get(path)?;
        let ParsedContent { mut values, body } = store::parse(collection.format, path, &raw)?;

        let template = values.get(TEMPLATE_KEY).and_then(Value::as_str).map(str::to_string);
        if let Some(body_field) = collection
            .field_set(template.as_deref())
            .and_then(|fields| fields.iter().find(|f| f.is_body))
            && let Some(text) = body.as_deref().filter(|b| !b.trim().is_empty())
        {
            values.insert(body_field.name.clone(), Value::String(text.to_string()));
        }

        Ok(Document {
            path: path.to_path_buf(),
            raw,
            values,
            body,
        })
    }

    /// Save `values` for `document` through the same path a form save uses.
    ///
    /// The values are normalized against the document's field set and
    /// serialized in the collection's format. Content identical to what is on
    /// disk is not written.
    ///
    /// # Errors
    /// Returns an error if serialization or the bridge write fails.
    pub fn submit_document(
        &self,
        collection: &Collection,
        document: &Document,
        values: &Map<String, Value>,
    ) -> Result<SubmitOutcome> {
        let template = values.get(TEMPLATE_KEY).and_then(Value::as_str);
        let fields = collection.field_set(template);
        let submission = match fields {
            Some(fields) => normalize(fields, values, template, document.body.as_deref()),
            None => passthrough(values, document.body.as_deref()),
        };

        let content = ParsedContent {
            values: submission.values,
            body: submission.body,
        };
        let serialized =
            store::serialize(collection.format, &content, fields.unwrap_or_default())?;
        let changed = content_hash(&serialized) != content_hash(&document.raw);
        if changed {
            tracing::debug!(path = %document.path.display(), "rewriting document");
            self.bridge.put(&document.path, &serialized)?;
        }

        let mut written = content.values;
        if let Some(body_field) = fields
            .and_then(|fields| fields.iter().find(|f| f.is_body))
            && let Some(text) = content.body.filter(|b| !b.trim().is_empty())
        {
            written.insert(body_field.name.clone(), Value::String(text));
        }

        Ok(SubmitOutcome {
            values: written,
            changed,
        })
    }
}

impl<B: Bridge> ReferenceResolver for Database<B> {
    fn resolves(&self, collections: &[String], reference: &str) -> bool {
        let target = Path::new(reference);
        collections
            .iter()
            .filter_map(|name| self.schema.collection(name))
            .any(|collection| {
                self.documents(collection)
                    .is_ok_and(|docs| docs.iter().any(|doc| doc == target))
            })
    }
}

fn content_hash(content: &str) -> [u8; 32] {
    Sha256::digest(content.as_bytes()).into()
}

#[cfg(test)]
#[path = "database_tests.rs"]
mod tests;
