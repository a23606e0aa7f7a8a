use std::path::Path;

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::error::{Result, TinaError};
use crate::schema::Collection;

const DEFAULT_MATCH: &str = "**/*";

pub trait FileFilter {
    fn should_include(&self, path: &Path) -> bool;
}

/// Selects the files of a collection: paths relative to the collection
/// directory that match its include glob and carry the format's extension.
#[derive(Debug)]
pub struct CollectionFilter {
    extension: &'static str,
    include: GlobSet,
}

impl CollectionFilter {
    /// Build the filter for `collection`.
    ///
    /// # Errors
    /// Returns an error if the collection's `match` glob is invalid.
    pub fn new(collection: &Collection) -> Result<Self> {
        let extension = collection.format.extension();
        let pattern = collection
            .match_pattern
            .as_deref()
            .unwrap_or(DEFAULT_MATCH);
        let full_pattern = format!("{}.{extension}", pattern.trim_end_matches('/'));

        let glob = Glob::new(&full_pattern).map_err(|e| TinaError::InvalidPattern {
            pattern: pattern.to_string(),
            source: e,
        })?;
        let include = GlobSetBuilder::new()
            .add(glob)
            .build()
            .map_err(|e| TinaError::InvalidPattern {
                pattern: pattern.to_string(),
                source: e,
            })?;

        Ok(Self { extension, include })
    }

    fn has_valid_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == self.extension)
    }
}

impl FileFilter for CollectionFilter {
    fn should_include(&self, path: &Path) -> bool {
        self.has_valid_extension(path) && self.include.is_match(path)
    }
}

#[cfg(test)]
#[path = "filter_tests.rs"]
mod tests;
