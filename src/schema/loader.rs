use std::path::{Path, PathBuf};

use crate::error::{Result, TinaError};

use super::filesystem::{FileSystem, RealFileSystem};
use super::model::{DEFAULT_SCHEMA_PATH, Schema};

/// Trait for loading the content schema.
pub trait SchemaLoader {
    /// Load the schema from the default location under the content root.
    ///
    /// # Errors
    /// Returns an error if the schema file is missing, unreadable or malformed.
    fn load(&self) -> Result<Schema>;

    /// Load the schema from a specific path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    fn load_from_path(&self, path: &Path) -> Result<Schema>;
}

/// Loads `.tina/schema.toml` from the filesystem.
///
/// Relative paths are resolved against the content root, which defaults to the
/// current working directory.
#[derive(Debug)]
pub struct FileSchemaLoader<F: FileSystem = RealFileSystem> {
    fs: F,
    root: Option<PathBuf>,
}

impl Default for FileSchemaLoader<RealFileSystem> {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSchemaLoader<RealFileSystem> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            fs: RealFileSystem,
            root: None,
        }
    }
}

impl<F: FileSystem> FileSchemaLoader<F> {
    pub const fn with_fs(fs: F) -> Self {
        Self { fs, root: None }
    }

    /// Resolve schema paths against `root` instead of the working directory.
    #[must_use]
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    fn root(&self) -> Result<PathBuf> {
        match &self.root {
            Some(root) => Ok(root.clone()),
            None => Ok(self.fs.current_dir()?),
        }
    }

    fn parse(content: &str, path: &Path) -> Result<Schema> {
        let schema: Schema = toml::from_str(content).map_err(|e| {
            TinaError::Schema(format!("Failed to parse {}: {}", path.display(), e.message()))
        })?;
        validate_schema(&schema)?;
        Ok(schema)
    }
}

impl<F: FileSystem> SchemaLoader for FileSchemaLoader<F> {
    fn load(&self) -> Result<Schema> {
        let path = self.root()?.join(DEFAULT_SCHEMA_PATH);
        self.load_from_path(&path)
    }

    fn load_from_path(&self, path: &Path) -> Result<Schema> {
        let path = if path.is_relative() {
            self.root()?.join(path)
        } else {
            path.to_path_buf()
        };

        if !self.fs.exists(&path) {
            return Err(TinaError::Schema(format!(
                "Schema file not found: {}",
                path.display()
            )));
        }

        let content = self
            .fs
            .read_to_string(&path)
            .map_err(|source| TinaError::FileRead {
                path: path.clone(),
                source,
            })?;
        Self::parse(&content, &path)
    }
}

/// Minimal well-formedness required before any document can be located.
///
/// Everything beyond this is left to the collection auditor, which reports
/// structural problems as warnings instead of aborting.
fn validate_schema(schema: &Schema) -> Result<()> {
    for (index, collection) in schema.collections.iter().enumerate() {
        if collection.name.trim().is_empty() {
            return Err(TinaError::Schema(format!(
                "collections[{index}] has an empty name"
            )));
        }
        if collection.path.trim().is_empty() {
            return Err(TinaError::Schema(format!(
                "collection '{}' has an empty path",
                collection.name
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "loader_tests/mod.rs"]
mod tests;
