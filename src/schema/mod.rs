mod filesystem;
mod loader;
mod model;

pub use filesystem::{FileSystem, RealFileSystem};
pub use loader::{FileSchemaLoader, SchemaLoader};
pub use model::{
    Collection, DEFAULT_SCHEMA_PATH, DocumentFormat, Field, FieldType, Schema, TEMPLATE_KEY,
    Template,
};
