use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Schema file location, relative to the content root.
pub const DEFAULT_SCHEMA_PATH: &str = ".tina/schema.toml";

/// Document key selecting the template of a templated collection.
pub const TEMPLATE_KEY: &str = "_template";

/// Top-level schema: an ordered list of collections.
///
/// Declaration order is significant: the audit walks collections in this order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Schema {
    #[serde(default)]
    pub collections: Vec<Collection>,
}

impl Schema {
    #[must_use]
    pub fn collections(&self) -> &[Collection] {
        &self.collections
    }

    #[must_use]
    pub fn collection(&self, name: &str) -> Option<&Collection> {
        self.collections.iter().find(|c| c.name == name)
    }
}

/// On-disk encoding of a collection's documents.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    #[default]
    Md,
    Mdx,
    Json,
    Toml,
}

impl DocumentFormat {
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Md => "md",
            Self::Mdx => "mdx",
            Self::Json => "json",
            Self::Toml => "toml",
        }
    }

    #[must_use]
    pub const fn is_markdown(self) -> bool {
        matches!(self, Self::Md | Self::Mdx)
    }
}

/// A schema-declared group of documents sharing a directory and field set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Collection {
    pub name: String,

    #[serde(default)]
    pub label: Option<String>,

    /// Directory holding the documents, relative to the content root.
    pub path: String,

    #[serde(default)]
    pub format: DocumentFormat,

    /// Include glob relative to `path` (default: every file with the format's extension).
    #[serde(default, rename = "match")]
    pub match_pattern: Option<String>,

    #[serde(default)]
    pub fields: Option<Vec<Field>>,

    #[serde(default)]
    pub templates: Option<Vec<Template>>,
}

impl Collection {
    #[must_use]
    pub fn is_templated(&self) -> bool {
        self.templates.is_some()
    }

    #[must_use]
    pub fn template(&self, name: &str) -> Option<&Template> {
        self.templates.as_deref()?.iter().find(|t| t.name == name)
    }

    /// Field set governing a document: the collection's fields, or the named
    /// template's fields for templated collections.
    #[must_use]
    pub fn field_set(&self, template: Option<&str>) -> Option<&[Field]> {
        match (self.is_templated(), template) {
            (true, Some(name)) => self.template(name).map(|t| t.fields.as_slice()),
            (true, None) => None,
            (false, _) => self.fields.as_deref(),
        }
    }

    /// Every field set declared by the collection, labelled for reporting.
    #[must_use]
    pub fn field_sets(&self) -> Vec<(Option<&str>, &[Field])> {
        let mut sets = Vec::new();
        if let Some(fields) = &self.fields {
            sets.push((None, fields.as_slice()));
        }
        for template in self.templates.iter().flatten() {
            sets.push((Some(template.name.as_str()), template.fields.as_slice()));
        }
        sets
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Template {
    pub name: String,

    #[serde(default)]
    pub label: Option<String>,

    #[serde(default)]
    pub fields: Vec<Field>,
}

/// A single field definition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Field {
    pub name: String,

    #[serde(rename = "type")]
    pub field_type: FieldType,

    #[serde(default)]
    pub label: Option<String>,

    #[serde(default)]
    pub required: bool,

    /// Value is a list of `field_type` values.
    #[serde(default)]
    pub list: bool,

    /// Value substituted by a clean pass with default values enabled.
    #[serde(default)]
    pub default: Option<Value>,

    /// Allowed values (string fields).
    #[serde(default)]
    pub options: Vec<String>,

    /// Regex every value must match (string fields).
    #[serde(default)]
    pub pattern: Option<String>,

    /// Collections a reference may point into (reference fields).
    #[serde(default)]
    pub collections: Vec<String>,

    /// Maps the markdown body (rich-text fields of md/mdx collections).
    #[serde(default)]
    pub is_body: bool,

    /// Sub-fields (object fields).
    #[serde(default)]
    pub fields: Vec<Field>,
}

impl Field {
    /// Bare field of the given type, with every optional attribute unset.
    #[must_use]
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            label: None,
            required: false,
            list: false,
            default: None,
            options: Vec::new(),
            pattern: None,
            collections: Vec::new(),
            is_body: false,
            fields: Vec::new(),
        }
    }
}

/// Field type name. Unknown names are kept as [`FieldType::Custom`] so that a
/// schema using a plugin-provided type still loads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Datetime,
    Image,
    Reference,
    Object,
    RichText,
    Custom(String),
}

impl FieldType {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Datetime => "datetime",
            Self::Image => "image",
            Self::Reference => "reference",
            Self::Object => "object",
            Self::RichText => "rich-text",
            Self::Custom(name) => name,
        }
    }

    /// Types that accept `options` and `pattern`.
    #[must_use]
    pub const fn is_textual(&self) -> bool {
        matches!(self, Self::String)
    }
}

impl From<String> for FieldType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "string" => Self::String,
            "number" => Self::Number,
            "boolean" => Self::Boolean,
            "datetime" => Self::Datetime,
            "image" => Self::Image,
            "reference" => Self::Reference,
            "object" => Self::Object,
            "rich-text" => Self::RichText,
            _ => Self::Custom(value),
        }
    }
}

impl From<FieldType> for String {
    fn from(value: FieldType) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;
