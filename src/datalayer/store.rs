//! Document codec: raw file content to field values and back.

use std::path::Path;

use serde_json::{Map, Value};

use crate::error::{Result, TinaError};
use crate::schema::{DocumentFormat, Field, FieldType};

const FRONTMATTER_DELIMITER: &str = "---";

/// Field values plus, for markdown formats, the text after the frontmatter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedContent {
    pub values: Map<String, Value>,
    pub body: Option<String>,
}

/// Parse `raw` according to `format`.
///
/// # Errors
/// Returns [`TinaError::DocumentParse`] if the content is not valid for the format.
pub fn parse(format: DocumentFormat, path: &Path, raw: &str) -> Result<ParsedContent> {
    let parse_error = |message: String| TinaError::DocumentParse {
        path: path.to_path_buf(),
        message,
    };

    match format {
        DocumentFormat::Json => {
            let values: Map<String, Value> =
                serde_json::from_str(raw).map_err(|e| parse_error(e.to_string()))?;
            Ok(ParsedContent { values, body: None })
        }
        DocumentFormat::Toml => {
            let table: toml::Table =
                toml::from_str(raw).map_err(|e| parse_error(e.message().to_string()))?;
            let values = table
                .into_iter()
                .map(|(key, value)| (key, from_toml(value)))
                .collect();
            Ok(ParsedContent { values, body: None })
        }
        DocumentFormat::Md | DocumentFormat::Mdx => parse_markdown(raw).map_err(parse_error),
    }
}

fn parse_markdown(raw: &str) -> std::result::Result<ParsedContent, String> {
    let Some((frontmatter, body)) = split_frontmatter(raw) else {
        return Ok(ParsedContent {
            values: Map::new(),
            body: Some(raw.to_string()),
        });
    };

    let values: Map<String, Value> = if frontmatter.trim().is_empty() {
        Map::new()
    } else {
        serde_yaml::from_str(frontmatter).map_err(|e| e.to_string())?
    };

    Ok(ParsedContent {
        values,
        body: Some(body.to_string()),
    })
}

/// Split `---`-delimited frontmatter from the body.
///
/// Returns `None` when the document has no frontmatter block.
fn split_frontmatter(raw: &str) -> Option<(&str, &str)> {
    let rest = raw
        .strip_prefix(FRONTMATTER_DELIMITER)?
        .strip_prefix('\n')
        .or_else(|| {
            raw.strip_prefix(FRONTMATTER_DELIMITER)?
                .strip_prefix("\r\n")
        })?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == FRONTMATTER_DELIMITER {
            let frontmatter = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return Some((frontmatter, body));
        }
        offset += line.len();
    }
    None
}

/// TOML datetimes become their RFC 3339 text, the form every other format uses.
fn from_toml(value: toml::Value) -> Value {
    match value {
        toml::Value::String(text) => Value::String(text),
        toml::Value::Integer(n) => Value::from(n),
        toml::Value::Float(n) => Value::from(n),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(datetime) => Value::String(datetime.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(from_toml).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(key, value)| (key, from_toml(value)))
                .collect(),
        ),
    }
}

/// Serialize `content` in the canonical layout for `format`.
///
/// `fields` describes the values, when known. TOML uses it to write
/// `datetime` values as native dates.
///
/// # Errors
/// Returns an error if a value cannot be represented in the target format.
pub fn serialize(
    format: DocumentFormat,
    content: &ParsedContent,
    fields: &[Field],
) -> Result<String> {
    match format {
        DocumentFormat::Json => {
            let mut out = serde_json::to_string_pretty(&content.values)?;
            out.push('\n');
            Ok(out)
        }
        DocumentFormat::Toml => Ok(toml::to_string(&to_toml_table(&content.values, fields))?),
        DocumentFormat::Md | DocumentFormat::Mdx => serialize_markdown(content),
    }
}

fn to_toml_table(values: &Map<String, Value>, fields: &[Field]) -> toml::Table {
    values
        .iter()
        .filter_map(|(key, value)| {
            let field = fields.iter().find(|f| &f.name == key);
            to_toml(value, field).map(|value| (key.clone(), value))
        })
        .collect()
}

/// TOML has no null; null values and list items are omitted.
fn to_toml(value: &Value, field: Option<&Field>) -> Option<toml::Value> {
    let converted = match value {
        Value::Null => return None,
        Value::Bool(b) => toml::Value::Boolean(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => toml::Value::Integer(i),
            None => toml::Value::Float(n.as_f64()?),
        },
        Value::String(text) => match field {
            Some(field) if field.field_type == FieldType::Datetime => text
                .parse::<toml::value::Datetime>()
                .map_or_else(|_| toml::Value::String(text.clone()), toml::Value::Datetime),
            _ => toml::Value::String(text.clone()),
        },
        Value::Array(items) => {
            toml::Value::Array(items.iter().filter_map(|item| to_toml(item, field)).collect())
        }
        Value::Object(map) => {
            let nested = field.map_or(&[][..], |f| f.fields.as_slice());
            toml::Value::Table(to_toml_table(map, nested))
        }
    };
    Some(converted)
}

fn serialize_markdown(content: &ParsedContent) -> Result<String> {
    let body = content.body.as_deref().unwrap_or_default();
    if content.values.is_empty() {
        return Ok(body.to_string());
    }

    let yaml = serde_yaml::to_string(&content.values)?;
    let mut out = String::with_capacity(yaml.len() + body.len() + 8);
    out.push_str(FRONTMATTER_DELIMITER);
    out.push('\n');
    out.push_str(&yaml);
    if !yaml.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(FRONTMATTER_DELIMITER);
    out.push('\n');
    out.push_str(body);
    Ok(out)
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
