//! Rebuilds submitted field values the way a form save does.
//!
//! Only declared fields survive, in declaration order. Null values are dropped
//! and object fields are rebuilt recursively from their sub-fields. Values are
//! never coerced: an invalid value is written back as it was submitted.

use serde_json::{Map, Value};

use crate::schema::{Field, FieldType, TEMPLATE_KEY};

/// Normalized frontmatter/data values and the body extracted from them.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub values: Map<String, Value>,
    pub body: Option<String>,
}

/// Normalize `values` against `fields`.
///
/// `template` is written first for templated collections. A field flagged
/// `is_body` is moved out of the values into the markdown body.
#[must_use]
pub fn normalize(
    fields: &[Field],
    values: &Map<String, Value>,
    template: Option<&str>,
    body: Option<&str>,
) -> Submission {
    let mut out = Map::new();
    if let Some(template) = template {
        out.insert(TEMPLATE_KEY.to_string(), Value::String(template.to_string()));
    }

    let mut new_body = body.map(str::to_string);
    for field in fields {
        let Some(value) = values.get(&field.name).filter(|v| !v.is_null()) else {
            continue;
        };
        if field.is_body
            && let Some(text) = value.as_str()
        {
            new_body = Some(text.to_string());
            continue;
        }
        out.insert(field.name.clone(), normalize_value(field, value));
    }

    Submission {
        values: out,
        body: new_body,
    }
}

/// Values of a document whose field set is unknown: kept as-is, minus nulls.
#[must_use]
pub fn passthrough(values: &Map<String, Value>, body: Option<&str>) -> Submission {
    let values = values
        .iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| (k.clone(), strip_nulls(v)))
        .collect();
    Submission {
        values,
        body: body.map(str::to_string),
    }
}

fn normalize_value(field: &Field, value: &Value) -> Value {
    match value {
        Value::Array(items) if field.list => Value::Array(
            items
                .iter()
                .filter(|item| !item.is_null())
                .map(|item| normalize_item(field, item))
                .collect(),
        ),
        _ => normalize_item(field, value),
    }
}

fn normalize_item(field: &Field, value: &Value) -> Value {
    match (&field.field_type, value) {
        (FieldType::Object, Value::Object(map)) if !field.fields.is_empty() => {
            Value::Object(normalize(&field.fields, map, None, None).values)
        }
        _ => strip_nulls(value),
    }
}

fn strip_nulls(value: &Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(
            items
                .iter()
                .filter(|item| !item.is_null())
                .map(strip_nulls)
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k.clone(), strip_nulls(v)))
                .collect(),
        ),
        other => other.clone(),
    }
}

#[cfg(test)]
#[path = "submit_tests.rs"]
mod tests;
