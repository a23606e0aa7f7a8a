//! Field-level validation and default substitution.
//!
//! Scalar checks are looked up by field type in a [`ValidatorRegistry`]; the
//! driver handles required-ness, lists, nested objects and undeclared keys.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::database::ReferenceResolver;
use crate::error::Result;
use crate::registry::Registry;
use crate::schema::{Field, FieldType, TEMPLATE_KEY};

static DATETIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\d{4}-\d{2}-\d{2}(?:[T ]\d{2}:\d{2}(?::\d{2}(?:\.\d+)?)?(?:Z|[+-]\d{2}:?\d{2})?)?$",
    )
    // SAFETY: Pattern is a static literal
    .expect("valid datetime regex")
});

/// Compiled `pattern` regexes, keyed by pattern text. Invalid patterns are
/// remembered as such and never match-checked.
#[derive(Debug, Default)]
pub struct PatternCache {
    compiled: RefCell<HashMap<String, Option<Regex>>>,
}

impl PatternCache {
    /// Whether `text` matches `pattern`, or `None` if the pattern is invalid.
    pub fn is_match(&self, pattern: &str, text: &str) -> Option<bool> {
        if let Some(regex) = self.compiled.borrow().get(pattern) {
            return regex.as_ref().map(|re| re.is_match(text));
        }
        let regex = Regex::new(pattern).ok();
        let matched = regex.as_ref().map(|re| re.is_match(text));
        self.compiled.borrow_mut().insert(pattern.to_string(), regex);
        matched
    }
}

/// Lookups shared by every validator of a checker.
pub struct ValidationContext<'a> {
    pub refs: &'a dyn ReferenceResolver,
    pub patterns: &'a PatternCache,
}

/// Checks a single (non-list) value of a field.
pub trait FieldValidator {
    /// Problems with `value`, as human-readable messages. Empty when valid.
    fn validate(&self, field: &Field, value: &Value, ctx: &ValidationContext<'_>) -> Vec<String>;
}

pub type ValidatorRegistry = Registry<Box<dyn FieldValidator>>;

/// Registry holding a validator for every built-in field type.
///
/// # Errors
/// Fails only if two built-ins claim the same type name.
pub fn builtin_validators() -> Result<ValidatorRegistry> {
    let mut registry: ValidatorRegistry = Registry::new();
    registry.register(FieldType::String.as_str(), Box::new(StringValidator))?;
    registry.register(FieldType::Number.as_str(), Box::new(NumberValidator))?;
    registry.register(FieldType::Boolean.as_str(), Box::new(BooleanValidator))?;
    registry.register(FieldType::Datetime.as_str(), Box::new(DatetimeValidator))?;
    registry.register(FieldType::Image.as_str(), Box::new(ImageValidator))?;
    registry.register(FieldType::Reference.as_str(), Box::new(ReferenceValidator))?;
    registry.register(FieldType::Object.as_str(), Box::new(ObjectValidator))?;
    registry.register(FieldType::RichText.as_str(), Box::new(RichTextValidator))?;
    Ok(registry)
}

/// JSON-ish name of a value's kind, for messages.
#[must_use]
pub const fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

fn mismatch(expected: &str, value: &Value) -> Vec<String> {
    vec![format!("expected {expected}, found {}", describe(value))]
}

struct StringValidator;

impl FieldValidator for StringValidator {
    fn validate(&self, field: &Field, value: &Value, ctx: &ValidationContext<'_>) -> Vec<String> {
        let Some(text) = value.as_str() else {
            return mismatch("a string", value);
        };

        let mut problems = Vec::new();
        if !field.options.is_empty() && !field.options.iter().any(|o| o == text) {
            problems.push(format!(
                "'{text}' is not one of the allowed options: {}",
                field.options.join(", ")
            ));
        }
        if let Some(pattern) = &field.pattern
            && ctx.patterns.is_match(pattern, text) == Some(false)
        {
            problems.push(format!("'{text}' does not match pattern {pattern}"));
        }
        problems
    }
}

struct NumberValidator;

impl FieldValidator for NumberValidator {
    fn validate(&self, _field: &Field, value: &Value, _ctx: &ValidationContext<'_>) -> Vec<String> {
        if value.is_number() {
            Vec::new()
        } else {
            mismatch("a number", value)
        }
    }
}

struct BooleanValidator;

impl FieldValidator for BooleanValidator {
    fn validate(&self, _field: &Field, value: &Value, _ctx: &ValidationContext<'_>) -> Vec<String> {
        if value.is_boolean() {
            Vec::new()
        } else {
            mismatch("a boolean", value)
        }
    }
}

struct DatetimeValidator;

impl FieldValidator for DatetimeValidator {
    fn validate(&self, _field: &Field, value: &Value, _ctx: &ValidationContext<'_>) -> Vec<String> {
        match value.as_str() {
            Some(text) if DATETIME.is_match(text) => Vec::new(),
            Some(text) => vec![format!("'{text}' is not a valid datetime")],
            None => mismatch("a datetime string", value),
        }
    }
}

struct ImageValidator;

impl FieldValidator for ImageValidator {
    fn validate(&self, _field: &Field, value: &Value, _ctx: &ValidationContext<'_>) -> Vec<String> {
        if value.is_string() {
            Vec::new()
        } else {
            mismatch("an image path", value)
        }
    }
}

struct ReferenceValidator;

impl FieldValidator for ReferenceValidator {
    fn validate(&self, field: &Field, value: &Value, ctx: &ValidationContext<'_>) -> Vec<String> {
        let Some(reference) = value.as_str() else {
            return mismatch("a document reference", value);
        };
        if field.collections.is_empty() || ctx.refs.resolves(&field.collections, reference) {
            Vec::new()
        } else {
            vec![format!(
                "reference '{reference}' does not match any document in {}",
                field.collections.join(", ")
            )]
        }
    }
}

struct ObjectValidator;

impl FieldValidator for ObjectValidator {
    fn validate(&self, _field: &Field, value: &Value, _ctx: &ValidationContext<'_>) -> Vec<String> {
        if value.is_object() {
            Vec::new()
        } else {
            mismatch("an object", value)
        }
    }
}

struct RichTextValidator;

impl FieldValidator for RichTextValidator {
    fn validate(&self, _field: &Field, value: &Value, _ctx: &ValidationContext<'_>) -> Vec<String> {
        if value.is_string() || value.is_object() {
            Vec::new()
        } else {
            mismatch("rich text", value)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueKind {
    Missing,
    Invalid,
    Unknown,
}

/// A field that failed validation. `field` is a dotted path (`seo.title`, `tags[2]`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    pub field: String,
    pub kind: IssueKind,
    pub message: String,
}

impl FieldIssue {
    fn new(field: &str, kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            kind,
            message: message.into(),
        }
    }
}

/// Validation driver over a field set.
///
/// Field patterns are compiled once per checker.
pub struct FieldChecker<'a> {
    validators: &'a ValidatorRegistry,
    refs: &'a dyn ReferenceResolver,
    patterns: PatternCache,
}

impl<'a> FieldChecker<'a> {
    #[must_use]
    pub fn new(validators: &'a ValidatorRegistry, refs: &'a dyn ReferenceResolver) -> Self {
        Self {
            validators,
            refs,
            patterns: PatternCache::default(),
        }
    }

    /// Every issue in `values` against `fields`, declared fields first, then
    /// undeclared keys in document order.
    #[must_use]
    pub fn check_document(&self, fields: &[Field], values: &Map<String, Value>) -> Vec<FieldIssue> {
        self.check_fields(fields, values, "", true)
    }

    fn check_fields(
        &self,
        fields: &[Field],
        values: &Map<String, Value>,
        prefix: &str,
        top_level: bool,
    ) -> Vec<FieldIssue> {
        let mut issues = Vec::new();
        for field in fields {
            let path = join(prefix, &field.name);
            issues.extend(self.check_field(field, values.get(&field.name), &path));
        }

        for key in values.keys() {
            if top_level && key == TEMPLATE_KEY {
                continue;
            }
            if !fields.iter().any(|f| &f.name == key) {
                issues.push(FieldIssue::new(
                    &join(prefix, key),
                    IssueKind::Unknown,
                    "field is not declared in the schema",
                ));
            }
        }
        issues
    }

    /// Issues for one field's value (`None` or null means absent).
    #[must_use]
    pub fn check_field(&self, field: &Field, value: Option<&Value>, path: &str) -> Vec<FieldIssue> {
        let Some(value) = value.filter(|v| !v.is_null()) else {
            return if field.required {
                vec![FieldIssue::new(
                    path,
                    IssueKind::Missing,
                    "required field is missing",
                )]
            } else {
                Vec::new()
            };
        };

        if !field.list {
            return self.check_item(field, value, path);
        }

        let Some(items) = value.as_array() else {
            return vec![FieldIssue::new(
                path,
                IssueKind::Invalid,
                format!("expected a list of {}, found {}", field.field_type, describe(value)),
            )];
        };
        if field.required && items.is_empty() {
            return vec![FieldIssue::new(
                path,
                IssueKind::Missing,
                "required list is empty",
            )];
        }
        items
            .iter()
            .enumerate()
            .flat_map(|(i, item)| self.check_item(field, item, &format!("{path}[{i}]")))
            .collect()
    }

    fn check_item(&self, field: &Field, value: &Value, path: &str) -> Vec<FieldIssue> {
        if field.list && value.is_array() {
            return vec![FieldIssue::new(
                path,
                IssueKind::Invalid,
                "nested lists are not supported",
            )];
        }
        if !field.list && value.is_array() && field.field_type != FieldType::Object {
            return vec![FieldIssue::new(
                path,
                IssueKind::Invalid,
                format!("expected a single {}, found list", field.field_type),
            )];
        }

        let Some(validator) = self.validators.get(field.field_type.as_str()) else {
            // Unregistered types are reported once per collection.
            return Vec::new();
        };

        let ctx = ValidationContext {
            refs: self.refs,
            patterns: &self.patterns,
        };
        let mut issues: Vec<FieldIssue> = validator
            .validate(field, value, &ctx)
            .into_iter()
            .map(|message| FieldIssue::new(path, IssueKind::Invalid, message))
            .collect();

        if field.field_type == FieldType::Object
            && let Some(map) = value.as_object()
        {
            issues.extend(self.check_fields(&field.fields, map, path, false));
        }
        issues
    }
}

/// Replace missing or invalid values with declared defaults.
///
/// Object fields are descended into first so nested defaults apply even when
/// the object itself has none. Fields without a default are left untouched.
/// Returns the dotted paths that received a default.
pub fn apply_defaults(
    checker: &FieldChecker<'_>,
    fields: &[Field],
    values: &mut Map<String, Value>,
) -> Vec<String> {
    apply_defaults_at(checker, fields, values, "")
}

fn apply_defaults_at(
    checker: &FieldChecker<'_>,
    fields: &[Field],
    values: &mut Map<String, Value>,
    prefix: &str,
) -> Vec<String> {
    let mut applied = Vec::new();
    for field in fields {
        let path = join(prefix, &field.name);

        if field.field_type == FieldType::Object
            && !field.list
            && let Some(Value::Object(nested)) = values.get_mut(&field.name)
        {
            applied.extend(apply_defaults_at(checker, &field.fields, nested, &path));
        }

        let Some(default) = &field.default else {
            continue;
        };
        let current = values.get(&field.name).filter(|v| !v.is_null());
        if current.is_none() || !checker.check_field(field, current, &path).is_empty() {
            values.insert(field.name.clone(), default.clone());
            applied.push(path);
        }
    }
    applied
}

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

#[cfg(test)]
#[path = "validate_tests.rs"]
mod tests;
