//! Collection-level structural checks.
//!
//! Everything here is a warning: the schema is still usable, but some part of
//! it cannot do what its author intended.

use std::collections::HashSet;
use std::path::Path;

use crate::datalayer::{Bridge, CollectionFilter};
use crate::schema::{Collection, Field, FieldType, Schema, TEMPLATE_KEY};

use super::validate::{FieldChecker, ValidatorRegistry};
use super::{AuditTarget, Finding, FindingSink};

/// Audit the configuration of `target.collection`.
///
/// Every problem is recorded; returns true if any warning was found.
pub fn audit_collection<B: Bridge>(target: &AuditTarget<'_, B>, sink: &mut dyn FindingSink) -> bool {
    let collection = target.collection;
    let _span = tracing::info_span!(
        "audit_collection",
        collection = %collection.name,
        root = %target.root_path.display()
    )
    .entered();

    let mut warnings = Vec::new();
    check_layout(target, &mut warnings);

    let context = FieldContext {
        collection,
        schema: target.database.get_schema(),
        checker: FieldChecker::new(target.validators, target.database),
        validators: target.validators,
    };
    for (template, fields) in collection.field_sets() {
        let scope = template.map(|name| format!("templates.{name}"));
        if fields.is_empty() {
            warnings.push((scope.clone(), "declares no fields".to_string()));
        }
        let mut body_fields = 0;
        check_fields(&context, fields, scope.as_deref(), false, &mut body_fields, &mut warnings);
        if body_fields > 1 {
            warnings.push((
                scope,
                format!("declares {body_fields} body fields; only one is allowed"),
            ));
        }
    }

    let found = !warnings.is_empty();
    for (field, message) in warnings {
        let finding = Finding::warning(&collection.name, &collection.path, message);
        sink.record(match field {
            Some(field) => finding.with_field(field),
            None => finding,
        });
    }
    found
}

type Warnings = Vec<(Option<String>, String)>;

fn check_layout<B: Bridge>(target: &AuditTarget<'_, B>, warnings: &mut Warnings) {
    let collection = target.collection;
    let schema = target.database.get_schema();

    match (&collection.fields, &collection.templates) {
        (Some(_), Some(_)) => warnings.push((
            None,
            "declares both fields and templates; fields are ignored".to_string(),
        )),
        (None, None) => warnings.push((None, "declares neither fields nor templates".to_string())),
        (None, Some(templates)) if templates.is_empty() => {
            warnings.push((None, "declares an empty templates list".to_string()));
        }
        _ => {}
    }

    let mut seen = HashSet::new();
    for template in collection.templates.iter().flatten() {
        if !seen.insert(template.name.as_str()) {
            warnings.push((None, format!("template '{}' is declared more than once", template.name)));
        }
    }

    let same_name = schema
        .collections()
        .iter()
        .filter(|c| c.name == collection.name)
        .count();
    if same_name > 1 {
        warnings.push((
            None,
            format!("collection name '{}' is declared {same_name} times", collection.name),
        ));
    }

    for other in shared_location(schema, collection) {
        warnings.push((
            None,
            format!(
                "shares path '{}' and format '{}' with collection '{}'",
                collection.path,
                collection.format.extension(),
                other.name
            ),
        ));
    }

    if let Err(e) = CollectionFilter::new(collection) {
        warnings.push((None, format!("{e}; documents cannot be listed")));
    }

    if !target.database.bridge().dir_exists(Path::new(&collection.path)) {
        warnings.push((None, format!("directory '{}' does not exist", collection.path)));
    }
}

fn shared_location<'s>(schema: &'s Schema, collection: &Collection) -> Vec<&'s Collection> {
    let normalize = |p: &str| p.trim_matches('/').to_string();
    schema
        .collections()
        .iter()
        .filter(|other| {
            other.name != collection.name
                && other.format == collection.format
                && normalize(&other.path) == normalize(&collection.path)
        })
        .collect()
}

struct FieldContext<'a> {
    collection: &'a Collection,
    schema: &'a Schema,
    checker: FieldChecker<'a>,
    validators: &'a ValidatorRegistry,
}

fn check_fields(
    ctx: &FieldContext<'_>,
    fields: &[Field],
    scope: Option<&str>,
    nested: bool,
    body_fields: &mut usize,
    warnings: &mut Warnings,
) {
    let mut names = HashSet::new();
    for field in fields {
        let path = match scope {
            Some(scope) => format!("{scope}.{}", field.name),
            None => field.name.clone(),
        };
        let mut warn = |message: String| warnings.push((Some(path.clone()), message));

        if field.name.trim().is_empty() {
            warn("field has an empty name".to_string());
        } else if !names.insert(field.name.as_str()) {
            warn(format!("field '{}' is declared more than once", field.name));
        }
        if field.name == TEMPLATE_KEY && !nested {
            warn(format!("'{TEMPLATE_KEY}' is reserved for template selection"));
        }

        check_field_type(ctx, field, &mut warn);
        check_body(ctx, field, nested, body_fields, &mut warn);

        if let Some(default) = &field.default {
            for issue in ctx.checker.check_field(field, Some(default), &path) {
                warn(format!("default value is invalid: {}", issue.message));
            }
        }

        if field.field_type == FieldType::Object {
            if field.fields.is_empty() {
                warn("object field declares no sub-fields".to_string());
            }
            check_fields(ctx, &field.fields, Some(&path), true, body_fields, warnings);
        }
    }
}

fn check_field_type(
    ctx: &FieldContext<'_>,
    field: &Field,
    warn: &mut impl FnMut(String),
) {
    if !ctx.validators.contains(field.field_type.as_str()) {
        warn(format!(
            "field type '{}' has no registered validator; values are not checked",
            field.field_type
        ));
    }

    if !field.field_type.is_textual() {
        if !field.options.is_empty() {
            warn(format!("options are ignored on {} fields", field.field_type));
        }
        if field.pattern.is_some() {
            warn(format!("pattern is ignored on {} fields", field.field_type));
        }
    }
    if let Some(pattern) = &field.pattern
        && let Err(e) = regex::Regex::new(pattern)
    {
        warn(format!("pattern '{pattern}' is not a valid regex: {e}"));
    }

    if field.field_type == FieldType::Reference {
        if field.collections.is_empty() {
            warn("reference field declares no target collections".to_string());
        }
        for name in &field.collections {
            if ctx.schema.collection(name).is_none() {
                warn(format!("reference targets unknown collection '{name}'"));
            }
        }
    } else if !field.collections.is_empty() {
        warn(format!("collections are ignored on {} fields", field.field_type));
    }
}

fn check_body(
    ctx: &FieldContext<'_>,
    field: &Field,
    nested: bool,
    body_fields: &mut usize,
    warn: &mut impl FnMut(String),
) {
    if !field.is_body {
        return;
    }
    if nested {
        warn("is_body is only valid on top-level fields".to_string());
        return;
    }
    *body_fields += 1;
    if !ctx.collection.format.is_markdown() {
        warn(format!(
            "is_body has no effect in {} collections",
            ctx.collection.format.extension()
        ));
    }
    if field.field_type != FieldType::RichText {
        warn(format!("body field should be rich-text, not {}", field.field_type));
    }
}

#[cfg(test)]
#[path = "collection_tests.rs"]
mod tests;
