use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use crate::audit::{Severity, builtin_validators};
use crate::datalayer::{FilesystemBridge, WriteMode};
use crate::schema::Schema;

use super::*;

const SCHEMA: &str = r#"
[[collections]]
name = "post"
path = "content/posts"

[[collections.fields]]
name = "title"
type = "string"
required = true
default = "Untitled"

[[collections.fields]]
name = "views"
type = "number"

[[collections.fields]]
name = "category"
type = "string"
required = true

[[collections.fields]]
name = "author"
type = "reference"
collections = ["author"]

[[collections.fields]]
name = "body"
type = "rich-text"
is_body = true

[[collections]]
name = "author"
path = "content/authors"
format = "json"

[[collections.fields]]
name = "name"
type = "string"
required = true
"#;

const VALID_POST: &str =
    "---\ntitle: A\ncategory: news\nauthor: content/authors/jane.json\n---\nHello\n";
const JANE: &str = "{\n  \"name\": \"Jane\"\n}\n";

fn content_root(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    let mut all = vec![("content/authors/jane.json", JANE)];
    all.extend_from_slice(files);
    for (rel, content) in all {
        let path = dir.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }
    dir
}

struct Run {
    error: bool,
    findings: Vec<Finding>,
    rewrites: Vec<PathBuf>,
}

fn run(
    root: &Path,
    schema: &str,
    collection: &str,
    mode: WriteMode,
    use_default_values: bool,
) -> Run {
    let schema: Schema = toml::from_str(schema).unwrap();
    let database = Database::new(FilesystemBridge::new(root, mode), schema);
    let validators = builtin_validators().unwrap();
    let collection = database.get_schema().collection(collection).unwrap();
    let target = AuditTarget {
        collection,
        database: &database,
        root_path: root,
        use_default_values,
        validators: &validators,
    };

    let mut findings = Vec::new();
    let error = audit_documents(&target, &mut findings).unwrap();
    Run {
        error,
        findings,
        rewrites: database.bridge().written(),
    }
}

fn read(root: &Path, rel: &str) -> String {
    fs::read_to_string(root.join(rel)).unwrap()
}

#[test]
fn valid_documents_have_no_findings() {
    let dir = content_root(&[("content/posts/a.md", VALID_POST)]);

    let result = run(dir.path(), SCHEMA, "post", WriteMode::Record, false);

    assert!(!result.error);
    assert!(result.findings.is_empty(), "findings: {:?}", result.findings);
    assert!(result.rewrites.is_empty());
}

#[test]
fn every_invalid_field_is_reported() {
    let dir = content_root(&[
        ("content/posts/a.md", VALID_POST),
        (
            "content/posts/b.md",
            "---\ntitle: 5\nviews: many\nauthor: content/authors/nobody.json\nextra: 1\n---\n",
        ),
    ]);

    let result = run(dir.path(), SCHEMA, "post", WriteMode::Record, false);

    assert!(result.error);
    let fields: Vec<_> = result
        .findings
        .iter()
        .map(|f| f.field.as_deref().unwrap())
        .collect();
    assert_eq!(fields, vec!["title", "views", "category", "author", "extra"]);
    assert!(result.findings.iter().all(|f| f.severity == Severity::Error));
    assert!(
        result
            .findings
            .iter()
            .all(|f| f.path == Path::new("content/posts/b.md"))
    );
    assert_eq!(result.findings[2].message, "required field is missing");
}

#[test]
fn dry_run_records_rewrites_without_touching_disk() {
    let stale = "---\nextra: 1\ncategory: news\ntitle: B\n---\nBody\n";
    let dir = content_root(&[
        ("content/posts/a.md", VALID_POST),
        ("content/posts/b.md", stale),
    ]);

    let result = run(dir.path(), SCHEMA, "post", WriteMode::Record, true);

    assert_eq!(result.rewrites, vec![PathBuf::from("content/posts/b.md")]);
    assert_eq!(read(dir.path(), "content/posts/a.md"), VALID_POST);
    assert_eq!(read(dir.path(), "content/posts/b.md"), stale);
    assert_eq!(read(dir.path(), "content/authors/jane.json"), JANE);
}

#[test]
fn dry_run_never_applies_defaults() {
    let dir = content_root(&[("content/posts/c.md", "---\ncategory: news\n---\n")]);

    let result = run(dir.path(), SCHEMA, "post", WriteMode::Record, true);

    assert!(result.error);
    assert_eq!(result.findings[0].field.as_deref(), Some("title"));
    assert_eq!(read(dir.path(), "content/posts/c.md"), "---\ncategory: news\n---\n");
}

#[test]
fn clean_with_defaults_fills_missing_required_field() {
    let dir = content_root(&[("content/posts/c.md", "---\ncategory: news\n---\n")]);

    let result = run(dir.path(), SCHEMA, "post", WriteMode::Apply, true);

    assert!(!result.error, "findings: {:?}", result.findings);
    assert_eq!(
        read(dir.path(), "content/posts/c.md"),
        "---\ntitle: Untitled\ncategory: news\n---\n"
    );
}

#[test]
fn clean_without_defaults_leaves_field_missing() {
    let dir = content_root(&[("content/posts/c.md", "---\ncategory: news\n---\n")]);

    let result = run(dir.path(), SCHEMA, "post", WriteMode::Apply, false);

    assert!(result.error);
    assert_eq!(result.findings.len(), 1);
    assert_eq!(result.findings[0].field.as_deref(), Some("title"));
    assert_eq!(read(dir.path(), "content/posts/c.md"), "---\ncategory: news\n---\n");
}

#[test]
fn missing_default_keeps_the_error() {
    let dir = content_root(&[("content/posts/d.md", "---\ntitle: T\n---\n")]);

    let result = run(dir.path(), SCHEMA, "post", WriteMode::Apply, true);

    assert!(result.error);
    assert_eq!(result.findings.len(), 1);
    assert_eq!(result.findings[0].field.as_deref(), Some("category"));
}

#[test]
fn clean_reports_against_the_saved_document() {
    let dir = content_root(&[(
        "content/posts/e.md",
        "---\ntitle: E\ncategory: news\nextra: 1\n---\n",
    )]);

    let result = run(dir.path(), SCHEMA, "post", WriteMode::Apply, false);

    assert!(!result.error, "findings: {:?}", result.findings);
    assert_eq!(result.rewrites, vec![PathBuf::from("content/posts/e.md")]);
    assert_eq!(
        read(dir.path(), "content/posts/e.md"),
        "---\ntitle: E\ncategory: news\n---\n"
    );
}

#[test]
fn unparsable_document_is_an_error_and_others_still_run() {
    let dir = content_root(&[
        ("content/posts/a.md", "---\ntitle: [unclosed\n---\n"),
        ("content/posts/b.md", "---\ntitle: B\n---\n"),
    ]);

    let result = run(dir.path(), SCHEMA, "post", WriteMode::Record, false);

    assert!(result.error);
    assert_eq!(result.findings.len(), 2);
    assert!(result.findings[0].message.starts_with("cannot be parsed: "));
    assert_eq!(result.findings[0].field, None);
    assert_eq!(result.findings[1].path, Path::new("content/posts/b.md"));
    assert_eq!(result.findings[1].field.as_deref(), Some("category"));
}

#[test]
fn templated_documents_must_name_a_known_template() {
    let schema = r#"
[[collections]]
name = "page"
path = "content/pages"

[[collections.templates]]
name = "hero"

[[collections.templates.fields]]
name = "headline"
type = "string"
required = true
"#;
    let dir = content_root(&[
        ("content/pages/p1.md", "---\n_template: hero\nheadline: Hi\n---\n"),
        ("content/pages/p2.md", "---\nheadline: Hi\n---\n"),
        ("content/pages/p3.md", "---\n_template: banner\n---\n"),
    ]);

    let result = run(dir.path(), schema, "page", WriteMode::Record, false);

    assert!(result.error);
    let found: Vec<_> = result
        .findings
        .iter()
        .map(|f| (f.path.to_str().unwrap(), f.message.as_str()))
        .collect();
    assert_eq!(
        found,
        vec![
            ("content/pages/p2.md", "document does not name a template"),
            ("content/pages/p3.md", "unknown template 'banner'"),
        ]
    );
    assert!(
        result
            .findings
            .iter()
            .all(|f| f.field.as_deref() == Some("_template"))
    );
}

const EVENT_SCHEMA: &str = r#"
[[collections]]
name = "event"
path = "content/events"
format = "toml"

[[collections.fields]]
name = "title"
type = "string"

[[collections.fields]]
name = "date"
type = "datetime"
required = true
"#;

const LAUNCH: &str = "title = \"Launch\"\ndate = 2024-01-15\n";

#[test]
fn toml_native_dates_are_valid_datetimes() {
    let dir = content_root(&[("content/events/launch.toml", LAUNCH)]);

    let result = run(dir.path(), EVENT_SCHEMA, "event", WriteMode::Record, false);

    assert!(!result.error, "findings: {:?}", result.findings);
    assert!(result.rewrites.is_empty());
}

#[test]
fn clean_keeps_toml_dates_native() {
    let dir = content_root(&[
        ("content/events/launch.toml", LAUNCH),
        (
            "content/events/party.toml",
            "extra = 1\ndate = 2024-06-01T18:00:00Z\ntitle = \"Party\"\n",
        ),
    ]);

    let result = run(dir.path(), EVENT_SCHEMA, "event", WriteMode::Apply, false);

    assert!(!result.error, "findings: {:?}", result.findings);
    assert_eq!(
        result.rewrites,
        vec![PathBuf::from("content/events/party.toml")]
    );
    assert_eq!(read(dir.path(), "content/events/launch.toml"), LAUNCH);
    assert_eq!(
        read(dir.path(), "content/events/party.toml"),
        "title = \"Party\"\ndate = 2024-06-01T18:00:00Z\n"
    );
}

#[test]
fn same_named_collection_audits_its_own_documents() {
    let schema = r#"
[[collections]]
name = "post"
path = "content/posts"

[[collections.fields]]
name = "title"
type = "string"

[[collections]]
name = "post"
path = "content/notes"

[[collections.fields]]
name = "note"
type = "string"
required = true
"#;
    let dir = content_root(&[
        ("content/posts/a.md", "---\ntitle: A\n---\n"),
        ("content/notes/n.md", "---\ntitle: N\n---\n"),
    ]);
    let schema: Schema = toml::from_str(schema).unwrap();
    let database = Database::new(FilesystemBridge::new(dir.path(), WriteMode::Record), schema);
    let validators = builtin_validators().unwrap();

    let mut findings = Vec::new();
    for collection in database.get_schema().collections() {
        let target = AuditTarget {
            collection,
            database: &database,
            root_path: dir.path(),
            use_default_values: false,
            validators: &validators,
        };
        audit_documents(&target, &mut findings).unwrap();
    }

    let found: Vec<_> = findings
        .iter()
        .map(|f| (f.path.to_str().unwrap(), f.field.as_deref().unwrap()))
        .collect();
    assert_eq!(
        found,
        vec![("content/notes/n.md", "note"), ("content/notes/n.md", "title")]
    );
}

#[derive(Default)]
struct Passes(Vec<(String, usize)>);

impl FindingSink for Passes {
    fn record(&mut self, _finding: Finding) {}

    fn begin_documents(&mut self, collection: &str, total: usize) {
        self.0.push((collection.to_string(), total));
    }
}

#[test]
fn document_pass_is_announced_by_label() {
    let schema = r#"
[[collections]]
name = "post"
label = "Blog Posts"
path = "content/posts"

[[collections.fields]]
name = "title"
type = "string"
"#;
    let dir = content_root(&[("content/posts/a.md", "---\ntitle: A\n---\n")]);
    let schema: Schema = toml::from_str(schema).unwrap();
    let database = Database::new(FilesystemBridge::new(dir.path(), WriteMode::Record), schema);
    let validators = builtin_validators().unwrap();
    let target = AuditTarget {
        collection: &database.get_schema().collections()[0],
        database: &database,
        root_path: dir.path(),
        use_default_values: false,
        validators: &validators,
    };

    let mut passes = Passes::default();
    audit_documents(&target, &mut passes).unwrap();

    assert_eq!(passes.0, vec![("Blog Posts".to_string(), 1)]);
}
