use std::fs;

use serde_json::json;
use tempfile::TempDir;

use crate::datalayer::{FilesystemBridge, WriteMode};

use super::*;

const SCHEMA: &str = r#"
[[collections]]
name = "post"
path = "content/posts"
format = "md"

[[collections.fields]]
name = "title"
type = "string"

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
"#;

fn setup(mode: WriteMode) -> (TempDir, Database<FilesystemBridge>) {
    let dir = TempDir::new().unwrap();
    let write = |rel: &str, content: &str| {
        let path = dir.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    };
    write(
        "content/posts/hello.md",
        "---\nauthor: content/authors/jane.json\ntitle: Hello\nstale: 1\n---\nBody text\n",
    );
    write("content/posts/notes.txt", "ignored");
    write("content/authors/jane.json", "{\"name\": \"Jane\"}");

    let schema: Schema = toml::from_str(SCHEMA).unwrap();
    let db = Database::new(FilesystemBridge::new(dir.path(), mode), schema);
    (dir, db)
}

#[test]
fn documents_are_filtered_by_format() {
    let (_dir, db) = setup(WriteMode::Record);
    let post = db.get_schema().collection("post").unwrap().clone();

    let docs = db.documents(&post).unwrap();

    assert_eq!(docs, vec![PathBuf::from("content/posts/hello.md")]);
}

#[test]
fn get_document_maps_body_into_body_field() {
    let (_dir, db) = setup(WriteMode::Record);
    let post = db.get_schema().collection("post").unwrap().clone();

    let doc = db
        .get_document(&post, Path::new("content/posts/hello.md"))
        .unwrap();

    assert_eq!(doc.values["title"], json!("Hello"));
    assert_eq!(doc.values["body"], json!("Body text\n"));
    assert_eq!(doc.body.as_deref(), Some("Body text\n"));
}

#[test]
fn references_resolve_against_target_collections() {
    let (_dir, db) = setup(WriteMode::Record);
    let targets = vec!["author".to_string()];

    assert!(db.resolves(&targets, "content/authors/jane.json"));
    assert!(!db.resolves(&targets, "content/authors/nobody.json"));
    assert!(!db.resolves(&["post".to_string()], "content/authors/jane.json"));
    assert!(!db.resolves(&["unknown".to_string()], "content/authors/jane.json"));
}

#[test]
fn submit_in_record_mode_leaves_disk_untouched() {
    let (dir, db) = setup(WriteMode::Record);
    let post = db.get_schema().collection("post").unwrap().clone();
    let path = Path::new("content/posts/hello.md");
    let before = fs::read_to_string(dir.path().join(path)).unwrap();
    let doc = db.get_document(&post, path).unwrap();

    let outcome = db.submit_document(&post, &doc, &doc.values).unwrap();

    assert!(outcome.changed);
    assert_eq!(fs::read_to_string(dir.path().join(path)).unwrap(), before);
    assert_eq!(db.bridge().written(), vec![path.to_path_buf()]);
}

#[test]
fn submit_in_apply_mode_normalizes_on_disk() {
    let (dir, db) = setup(WriteMode::Apply);
    let post = db.get_schema().collection("post").unwrap().clone();
    let path = Path::new("content/posts/hello.md");
    let doc = db.get_document(&post, path).unwrap();

    let outcome = db.submit_document(&post, &doc, &doc.values).unwrap();

    let written = fs::read_to_string(dir.path().join(path)).unwrap();
    assert_eq!(
        written,
        "---\ntitle: Hello\nauthor: content/authors/jane.json\n---\nBody text\n"
    );
    assert!(!outcome.values.contains_key("stale"));
    assert_eq!(outcome.values["body"], json!("Body text\n"));
}

#[test]
fn unchanged_submission_is_not_written() {
    let (_dir, db) = setup(WriteMode::Apply);
    let author = db.get_schema().collection("author").unwrap().clone();
    let path = Path::new("content/authors/jane.json");
    let doc = db.get_document(&author, path).unwrap();
    let first = db.submit_document(&author, &doc, &doc.values).unwrap();
    assert!(first.changed);

    let reread = db.get_document(&author, path).unwrap();
    let second = db.submit_document(&author, &reread, &reread.values).unwrap();

    assert!(!second.changed);
}

#[test]
fn same_named_collections_list_their_own_documents() {
    let dir = TempDir::new().unwrap();
    for rel in ["content/posts/a.md", "content/notes/n.md"] {
        let path = dir.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "---\ntitle: T\n---\n").unwrap();
    }
    let schema: Schema = toml::from_str(
        r#"
[[collections]]
name = "post"
path = "content/posts"

[[collections]]
name = "post"
path = "content/notes"
"#,
    )
    .unwrap();
    let db = Database::new(FilesystemBridge::new(dir.path(), WriteMode::Record), schema);
    let collections = db.get_schema().collections().to_vec();

    let posts = db.documents(&collections[0]).unwrap();
    let notes = db.documents(&collections[1]).unwrap();

    assert_eq!(posts, vec![PathBuf::from("content/posts/a.md")]);
    assert_eq!(notes, vec![PathBuf::from("content/notes/n.md")]);
}
