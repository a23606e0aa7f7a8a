#![allow(dead_code)]

use std::fs;
use std::path::Path;

use tempfile::TempDir;

/// Creates an `assert_cmd` Command for the tinacms binary with telemetry off.
#[macro_export]
macro_rules! tinacms {
    () => {{
        let mut cmd = assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("tinacms"));
        cmd.env("TINA_TELEMETRY_DISABLED", "1").env("NO_COLOR", "1");
        cmd
    }};
}

/// A temporary content root.
pub struct TestFixture {
    pub dir: TempDir,
}

impl TestFixture {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Creates a file with the given content, creating parent directories.
    pub fn create_file(&self, relative_path: &str, content: &str) {
        let path = self.dir.path().join(relative_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        fs::write(&path, content).expect("Failed to write file");
    }

    pub fn create_dir(&self, relative_path: &str) {
        fs::create_dir_all(self.dir.path().join(relative_path))
            .expect("Failed to create directory");
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn read(&self, relative_path: &str) -> String {
        fs::read_to_string(self.dir.path().join(relative_path)).expect("Failed to read file")
    }

    /// Writes `.tina/schema.toml`.
    pub fn create_schema(&self, content: &str) {
        self.create_file(".tina/schema.toml", content);
    }
}

/// A post collection with a required title (default "Untitled") and an
/// author collection it references.
pub const BLOG_SCHEMA: &str = r#"
[[collections]]
name = "post"
label = "Blog Posts"
path = "content/posts"

[[collections.fields]]
name = "title"
type = "string"
required = true
default = "Untitled"

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

/// Adds a collection whose only problem is structural.
pub const WARNING_SCHEMA: &str = r#"
[[collections]]
name = "page"
path = "content/pages"

[[collections.fields]]
name = "title"
type = "string"

[[collections.fields]]
name = "views"
type = "number"
options = ["1"]
"#;

pub const VALID_POST: &str =
    "---\ntitle: Hello\nauthor: content/authors/jane.json\n---\nWelcome\n";
pub const UNTITLED_POST: &str = "---\nauthor: content/authors/jane.json\n---\nWelcome\n";
pub const JANE: &str = "{\n  \"name\": \"Jane\"\n}\n";

/// A blog whose single post has no title.
pub fn blog_missing_title() -> TestFixture {
    let fixture = TestFixture::new();
    fixture.create_schema(BLOG_SCHEMA);
    fixture.create_file("content/authors/jane.json", JANE);
    fixture.create_file("content/posts/hello.md", UNTITLED_POST);
    fixture
}

/// A blog that passes the audit.
pub fn valid_blog() -> TestFixture {
    let fixture = TestFixture::new();
    fixture.create_schema(BLOG_SCHEMA);
    fixture.create_file("content/authors/jane.json", JANE);
    fixture.create_file("content/posts/hello.md", VALID_POST);
    fixture
}
