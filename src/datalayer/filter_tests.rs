use std::path::Path;

use crate::schema::DocumentFormat;

use super::*;

fn collection(format: DocumentFormat, match_pattern: Option<&str>) -> Collection {
    Collection {
        name: "post".to_string(),
        label: None,
        path: "content/posts".to_string(),
        format,
        match_pattern: match_pattern.map(str::to_string),
        fields: Some(Vec::new()),
        templates: None,
    }
}

#[test]
fn default_match_includes_every_file_with_extension() {
    let filter = CollectionFilter::new(&collection(DocumentFormat::Md, None)).unwrap();

    assert!(filter.should_include(Path::new("hello.md")));
    assert!(filter.should_include(Path::new("2024/hello.md")));
    assert!(!filter.should_include(Path::new("hello.json")));
    assert!(!filter.should_include(Path::new("README")));
}

#[test]
fn mdx_collection_ignores_md_files() {
    let filter = CollectionFilter::new(&collection(DocumentFormat::Mdx, None)).unwrap();

    assert!(filter.should_include(Path::new("hello.mdx")));
    assert!(!filter.should_include(Path::new("hello.md")));
}

#[test]
fn custom_match_restricts_files() {
    let filter =
        CollectionFilter::new(&collection(DocumentFormat::Json, Some("published/*"))).unwrap();

    assert!(filter.should_include(Path::new("published/a.json")));
    assert!(!filter.should_include(Path::new("drafts/a.json")));
}

#[test]
fn invalid_match_glob_is_rejected() {
    let err = CollectionFilter::new(&collection(DocumentFormat::Md, Some("[unclosed"))).unwrap_err();

    assert!(matches!(err, TinaError::InvalidPattern { ref pattern, .. } if pattern == "[unclosed"));
}
