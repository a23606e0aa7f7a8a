use super::*;

#[test]
fn register_and_get() {
    let mut registry = Registry::new();
    registry.register("media", 1_u32).unwrap();
    assert_eq!(registry.get("media"), Some(&1));
    assert!(registry.contains("media"));
    assert_eq!(registry.len(), 1);
}

#[test]
fn duplicate_registration_is_rejected_and_keeps_first() {
    let mut registry = Registry::new();
    registry.register("media", "first").unwrap();

    let err = registry.register("media", "second").unwrap_err();

    assert!(matches!(err, TinaError::DuplicateCapability(ref name) if name == "media"));
    assert_eq!(registry.get("media"), Some(&"first"));
}

#[test]
fn names_follow_registration_order() {
    let mut registry = Registry::new();
    registry.register("b", ()).unwrap();
    registry.register("a", ()).unwrap();
    registry.register("c", ()).unwrap();

    let names: Vec<_> = registry.names().collect();
    assert_eq!(names, vec!["b", "a", "c"]);
}

#[test]
fn missing_name_returns_none() {
    let registry: Registry<u8> = Registry::default();
    assert!(registry.get("nope").is_none());
    assert!(registry.is_empty());
}
