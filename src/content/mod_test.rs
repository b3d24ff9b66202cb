use super::*;

#[test]
fn nullable_blank_becomes_null() {
    assert_eq!(nullable(Some("   ".into())), FieldValue::NullableText(None));
    assert_eq!(nullable(None), FieldValue::NullableText(None));
}

#[test]
fn nullable_trims_value() {
    assert_eq!(nullable(Some(" https://x.io ".into())), FieldValue::NullableText(Some("https://x.io".into())));
}

#[test]
fn clean_list_trims_and_drops_blanks() {
    let cleaned = clean_list(vec![" React ".into(), String::new(), "  ".into(), "Rust".into()]);
    assert_eq!(cleaned, vec!["React".to_owned(), "Rust".to_owned()]);
}

#[test]
fn list_conversion_cleans_entries() {
    let value: FieldValue = vec!["a".to_owned(), " ".to_owned()].into();
    assert_eq!(value, FieldValue::List(vec!["a".into()]));
}

#[test]
fn patch_field_skips_missing_values() {
    let mut out = Vec::new();
    patch_field::<bool>(&mut out, "is_active", None);
    patch_field(&mut out, "sort_order", Some(3));
    assert_eq!(out, vec![("sort_order", FieldValue::Int(3))]);
}

#[test]
fn require_text_rejects_whitespace() {
    let err = require_text("title", " \t").unwrap_err();
    assert!(matches!(err, ContentError::Invalid { field: "title", reason: "must not be empty" }));
    assert!(require_text("title", "ok").is_ok());
}

#[test]
fn require_max_len_counts_chars_not_bytes() {
    assert!(require_max_len("name", "ééé", 3).is_ok());
    assert!(require_max_len("name", "éééé", 3).is_err());
}

#[test]
fn content_error_messages() {
    assert_eq!(ContentError::NotFound("services").to_string(), "services not found");
    assert_eq!(ContentError::EmptyPatch.to_string(), "nothing to update");
    let invalid = ContentError::Invalid { field: "title", reason: "too long" };
    assert_eq!(invalid.to_string(), "invalid title: too long");
}
