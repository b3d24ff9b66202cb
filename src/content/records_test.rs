use super::*;

// =============================================================================
// Drafts
// =============================================================================

#[test]
fn new_service_defaults_from_minimal_json() {
    let draft: NewService = serde_json::from_str(r#"{"title":"SEO"}"#).unwrap();
    assert_eq!(draft.title, "SEO");
    assert_eq!(draft.sort_order, 0);
    assert!(draft.is_active);
    assert!(draft.validate().is_ok());
}

#[test]
fn new_service_fields_trim_title() {
    let draft: NewService = serde_json::from_str(r#"{"title":"  SEO  ","icon":"search"}"#).unwrap();
    let fields = draft.into_fields();
    assert_eq!(fields[0], ("title", FieldValue::Text("SEO".into())));
    assert_eq!(fields[2], ("icon", FieldValue::Text("search".into())));
    assert_eq!(fields.len(), 5);
}

#[test]
fn overlong_title_rejected() {
    let draft = NewProduct {
        title: "x".repeat(MAX_TITLE_LEN + 1),
        description: String::new(),
        features: Vec::new(),
        icon: String::new(),
        is_popular: false,
        is_active: true,
        sort_order: 0,
    };
    assert!(matches!(draft.validate(), Err(ContentError::Invalid { field: "title", reason: "too long" })));
}

#[test]
fn portfolio_requires_category() {
    let draft: NewPortfolioItem = serde_json::from_str(r#"{"title":"Shop","category":" "}"#).unwrap();
    assert!(matches!(draft.validate(), Err(ContentError::Invalid { field: "category", .. })));
}

#[test]
fn portfolio_blank_urls_become_null_and_tags_clean() {
    let json = serde_json::json!({
        "title": "Shop",
        "category": "Web",
        "tags": ["React", " ", ""],
        "image_url": "",
        "project_url": "https://shop.example",
    });
    let draft: NewPortfolioItem = serde_json::from_value(json).unwrap();
    let fields = draft.into_fields();
    let get = |name: &str| fields.iter().find(|(c, _)| *c == name).map(|(_, v)| v.clone());
    assert_eq!(get("tags"), Some(FieldValue::List(vec!["React".into()])));
    assert_eq!(get("image_url"), Some(FieldValue::NullableText(None)));
    assert_eq!(get("project_url"), Some(FieldValue::NullableText(Some("https://shop.example".into()))));
}

#[test]
fn product_features_default_empty() {
    let draft: NewProduct = serde_json::from_str(r#"{"title":"POS","is_popular":true}"#).unwrap();
    assert!(draft.features.is_empty());
    assert!(draft.is_popular);
}

#[test]
fn contact_message_validation() {
    let ok = NewContactMessage { name: "Budi".into(), contact: "budi@example.com".into(), message: "Halo".into() };
    assert!(ok.validate().is_ok());

    let blank = NewContactMessage { message: "  ".into(), ..ok.clone() };
    assert!(matches!(blank.validate(), Err(ContentError::Invalid { field: "message", .. })));

    let long = NewContactMessage { message: "a".repeat(MAX_MESSAGE_LEN + 1), ..ok };
    assert!(matches!(long.validate(), Err(ContentError::Invalid { field: "message", reason: "too long" })));
}

#[test]
fn menu_draft_requires_absolute_path() {
    let draft = NewMenuSetting {
        menu_key: "blog".into(),
        label: "Blog".into(),
        path: "blog".into(),
        sort_order: 7,
        is_active: true,
    };
    assert!(matches!(draft.validate(), Err(ContentError::Invalid { field: "path", .. })));
}

// =============================================================================
// Patches
// =============================================================================

#[test]
fn empty_patches_yield_no_fields() {
    assert!(ServicePatch::default().into_fields().is_empty());
    assert!(PortfolioPatch::default().into_fields().is_empty());
    assert!(ProductPatch::default().into_fields().is_empty());
    assert!(MenuPatch::default().into_fields().is_empty());
    assert!(ContactMessagePatch::default().into_fields().is_empty());
    assert!(SiteSettingsPatch::default().into_fields().is_empty());
    assert!(HomepagePatch::default().into_fields().is_empty());
    assert!(AboutPatch::default().into_fields().is_empty());
}

#[test]
fn patch_with_blank_title_rejected() {
    let patch = ServicePatch { title: Some(String::new()), ..ServicePatch::default() };
    assert!(patch.validate().is_err());
}

#[test]
fn portfolio_patch_blank_image_clears_it() {
    let patch: PortfolioPatch = serde_json::from_str(r#"{"image_url":""}"#).unwrap();
    assert_eq!(patch.into_fields(), vec![("image_url", FieldValue::NullableText(None))]);
}

#[test]
fn site_settings_patch_only_sends_provided_fields() {
    let patch: SiteSettingsPatch = serde_json::from_str(r#"{"phone":"0812","whatsapp":""}"#).unwrap();
    assert_eq!(
        patch.into_fields(),
        vec![
            ("phone", FieldValue::NullableText(Some("0812".into()))),
            ("whatsapp", FieldValue::NullableText(None)),
        ]
    );
}

#[test]
fn about_patch_mission_cleaned() {
    let patch: AboutPatch = serde_json::from_str(r#"{"mission":["Build"," ","Support"]}"#).unwrap();
    assert_eq!(patch.into_fields(), vec![("mission", FieldValue::List(vec!["Build".into(), "Support".into()]))]);
}

#[test]
fn mark_read_patch() {
    let patch = ContactMessagePatch { is_read: Some(true) };
    assert_eq!(patch.into_fields(), vec![("is_read", FieldValue::Bool(true))]);
}

// =============================================================================
// Record metadata
// =============================================================================

#[test]
fn singleton_creation_policy() {
    assert!(<SiteSettings as Singleton>::CREATE_IF_MISSING);
    assert!(!<HomepageContent as Singleton>::CREATE_IF_MISSING);
    assert!(!<AboutContent as Singleton>::CREATE_IF_MISSING);
}

#[test]
fn contact_messages_listed_newest_first_without_active_filter() {
    assert_eq!(<ContactMessage as Collection>::ORDER_BY, "contact_messages.created_at DESC, id ASC");
    assert_eq!(<ContactMessage as Collection>::ACTIVE_COLUMN, None);
    assert_eq!(<Service as Collection>::ACTIVE_COLUMN, Some("is_active"));
}

#[test]
fn record_serializes_with_snake_case_fields() {
    let product = Product {
        id: Uuid::nil(),
        title: "POS".into(),
        description: String::new(),
        features: vec!["Offline mode".into()],
        icon: "store".into(),
        is_popular: true,
        is_active: true,
        sort_order: 1,
    };
    let json = serde_json::to_value(&product).unwrap();
    assert_eq!(json["is_popular"], true);
    assert_eq!(json["features"][0], "Offline mode");
}
