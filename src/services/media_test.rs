use super::*;

// =============================================================================
// image_extension
// =============================================================================

#[test]
fn extension_from_filename_wins() {
    assert_eq!(image_extension("image/png", Some("Brand.PNG")), Some("png".into()));
    assert_eq!(image_extension("image/jpeg", Some("photo.jpeg")), Some("jpeg".into()));
}

#[test]
fn extension_from_content_type_when_no_filename() {
    assert_eq!(image_extension("image/jpeg", None), Some("jpg".into()));
    assert_eq!(image_extension("image/svg+xml", None), Some("svg".into()));
    assert_eq!(image_extension("image/webp; charset=binary", None), Some("webp".into()));
}

#[test]
fn non_images_rejected() {
    assert_eq!(image_extension("application/pdf", Some("logo.png")), None);
    assert_eq!(image_extension("text/html", None), None);
    assert_eq!(image_extension("", None), None);
}

#[test]
fn odd_filename_extension_falls_back_to_type() {
    assert_eq!(image_extension("image/png", Some("logo.p/ng")), Some("png".into()));
    assert_eq!(image_extension("image/png", Some("logo")), Some("png".into()));
}

#[test]
fn filename_extension_must_match_image_type() {
    assert_eq!(image_extension("image/png", Some("logo.html")), Some("png".into()));
    assert_eq!(image_extension("image/png", Some("logo.jpg")), Some("png".into()));
    assert_eq!(image_extension("image/svg+xml", Some("logo.js")), Some("svg".into()));
    assert_eq!(image_extension("image/x-icon", Some("favicon.ICO")), Some("ico".into()));
}

#[test]
fn unlisted_image_types_rejected() {
    assert_eq!(image_extension("image/tiff", Some("scan.tiff")), None);
    assert_eq!(image_extension("image/", None), None);
}

#[test]
fn logo_path_format() {
    assert_eq!(logo_path(1_700_000_000_000, "png"), "logos/logo-1700000000000.png");
}

// =============================================================================
// store_logo
// =============================================================================

fn temp_media_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("sitecms-media-{name}-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[tokio::test]
async fn store_logo_writes_file_and_builds_url() {
    let dir = temp_media_dir("ok");
    let stored = store_logo(&dir, "https://site.example/", "image/png", Some("logo.png"), b"\x89PNG", 1024)
        .await
        .unwrap();

    assert!(stored.path.starts_with("logos/logo-"));
    assert!(stored.path.ends_with(".png"));
    assert_eq!(stored.public_url, format!("https://site.example/media/{}", stored.path));
    assert_eq!(std::fs::read(dir.join(&stored.path)).unwrap(), b"\x89PNG");

    std::fs::remove_dir_all(dir).unwrap();
}

#[tokio::test]
async fn store_logo_rejects_before_writing() {
    let dir = temp_media_dir("reject");

    let err = store_logo(&dir, "http://x", "text/plain", None, b"hi", 1024).await.unwrap_err();
    assert!(matches!(err, MediaError::NotAnImage));

    let err = store_logo(&dir, "http://x", "image/png", None, &[0u8; 11], 10).await.unwrap_err();
    assert!(matches!(err, MediaError::TooLarge { limit: 10 }));

    let err = store_logo(&dir, "http://x", "image/png", None, &[], 10).await.unwrap_err();
    assert!(matches!(err, MediaError::Empty));

    assert!(!dir.join(LOGO_FOLDER).exists());
    std::fs::remove_dir_all(dir).unwrap();
}
