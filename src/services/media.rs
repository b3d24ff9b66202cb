//! Uploaded media (site logo) stored on local disk.
//!
//! DESIGN
//! ======
//! Files land under `MEDIA_DIR/logos/` with a millisecond timestamp name and
//! are served statically at `/media/...`. The upload body is the raw file;
//! the content type decides which extensions are accepted.
//!
//! ERROR HANDLING
//! ==============
//! Type and size checks run before anything touches the filesystem.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

pub const LOGO_FOLDER: &str = "logos";

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("only image uploads are allowed")]
    NotAnImage,
    #[error("file exceeds {limit} bytes")]
    TooLarge { limit: usize },
    #[error("empty upload")]
    Empty,
    #[error("storage error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredMedia {
    /// Path relative to the media root, e.g. `logos/logo-1700000000000.png`.
    pub path: String,
    pub public_url: String,
}

/// Accepted image subtypes: stored extension first, then other extensions
/// a filename may carry for the same type.
const IMAGE_TYPES: &[(&str, &[&str])] = &[
    ("png", &["png"]),
    ("jpeg", &["jpg", "jpeg"]),
    ("pjpeg", &["jpg", "jpeg"]),
    ("gif", &["gif"]),
    ("webp", &["webp"]),
    ("avif", &["avif"]),
    ("svg+xml", &["svg"]),
    ("x-icon", &["ico"]),
    ("vnd.microsoft.icon", &["ico"]),
];

/// File extension for an accepted image content type.
///
/// The filename's extension is kept only when it matches the content type;
/// anything else is stored under the type's own extension.
#[must_use]
pub fn image_extension(content_type: &str, filename: Option<&str>) -> Option<String> {
    let mime = content_type.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
    let subtype = mime.strip_prefix("image/")?;
    let (_, extensions) = IMAGE_TYPES.iter().find(|(name, _)| *name == subtype)?;

    let from_name = filename
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .filter(|ext| extensions.contains(&ext.as_str()));

    Some(from_name.unwrap_or_else(|| extensions[0].to_owned()))
}

#[must_use]
pub fn logo_path(millis: u128, ext: &str) -> String {
    format!("{LOGO_FOLDER}/logo-{millis}.{ext}")
}

/// Validate and write an uploaded logo.
///
/// # Errors
///
/// Returns `NotAnImage`, `Empty`, `TooLarge`, or an I/O error.
pub async fn store_logo(
    media_dir: &Path,
    public_base_url: &str,
    content_type: &str,
    filename: Option<&str>,
    bytes: &[u8],
    max_bytes: usize,
) -> Result<StoredMedia, MediaError> {
    let ext = image_extension(content_type, filename).ok_or(MediaError::NotAnImage)?;
    if bytes.is_empty() {
        return Err(MediaError::Empty);
    }
    if bytes.len() > max_bytes {
        return Err(MediaError::TooLarge { limit: max_bytes });
    }

    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let path = logo_path(millis, &ext);
    let target: PathBuf = media_dir.join(&path);

    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&target, bytes).await?;
    tracing::info!(%path, size = bytes.len(), "logo stored");

    let public_url = format!("{}/media/{path}", public_base_url.trim_end_matches('/'));
    Ok(StoredMedia { path, public_url })
}

#[cfg(test)]
#[path = "media_test.rs"]
mod tests;
