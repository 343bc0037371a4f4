use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Serialize, Serializer};

/// One stored screenshot. `image_file` is only populated when the query projected it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Screenshot {
    pub id: i64,
    pub computer_name: String,
    pub system: String,
    pub processor: String,
    pub public_ip: String,
    pub location: String,
    pub content_type: Option<String>,
    /// UTC, `YYYY-MM-DD HH:MM:SS.SSS`.
    pub timestamp: String,
    /// Raw bytes; serialized as standard base64.
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_base64"
    )]
    pub image_file: Option<Vec<u8>>,
}

fn serialize_base64<S: Serializer>(bytes: &Option<Vec<u8>>, s: S) -> Result<S::Ok, S::Error> {
    match bytes {
        Some(b) => s.serialize_str(&STANDARD.encode(b)),
        None => s.serialize_none(),
    }
}

/// Validated upload, ready for insert.
#[derive(Debug, Clone)]
pub struct NewScreenshot {
    pub computer_name: String,
    pub system: String,
    pub processor: String,
    pub public_ip: String,
    pub location: String,
    pub image: Option<NewImage>,
}

#[derive(Debug, Clone)]
pub struct NewImage {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Normalizes a declared MIME type to a servable image type: lowercased, parameters dropped.
/// `None` for anything outside `image/*` and for SVG, which browsers execute as a document.
pub fn image_content_type(declared: &str) -> Option<String> {
    let essence = declared
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    let subtype = essence.strip_prefix("image/")?;
    let valid = !subtype.is_empty()
        && !subtype.starts_with("svg")
        && subtype
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '+' | '-'));
    valid.then_some(essence)
}

/// Image payload as read back for `GET /image/{id}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}
