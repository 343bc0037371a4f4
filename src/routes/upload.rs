// POST /upload — multipart screenshot upload

use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

use super::AppState;
use crate::config::UploadConfig;
use crate::error::ApiError;
use crate::models::{NewImage, NewScreenshot, image_content_type};

/// Multipart fields as received; validated by [`UploadForm::validate`].
#[derive(Debug, Default)]
pub(crate) struct UploadForm {
    pub(crate) computer_name: Option<String>,
    pub(crate) system: Option<String>,
    pub(crate) processor: Option<String>,
    pub(crate) public_ip: Option<String>,
    pub(crate) location: Option<String>,
    pub(crate) image: Option<Vec<u8>>,
    pub(crate) image_content_type: Option<String>,
}

impl UploadForm {
    /// All five text fields must be non-blank; the image is required when `require_image` is set.
    pub(crate) fn validate(self, config: &UploadConfig) -> Result<NewScreenshot, ApiError> {
        fn present(v: Option<String>) -> Option<String> {
            v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
        }

        let computer_name = present(self.computer_name);
        let system = present(self.system);
        let processor = present(self.processor);
        let public_ip = present(self.public_ip);
        let location = present(self.location);
        let image = self.image.filter(|b| !b.is_empty());

        let mut missing = Vec::new();
        for (name, value) in [
            ("computer_name", &computer_name),
            ("system", &system),
            ("processor", &processor),
            ("public_ip", &public_ip),
            ("location", &location),
        ] {
            if value.is_none() {
                missing.push(name);
            }
        }
        if config.require_image && image.is_none() {
            missing.push("image_file");
        }

        match (computer_name, system, processor, public_ip, location) {
            (Some(computer_name), Some(system), Some(processor), Some(public_ip), Some(location))
                if missing.is_empty() =>
            {
                let image = image.map(|bytes| NewImage {
                    bytes,
                    content_type: self
                        .image_content_type
                        .as_deref()
                        .and_then(image_content_type)
                        .unwrap_or_else(|| config.default_content_type.clone()),
                });
                Ok(NewScreenshot {
                    computer_name,
                    system,
                    processor,
                    public_ip,
                    location,
                    image,
                })
            }
            _ => Err(ApiError::Validation(format!(
                "Missing required data: {}",
                missing.join(", ")
            ))),
        }
    }
}

pub(super) async fn upload_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let mut multipart = multipart?;
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().map(|n| n.to_string());
        match field_name.as_deref() {
            Some("image_file") => {
                form.image_content_type = field.content_type().map(|c| c.to_string());
                form.image = Some(field.bytes().await?.to_vec());
            }
            Some("computer_name") => form.computer_name = Some(field.text().await?),
            Some("system") => form.system = Some(field.text().await?),
            Some("processor") => form.processor = Some(field.text().await?),
            Some("public_ip") => form.public_ip = Some(field.text().await?),
            Some("location") => form.location = Some(field.text().await?),
            _ => {} // ignore unknown fields
        }
    }

    let new = form.validate(&state.config.upload)?;
    let id = state.repo.insert(&new).await?;
    tracing::info!(
        id,
        computer_name = %new.computer_name,
        location = %new.location,
        "screenshot stored"
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Screenshot data saved successfully",
            "id": id,
        })),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_form() -> UploadForm {
        UploadForm {
            computer_name: Some("MyPC".into()),
            system: Some("Windows 10".into()),
            processor: Some("Intel Core i7".into()),
            public_ip: Some("192.168.1.1".into()),
            location: Some("New York, USA".into()),
            image: Some(vec![0x89, b'P', b'N', b'G']),
            image_content_type: None,
        }
    }

    #[test]
    fn complete_form_validates_with_default_content_type() {
        let new = full_form().validate(&UploadConfig::default()).unwrap();
        assert_eq!(new.computer_name, "MyPC");
        let image = new.image.unwrap();
        assert_eq!(image.content_type, "image/png");
        assert_eq!(image.bytes.len(), 4);
    }

    #[test]
    fn blank_fields_are_reported() {
        let mut form = full_form();
        form.system = Some("   ".into());
        form.location = None;
        let err = form.validate(&UploadConfig::default()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("system"), "{msg}");
        assert!(msg.contains("location"), "{msg}");
        assert!(!msg.contains("processor"), "{msg}");
    }

    #[test]
    fn image_requirement_follows_config() {
        let mut form = full_form();
        form.image = Some(vec![]);
        let err = form.validate(&UploadConfig::default()).unwrap_err();
        assert!(err.to_string().contains("image_file"));

        let mut form = full_form();
        form.image = None;
        let lenient = UploadConfig {
            require_image: false,
            ..UploadConfig::default()
        };
        let new = form.validate(&lenient).unwrap();
        assert!(new.image.is_none());
    }

    #[test]
    fn declared_content_type_is_kept() {
        let mut form = full_form();
        form.image_content_type = Some("Image/JPEG; charset=binary".into());
        let new = form.validate(&UploadConfig::default()).unwrap();
        assert_eq!(new.image.unwrap().content_type, "image/jpeg");
    }

    #[test]
    fn non_image_content_types_fall_back_to_default() {
        for declared in ["text/html", "image/svg+xml", "application/javascript", "image/", ""] {
            let mut form = full_form();
            form.image_content_type = Some(declared.into());
            let new = form.validate(&UploadConfig::default()).unwrap();
            assert_eq!(new.image.unwrap().content_type, "image/png", "{declared}");
        }
    }
}
