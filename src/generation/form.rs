use axum::body::Bytes;
use axum::extract::Multipart;

use crate::{
    error::ServiceError,
    generation::types::{
        DEFAULT_GUIDANCE, DEFAULT_HEIGHT, DEFAULT_STEPS, DEFAULT_WIDTH, GenerationRequest,
        MAX_REFERENCE_IMAGES, ReferenceImage,
    },
};

#[derive(Debug, Clone, PartialEq)]
pub struct FormPart {
    pub name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl FormPart {
    pub fn text(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            file_name: None,
            content_type: None,
            data: Bytes::copy_from_slice(value.as_bytes()),
        }
    }

    pub fn file(name: &str, file_name: &str, content_type: &str, data: &[u8]) -> Self {
        Self {
            name: name.to_string(),
            file_name: Some(file_name.to_string()),
            content_type: Some(content_type.to_string()),
            data: Bytes::copy_from_slice(data),
        }
    }

    fn as_text(&self) -> String {
        String::from_utf8_lossy(&self.data).into_owned()
    }
}

/// The inbound multipart body, buffered in submission order.
#[derive(Debug, Default, Clone)]
pub struct InboundForm {
    parts: Vec<FormPart>,
}

impl InboundForm {
    pub fn new(parts: Vec<FormPart>) -> Self {
        Self { parts }
    }

    pub async fn read(mut multipart: Multipart) -> Result<Self, ServiceError> {
        let mut parts = Vec::new();
        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            let file_name = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);
            let data = field.bytes().await?;
            parts.push(FormPart {
                name,
                file_name,
                content_type,
                data,
            });
        }
        Ok(Self { parts })
    }

    /// First part with the given name.
    pub fn get(&self, name: &str) -> Option<&FormPart> {
        self.parts.iter().find(|part| part.name == name)
    }

    /// Text value of a field; an empty value reads the same as a missing one.
    pub fn text(&self, name: &str) -> Option<String> {
        self.get(name)
            .map(FormPart::as_text)
            .filter(|value| !value.is_empty())
    }
}

impl GenerationRequest {
    pub fn from_form(form: &InboundForm) -> Result<Self, ServiceError> {
        let prompt = form.text("prompt").ok_or_else(ServiceError::missing_prompt)?;

        let reference_images = (0..MAX_REFERENCE_IMAGES)
            .filter_map(|slot| {
                let part = form.get(&format!("input_image_{slot}"))?;
                // Only file uploads count; a plain text part under this name is ignored.
                (part.file_name.is_some() && !part.data.is_empty()).then(|| ReferenceImage {
                    slot,
                    file_name: part.file_name.clone(),
                    content_type: part.content_type.clone(),
                    data: part.data.clone(),
                })
            })
            .collect();

        let or_default =
            |name: &str, default: &str| form.text(name).unwrap_or_else(|| default.to_string());

        Ok(Self {
            prompt,
            reference_images,
            steps: or_default("steps", DEFAULT_STEPS),
            guidance: or_default("guidance", DEFAULT_GUIDANCE),
            width: or_default("width", DEFAULT_WIDTH),
            height: or_default("height", DEFAULT_HEIGHT),
            seed: form.text("seed"),
        })
    }
}
