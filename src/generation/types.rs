use axum::body::Bytes;
use serde::Serialize;

pub const MAX_REFERENCE_IMAGES: usize = 4;

pub const DEFAULT_STEPS: &str = "25";
pub const DEFAULT_GUIDANCE: &str = "3.5";
pub const DEFAULT_WIDTH: &str = "1024";
pub const DEFAULT_HEIGHT: &str = "768";

/// A validated, defaulted generation request. Numeric parameters stay as the
/// submitted strings and are forwarded without parsing or clamping.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub reference_images: Vec<ReferenceImage>,
    pub steps: String,
    pub guidance: String,
    pub width: String,
    pub height: String,
    pub seed: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceImage {
    /// Index taken from the `input_image_<slot>` field name.
    pub slot: usize,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl ReferenceImage {
    pub fn field_name(&self) -> String {
        format!("input_image_{}", self.slot)
    }
}

/// One field of the multipart payload sent upstream.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundField {
    Text { name: String, value: String },
    Image(ReferenceImage),
}

impl OutboundField {
    fn text(name: &str, value: &str) -> Self {
        OutboundField::Text {
            name: name.to_string(),
            value: value.to_string(),
        }
    }

    pub fn name(&self) -> String {
        match self {
            OutboundField::Text { name, .. } => name.clone(),
            OutboundField::Image(image) => image.field_name(),
        }
    }
}

impl GenerationRequest {
    /// Fields in the order they are written to the upstream form.
    pub fn outbound_fields(&self) -> Vec<OutboundField> {
        let mut fields = Vec::with_capacity(6 + self.reference_images.len());
        fields.push(OutboundField::text("prompt", &self.prompt));
        fields.extend(
            self.reference_images
                .iter()
                .cloned()
                .map(OutboundField::Image),
        );
        fields.push(OutboundField::text("steps", &self.steps));
        fields.push(OutboundField::text("guidance", &self.guidance));
        fields.push(OutboundField::text("width", &self.width));
        fields.push(OutboundField::text("height", &self.height));
        if let Some(ref seed) = self.seed {
            fields.push(OutboundField::text("seed", seed));
        }
        fields
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedImage {
    /// Base64-encoded PNG, exactly as returned upstream.
    pub image: String,
}

#[derive(Debug, Serialize)]
pub struct GenerationResponse {
    pub success: bool,
    pub image: String,
}

impl From<GeneratedImage> for GenerationResponse {
    fn from(generated: GeneratedImage) -> Self {
        Self {
            success: true,
            image: generated.image,
        }
    }
}
