mod form;
mod types;
mod upstream;

pub use form::{FormPart, InboundForm};
pub use types::{
    DEFAULT_GUIDANCE, DEFAULT_HEIGHT, DEFAULT_STEPS, DEFAULT_WIDTH, GeneratedImage,
    GenerationRequest, GenerationResponse, MAX_REFERENCE_IMAGES, OutboundField, ReferenceImage,
};
pub use upstream::{ImageGenerator, WorkersAiClient};
