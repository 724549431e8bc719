pub mod config;
pub mod error;
pub mod generation;
pub mod server;

pub use config::AppConfig;
pub use error::ServiceError;
pub use generation::{GeneratedImage, GenerationRequest, ImageGenerator, WorkersAiClient};
pub use server::build_router;
