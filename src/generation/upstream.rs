use async_trait::async_trait;
use reqwest::{
    Client, StatusCode,
    multipart::{Form, Part},
};
use serde::Deserialize;
use tracing::debug;

use crate::{
    config::AppConfig,
    error::ServiceError,
    generation::types::{GeneratedImage, GenerationRequest, OutboundField, ReferenceImage},
};

/// Anything that can turn a generation request into an image.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedImage, ServiceError>;
}

/// Calls a Workers AI text-to-image model over the Cloudflare REST API.
pub struct WorkersAiClient {
    client: Client,
    url: String,
    api_token: String,
}

#[derive(Debug, Deserialize)]
struct RunEnvelope {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    result: Option<RunResult>,
    #[serde(default)]
    errors: Vec<ApiMessage>,
}

#[derive(Debug, Deserialize)]
struct RunResult {
    image: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    message: String,
}

impl WorkersAiClient {
    pub fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.upstream_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            url: config.run_url(),
            api_token: config.api_token.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn build_form(request: &GenerationRequest) -> Result<Form, ServiceError> {
        request
            .outbound_fields()
            .into_iter()
            .try_fold(Form::new(), |form, field| match field {
                OutboundField::Text { name, value } => Ok(form.text(name, value)),
                OutboundField::Image(image) => {
                    let name = image.field_name();
                    Ok(form.part(name, image_part(image)?))
                }
            })
    }
}

fn image_part(image: ReferenceImage) -> Result<Part, ServiceError> {
    let file_name = image.file_name.clone().unwrap_or_else(|| image.field_name());
    let part = Part::bytes(image.data.to_vec()).file_name(file_name);
    match image.content_type {
        Some(ref mime) => Ok(part.mime_str(mime)?),
        None => Ok(part),
    }
}

/// Maps a Workers AI reply onto an image or a failure carrying the upstream message.
fn interpret(status: StatusCode, body: &str) -> Result<GeneratedImage, ServiceError> {
    let envelope = serde_json::from_str::<RunEnvelope>(body).ok();

    let upstream_message = envelope.as_ref().and_then(|env| {
        env.errors
            .iter()
            .map(|e| e.message.trim())
            .find(|m| !m.is_empty())
            .map(str::to_string)
    });

    let accepted = status.is_success()
        && envelope
            .as_ref()
            .is_some_and(|env| env.success != Some(false));
    if !accepted {
        return Err(ServiceError::Generation(upstream_message.unwrap_or_else(
            || format!("Workers AI returned {status}: {body}"),
        )));
    }

    envelope
        .and_then(|env| env.result)
        .and_then(|result| result.image)
        .map(|image| GeneratedImage { image })
        .ok_or_else(|| {
            ServiceError::Generation("Workers AI response did not contain an image".into())
        })
}

#[async_trait]
impl ImageGenerator for WorkersAiClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedImage, ServiceError> {
        let form = Self::build_form(request)?;
        debug!(url = %self.url, "Workers AI run POST");

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_token)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        interpret(status, &body)
    }
}
