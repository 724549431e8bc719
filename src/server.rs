use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Request, State, multipart::MultipartRejection},
    http::{HeaderValue, Method, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::{
    config::AppConfig,
    error::ServiceError,
    generation::{GenerationRequest, GenerationResponse, ImageGenerator, InboundForm},
};

pub const INDEX_HTML: &str = include_str!("../static/index.html");

#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<dyn ImageGenerator>,
}

pub fn build_router(config: Arc<AppConfig>, generator: Arc<dyn ImageGenerator>) -> Router {
    let state = AppState { generator };

    Router::new()
        .route("/", get(index).head(not_found).fallback(not_found))
        .route("/api/generate", post(generate).fallback(not_found))
        .fallback(not_found)
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(middleware::from_fn(preflight))
        .layer(TraceLayer::new_for_http())
}

/// Answers every OPTIONS request, whatever the path, before routing.
async fn preflight(request: Request, next: Next) -> Response {
    if request.method() != Method::OPTIONS {
        return next.run(request).await;
    }

    let mut response = StatusCode::NO_CONTENT.into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    response
}

async fn index() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/html;charset=UTF-8")],
        INDEX_HTML,
    )
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not Found")
}

async fn generate(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, ServiceError> {
    let result = run_generation(state.generator.as_ref(), multipart).await;

    match result {
        Ok(response) => Ok((
            [(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")],
            Json(response),
        )),
        Err(err) => {
            match err {
                ServiceError::Validation(ref message) => {
                    warn!(%message, "rejected generation request")
                }
                ServiceError::Generation(ref message) => {
                    error!(%message, "image generation failed")
                }
            }
            Err(err)
        }
    }
}

async fn run_generation(
    generator: &dyn ImageGenerator,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<GenerationResponse, ServiceError> {
    let form = InboundForm::read(multipart?).await?;
    let request = GenerationRequest::from_form(&form)?;

    info!(
        images = request.reference_images.len(),
        seeded = request.seed.is_some(),
        "forwarding generation request"
    );

    let generated = generator.generate(&request).await?;
    Ok(generated.into())
}
