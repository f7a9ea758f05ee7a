use anyhow::Context;
use axum::{
    extract::{
        multipart::{Multipart, MultipartRejection},
        rejection::JsonRejection,
        DefaultBodyLimit, State,
    },
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use serde::Deserialize;
use soullens_core::analysis::{AnalysisError, EmotionService, ErrorBody, HealthStatus};
use soullens_core::config::{AllowedOrigin, ServerConfig};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<EmotionService>,
}

#[derive(Debug, Deserialize)]
struct TextRequest {
    #[serde(default)]
    text: Option<String>,
}

struct Upload {
    filename: String,
    bytes: Bytes,
}

pub fn router(service: Arc<EmotionService>, cfg: &ServerConfig) -> anyhow::Result<Router> {
    let state = AppState { service };

    Ok(Router::new()
        .route("/health", get(health))
        .route("/analyze_text", post(analyze_text))
        .route("/analyze_audio", post(analyze_audio))
        .with_state(state)
        .layer(DefaultBodyLimit::max(cfg.upload_limit.bytes()))
        .layer(cors_layer(cfg)?))
}

fn cors_layer(cfg: &ServerConfig) -> anyhow::Result<CorsLayer> {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if cfg.allows_any_origin() {
        return Ok(layer.allow_origin(Any));
    }

    let mut values = Vec::with_capacity(cfg.allowed_origins.len());
    for origin in &cfg.allowed_origins {
        if let AllowedOrigin::Exact(o) = origin {
            values.push(
                HeaderValue::from_str(o).with_context(|| format!("invalid CORS origin: {o}"))?,
            );
        }
    }
    Ok(layer.allow_origin(AllowOrigin::list(values)))
}

async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(state.service.health())
}

async fn analyze_text(
    State(state): State<AppState>,
    payload: Result<Json<TextRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::warn!(error = %rejection, "rejected text payload");
            let body = ErrorBody {
                error: rejection.body_text(),
            };
            return (rejection.status(), Json(body)).into_response();
        }
    };

    match request.text {
        Some(text) => Json(state.service.analyze_text(&text)).into_response(),
        None => {
            let err = AnalysisError::InvalidInput("missing `text` field".to_owned());
            tracing::warn!(error = %err, "rejected text payload");
            (StatusCode::UNPROCESSABLE_ENTITY, Json(ErrorBody::from(&err))).into_response()
        }
    }
}

/// Failures are answered with `200 {"error": ...}` so the browser client can show them.
async fn analyze_audio(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let upload = match multipart {
        Ok(mut multipart) => read_upload(&mut multipart).await,
        Err(rejection) => Err(AnalysisError::InvalidInput(rejection.body_text())),
    };
    let upload = match upload {
        Ok(upload) => upload,
        Err(err) => return audio_error(&err, None),
    };

    let filename = upload.filename.clone();
    let service = state.service.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        service.analyze_audio(upload.bytes, &upload.filename)
    })
    .await;

    match outcome {
        Ok(Ok(analysis)) => {
            tracing::info!(
                filename = %analysis.filename,
                emotion = %analysis.result.emotion,
                confidence = analysis.result.confidence,
                "audio analyzed"
            );
            Json(analysis).into_response()
        }
        Ok(Err(err)) => audio_error(&err, Some(&filename)),
        Err(join_err) => {
            tracing::error!(error = %join_err, filename = %filename, "audio analysis task failed");
            Json(ErrorBody {
                error: format!("audio analysis aborted: {join_err}"),
            })
            .into_response()
        }
    }
}

async fn read_upload(multipart: &mut Multipart) -> Result<Upload, AnalysisError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AnalysisError::InvalidInput(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_owned();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AnalysisError::InvalidInput(e.to_string()))?;
        return Ok(Upload { filename, bytes });
    }
    Err(AnalysisError::InvalidInput("missing `file` field".to_owned()))
}

fn audio_error(err: &AnalysisError, filename: Option<&str>) -> Response {
    tracing::warn!(
        error = %err,
        filename = %filename.unwrap_or("<none>"),
        "audio analysis failed"
    );
    Json(ErrorBody::from(err)).into_response()
}
