use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use lockstep::{
    CACHE_STATUS_HEADER, Resolution, SignedResponse, derive_fingerprint, validate_request,
};

use crate::gateway::error::GatewayError;
use crate::gateway::state::HandlerState;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub service_name: String,
    pub version: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupResponse {
    pub deleted_count: usize,
    pub status: String,
}

#[instrument(skip(state))]
pub async fn health_handler(State(state): State<HandlerState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service_name: state.service_name.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `POST /generate`: validate, fingerprint, resolve once, sign.
#[instrument(
    skip(state, body),
    fields(fingerprint = tracing::field::Empty, cache = tracing::field::Empty)
)]
pub async fn generate_handler(
    State(state): State<HandlerState>,
    body: Bytes,
) -> Result<Response, GatewayError> {
    let raw: serde_json::Value =
        serde_json::from_slice(&body).map_err(|e| GatewayError::MalformedJson(e.to_string()))?;
    let request = validate_request(&raw)?;

    let fingerprint = derive_fingerprint(&request);
    tracing::Span::current().record("fingerprint", tracing::field::display(&fingerprint));
    debug!(model = %request.model, seed = request.seed, "Resolving generation");

    let resolution = state.registry.resolve(&fingerprint, &request).await?;
    let status = resolution.status();
    tracing::Span::current().record("cache", status.as_header_value());

    let Resolution { entry, cache_hit } = resolution;
    let signature = state.signer.sign(&fingerprint, &entry.content);
    info!(cache_hit, hit_count = entry.hit_count, "Generation served");

    let body = SignedResponse {
        content: entry.content,
        model: entry.model,
        seed: entry.seed,
        fingerprint: fingerprint.into_string(),
        signature,
        cache_hit,
    };

    Ok((
        StatusCode::OK,
        [(CACHE_STATUS_HEADER, status.as_header_value())],
        Json(body),
    )
        .into_response())
}

/// `POST /cleanup`: run the retention sweep now.
#[instrument(skip(state))]
pub async fn cleanup_handler(
    State(state): State<HandlerState>,
) -> Result<Json<CleanupResponse>, GatewayError> {
    let report = state.sweeper.sweep().await?;
    Ok(Json(CleanupResponse {
        deleted_count: report.deleted_count,
        status: "ok".to_string(),
    }))
}

#[instrument(skip(state))]
pub async fn stats_handler(State(state): State<HandlerState>) -> Response {
    Json(state.registry.stats()).into_response()
}
