use axum::extract::State;
use serde::Serialize;

use crate::api::state::{AppState, EngineStatus};
use crate::api::v1::response::ApiResponse;
use crate::ocr::Binarization;

/// Health data returned inside the v1 envelope.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthData {
    pub status: String,
    pub version: String,
    pub engine: EngineHealth,
    pub default_language: String,
    pub binarization: Binarization,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct EngineHealth {
    pub name: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// `GET /api/v1/health`
///
/// Engine availability reflects the probe taken at startup; it is not re-run
/// per request.
#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "health",
    responses(
        (status = 200, description = "Service health status", body = HealthData),
    )
)]
pub async fn health_check(State(state): State<AppState>) -> ApiResponse<HealthData> {
    let name = state.pipeline.extractor().engine_name().to_string();
    let engine = match &state.engine {
        EngineStatus::Available => EngineHealth {
            name,
            status: "available".to_string(),
            reason: None,
        },
        EngineStatus::Unavailable { reason } => EngineHealth {
            name,
            status: "unavailable".to_string(),
            reason: Some(reason.clone()),
        },
    };

    let status = if state.engine.is_available() {
        "ok"
    } else {
        "degraded"
    };

    ApiResponse::success(HealthData {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        engine,
        default_language: state.config.ocr.default_language.to_string(),
        binarization: state.pipeline.normalizer().binarization(),
    })
}
