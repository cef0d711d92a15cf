use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config::Permission;
use crate::session::ParticipantSummary;
use crate::tracking::{Coordinate, ParticipantId};
use crate::web::api::error::{ApiError, ApiResult, ErrorResponse};
use crate::web::auth::{require_permission, AuthenticatedUser};
use crate::web::server::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct SampleRequest {
    pub id: ParticipantId,
    /// Seconds
    pub timestamp: f64,
    pub position: Coordinate,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SampleResponse {
    /// Whether the sample produced a record inside the relevance radius.
    pub retained: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RecordsResponse {
    /// `[id, velocity, orientation, angular_speed, acceleration,
    /// distance_to_hero, angle_to_hero]` per record, oldest first.
    #[schema(value_type = Vec<Vec<Object>>)]
    pub records: Vec<serde_json::Value>,
}

#[utoipa::path(
    get,
    path = "/api/participants",
    responses(
        (status = 200, description = "Tracked participants", body = Vec<ParticipantSummary>)
    ),
    tag = "tracking"
)]
pub async fn list_participants(State(state): State<AppState>) -> Json<Vec<ParticipantSummary>> {
    Json(state.session.participants())
}

#[utoipa::path(
    get,
    path = "/api/records",
    responses(
        (status = 200, description = "Recently dispatched records", body = RecordsResponse)
    ),
    tag = "tracking"
)]
pub async fn recent_records(State(state): State<AppState>) -> Json<RecordsResponse> {
    let records = state
        .recent
        .snapshot()
        .iter()
        .filter_map(|r| serde_json::from_str(r).ok())
        .collect();
    Json(RecordsResponse { records })
}

#[utoipa::path(
    post,
    path = "/api/samples",
    request_body = SampleRequest,
    security(
        ("api_key" = [])
    ),
    responses(
        (status = 200, description = "Sample ingested", body = SampleResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse)
    ),
    tag = "tracking"
)]
pub async fn ingest_sample(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<SampleRequest>,
) -> ApiResult<Json<SampleResponse>> {
    require_permission(&user, Permission::IngestSamples)?;

    let p = request.position;
    if !(request.timestamp.is_finite() && p.x.is_finite() && p.y.is_finite() && p.z.is_finite()) {
        return Err(ApiError::Validation("non_finite_sample".into()));
    }

    let retained = state
        .session
        .process(request.id, request.timestamp, request.position)
        .is_some();
    Ok(Json(SampleResponse { retained }))
}

#[utoipa::path(
    get,
    path = "/api/export",
    responses(
        (status = 200, description = "CSV export of all record buffers", body = String, content_type = "text/csv"),
        (status = 500, description = "Export failed", body = ErrorResponse)
    ),
    tag = "tracking"
)]
pub async fn export_csv(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let csv = state.session.csv_string()?;
    Ok(([(header::CONTENT_TYPE, "text/csv")], csv))
}
