use utoipa::{
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
    Modify, OpenApi,
};

use super::api::error::ErrorResponse;
use super::api::tracking::{RecordsResponse, SampleRequest, SampleResponse};

#[derive(OpenApi)]
#[openapi(
    paths(
        super::api::tracking::list_participants,
        super::api::tracking::recent_records,
        super::api::tracking::ingest_sample,
        super::api::tracking::export_csv,
    ),
    components(
        schemas(
            SampleRequest,
            SampleResponse,
            RecordsResponse,
            ErrorResponse,
            crate::session::ParticipantSummary,
            crate::tracking::ParticipantKind,
            crate::tracking::Coordinate,
        )
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Herotrack API",
        description = "Hero-relative kinematics of tracked traffic participants",
        version = "0.1.0"
    ),
    tags(
        (name = "tracking", description = "Participants, records and sample ingestion")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "api_key",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}
