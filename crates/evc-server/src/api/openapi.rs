//! OpenAPI document aggregation. Only the liveness endpoint carries full
//! schema annotations; the conversational and account endpoints evolve too
//! quickly in this deployment to be worth keeping an authoritative schema
//! for, so the rest of the surface is documented in the repository root
//! README instead.

use utoipa::OpenApi;

use crate::api::routes::health;

#[derive(OpenApi)]
#[openapi(
    paths(health::health_check),
    components(schemas(health::HealthResponse)),
    tags((name = "evc", description = "Emotional Value Core conversational API"))
)]
pub struct ApiDoc;
