use std::sync::Arc;

use axum::Router;
use utoipa::OpenApi;

use crate::resolution::{self, ResolutionState};

/// OpenAPI document for the JSON API.
#[derive(OpenApi)]
#[openapi(
    paths(
        resolution::api::list_resolutions_handler,
        resolution::api::get_resolution_handler,
        resolution::api::create_resolution_handler,
        resolution::api::update_resolution_handler,
        resolution::api::delete_resolution_handler,
    ),
    components(schemas(
        resolution::api::ResolutionJson,
        resolution::api::CreatedResolutionJson,
        resolution::api::UpdatedResolutionJson,
        resolution::api::ResolutionsResponse,
        resolution::api::CreateResolutionRequest,
        resolution::api::UpdateResolutionRequest,
        resolution::api::ErrorResponse,
    )),
    tags((name = "Resolutions", description = "Track resolutions and whether they are done"))
)]
pub struct ApiDoc;

/// Creates the API routes for JSON API endpoints.
pub fn create_api_router(resolution_state: Arc<ResolutionState>) -> Router {
    let resolutions_router = resolution::api::create_api_router(resolution_state);
    Router::new().nest("/api", resolutions_router)
}
