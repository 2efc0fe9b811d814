use crate::resolution::{Resolution, ResolutionFilter, ResolutionServiceError, ResolutionState};
use axum::{
    Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Json, Response},
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

const VALIDATION_FAILED: &str = "Validation failed.";
const ID_NOT_POSITIVE: &str = "id must be greater than zero";
const ROUTE_ID_NOT_POSITIVE: &str = "route id must be greater than zero";
const BODY_ID_REQUIRED: &str = "body id is required";
const TITLE_REQUIRED: &str = "title is required";
const IS_DONE_NOT_BOOLEAN: &str = "isDone must be true or false";

/// JSON representation of a Resolution for list and get responses.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionJson {
    /// Unique identifier for the resolution
    id: u32,
    /// What the resolution is about
    title: String,
    /// Whether the resolution has been completed
    is_done: bool,
    /// When the resolution was created
    created_at: DateTime<Utc>,
    /// When the resolution was last updated; omitted if never updated
    #[serde(skip_serializing_if = "Option::is_none")]
    updated_at: Option<DateTime<Utc>>,
}

impl From<Resolution> for ResolutionJson {
    fn from(resolution: Resolution) -> Self {
        Self {
            id: resolution.id(),
            title: resolution.title().to_string(),
            is_done: resolution.is_done(),
            created_at: resolution.created_at(),
            updated_at: resolution.updated_at(),
        }
    }
}

/// JSON body returned after creating a resolution.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatedResolutionJson {
    id: u32,
    title: String,
    is_done: bool,
    created_at: DateTime<Utc>,
}

impl From<Resolution> for CreatedResolutionJson {
    fn from(resolution: Resolution) -> Self {
        Self {
            id: resolution.id(),
            title: resolution.title().to_string(),
            is_done: resolution.is_done(),
            created_at: resolution.created_at(),
        }
    }
}

/// JSON body returned after updating a resolution.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedResolutionJson {
    id: u32,
    title: String,
    is_done: bool,
    updated_at: Option<DateTime<Utc>>,
}

impl From<Resolution> for UpdatedResolutionJson {
    fn from(resolution: Resolution) -> Self {
        Self {
            id: resolution.id(),
            title: resolution.title().to_string(),
            is_done: resolution.is_done(),
            updated_at: resolution.updated_at(),
        }
    }
}

/// API response for listing resolutions.
#[derive(Debug, Serialize, ToSchema)]
pub struct ResolutionsResponse {
    /// Matching resolutions in creation order
    items: Vec<ResolutionJson>,
}

/// Query parameters for filtering resolutions.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionsQuery {
    #[serde(default)]
    is_done: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

/// JSON request payload for creating a resolution.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateResolutionRequest {
    #[serde(default)]
    title: Option<String>,
}

/// JSON request payload for updating a resolution.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResolutionRequest {
    /// Must match the ID in the route
    #[serde(default)]
    id: i32,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    is_done: bool,
}

/// JSON response for API errors
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error category, `BadRequest` or `NotFound`
    pub error: String,
    pub message: String,
    pub details: Vec<String>,
}

/// Errors returned by the resolution endpoints.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ResolutionApiError {
    /// The request was malformed.
    #[error("{message}")]
    BadRequest {
        message: String,
        details: Vec<String>,
    },
    /// No resolution exists with the given ID.
    #[error("resolution with id {0} not found")]
    NotFound(u32),
}

impl ResolutionApiError {
    fn validation(detail: &str) -> Self {
        Self::BadRequest {
            message: VALIDATION_FAILED.to_string(),
            details: vec![detail.to_string()],
        }
    }

    fn id_mismatch(route_id: i32, body_id: i32) -> Self {
        Self::BadRequest {
            message: "Route id does not match body id.".to_string(),
            details: vec![
                format!("route id: {}", route_id),
                format!("body id: {}", body_id),
            ],
        }
    }
}

impl From<ResolutionServiceError> for ResolutionApiError {
    fn from(err: ResolutionServiceError) -> Self {
        match err {
            ResolutionServiceError::BlankTitle => Self::validation(TITLE_REQUIRED),
            ResolutionServiceError::NotFound(id) => Self::NotFound(id),
        }
    }
}

impl IntoResponse for ResolutionApiError {
    fn into_response(self) -> Response {
        let (status_code, body) = match self {
            ResolutionApiError::BadRequest { message, details } => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error: "BadRequest".to_string(),
                    message,
                    details,
                },
            ),
            ResolutionApiError::NotFound(id) => {
                tracing::warn!("Resolution {} not found", id);
                (
                    StatusCode::NOT_FOUND,
                    ErrorResponse {
                        error: "NotFound".to_string(),
                        message: "Resource not found.".to_string(),
                        details: vec![format!("resolution with id {} not found", id)],
                    },
                )
            }
        };
        (status_code, Json(body)).into_response()
    }
}

/// Parses a boolean the way query strings spell it: `true`/`false`, any case.
fn parse_bool(raw: &str) -> Option<bool> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("true") {
        Some(true)
    } else if trimmed.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Parses a route ID, rejecting anything that is not a positive 32-bit integer.
fn parse_route_id(raw: &str, detail: &str) -> Result<i32, ResolutionApiError> {
    match raw.parse::<i32>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ResolutionApiError::validation(detail)),
    }
}

/// Reads the ID from an update body. Missing, zero or non-integer IDs count as absent.
fn read_body_id(body: &serde_json::Value) -> Option<i32> {
    body.get("id")
        .and_then(serde_json::Value::as_i64)
        .and_then(|id| i32::try_from(id).ok())
        .filter(|id| *id != 0)
}

/// Picks the detail for an update body whose fields have the wrong types.
fn invalid_update_body(body: &serde_json::Value) -> ResolutionApiError {
    match body.get("isDone") {
        Some(is_done) if !is_done.is_boolean() => {
            ResolutionApiError::validation(IS_DONE_NOT_BOOLEAN)
        }
        _ => ResolutionApiError::validation(TITLE_REQUIRED),
    }
}

fn is_blank(title: Option<&str>) -> bool {
    title.is_none_or(|title| title.trim().is_empty())
}

/// Handler for GET /api/resolutions - Lists resolutions, optionally filtered.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/api/resolutions",
    params(
        ("isDone" = Option<bool>, Query, description = "Only resolutions with this done flag"),
        ("title" = Option<String>, Query, description = "Case-insensitive title substring")
    ),
    responses(
        (status = 200, description = "Matching resolutions", body = ResolutionsResponse),
        (status = 400, description = "isDone is not a boolean", body = ErrorResponse)
    ),
    tag = "Resolutions"
)]
pub async fn list_resolutions_handler(
    State(state): State<Arc<ResolutionState>>,
    query: Result<Query<ResolutionsQuery>, QueryRejection>,
) -> Result<Json<ResolutionsResponse>, ResolutionApiError> {
    let Query(query) = query.map_err(|_| ResolutionApiError::validation(IS_DONE_NOT_BOOLEAN))?;
    let is_done = match query.is_done.as_deref() {
        None | Some("") => None,
        Some(raw) => Some(
            parse_bool(raw).ok_or_else(|| ResolutionApiError::validation(IS_DONE_NOT_BOOLEAN))?,
        ),
    };
    let filter = ResolutionFilter {
        is_done,
        title_contains: query.title,
    };

    let items = state
        .service
        .read()
        .await
        .list(&filter)
        .into_iter()
        .map(ResolutionJson::from)
        .collect();
    Ok(Json(ResolutionsResponse { items }))
}

/// Handler for GET /api/resolutions/{id} - Returns a single resolution.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/api/resolutions/{id}",
    params(("id" = i32, Path, description = "Resolution ID")),
    responses(
        (status = 200, description = "Resolution found", body = ResolutionJson),
        (status = 400, description = "Invalid ID", body = ErrorResponse),
        (status = 404, description = "Resolution not found", body = ErrorResponse)
    ),
    tag = "Resolutions"
)]
pub async fn get_resolution_handler(
    State(state): State<Arc<ResolutionState>>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<ResolutionJson>, ResolutionApiError> {
    let Path(id) = path.map_err(|_| ResolutionApiError::validation(ID_NOT_POSITIVE))?;
    let id = parse_route_id(&id, ID_NOT_POSITIVE)?;
    let resolution = state.service.read().await.get_by_id(id as u32)?;
    Ok(Json(ResolutionJson::from(resolution)))
}

/// Handler for POST /api/resolutions - Creates a resolution.
#[tracing::instrument(skip(state, payload))]
#[utoipa::path(
    post,
    path = "/api/resolutions",
    request_body = CreateResolutionRequest,
    responses(
        (status = 201, description = "Resolution created", body = CreatedResolutionJson,
            headers(("location" = String, description = "URI of the new resolution"))),
        (status = 400, description = "Missing or blank title", body = ErrorResponse)
    ),
    tag = "Resolutions"
)]
pub async fn create_resolution_handler(
    State(state): State<Arc<ResolutionState>>,
    payload: Result<Json<CreateResolutionRequest>, JsonRejection>,
) -> Result<Response, ResolutionApiError> {
    let title = match payload {
        Ok(Json(request)) if !is_blank(request.title.as_deref()) => {
            request.title.unwrap_or_default()
        }
        _ => return Err(ResolutionApiError::validation(TITLE_REQUIRED)),
    };

    let resolution = state.service.write().await.create(title)?;
    let location = format!("/api/resolutions/{}", resolution.id());
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(CreatedResolutionJson::from(resolution)),
    )
        .into_response())
}

/// Handler for PUT /api/resolutions/{id} - Replaces title and done flag.
#[tracing::instrument(skip(state, payload))]
#[utoipa::path(
    put,
    path = "/api/resolutions/{id}",
    params(("id" = i32, Path, description = "Resolution ID")),
    request_body = UpdateResolutionRequest,
    responses(
        (status = 200, description = "Resolution updated", body = UpdatedResolutionJson),
        (status = 400, description = "Invalid or mismatched IDs, bad fields", body = ErrorResponse),
        (status = 404, description = "Resolution not found", body = ErrorResponse)
    ),
    tag = "Resolutions"
)]
pub async fn update_resolution_handler(
    State(state): State<Arc<ResolutionState>>,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Json<UpdatedResolutionJson>, ResolutionApiError> {
    let Path(id) = path.map_err(|_| ResolutionApiError::validation(ROUTE_ID_NOT_POSITIVE))?;
    let route_id = parse_route_id(&id, ROUTE_ID_NOT_POSITIVE)?;

    let Ok(Json(body)) = payload else {
        return Err(ResolutionApiError::validation(BODY_ID_REQUIRED));
    };
    let body_id =
        read_body_id(&body).ok_or_else(|| ResolutionApiError::validation(BODY_ID_REQUIRED))?;
    if body_id != route_id {
        return Err(ResolutionApiError::id_mismatch(route_id, body_id));
    }
    let request =
        UpdateResolutionRequest::deserialize(&body).map_err(|_| invalid_update_body(&body))?;
    if is_blank(request.title.as_deref()) {
        return Err(ResolutionApiError::validation(TITLE_REQUIRED));
    }

    let resolution = state.service.write().await.update(
        request.id as u32,
        request.title.unwrap_or_default(),
        request.is_done,
    )?;
    Ok(Json(UpdatedResolutionJson::from(resolution)))
}

/// Handler for DELETE /api/resolutions/{id} - Removes a resolution.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    delete,
    path = "/api/resolutions/{id}",
    params(("id" = i32, Path, description = "Resolution ID")),
    responses(
        (status = 204, description = "Resolution deleted"),
        (status = 400, description = "Invalid ID", body = ErrorResponse),
        (status = 404, description = "Resolution not found", body = ErrorResponse)
    ),
    tag = "Resolutions"
)]
pub async fn delete_resolution_handler(
    State(state): State<Arc<ResolutionState>>,
    path: Result<Path<String>, PathRejection>,
) -> Result<StatusCode, ResolutionApiError> {
    let Path(id) = path.map_err(|_| ResolutionApiError::validation(ID_NOT_POSITIVE))?;
    let id = parse_route_id(&id, ID_NOT_POSITIVE)?;
    state.service.write().await.delete(id as u32)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Creates and returns the resolutions API router.
pub fn create_api_router(state: Arc<ResolutionState>) -> Router {
    Router::new()
        .route(
            "/resolutions",
            get(list_resolutions_handler).post(create_resolution_handler),
        )
        .route(
            "/resolutions/{id}",
            get(get_resolution_handler)
                .put(update_resolution_handler)
                .delete(delete_resolution_handler),
        )
        .with_state(state)
}
