use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode};
use resolutions_server::resolution::ResolutionState;
use resolutions_server::web::create_app;
use std::sync::Arc;
use tower::ServiceExt;

/// Status, headers and decoded JSON body of a test response.
pub struct JsonResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: serde_json::Value,
}

/// Creates the application router backed by an empty store.
pub fn setup() -> Router {
    // Allow multiple calls to init for tests.
    let _ = tracing_subscriber::fmt().try_init();
    create_app(Arc::new(ResolutionState::default()))
}

/// Sends a request through a clone of the router and decodes the JSON body.
/// Empty bodies decode to `Value::Null`.
pub async fn send(app: &Router, request: Request<Body>) -> JsonResponse {
    let response = app.clone().oneshot(request).await.unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    JsonResponse {
        status,
        headers,
        body,
    }
}

pub fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}
