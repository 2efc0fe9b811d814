use axum::http::{Method, StatusCode};
use resolutions_server::web::api::ApiDoc;
use tower::ServiceExt;
use utoipa::OpenApi;

mod common;

use common::{empty_request, send, setup};

#[tokio::test]
async fn can_check_health_endpoint() {
    let app = setup();

    let response = app
        .oneshot(empty_request(Method::GET, "/health"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(std::str::from_utf8(&body).unwrap(), "OK");
}

#[tokio::test]
async fn can_serve_openapi_document() {
    let app = setup();

    let response = send(&app, empty_request(Method::GET, "/api-docs/openapi.json")).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.headers.get("content-type").unwrap(),
        "application/json"
    );
    let paths = response.body["paths"].as_object().unwrap();
    assert!(paths.contains_key("/api/resolutions"));
    assert!(paths.contains_key("/api/resolutions/{id}"));
    let item = &paths["/api/resolutions/{id}"];
    assert!(item.get("get").is_some());
    assert!(item.get("put").is_some());
    assert!(item.get("delete").is_some());
}

#[test]
fn openapi_document_describes_error_schema() {
    let doc = ApiDoc::openapi();
    let schemas = &doc.components.expect("components").schemas;

    assert!(schemas.contains_key("ErrorResponse"));
    assert!(schemas.contains_key("ResolutionJson"));
}
