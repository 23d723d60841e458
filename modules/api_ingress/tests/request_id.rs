use axum::{
    body::Body,
    extract::Extension,
    http::{Request, StatusCode},
    response::Json,
    routing::get,
    Router,
};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tower::util::ServiceExt; // for `oneshot`

use api_ingress::{request_id::XRequestId, ApiIngress};
use modkit::{ModuleCtxBuilder, Problem, ProblemResponse, RequestMeta, RestHostModule};

#[tokio::test]
async fn generates_request_id_when_missing() {
    let app = test_app();

    let response = app
        .oneshot(Request::builder().uri("/test").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let request_id = response
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_owned();
    assert!(!request_id.is_empty(), "x-request-id should be generated");

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["request_id"], request_id);
}

#[tokio::test]
async fn preserves_incoming_request_id() {
    let app = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("x-request-id", "abc-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let request_id = response
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok());
    assert_eq!(request_id, Some("abc-123"));
}

#[tokio::test]
async fn includes_request_id_in_problem() {
    let app = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/error")
                .header("x-request-id", "error-test-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let request_id = response
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok());
    assert_eq!(request_id, Some("error-test-123"));

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], 500);
    assert_eq!(json["instance"], "/error");
    assert_eq!(json["requestId"], "error-test-123");
}

// Routes wrapped by the ingress host exactly as in the REST phase
fn test_app() -> Router {
    let ingress = ApiIngress::default();
    let ctx = ModuleCtxBuilder::new(CancellationToken::new()).build();

    let routes = Router::new()
        .route("/test", get(success_handler))
        .route("/error", get(error_handler));

    let router = ingress.rest_prepare(&ctx, routes).unwrap();
    ingress.rest_finalize(&ctx, router).unwrap()
}

async fn success_handler(
    Extension(XRequestId(request_id)): Extension<XRequestId>,
) -> Json<serde_json::Value> {
    Json(json!({"status": "ok", "request_id": request_id}))
}

async fn error_handler(meta: RequestMeta) -> ProblemResponse {
    Problem::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", "Test error")
        .with_code("TEST_ERROR")
        .for_request(&meta)
        .into()
}
