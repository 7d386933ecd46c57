//! Tests de forma de la API sobre un router stub
//!
//! No levantan base de datos: comprueban el contrato HTTP (códigos de
//! estado y estructura JSON) con handlers de prueba autocontenidos.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

#[tokio::test]
async fn test_health_check() {
    let app = create_test_app();

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["service"], "fleet-tracker");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_detection_requires_authorization_header() {
    let app = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/anomaly/detect")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_detection_report_shape() {
    let app = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/anomaly/detect")
                .header("authorization", "Bearer test-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(body["success"], true);
    assert!(body["data"]["created_count"].is_number());
    assert!(body["data"]["anomalies"].is_array());
}

#[tokio::test]
async fn test_unknown_route_returns_404() {
    let app = create_test_app();

    let response = app
        .oneshot(Request::builder().uri("/api/unknown").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// Función helper para crear la app de test
fn create_test_app() -> Router {
    Router::new()
        .route("/health", get(stub_health))
        .route("/api/anomaly/detect", post(stub_detect))
}

async fn stub_health() -> Json<Value> {
    Json(json!({
        "service": "fleet-tracker",
        "status": "healthy"
    }))
}

async fn stub_detect(headers: axum::http::HeaderMap) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    if !headers.contains_key("authorization") {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "Unauthorized",
                "message": "Missing Authorization header",
                "code": "UNAUTHORIZED"
            })),
        ));
    }

    Ok(Json(json!({
        "success": true,
        "message": "Anomaly detection completed. Found 0 anomalies.",
        "data": {
            "created_count": 0,
            "anomalies": []
        }
    })))
}
