use std::path::PathBuf;

use airmap::Catalog;
use airmap_server::{router, AppState, ServerConfig};
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

fn app(config: &ServerConfig) -> Router {
    router(AppState::new(Catalog::builtin().unwrap()), config)
}

fn generate(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/api/maps/generate")
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

async fn send_json(request: Request<Body>) -> (StatusCode, Value) {
    let (status, body) = send(app(&ServerConfig::default()), request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn generates_maps() {
    let request = json!({
        "dataset": "Ozone",
        "selected_regions": ["Pune", "Satara"],
        "selected_years": [2021],
        "selected_classes": ["low", "medium"]
    });
    let (status, body) = send_json(generate(request.to_string())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["dataset"], "Ozone");
    assert_eq!(
        body["urls"]["Satara - 2021-02"],
        "https://tiles.airmap.example/ozone/satara/2021-02/{z}/{x}/{y}.png"
    );
    assert_eq!(body["urls"].as_object().unwrap().len(), 4);
    assert_eq!(body["stats"]["Pune - 2021-02"], Value::Null);
    assert_eq!(body["legends"], json!({"low": "blue", "medium": "green"}));
    assert_eq!(body["selected_regions"], json!(["Pune", "Satara"]));
    assert_eq!(body["geojson_data"]["features"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn validation_errors_are_bad_requests() {
    let request = json!({
        "dataset": "Ozone",
        "selected_regions": ["Pune"],
        "selected_years": [],
        "selected_classes": ["low"]
    });
    let (status, body) = send_json(generate(request.to_string())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"success": false, "error": "Please select at least one year"})
    );
}

#[tokio::test]
async fn malformed_bodies_are_bad_requests() {
    let (status, body) = send_json(generate("{\"dataset\": ")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required parameters");

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/maps/generate")
        .body(Body::from("{}"))
        .unwrap();
    let (status, body) = send_json(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn missing_data_is_not_found() {
    let request = json!({
        "dataset": "NO2",
        "selected_regions": ["Atlantis"],
        "selected_years": [2019],
        "selected_classes": ["low"]
    });
    let (status, body) = send_json(generate(request.to_string())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "No data available for region: Atlantis");

    let request = json!({
        "dataset": "NO2",
        "selected_regions": ["Delhi"],
        "selected_years": [2030],
        "selected_classes": ["low"]
    });
    let (status, body) = send_json(generate(request.to_string())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "No map data found for the selected criteria");
}

#[tokio::test]
async fn health() {
    let request = Request::get("/health").body(Body::empty()).unwrap();
    let (status, body) = send(app(&ServerConfig::default()), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"ok");
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let request = Request::get("/health")
        .header(header::ORIGIN, "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app(&ServerConfig::default()).oneshot(request).await.unwrap();
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}

#[tokio::test]
async fn client_bundle_is_served_only_in_production() {
    let request = || Request::get("/maps/ozone").body(Body::empty()).unwrap();

    let (status, _) = send(app(&ServerConfig::default()), request()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let production = ServerConfig {
        production: true,
        static_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/static"),
        ..ServerConfig::default()
    };
    let (status, body) = send(app(&production), request()).await;
    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8(body).unwrap().contains("Air Quality Maps"));

    // API routes still win over the bundle.
    let (status, _) = send(app(&production), generate("{}")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
