//! Integration test: Server API endpoints

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use classifier_playground::data::DatasetStore;
use classifier_playground::server::{create_router, AppState, ServerConfig};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

const BOUNDARY: &str = "playground-test-boundary";

fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        dataset_dir: "unused".to_string(),
        max_upload_size: 10 * 1024 * 1024,
    }
}

fn test_app() -> axum::Router {
    let config = test_config();
    let state = Arc::new(AppState::with_store(config.clone(), DatasetStore::in_memory()));
    create_router(state, &config)
}

fn fs_app(dir: &std::path::Path) -> axum::Router {
    let config = ServerConfig {
        dataset_dir: dir.display().to_string(),
        ..test_config()
    };
    let state = Arc::new(AppState::new(config.clone()));
    create_router(state, &config)
}

async fn send(app: axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn upload_request(name: &str, csv: &str) -> Request<Body> {
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"name\"\r\n\r\n{name}\r\n\
         --{b}\r\nContent-Disposition: form-data; name=\"dataset\"; filename=\"data.csv\"\r\n\
         Content-Type: text/csv\r\n\r\n{csv}\r\n--{b}--\r\n",
        b = BOUNDARY,
        name = name,
        csv = csv,
    );
    Request::builder()
        .method("POST")
        .uri("/upload-dataset")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

const TOY_CSV: &str = "f1,f2,target\n1.0,2.0,0\n2.0,1.0,1\n3.0,0.5,0\n4.0,4.0,1\n5.0,5.5,0\n";

#[tokio::test]
async fn test_root_endpoint() {
    let (status, body) = send(test_app(), get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "backend is up and running"}));
}

#[tokio::test]
async fn test_health_endpoint() {
    let (status, body) = send(test_app(), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["uptime_secs"].as_i64().unwrap() >= 0);
}

#[tokio::test]
async fn test_list_datasets() {
    let (status, body) = send(test_app(), get("/list-datasets")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"datasets": ["iris", "wine", "breast_cancer"]}));
}

#[tokio::test]
async fn test_preview_builtin() {
    let (status, body) = send(test_app(), get("/dataset-preview/iris?preview_size=3")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["n_samples"], 150);
    assert_eq!(body["n_features"], 4);
    assert_eq!(body["n_classes"], 3);
    assert_eq!(body["samples"].as_array().unwrap().len(), 3);

    let (_, again) = send(test_app(), get("/dataset-preview/iris?preview_size=3")).await;
    assert_eq!(body, again);
}

#[tokio::test]
async fn test_preview_errors() {
    let (status, body) = send(test_app(), get("/dataset-preview/unknown?preview_size=3")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], true);

    let (status, _) = send(test_app(), get("/dataset-preview/iris?preview_size=151")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(test_app(), get("/dataset-preview/iris?preview_size=0")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(test_app(), get("/dataset-preview/iris")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_then_list_preview_and_train() {
    let dir = tempfile::tempdir().unwrap();

    let (status, body) = send(fs_app(dir.path()), upload_request("toy", TOY_CSV)).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["message"], "Dataset 'toy' uploaded successfully");
    assert_eq!(body["rows"], 5);
    assert_eq!(body["features"], 2);
    assert!(dir.path().join("toy.csv").is_file());

    let (_, body) = send(fs_app(dir.path()), get("/list-datasets")).await;
    assert_eq!(body, json!({"datasets": ["iris", "wine", "breast_cancer", "toy"]}));

    let (status, body) = send(fs_app(dir.path()), get("/dataset-preview/toy?preview_size=5")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["n_classes"], 2);

    let request = json!({
        "model_name": "decision_tree",
        "hyperparameters": {},
        "dataset_name": "toy"
    });
    let (status, body) = send(fs_app(dir.path()), post_json("/train", request)).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    let accuracy = body["accuracy"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&accuracy));
}

#[tokio::test]
async fn test_preview_rejects_encoded_parent_path() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("secret.csv"), TOY_CSV).unwrap();
    let datasets = dir.path().join("datasets");

    let (status, body) = send(fs_app(&datasets), get("/dataset-preview/..%2Fsecret?preview_size=1")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], true);
}

#[tokio::test]
async fn test_upload_schema_violation() {
    let (status, body) = send(test_app(), upload_request("bad", "f1,label\n1,0\n2,1\n")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Dataset must include 'target' column.");

    let (status, body) = send(test_app(), upload_request("bad", "f1,target\n1,0\n2,0\n")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Target must have at least 2 distinct classes.");
}

#[tokio::test]
async fn test_upload_reserved_name() {
    let (status, _) = send(test_app(), upload_request("iris", TOY_CSV)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_train_builtin_default_dataset() {
    let request = json!({
        "model_name": "knn",
        "hyperparameters": {"n_neighbors": 5}
    });
    let (status, body) = send(test_app(), post_json("/train", request)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["accuracy"].as_f64().unwrap() > 0.5);
}

#[tokio::test]
async fn test_train_client_errors() {
    let cases = [
        json!({"model_name": "random_forest", "hyperparameters": {}}),
        json!({"model_name": "svm", "hyperparameters": {"C": 1.0, "kernel": "invalid_kernel"}}),
        json!({"model_name": "knn", "hyperparameters": {"n_neighbors": 3}, "dataset_name": "nope"}),
        json!({"hyperparameters": {}}),
    ];
    for request in cases {
        let (status, body) = send(test_app(), post_json("/train", request.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "request {}", request);
        assert_eq!(body["error"], true);
    }
}

#[tokio::test]
async fn test_unknown_route() {
    let (status, body) = send(test_app(), get("/nowhere")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], true);
}
