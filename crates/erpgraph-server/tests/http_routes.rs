//! HTTP-level tests for the assembled router.

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use erpgraph_auth::{Action, PolicyRule};
use erpgraph_server::{AppConfig, AppState, AuthMode, build_app};
use serde_json::{Value, json};
use tower::ServiceExt;

fn app_with(cfg: AppConfig) -> (AppState, Router) {
    let state = AppState::from_config(cfg).unwrap();
    let app = build_app(&state);
    (state, app)
}

fn policy_config() -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.auth.mode = AuthMode::Policy;
    cfg.auth.rules = vec![PolicyRule {
        role: "admin".into(),
        resource: "*".into(),
        actions: vec![Action::Create, Action::Read, Action::Update, Action::Delete],
    }];
    cfg
}

fn graphql_request(query: &str, headers: &[(&str, &str)]) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/graphql")
        .header("content-type", "application/json");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder
        .body(Body::from(json!({ "query": query }).to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_endpoints() {
    let (_, app) = app_with(AppConfig::default());

    let response = app
        .clone()
        .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({"status": "ok"}));

    let response = app
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(json_body(response).await["service"], json!("erpgraph"));
}

#[tokio::test]
async fn test_request_id_is_generated_or_echoed() {
    let (_, app) = app_with(AppConfig::default());

    let response = app
        .clone()
        .oneshot(
            Request::get("/readyz")
                .header("x-request-id", "abc-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.headers()["x-request-id"], "abc-123");

    let response = app
        .oneshot(Request::get("/readyz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert!(!response.headers()["x-request-id"].is_empty());
}

#[tokio::test]
async fn test_log_route() {
    let (_, app) = app_with(AppConfig::default());
    let response = app
        .oneshot(Request::get("/test-log").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"Logs have been generated.");
}

#[tokio::test]
async fn test_product_crud_over_http() {
    let (state, app) = app_with(policy_config());
    let admin = [("x-user-id", "1"), ("x-user-roles", "admin")];

    let response = app
        .clone()
        .oneshot(graphql_request(
            r#"mutation { createProduct(input: {name: "Pen", price: 2}) { obj { dbId name } } }"#,
            &admin,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["createProduct"]["obj"], json!({"dbId": 1, "name": "Pen"}));

    let response = app
        .clone()
        .oneshot(graphql_request("{ all_products { name price } }", &[]))
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["data"]["all_products"], json!([{"name": "Pen", "price": 2}]));

    let response = app
        .oneshot(graphql_request(
            "mutation { deleteProduct(id: 1) { success } }",
            &admin,
        ))
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["data"]["deleteProduct"]["success"], json!(true));
    assert_eq!(state.storage.count("Product").await, 0);
}

#[tokio::test]
async fn test_anonymous_mutation_is_unauthorized() {
    let (state, app) = app_with(policy_config());

    let response = app
        .oneshot(graphql_request(
            r#"mutation { createUser(input: {username: "ann", email: "ann@example.com"}) { obj { dbId } } }"#,
            &[],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["errors"][0]["extensions"]["code"], json!("UNAUTHORIZED"));
    assert_eq!(state.storage.count("User").await, 0);
}

#[tokio::test]
async fn test_graphql_get_with_query_string() {
    let (_, app) = app_with(AppConfig::default());
    let response = app
        .oneshot(
            Request::get("/graphql?query=%7B%20_health%20%7D")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["data"]["_health"], json!("ok"));
}

#[tokio::test]
async fn test_graphiql_toggle() {
    let (_, app) = app_with(AppConfig::default());
    let response = app
        .oneshot(Request::get("/graphiql").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let mut cfg = AppConfig::default();
    cfg.graphql.graphiql = false;
    let (_, app) = app_with(cfg);
    let response = app
        .oneshot(Request::get("/graphiql").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
