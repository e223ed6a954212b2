//! End-to-end: derived routes served through axum against an in-memory store.

use autorest_sdk::{
    ApiOverrides, ApiRegistry, FieldDescriptor, MemoryStore, ModelDescriptor, StaticSchema,
    WriteRequiresToken,
};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn quiz_router(store: Arc<MemoryStore>) -> Router {
    let schema = Arc::new(StaticSchema::new(vec![
        ModelDescriptor::new("question", "Question", "Questions")
            .field(FieldDescriptor::short_text("title"))
            .field(FieldDescriptor::choice("kind", ["t", "m"]))
            .field(FieldDescriptor::long_text("text"))
            .overrides(ApiOverrides::new().search_fields(["title"])),
        ModelDescriptor::new("answer", "Answer", "Answers")
            .field(FieldDescriptor::relation("question", "question"))
            .field(FieldDescriptor::long_text("text"))
            .overrides(ApiOverrides::new().depth(1)),
        ModelDescriptor::new("notification", "Notification", "Notifications")
            .field(FieldDescriptor::long_text("text"))
            .overrides(ApiOverrides::new().permissions(vec![Arc::new(WriteRequiresToken {
                header: "x-api-token",
                token: "secret".into(),
            })])),
    ]));
    let registry = ApiRegistry::new(schema, store);
    registry.build_routes().expect("route table").into_router()
}

fn object(v: Value) -> serde_json::Map<String, Value> {
    match v {
        Value::Object(m) => m,
        _ => unreachable!(),
    }
}

fn seeded_router() -> Router {
    let store = Arc::new(MemoryStore::new());
    store.seed(
        "question",
        vec![
            object(json!({"title": "Borrow checker", "kind": "t", "text": "explain moves"})),
            object(json!({"title": "Lifetimes", "kind": "m", "text": "pick the elided form"})),
        ],
    );
    store.seed(
        "answer",
        vec![object(json!({"question": 2, "text": "the 'a goes on the output"}))],
    );
    quiz_router(store)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn list_wraps_rows_in_the_standard_envelope() {
    let response = seeded_router()
        .oneshot(Request::get("/questions").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["meta"]["count"], json!(2));
    assert_eq!(body["data"][0]["title"], json!("Borrow checker"));
}

#[tokio::test]
async fn create_then_retrieve() {
    let router = seeded_router();
    let response = router
        .clone()
        .oneshot(
            Request::post("/questions")
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({"title": "Traits", "kind": "t", "text": "object safety"}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["data"]["id"], json!(3));

    let response = router
        .oneshot(Request::get("/questions/3").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let fetched = body_json(response).await;
    assert_eq!(fetched["data"]["title"], json!("Traits"));
}

#[tokio::test]
async fn search_respects_the_override_block() {
    // "moves" appears only in text; the override narrows search to title.
    let response = seeded_router()
        .oneshot(
            Request::get("/questions?search=moves")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["meta"]["count"], json!(0));

    let response = seeded_router()
        .oneshot(
            Request::get("/questions?search=borrow")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["meta"]["count"], json!(1));
}

#[tokio::test]
async fn filtering_restricted_to_resolved_fields() {
    let response = seeded_router()
        .oneshot(
            Request::get("/questions?kind=m")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["meta"]["count"], json!(1));
    assert_eq!(body["data"][0]["title"], json!("Lifetimes"));

    // title is not a filterable field by default; the param is inert.
    let response = seeded_router()
        .oneshot(
            Request::get("/questions?title=Lifetimes")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["meta"]["count"], json!(2));
}

#[tokio::test]
async fn choice_validation_rejects_out_of_domain_values() {
    let response = seeded_router()
        .oneshot(
            Request::post("/questions")
                .header("content-type", "application/json")
                .body(Body::from(json!({"title": "Bad", "kind": "z"}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], json!("validation_error"));
}

#[tokio::test]
async fn depth_expands_the_relation_on_the_wire() {
    let response = seeded_router()
        .oneshot(Request::get("/answers/1").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["question"]["title"], json!("Lifetimes"));
}

#[tokio::test]
async fn write_token_policy_enforced_before_the_operation() {
    let router = seeded_router();
    let denied = router
        .clone()
        .oneshot(
            Request::post("/notifications")
                .header("content-type", "application/json")
                .body(Body::from(json!({"text": "hello"}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(denied.status(), StatusCode::FORBIDDEN);

    let allowed = router
        .oneshot(
            Request::post("/notifications")
                .header("content-type", "application/json")
                .header("x-api-token", "secret")
                .body(Body::from(json!({"text": "hello"}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(allowed.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn missing_rows_map_to_not_found() {
    let response = seeded_router()
        .oneshot(Request::get("/questions/99").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], json!("not_found"));
}
