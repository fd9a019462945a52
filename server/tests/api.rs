//! HTTP-level tests: router + in-memory store + stub provider.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use gptnix::openai::completion::{CompletionChoice, CompletionResponse, Message};
use gptnix::{
    CompletionProvider, CompletionRequest, ConversationStore, ProviderError, QueryHandler,
    FALLBACK_RESPONSE,
};
use serde_json::{json, Value};
use server::{router, AppState};
use shared::{
    api::{ASK_ROUTE, CONVERSATIONS_ROUTE},
    UserId, TECHNICAL_DIFFICULTIES, USER_ID_HEADER,
};
use tower::ServiceExt;

// =============================================================================
// Helpers
// =============================================================================

/// Answers every request with the same content, or fails when `None`.
struct StubProvider(Option<Option<&'static str>>);

#[async_trait]
impl CompletionProvider for StubProvider {
    async fn complete(
        &self,
        _request: CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError> {
        let Some(content) = self.0 else {
            return Err(ProviderError::Status {
                status: 500,
                body: "boom".to_owned(),
            });
        };

        Ok(CompletionResponse {
            choices: vec![CompletionChoice {
                finish_reason: Some("stop".to_owned()),
                index: 0,
                message: Message {
                    role: "assistant".to_owned(),
                    content: content.map(str::to_owned),
                },
            }],
            created: None,
            id: None,
            model: None,
            usage: None,
        })
    }
}

fn make_app(provider: StubProvider) -> (axum::Router, ConversationStore) {
    let store = ConversationStore::in_memory().unwrap();
    let handler = QueryHandler::new(Arc::new(provider), store.clone(), "gpt-4o-mini");

    (router(AppState::new(handler)), store)
}

/// A store whose `conversations` table lacks the text columns: it opens, but
/// every read and write fails.
fn make_unwritable_app(dir: &tempfile::TempDir) -> axum::Router {
    let path = dir.path().join("unwritable.db");
    rusqlite::Connection::open(&path)
        .unwrap()
        .execute_batch(
            "CREATE TABLE conversations (id INTEGER PRIMARY KEY, user_id TEXT, timestamp INTEGER);",
        )
        .unwrap();

    let store = ConversationStore::open(&path).unwrap();
    let handler = QueryHandler::new(
        Arc::new(StubProvider(Some(Some("4")))),
        store,
        "gpt-4o-mini",
    );

    router(AppState::new(handler))
}

fn ask_request(user: Option<&str>, query: &str) -> Request<Body> {
    let mut builder = Request::post(ASK_ROUTE).header("content-type", "application/json");
    if let Some(user) = user {
        builder = builder.header(USER_ID_HEADER, user);
    }

    builder
        .body(Body::from(json!({ "query": query }).to_string()))
        .unwrap()
}

fn conversations_request(user: Option<&str>) -> Request<Body> {
    let mut builder = Request::get(CONVERSATIONS_ROUTE);
    if let Some(user) = user {
        builder = builder.header(USER_ID_HEADER, user);
    }

    builder.body(Body::empty()).unwrap()
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = hyper::body::to_bytes(resp.into_body()).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn health_is_ok() {
    let (app, _) = make_app(StubProvider(Some(Some("4"))));

    let resp = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn ask_returns_answer_and_persists_it() {
    let (app, store) = make_app(StubProvider(Some(Some("4"))));

    let resp = app
        .clone()
        .oneshot(ask_request(Some("u1"), "What is 2+2?"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, json!({ "response": "4" }));

    let records = store.list_by_user(Some(&UserId::new("u1"))).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].query, "What is 2+2?");
    assert_eq!(records[0].response, "4");

    let resp = app.oneshot(conversations_request(Some("u1"))).await.unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["conversations"][0]["query"], "What is 2+2?");
    assert_eq!(body["conversations"][0]["response"], "4");
}

#[tokio::test]
async fn provider_failure_is_generic_and_stores_nothing() {
    let (app, store) = make_app(StubProvider(None));

    let resp = app
        .clone()
        .oneshot(ask_request(Some("u1"), "What is 2+2?"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(resp).await;
    assert_eq!(body["error"], "technical_difficulties");
    assert_eq!(body["message"], TECHNICAL_DIFFICULTIES);
    assert!(!body.to_string().contains("boom"));
    assert_eq!(store.count().unwrap(), 0);

    let resp = app.oneshot(conversations_request(Some("u1"))).await.unwrap();
    assert_eq!(body_json(resp).await, json!({ "conversations": [] }));
}

#[tokio::test]
async fn store_failure_on_ask_is_generic() {
    let dir = tempfile::tempdir().unwrap();
    let app = make_unwritable_app(&dir);

    let resp = app.oneshot(ask_request(Some("u1"), "What is 2+2?")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(resp).await;
    assert_eq!(body["error"], "technical_difficulties");
    assert_eq!(body["message"], TECHNICAL_DIFFICULTIES);
    assert!(body.get("response").is_none());
}

#[tokio::test]
async fn store_failure_on_list_is_generic() {
    let dir = tempfile::tempdir().unwrap();
    let app = make_unwritable_app(&dir);

    let resp = app.oneshot(conversations_request(Some("u1"))).await.unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(resp).await;
    assert_eq!(body["error"], "technical_difficulties");
    assert_eq!(body["message"], TECHNICAL_DIFFICULTIES);
    assert!(!body.to_string().contains("no such column"));
}

#[tokio::test]
async fn empty_content_returns_fallback() {
    let (app, store) = make_app(StubProvider(Some(None)));

    let resp = app.oneshot(ask_request(Some("u1"), "hello")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        body_json(resp).await,
        json!({ "response": FALLBACK_RESPONSE })
    );
    let records = store.list_by_user(Some(&UserId::new("u1"))).unwrap();
    assert_eq!(records[0].response, FALLBACK_RESPONSE);
}

#[tokio::test]
async fn conversations_are_scoped_to_the_caller() {
    let (app, _) = make_app(StubProvider(Some(Some("answer"))));

    for (user, query) in [(Some("u1"), "a"), (Some("u2"), "b"), (None, "c"), (Some("u1"), "d")] {
        let resp = app.clone().oneshot(ask_request(user, query)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let resp = app
        .clone()
        .oneshot(conversations_request(Some("u1")))
        .await
        .unwrap();
    let body = body_json(resp).await;
    let queries: Vec<_> = body["conversations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["query"].as_str().unwrap().to_owned())
        .collect();
    assert_eq!(queries, ["a", "d"]);

    let resp = app.oneshot(conversations_request(None)).await.unwrap();
    assert_eq!(body_json(resp).await, json!({ "conversations": [] }));
}

#[tokio::test]
async fn blank_identity_header_is_anonymous() {
    let (app, store) = make_app(StubProvider(Some(Some("hi"))));

    let resp = app
        .clone()
        .oneshot(ask_request(Some("   "), "hello"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(store.count().unwrap(), 1);

    let resp = app.oneshot(conversations_request(Some("   "))).await.unwrap();
    assert_eq!(body_json(resp).await, json!({ "conversations": [] }));
}

#[tokio::test]
async fn reads_are_repeatable() {
    let (app, _) = make_app(StubProvider(Some(Some("x"))));
    app.clone()
        .oneshot(ask_request(Some("u1"), "one"))
        .await
        .unwrap();

    let first = body_json(
        app.clone()
            .oneshot(conversations_request(Some("u1")))
            .await
            .unwrap(),
    )
    .await;
    let second = body_json(app.oneshot(conversations_request(Some("u1"))).await.unwrap()).await;

    assert_eq!(first, second);
}
