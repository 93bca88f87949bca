use std::sync::{Arc, Mutex};

use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;
use serde_json::{Value, json};
use tokio::net::TcpListener;

use context_engine::config::ModelConfig;
use context_engine::insight::InsightGenerator;
use context_engine::model::ollama::OllamaClient;
use context_engine::model::{ModelClient, ModelError};
use context_engine::server::{self, AppState};
use context_engine::store::{ContentStore, EngineOutput};

/// A stand-in for the Ollama server: records request bodies and answers
/// with a fixed status and body.
#[derive(Clone)]
struct FakeOllama {
    status: StatusCode,
    body: String,
    seen: Arc<Mutex<Vec<Value>>>,
}

async fn generate(State(fake): State<FakeOllama>, Json(body): Json<Value>) -> Response {
    fake.seen.lock().unwrap().push(body);
    (
        fake.status,
        [("content-type", "application/json")],
        fake.body.clone(),
    )
        .into_response()
}

async fn spawn_fake(status: StatusCode, body: &str) -> (String, Arc<Mutex<Vec<Value>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let fake = FakeOllama {
        status,
        body: body.to_string(),
        seen: seen.clone(),
    };
    let app = Router::new()
        .route("/api/generate", post(generate))
        .with_state(fake);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await });
    (format!("http://{}/api/generate", addr), seen)
}

fn client(url: String) -> OllamaClient {
    OllamaClient::new(ModelConfig {
        url,
        model: "llama3.1:8b".to_string(),
    })
}

#[tokio::test]
async fn sends_model_prompt_and_disables_streaming() {
    let reply = json!({"model": "llama3.1:8b", "response": "hello there", "done": true});
    let (url, seen) = spawn_fake(StatusCode::OK, &reply.to_string()).await;

    let text = client(url).query("say hi").await.unwrap();
    assert_eq!(text, "hello there");

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(
        seen[0],
        json!({"model": "llama3.1:8b", "prompt": "say hi", "stream": false})
    );
}

#[tokio::test]
async fn missing_response_field_is_an_error() {
    let (url, _) = spawn_fake(StatusCode::OK, r#"{"done": true}"#).await;

    let err = client(url).query("x").await.unwrap_err();
    assert!(matches!(err, ModelError::MissingResponse));
}

#[tokio::test]
async fn error_status_carries_body() {
    let (url, _) = spawn_fake(
        StatusCode::NOT_FOUND,
        r#"{"error": "model 'llama3.1:8b' not found"}"#,
    )
    .await;

    let err = client(url).query("x").await.unwrap_err();
    match err {
        ModelError::Status { status, body } => {
            assert_eq!(status, 404);
            assert!(body.contains("not found"));
        }
        other => panic!("expected Status, got {:?}", other),
    }
}

#[tokio::test]
async fn undecodable_body_is_http_error() {
    let (url, _) = spawn_fake(StatusCode::OK, "<html>proxy error</html>").await;

    let err = client(url).query("x").await.unwrap_err();
    assert!(matches!(err, ModelError::Http(_)));
}

#[tokio::test]
async fn end_to_end_through_service() {
    let reply = json!({"response": "{\"verdict\":\"low_reach\"}"});
    let (url, seen) = spawn_fake(StatusCode::OK, &reply.to_string()).await;

    let store = ContentStore::from_entries([(
        "cnt_002",
        EngineOutput::try_from(json!({"content_id": "cnt_002", "views": 100})).unwrap(),
    )]);
    let insights = InsightGenerator::new(Arc::new(client(url)));
    let state = AppState::new(Arc::new(store), Arc::new(insights));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(server::serve_on(listener, state));

    let body: Value = reqwest::Client::new()
        .post(format!("http://{}/analyze/link", addr))
        .json(&json!({"link": "cnt_002"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body, json!({"verdict": "low_reach"}));
    let prompt = seen.lock().unwrap()[0]["prompt"].as_str().unwrap().to_string();
    assert!(prompt.contains("\"views\": 100"));
    assert!(prompt.ends_with("Return JSON only.\n"));
}
