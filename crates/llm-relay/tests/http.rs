//! End-to-end tests of the HTTP surface with fake provider adapters.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

use llm_relay::llm::{
    ChatMessage, CompletionError, LLMError, LLMProvider, ModelRegistry, Provider,
    ProviderRegistry, Role,
};
use llm_relay::router::ChatRouter;
use llm_relay::server::{AppState, build_app};

// ============================================================================
// Fixtures
// ============================================================================

type Reply = fn(&[ChatMessage]) -> Result<String, CompletionError>;

struct FakeAdapter {
    provider: Provider,
    calls: Mutex<Vec<(Vec<ChatMessage>, String)>>,
    reply: Reply,
}

impl FakeAdapter {
    fn new(provider: Provider, reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            provider,
            calls: Mutex::new(Vec::new()),
            reply,
        })
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl LLMProvider for FakeAdapter {
    fn provider(&self) -> Provider {
        self.provider
    }

    async fn complete(
        &self,
        conversation: &[ChatMessage],
        model: &str,
    ) -> Result<String, CompletionError> {
        self.calls
            .lock()
            .unwrap()
            .push((conversation.to_vec(), model.to_string()));
        (self.reply)(conversation)
    }
}

fn last_user_upper(conversation: &[ChatMessage]) -> Result<String, CompletionError> {
    Ok(conversation
        .iter()
        .rev()
        .find(|m| m.role() == Role::User)
        .map(|m| m.content().to_uppercase())
        .unwrap_or_default())
}

struct TestApp {
    app: Router,
    _static_dir: TempDir,
}

fn test_app(adapters: &[Arc<FakeAdapter>]) -> TestApp {
    let mut providers = ProviderRegistry::new();
    for adapter in adapters {
        providers.register(adapter.clone());
    }

    let static_dir = TempDir::new().unwrap();
    std::fs::write(static_dir.path().join("index.html"), "<h1>chat</h1>").unwrap();
    std::fs::write(static_dir.path().join("script.js"), "console.log('hi');").unwrap();

    let state = AppState {
        router: ChatRouter::new(ModelRegistry::reference(), providers),
    };
    TestApp {
        app: build_app(state, static_dir.path(), Duration::from_secs(30)),
        _static_dir: static_dir,
    }
}

async fn post_chat(app: &Router, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/chat")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, bytes.to_vec())
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

// ============================================================================
// POST /chat
// ============================================================================

#[tokio::test]
async fn chat_returns_normalized_reply() {
    let openai = FakeAdapter::new(Provider::OpenAI, last_user_upper);
    let t = test_app(&[openai.clone()]);

    let (status, body) = post_chat(
        &t.app,
        json!({
            "messages": [{"role": "user", "content": "hi"}],
            "model": "openai_gpt-3.5-turbo"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"role": "assistant", "content": "HI"}));

    let calls = openai.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].1, "gpt-3.5-turbo");
}

#[tokio::test]
async fn chat_unknown_model_is_bad_request() {
    let openai = FakeAdapter::new(Provider::OpenAI, last_user_upper);
    let t = test_app(&[openai.clone()]);

    let (status, body) = post_chat(
        &t.app,
        json!({
            "messages": [{"role": "user", "content": "hi"}],
            "model": "does-not-exist"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Invalid model key selected: does-not-exist");
    assert_eq!(openai.call_count(), 0);
}

#[tokio::test]
async fn chat_invalid_role_is_bad_request() {
    let openai = FakeAdapter::new(Provider::OpenAI, last_user_upper);
    let t = test_app(&[openai.clone()]);

    let (status, body) = post_chat(
        &t.app,
        json!({
            "messages": [{"role": "tool", "content": "{}"}],
            "model": "openai_gpt-3.5-turbo"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("'tool'"));
    assert_eq!(openai.call_count(), 0);
}

#[tokio::test]
async fn chat_missing_credential_is_service_unavailable() {
    let openai = FakeAdapter::new(Provider::OpenAI, last_user_upper);
    let t = test_app(&[openai]);

    let (status, body) = post_chat(
        &t.app,
        json!({
            "messages": [{"role": "user", "content": "hi"}],
            "model": "anthropic_claude-3-haiku"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        body["detail"],
        "Anthropic model selected, but API key not configured"
    );
}

#[tokio::test]
async fn chat_invalid_request_from_adapter_is_bad_request() {
    let anthropic = FakeAdapter::new(Provider::Anthropic, |_| {
        Err(CompletionError::InvalidRequest {
            provider: Provider::Anthropic,
            message: "no user messages provided".to_string(),
        })
    });
    let t = test_app(&[anthropic]);

    let (status, body) = post_chat(
        &t.app,
        json!({
            "messages": [{"role": "system", "content": "Be terse."}],
            "model": "anthropic_claude-3-haiku"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["detail"]
            .as_str()
            .unwrap()
            .contains("no user messages provided")
    );
}

#[tokio::test]
async fn chat_provider_fault_is_bad_gateway() {
    let openai = FakeAdapter::new(Provider::OpenAI, |_| {
        Err(CompletionError::Provider {
            provider: Provider::OpenAI,
            source: LLMError::Api {
                status: 500,
                message: "server exploded".to_string(),
            },
        })
    });
    let t = test_app(&[openai]);

    let (status, body) = post_chat(
        &t.app,
        json!({
            "messages": [{"role": "user", "content": "hi"}],
            "model": "openai_gpt-3.5-turbo"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let detail = body["detail"].as_str().unwrap();
    assert!(detail.starts_with("OpenAI API error"));
    assert!(detail.contains("server exploded"));
}

#[tokio::test]
async fn chat_missing_content_gets_detail_body() {
    let openai = FakeAdapter::new(Provider::OpenAI, last_user_upper);
    let t = test_app(&[openai.clone()]);

    let (status, body) = post_chat(
        &t.app,
        json!({
            "messages": [{"role": "user"}],
            "model": "openai_gpt-3.5-turbo"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let detail = body["detail"].as_str().unwrap();
    assert!(detail.contains("missing field `content`"));
    assert_eq!(body.as_object().unwrap().len(), 1);
    assert_eq!(openai.call_count(), 0);
}

#[tokio::test]
async fn chat_malformed_json_gets_detail_body() {
    let t = test_app(&[FakeAdapter::new(Provider::OpenAI, last_user_upper)]);

    let request = Request::builder()
        .method("POST")
        .uri("/chat")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&t.app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn chat_without_json_content_type_gets_detail_body() {
    let t = test_app(&[FakeAdapter::new(Provider::OpenAI, last_user_upper)]);

    let request = Request::builder()
        .method("POST")
        .uri("/chat")
        .body(Body::from(r#"{"messages": [], "model": "x"}"#))
        .unwrap();
    let (status, body) = send(&t.app, request).await;

    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert!(body["detail"].is_string());
}

/// Adapter that never answers before the request deadline.
struct StalledAdapter;

#[async_trait]
impl LLMProvider for StalledAdapter {
    fn provider(&self) -> Provider {
        Provider::OpenAI
    }

    async fn complete(
        &self,
        _conversation: &[ChatMessage],
        _model: &str,
    ) -> Result<String, CompletionError> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(String::new())
    }
}

#[tokio::test]
async fn chat_timeout_gets_detail_body() {
    let mut providers = ProviderRegistry::new();
    providers.register(Arc::new(StalledAdapter));
    let state = AppState {
        router: ChatRouter::new(ModelRegistry::reference(), providers),
    };
    let static_dir = TempDir::new().unwrap();
    let app = build_app(state, static_dir.path(), Duration::from_millis(50));

    let (status, body) = post_chat(
        &app,
        json!({
            "messages": [{"role": "user", "content": "hi"}],
            "model": "openai_gpt-3.5-turbo"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
    assert_eq!(body, json!({"detail": "request timed out"}));
}

// ============================================================================
// Other routes
// ============================================================================

#[tokio::test]
async fn models_lists_keys_with_availability() {
    let openai = FakeAdapter::new(Provider::OpenAI, last_user_upper);
    let t = test_app(&[openai]);

    let request = Request::builder()
        .uri("/models")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&t.app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "models": [
                {
                    "key": "anthropic_claude-3-haiku",
                    "provider": "anthropic",
                    "model": "claude-3-haiku-20240307",
                    "available": false
                },
                {
                    "key": "openai_gpt-3.5-turbo",
                    "provider": "openai",
                    "model": "gpt-3.5-turbo",
                    "available": true
                }
            ]
        })
    );
}

#[tokio::test]
async fn readyz_requires_a_provider() {
    let t = test_app(&[]);
    let (status, _) = get(&t.app, "/readyz").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let t = test_app(&[FakeAdapter::new(Provider::Anthropic, last_user_upper)]);
    let (status, body) = get(&t.app, "/readyz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"ok");

    let (status, _) = get(&t.app, "/livez").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn serves_static_files() {
    let t = test_app(&[]);

    let (status, body) = get(&t.app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"<h1>chat</h1>");

    let (status, body) = get(&t.app, "/static/script.js").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"console.log('hi');");
}

#[tokio::test]
async fn serves_bundled_browser_client() {
    let static_dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../static");
    let state = AppState {
        router: ChatRouter::new(ModelRegistry::reference(), ProviderRegistry::new()),
    };
    let app = build_app(state, &static_dir, Duration::from_secs(30));

    let (status, body) = get(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    let html = String::from_utf8(body).unwrap();
    assert!(html.contains("id=\"llm-select\""));
    assert!(html.contains("/static/script.js"));

    let (status, body) = get(&app, "/static/script.js").await;
    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8(body).unwrap().contains("fetch('/chat'"));
}
