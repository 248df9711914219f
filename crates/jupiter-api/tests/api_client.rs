use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use jupiter_api::ApiClient;
use jupiter_core::session::CredentialStore;
use jupiter_infrastructure::MemoryCredentialStore;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

#[derive(Clone, Default)]
struct MockState {
    auth_headers: Arc<Mutex<Vec<Option<String>>>>,
}

fn auth_body() -> Value {
    json!({
        "token": "tok-123",
        "user": {
            "id": "u-1",
            "username": "ann",
            "email": "ann@example.com",
            "display_name": "Ann",
            "bio": "",
            "created_at": "2026-01-01T00:00:00Z"
        }
    })
}

async fn login(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["password"] == "secret" {
        (StatusCode::OK, Json(auth_body()))
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Invalid credentials"})),
        )
    }
}

async fn profile(State(state): State<MockState>, headers: HeaderMap) -> Json<Value> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.auth_headers.lock().unwrap().push(auth);
    Json(auth_body()["user"].clone())
}

async fn send_chat() -> (StatusCode, Json<Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"error": "Message cannot be empty"})),
    )
}

async fn notifications() -> (StatusCode, Json<Value>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"error": "Invalid or expired token"})),
    )
}

async fn matches() -> Json<Value> {
    Json(json!([{
        "id": 7,
        "user_a_id": "u-1",
        "user_b_id": "u-2",
        "agent_a_approves": true,
        "agent_b_approves": true,
        "is_matched": true,
        "created_at": "2026-01-01T00:00:00Z",
        "updated_at": "2026-01-01T00:00:00Z",
        "other_user": null
    }]))
}

async fn spawn_mock_server() -> (String, MockState, oneshot::Sender<()>) {
    let state = MockState::default();
    let app = Router::new()
        .route("/v1/auth/login", post(login))
        .route("/v1/auth/profile", get(profile))
        .route("/v1/chat", post(send_chat))
        .route("/v1/notifications", get(notifications))
        .route("/v1/matches", get(matches))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock server listener");
    let address: SocketAddr = listener.local_addr().expect("mock listener local addr");
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .expect("run mock server");
    });
    (format!("http://{address}/v1"), state, shutdown_tx)
}

#[tokio::test]
async fn login_persists_session_and_attaches_bearer_credential() {
    let (base_url, state, _shutdown) = spawn_mock_server().await;
    let store = Arc::new(MemoryCredentialStore::new());
    let api = ApiClient::new(base_url, store.clone());

    let auth = api.login("ann", "secret").await.expect("login");
    assert_eq!(auth.token, "tok-123");
    assert_eq!(store.token().await.as_deref(), Some("tok-123"));
    assert_eq!(store.user().await.unwrap().username, "ann");

    let user = api.profile().await.expect("profile");
    assert_eq!(user.id, "u-1");
    let headers = state.auth_headers.lock().unwrap().clone();
    assert_eq!(headers, vec![Some("Bearer tok-123".to_string())]);
}

#[tokio::test]
async fn unauthenticated_requests_carry_no_credential() {
    let (base_url, state, _shutdown) = spawn_mock_server().await;
    let store = Arc::new(MemoryCredentialStore::new());
    let api = ApiClient::new(base_url, store);

    api.profile().await.expect("profile");
    let headers = state.auth_headers.lock().unwrap().clone();
    assert_eq!(headers, vec![None]);
}

#[tokio::test]
async fn unauthorized_clears_store_and_fires_hook_once() {
    let (base_url, _state, _shutdown) = spawn_mock_server().await;
    let store = Arc::new(MemoryCredentialStore::new());
    let api = ApiClient::new(base_url, store.clone());
    api.login("ann", "secret").await.expect("login");

    let fired = Arc::new(AtomicBool::new(false));
    let fired_in_hook = Arc::clone(&fired);
    api.set_unauthorized_hook(Arc::new(move || {
        let fired = Arc::clone(&fired_in_hook);
        Box::pin(async move {
            fired.store(true, Ordering::SeqCst);
        })
    }))
    .await;

    let err = api.notifications().await.expect_err("must be rejected");
    assert!(err.is_unauthorized());
    assert!(fired.load(Ordering::SeqCst));
    assert!(store.token().await.is_none());
    assert!(store.user().await.is_none());
}

#[tokio::test]
async fn rejected_operation_carries_server_message() {
    let (base_url, _state, _shutdown) = spawn_mock_server().await;
    let store = Arc::new(MemoryCredentialStore::new());
    let api = ApiClient::new(base_url, store);

    let err = api.send_chat_message("").await.expect_err("must fail");
    assert!(err.is_request_failed());
    assert_eq!(err.to_string(), "Message cannot be empty");
}

#[tokio::test]
async fn transport_failure_classifies_as_network_error() {
    // Grab a port that is guaranteed to have nothing listening on it.
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let address = listener.local_addr().expect("local addr");
    drop(listener);

    let store = Arc::new(MemoryCredentialStore::new());
    let api = ApiClient::new(format!("http://{address}/v1"), store);

    let err = api.matches().await.expect_err("must fail");
    assert!(err.is_network());
}

#[tokio::test]
async fn success_body_passes_through_undecorated() {
    let (base_url, _state, _shutdown) = spawn_mock_server().await;
    let store = Arc::new(MemoryCredentialStore::new());
    let api = ApiClient::new(base_url, store);

    let matches = api.matches().await.expect("matches");
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].id, 7);
    assert!(matches[0].is_matched);
    assert_eq!(matches[0].peer_label(), "Unknown");
}
