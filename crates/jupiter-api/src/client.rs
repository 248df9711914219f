//! The authenticated request pipeline.
//!
//! `ApiClient` is the single chokepoint for all remote calls: it attaches the
//! bearer credential, negotiates JSON bodies, and classifies every failure
//! into exactly one `JupiterError` kind before it reaches a caller. No other
//! component performs network I/O.
//!
//! An explicit "unauthorized" status from the service is fatal to the
//! session: the pipeline clears the credential store, fires the installed
//! unauthorized hook (which resets the application to the unauthenticated
//! view and cancels all polling leases), and returns
//! `JupiterError::Unauthorized`. Callers must not retry.

use crate::wire::{
    AuthResponse, ErrorBody, LoginRequest, RegisterRequest, SendMessageRequest, StatusAck,
    UpdateProfileRequest,
};
use futures::future::BoxFuture;
use jupiter_core::agent::AgentProfile;
use jupiter_core::conversation::{ChatExchange, ChatMessage, DirectMessage};
use jupiter_core::error::{JupiterError, Result};
use jupiter_core::matching::{MatchRecord, MatchingReport};
use jupiter_core::notification::{Notification, UnreadCount};
use jupiter_core::session::{CredentialStore, UserSummary};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::env;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Default base URL of the remote service, overridable via `JUPITER_API_URL`.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/v1";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Async callback fired exactly once per unauthorized response, after the
/// credential store has been cleared.
pub type UnauthorizedHook = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// HTTP client for the Jupiter service.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    store: Arc<dyn CredentialStore>,
    on_unauthorized: RwLock<Option<UnauthorizedHook>>,
}

impl ApiClient {
    /// Creates a client against an explicit base URL.
    pub fn new(base_url: impl Into<String>, store: Arc<dyn CredentialStore>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
            store,
            on_unauthorized: RwLock::new(None),
        }
    }

    /// Creates a client from the `JUPITER_API_URL` environment variable,
    /// falling back to [`DEFAULT_BASE_URL`].
    pub fn from_env(store: Arc<dyn CredentialStore>) -> Self {
        let base_url =
            env::var("JUPITER_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(base_url, store)
    }

    /// Installs the session-teardown callback for unauthorized responses.
    pub async fn set_unauthorized_hook(&self, hook: UnauthorizedHook) {
        *self.on_unauthorized.write().await = Some(hook);
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends one request through the pipeline: attach the bearer credential
    /// when a token is present, then classify the outcome.
    async fn execute<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T> {
        let mut request = request.timeout(REQUEST_TIMEOUT);
        if let Some(token) = self.store.token().await {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|err| JupiterError::network(err.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            self.handle_unauthorized().await;
            return Err(JupiterError::Unauthorized);
        }
        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .map(|body| body.error)
                .unwrap_or_else(|_| format!("request failed with status {status}"));
            return Err(JupiterError::request_failed(message));
        }

        response
            .json::<T>()
            .await
            .map_err(|err| JupiterError::serialization("JSON", err.to_string()))
    }

    async fn handle_unauthorized(&self) {
        tracing::info!("service reported unauthorized; tearing down session");
        if let Err(err) = self.store.clear().await {
            tracing::warn!(error = %err, "failed to clear credential store");
        }
        let hook = self.on_unauthorized.read().await.clone();
        if let Some(hook) = hook {
            hook().await;
        }
    }

    // ── Auth ──

    /// Creates an account. On success the fresh session is persisted and
    /// subsequent requests are authenticated.
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse> {
        let auth: AuthResponse = self
            .execute(self.http.post(self.url("/auth/register")).json(request))
            .await?;
        self.store
            .set_session(auth.token.clone(), auth.user.clone())
            .await?;
        Ok(auth)
    }

    /// Logs in. On success the fresh session is persisted.
    pub async fn login(&self, username: &str, password: &str) -> Result<AuthResponse> {
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let auth: AuthResponse = self
            .execute(self.http.post(self.url("/auth/login")).json(&body))
            .await?;
        self.store
            .set_session(auth.token.clone(), auth.user.clone())
            .await?;
        Ok(auth)
    }

    pub async fn profile(&self) -> Result<UserSummary> {
        self.execute(self.http.get(self.url("/auth/profile"))).await
    }

    pub async fn update_profile(
        &self,
        display_name: Option<String>,
        bio: Option<String>,
    ) -> Result<()> {
        let body = UpdateProfileRequest { display_name, bio };
        let _: StatusAck = self
            .execute(self.http.put(self.url("/auth/profile")).json(&body))
            .await?;
        Ok(())
    }

    // ── Agent chat ──

    pub async fn chat_history(&self) -> Result<Vec<ChatMessage>> {
        self.execute(self.http.get(self.url("/chat"))).await
    }

    pub async fn send_chat_message(&self, content: &str) -> Result<ChatExchange> {
        let body = SendMessageRequest {
            content: content.to_string(),
        };
        self.execute(self.http.post(self.url("/chat")).json(&body))
            .await
    }

    // ── Agent knowledge ──

    pub async fn agent_profile(&self) -> Result<AgentProfile> {
        self.execute(self.http.get(self.url("/agent/profile")))
            .await
    }

    /// Nudges the server to re-analyze the agent profile. Fire-and-forget;
    /// the analysis completes in the background.
    pub async fn trigger_profile_update(&self) -> Result<()> {
        let _: StatusAck = self
            .execute(self.http.post(self.url("/agent/profile/update")))
            .await?;
        Ok(())
    }

    // ── Matching ──

    pub async fn trigger_matching(&self) -> Result<MatchingReport> {
        self.execute(self.http.post(self.url("/matching/trigger")))
            .await
    }

    pub async fn matches(&self) -> Result<Vec<MatchRecord>> {
        self.execute(self.http.get(self.url("/matches"))).await
    }

    // ── Notifications ──

    pub async fn notifications(&self) -> Result<Vec<Notification>> {
        self.execute(self.http.get(self.url("/notifications"))).await
    }

    pub async fn unread_count(&self) -> Result<u64> {
        let body: UnreadCount = self
            .execute(self.http.get(self.url("/notifications/unread")))
            .await?;
        Ok(body.count)
    }

    pub async fn mark_notification_read(&self, id: i64) -> Result<()> {
        let _: StatusAck = self
            .execute(self.http.post(self.url(&format!("/notifications/{id}/read"))))
            .await?;
        Ok(())
    }

    // ── Direct messages ──

    pub async fn direct_messages(&self, match_id: i64) -> Result<Vec<DirectMessage>> {
        self.execute(self.http.get(self.url(&format!("/messages/{match_id}"))))
            .await
    }

    pub async fn send_direct_message(&self, match_id: i64, content: &str) -> Result<DirectMessage> {
        let body = SendMessageRequest {
            content: content.to_string(),
        };
        self.execute(
            self.http
                .post(self.url(&format!("/messages/{match_id}")))
                .json(&body),
        )
        .await
    }
}
