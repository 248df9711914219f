//! Agent knowledge service.
//!
//! Reads what the user's agent has learned about them and can nudge the
//! server to re-analyze. The re-analysis runs in the background with no
//! status subscription, so the refresh waits a fixed grace period and then
//! re-reads once; if the analysis has not landed yet the caller simply sees
//! unchanged data until the next manual refresh.

use jupiter_api::ApiClient;
use jupiter_core::agent::AgentProfile;
use jupiter_core::error::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// How long to give the background analysis before the single re-read.
pub const KNOWLEDGE_REFRESH_GRACE: Duration = Duration::from_secs(3);

pub struct AgentKnowledgeService {
    api: Arc<ApiClient>,
    profile: Arc<RwLock<Option<AgentProfile>>>,
    refresh_grace: Duration,
}

impl AgentKnowledgeService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            profile: Arc::new(RwLock::new(None)),
            refresh_grace: KNOWLEDGE_REFRESH_GRACE,
        }
    }

    /// Overrides the grace period. Tests use `Duration::ZERO`.
    pub fn with_refresh_grace(mut self, grace: Duration) -> Self {
        self.refresh_grace = grace;
        self
    }

    pub async fn reload(&self) -> Result<AgentProfile> {
        let profile = self.api.agent_profile().await?;
        *self.profile.write().await = Some(profile.clone());
        Ok(profile)
    }

    pub async fn profile(&self) -> Option<AgentProfile> {
        self.profile.read().await.clone()
    }

    /// Triggers a background re-analysis, then re-reads the profile once
    /// after the grace period. Never blocks beyond that single wait.
    pub async fn refresh_knowledge(&self) -> Result<AgentProfile> {
        self.api.trigger_profile_update().await?;
        tokio::time::sleep(self.refresh_grace).await;
        self.reload().await
    }
}
