//! Match list service.
//!
//! Matches are computed server-side; the client reads the list and can
//! trigger a background search. Triggering follows the nudge-then-re-read
//! pattern: issue the trigger, then re-fetch the list once.

use jupiter_api::ApiClient;
use jupiter_core::error::Result;
use jupiter_core::matching::{MatchRecord, MatchingReport};
use std::sync::Arc;
use tokio::sync::RwLock;

pub struct MatchBoard {
    api: Arc<ApiClient>,
    records: Arc<RwLock<Vec<MatchRecord>>>,
}

impl MatchBoard {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            records: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub async fn reload(&self) -> Result<()> {
        let records = self.api.matches().await?;
        *self.records.write().await = records;
        Ok(())
    }

    pub async fn records(&self) -> Vec<MatchRecord> {
        self.records.read().await.clone()
    }

    /// Matches where both agents agree.
    pub async fn confirmed(&self) -> Vec<MatchRecord> {
        self.records
            .read()
            .await
            .iter()
            .filter(|m| m.is_matched)
            .cloned()
            .collect()
    }

    /// Matches still waiting for the other agent's verdict.
    pub async fn pending(&self) -> Vec<MatchRecord> {
        self.records
            .read()
            .await
            .iter()
            .filter(|m| !m.is_matched)
            .cloned()
            .collect()
    }

    /// Kicks off a background match search and re-reads the list once the
    /// trigger returns. Best effort: results that land later are picked up
    /// by the next manual refresh.
    pub async fn trigger_matching(&self) -> Result<MatchingReport> {
        let report = self.api.trigger_matching().await?;
        tracing::info!(
            evaluated = report.evaluated,
            new_recommendations = report.new_recommendations,
            new_matches = report.new_matches,
            "match search finished"
        );
        self.reload().await?;
        Ok(report)
    }
}
