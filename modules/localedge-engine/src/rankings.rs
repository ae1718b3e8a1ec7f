use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use localedge_common::KeywordRank;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::fallback::FallbackProvider;

/// Auxiliary per-keyword rank lookups feeding the composite score.
/// Out-of-scope collaborator: a plain HTTP call, always wrapped with a
/// fallback by the caller.
#[async_trait]
pub trait RankProvider: Send + Sync {
    async fn keyword_ranks(&self, domain: &str, keywords: &[String]) -> Result<Vec<KeywordRank>>;
}

// --- Live HTTP provider ---

pub struct HttpRankProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpRankProvider {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RankRow {
    #[serde(default)]
    keyword: String,
    #[serde(default)]
    rank: u32,
}

#[derive(Debug, Deserialize)]
struct RankResponse {
    #[serde(default)]
    ranks: Vec<RankRow>,
}

#[async_trait]
impl RankProvider for HttpRankProvider {
    async fn keyword_ranks(&self, domain: &str, keywords: &[String]) -> Result<Vec<KeywordRank>> {
        info!(domain, keywords = keywords.len(), "Rank lookup");

        let body = serde_json::json!({
            "domain": domain,
            "keywords": keywords,
        });

        let resp = self
            .client
            .post(format!("{}/ranks", self.base_url))
            .header("X-API-KEY", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .context("Rank API request failed")?;

        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("Rank API returned status {status}");
        }

        let data: RankResponse = resp.json().await.context("Failed to parse rank response")?;

        let ranks = data
            .ranks
            .into_iter()
            .map(|r| KeywordRank {
                keyword: r.keyword,
                rank: r.rank,
            })
            .collect();
        Ok(ranks)
    }
}

// --- Seeded fallback provider ---

/// Rank provider backed by the seeded fallback generator; used whenever
/// no rank API is configured.
pub struct FallbackRankProvider {
    inner: Mutex<FallbackProvider>,
}

impl FallbackRankProvider {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: Mutex::new(FallbackProvider::new(seed)),
        }
    }
}

#[async_trait]
impl RankProvider for FallbackRankProvider {
    async fn keyword_ranks(&self, _domain: &str, keywords: &[String]) -> Result<Vec<KeywordRank>> {
        Ok(self.inner.lock().await.synthetic_ranks(keywords))
    }
}

/// Run a rank lookup with the live provider when one is configured,
/// falling back to synthetic ranks on any error. Never fails.
pub async fn ranks_with_fallback(
    live: Option<&dyn RankProvider>,
    fallback: &FallbackRankProvider,
    domain: &str,
    keywords: &[String],
) -> Vec<KeywordRank> {
    if let Some(provider) = live {
        match provider.keyword_ranks(domain, keywords).await {
            Ok(ranks) => return ranks,
            Err(e) => {
                warn!(domain, error = %e, "Live rank lookup failed, using fallback");
            }
        }
    }
    fallback
        .keyword_ranks(domain, keywords)
        .await
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingProvider;

    #[async_trait]
    impl RankProvider for FailingProvider {
        async fn keyword_ranks(
            &self,
            _domain: &str,
            _keywords: &[String],
        ) -> Result<Vec<KeywordRank>> {
            anyhow::bail!("simulated outage")
        }
    }

    #[tokio::test]
    async fn failed_live_lookup_falls_back_to_synthetic_ranks() {
        let keywords = vec!["plumber".to_string(), "drain cleaning".to_string()];
        let fallback = FallbackRankProvider::new(42);
        let ranks =
            ranks_with_fallback(Some(&FailingProvider), &fallback, "acme.example", &keywords).await;
        assert_eq!(ranks.len(), 2);
    }

    #[tokio::test]
    async fn missing_live_provider_uses_fallback_directly() {
        let keywords = vec!["water heater".to_string()];
        let fallback = FallbackRankProvider::new(42);
        let ranks = ranks_with_fallback(None, &fallback, "acme.example", &keywords).await;
        assert_eq!(ranks.len(), 1);
    }
}
