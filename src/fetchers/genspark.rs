//! GenSpark keyword-digest fetcher.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use tracing::info;

use super::{simulate_latency, str_list, usize_param};
use crate::models::{Fetcher, SourceType, UnifiedItem};

/// Mock upstream attribution per digest.
const MOCK_SOURCES_PER_DIGEST: usize = 15;

pub struct GenSparkFetcher;

#[async_trait]
impl Fetcher for GenSparkFetcher {
    fn name(&self) -> &'static str {
        "genspark"
    }

    fn source_type(&self) -> SourceType {
        SourceType::News
    }

    async fn fetch(&self, config: &Value) -> Result<Value> {
        let keywords = str_list(config, "keywords");
        let max_results = usize_param(config, "max_results", 10);

        info!(keywords = ?keywords, "Executing GenSpark research");

        simulate_latency(180).await;

        let collected_at = Utc::now();
        let items: Vec<UnifiedItem> = keywords
            .iter()
            .take(max_results)
            .enumerate()
            .map(|(i, keyword)| {
                UnifiedItem::new(
                    self.name(),
                    self.source_type(),
                    &format!("Digest: {keyword}"),
                    &format!(
                        "GenSpark research summary for '{keyword}', aggregated from {MOCK_SOURCES_PER_DIGEST} sources."
                    ),
                    &format!("https://genspark.ai/digest/{i}"),
                    collected_at,
                    collected_at,
                )
            })
            .collect();

        let count = items.len();
        Ok(json!({
            "items": items,
            "count": count,
            "keywords": keywords,
            "total_sources": count * MOCK_SOURCES_PER_DIGEST,
        }))
    }
}
