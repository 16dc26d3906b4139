//! Twitter keyword search fetcher.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use tracing::info;

use super::{simulate_latency, str_list, usize_param};
use crate::models::{Fetcher, SourceType, UnifiedItem};

pub struct TwitterFetcher;

#[async_trait]
impl Fetcher for TwitterFetcher {
    fn name(&self) -> &'static str {
        "twitter"
    }

    fn source_type(&self) -> SourceType {
        SourceType::Social
    }

    async fn fetch(&self, config: &Value) -> Result<Value> {
        let accounts = str_list(config, "accounts");
        let keywords = str_list(config, "keywords");
        let max_tweets = usize_param(config, "max_tweets", 50);

        info!(
            accounts = accounts.len(),
            keywords = keywords.len(),
            "Fetching Twitter data"
        );

        simulate_latency(80).await;

        let collected_at = Utc::now();
        let items: Vec<UnifiedItem> = keywords
            .iter()
            .take(max_tweets)
            .enumerate()
            .map(|(i, keyword)| {
                UnifiedItem::new(
                    self.name(),
                    self.source_type(),
                    &format!("Sample tweet about {keyword}"),
                    &format!("Discussion thread on {keyword} with community reactions."),
                    &format!("https://twitter.com/status/{}", i + 1),
                    collected_at,
                    collected_at,
                )
            })
            .collect();

        let count = items.len();
        Ok(json!({
            "items": items,
            "count": count,
            "accounts": accounts,
            "keywords": keywords,
        }))
    }
}
