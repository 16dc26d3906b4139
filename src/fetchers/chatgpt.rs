//! ChatGPT research-summary fetcher.
//!
//! Unlike the feed-style sources there is no sensible placeholder without
//! credentials, so a missing or unresolved `api_key` fails the fetch. The
//! engine records that as a failed result for this source only.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use tracing::info;

use super::{simulate_latency, str_list, str_param, usize_param};
use crate::models::{Fetcher, SourceType, UnifiedItem};

/// Queries answered per run, independent of how many are configured.
const MOCK_QUERY_CAP: usize = 3;

pub struct ChatGptFetcher;

#[async_trait]
impl Fetcher for ChatGptFetcher {
    fn name(&self) -> &'static str {
        "chatgpt"
    }

    fn source_type(&self) -> SourceType {
        SourceType::Llm
    }

    async fn fetch(&self, config: &Value) -> Result<Value> {
        let api_key = str_param(config, "api_key");
        match api_key.as_deref() {
            // Unresolved `${...}` placeholders count as missing.
            None | Some("") => anyhow::bail!("OpenAI API key is required"),
            Some(key) if key.starts_with("${") => {
                anyhow::bail!("OpenAI API key is required")
            }
            Some(_) => {}
        }

        let queries = str_list(config, "queries");
        let model = str_param(config, "model").unwrap_or_else(|| "gpt-4o".to_string());
        let max_tokens = usize_param(config, "max_tokens", 2000);

        info!(queries = queries.len(), model = %model, "Executing ChatGPT research");

        simulate_latency(250).await;

        let collected_at = Utc::now();
        let items: Vec<UnifiedItem> = queries
            .iter()
            .take(MOCK_QUERY_CAP)
            .enumerate()
            .map(|(i, query)| {
                UnifiedItem::new(
                    self.name(),
                    self.source_type(),
                    query,
                    &format!(
                        "Comprehensive research summary for '{query}'. Latest developments and insights."
                    ),
                    &format!("https://chat.openai.com/research/{i}"),
                    collected_at,
                    collected_at,
                )
            })
            .collect();

        let count = items.len();
        Ok(json!({
            "items": items,
            "count": count,
            "model": model,
            "total_tokens": count * (max_tokens / 2),
        }))
    }
}
