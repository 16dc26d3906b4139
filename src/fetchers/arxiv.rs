//! arXiv paper listing fetcher.
//!
//! Produces recent-paper placeholders for the configured categories. The
//! real arXiv Atom API takes the same parameters (category list, result
//! cap, lookback window), so the configuration surface is already the
//! final one.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use tracing::info;

use super::{simulate_latency, str_list, usize_param};
use crate::models::{Fetcher, SourceType, UnifiedItem};

/// Cap on placeholder papers per run, independent of `max_papers`.
const MOCK_PAPER_CAP: usize = 5;

pub struct ArxivFetcher;

#[async_trait]
impl Fetcher for ArxivFetcher {
    fn name(&self) -> &'static str {
        "arxiv"
    }

    fn source_type(&self) -> SourceType {
        SourceType::Academic
    }

    async fn fetch(&self, config: &Value) -> Result<Value> {
        let mut categories = str_list(config, "categories");
        if categories.is_empty() {
            categories.push("cs.AI".to_string());
        }
        let max_papers = usize_param(config, "max_papers", 10);
        let days_back = usize_param(config, "days_back", 7);

        info!(
            categories = ?categories,
            max_papers,
            "Fetching arXiv papers"
        );

        simulate_latency(150).await;

        let collected_at = Utc::now();
        let items: Vec<UnifiedItem> = (0..max_papers.min(MOCK_PAPER_CAP))
            .map(|i| {
                let category = &categories[i % categories.len()];
                let published_at =
                    collected_at - Duration::days((i % days_back.max(1)) as i64);
                UnifiedItem::new(
                    self.name(),
                    self.source_type(),
                    &format!("Advanced {category} Research Paper {i}"),
                    &format!("This paper presents novel research in {category}, covering recent methods and open problems."),
                    &format!("https://arxiv.org/abs/2024.{i:04}"),
                    published_at,
                    collected_at,
                )
            })
            .collect();

        let count = items.len();
        Ok(json!({
            "items": items,
            "count": count,
            "categories": categories,
        }))
    }
}
