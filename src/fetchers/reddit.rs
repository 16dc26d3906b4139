//! Reddit top-post fetcher.
//!
//! Degrades to a placeholder subreddit when none are configured rather
//! than failing; an empty feed upstream is a transient condition in this
//! domain, not an error.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use tracing::info;

use super::{simulate_latency, str_list, str_param, usize_param};
use crate::models::{Fetcher, SourceType, UnifiedItem};

const MOCK_POSTS_PER_SUBREDDIT: usize = 5;

pub struct RedditFetcher;

#[async_trait]
impl Fetcher for RedditFetcher {
    fn name(&self) -> &'static str {
        "reddit"
    }

    fn source_type(&self) -> SourceType {
        SourceType::Forum
    }

    async fn fetch(&self, config: &Value) -> Result<Value> {
        let mut subreddits = str_list(config, "subreddits");
        if subreddits.is_empty() {
            subreddits.push("research".to_string());
        }
        let post_limit = usize_param(config, "post_limit", 20);
        let time_filter = str_param(config, "time_filter").unwrap_or_else(|| "day".to_string());

        info!(subreddits = ?subreddits, post_limit, "Fetching Reddit posts");

        simulate_latency(120).await;

        let collected_at = Utc::now();
        let per_subreddit = (post_limit / subreddits.len()).clamp(1, MOCK_POSTS_PER_SUBREDDIT);
        let items: Vec<UnifiedItem> = subreddits
            .iter()
            .flat_map(|subreddit| {
                (0..per_subreddit).map(move |i| (subreddit, i))
            })
            .map(|(subreddit, i)| {
                UnifiedItem::new(
                    self.name(),
                    self.source_type(),
                    &format!("Interesting post from r/{subreddit} #{i}"),
                    &format!("Top discussion in r/{subreddit} over the last {time_filter}."),
                    &format!("https://reddit.com/r/{subreddit}/post{i}"),
                    collected_at,
                    collected_at,
                )
            })
            .collect();

        let count = items.len();
        Ok(json!({
            "items": items,
            "count": count,
            "subreddits": subreddits,
            "time_filter": time_filter,
        }))
    }
}
