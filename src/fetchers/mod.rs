//! Source fetcher plug-ins.
//!
//! Each submodule provides one implementation of the [`Fetcher`]
//! capability contract: source-specific parameters in, a structured
//! payload of normalized items out. Fetchers share no mutable state and
//! are safe to run concurrently with each other.
//!
//! # Supported Sources
//!
//! | Source | Module | Type | Notes |
//! |--------|--------|------|-------|
//! | arXiv | [`arxiv`] | academic | Category-filtered paper listing |
//! | Reddit | [`reddit`] | forum | Subreddit top posts |
//! | Twitter | [`twitter`] | social | Keyword/account search |
//! | ChatGPT | [`chatgpt`] | llm | Research summaries; requires an API key |
//! | GenSpark | [`genspark`] | news | Keyword digests |
//!
//! The upstream calls are simulated: each fetcher sleeps briefly to model
//! network latency and produces deterministic-id placeholder items. That
//! keeps the engine exercisable end to end without credentials; swapping
//! in a real client only touches the fetcher, not the engine.
//!
//! # Payload Shape
//!
//! Every fetcher returns a JSON object with at least `items` (a list of
//! [`crate::models::UnifiedItem`] records) and `count`, plus
//! source-specific extras.

use once_cell::sync::Lazy;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::models::Fetcher;
use crate::pipeline::Registry;

pub mod arxiv;
pub mod chatgpt;
pub mod genspark;
pub mod reddit;
pub mod twitter;

static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let mut registry: Registry = HashMap::new();
    registry.insert("arxiv", Arc::new(arxiv::ArxivFetcher) as Arc<dyn Fetcher>);
    registry.insert("reddit", Arc::new(reddit::RedditFetcher) as Arc<dyn Fetcher>);
    registry.insert("twitter", Arc::new(twitter::TwitterFetcher) as Arc<dyn Fetcher>);
    registry.insert("chatgpt", Arc::new(chatgpt::ChatGptFetcher) as Arc<dyn Fetcher>);
    registry.insert("genspark", Arc::new(genspark::GenSparkFetcher) as Arc<dyn Fetcher>);
    registry
});

/// The static name-to-fetcher mapping built at process startup.
pub fn registry() -> &'static Registry {
    &REGISTRY
}

/// Sorted registry names, for the `list` command.
pub fn available_sources() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = REGISTRY.keys().copied().collect();
    names.sort_unstable();
    names
}

pub(crate) fn str_list(config: &Value, key: &str) -> Vec<String> {
    config
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

pub(crate) fn usize_param(config: &Value, key: &str, default: usize) -> usize {
    config
        .get(key)
        .and_then(Value::as_u64)
        .map(|n| n as usize)
        .unwrap_or(default)
}

pub(crate) fn str_param(config: &Value, key: &str) -> Option<String> {
    config
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Simulated upstream latency with a little jitter.
pub(crate) async fn simulate_latency(base_ms: u64) {
    use rand::{rng, Rng};
    let jitter = rng().random_range(0..80u64);
    tokio::time::sleep(std::time::Duration::from_millis(base_ms + jitter)).await;
}
