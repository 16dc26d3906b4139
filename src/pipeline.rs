//! Pipeline composition: from declared source configs to runnable triples.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::config::SourceConfig;
use crate::models::{Fetcher, Pipeline};

/// The name-to-fetcher lookup consumed by [`compose`]. The composer never
/// builds this mapping itself.
pub type Registry = HashMap<&'static str, Arc<dyn Fetcher>>;

/// Build an ordered pipeline from declared source configs and a fetcher
/// registry.
///
/// Walks the configs in declaration order, skipping disabled entries
/// (logged at info) and names with no registered fetcher (logged at warn,
/// non-fatal). Never fails: an empty pipeline is the signal that nothing
/// is runnable. Composing twice from the same inputs yields identical
/// triples.
#[instrument(level = "debug", skip_all, fields(declared = source_configs.len()))]
pub fn compose(source_configs: &[(String, SourceConfig)], registry: &Registry) -> Pipeline {
    let mut pipeline = Pipeline::default();

    for (name, source) in source_configs {
        if !source.enabled {
            info!(source = %name, "Source disabled, skipping");
            continue;
        }
        if let Some(schedule) = &source.schedule {
            debug!(source = %name, %schedule, "Schedule declared, not enacted by this engine");
        }
        if !source.dependencies.is_empty() {
            debug!(
                source = %name,
                dependencies = ?source.dependencies,
                "Dependencies declared, not enacted by this engine"
            );
        }
        match registry.get(name.as_str()) {
            Some(fetcher) => {
                pipeline.fetchers.push(Arc::clone(fetcher));
                pipeline.configs.push(source.config.clone());
                pipeline.names.push(name.clone());
            }
            None => {
                warn!(source = %name, "Unknown source, no registered fetcher");
            }
        }
    }

    pipeline
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SourceType;
    use anyhow::Result;
    use async_trait::async_trait;
    use serde_json::{json, Value};

    struct NullFetcher(&'static str);

    #[async_trait]
    impl Fetcher for NullFetcher {
        fn name(&self) -> &'static str {
            self.0
        }

        fn source_type(&self) -> SourceType {
            SourceType::News
        }

        async fn fetch(&self, _config: &Value) -> Result<Value> {
            Ok(Value::Null)
        }
    }

    fn registry_of(names: &[&'static str]) -> Registry {
        names
            .iter()
            .map(|n| (*n, Arc::new(NullFetcher(*n)) as Arc<dyn Fetcher>))
            .collect()
    }

    fn source(enabled: bool, params: Value) -> SourceConfig {
        SourceConfig {
            enabled,
            config: params,
            ..SourceConfig::default()
        }
    }

    #[test]
    fn test_compose_preserves_declaration_order() {
        let registry = registry_of(&["a", "b", "c"]);
        let configs = vec![
            ("c".to_string(), source(true, json!({"n": 3}))),
            ("a".to_string(), source(true, json!({"n": 1}))),
            ("b".to_string(), source(true, json!({"n": 2}))),
        ];
        let pipeline = compose(&configs, &registry);
        assert_eq!(pipeline.names, vec!["c", "a", "b"]);
        assert_eq!(pipeline.configs[0]["n"], 3);
        assert_eq!(pipeline.len(), 3);
        assert_eq!(pipeline.fetchers.len(), pipeline.configs.len());
    }

    #[test]
    fn test_compose_skips_disabled() {
        let registry = registry_of(&["a", "b"]);
        let configs = vec![
            ("a".to_string(), source(false, Value::Null)),
            ("b".to_string(), source(true, Value::Null)),
        ];
        let pipeline = compose(&configs, &registry);
        assert_eq!(pipeline.names, vec!["b"]);
    }

    #[test]
    fn test_compose_skips_unknown_without_failing() {
        let registry = registry_of(&["a"]);
        let configs = vec![
            ("a".to_string(), source(true, Value::Null)),
            ("ghost".to_string(), source(true, Value::Null)),
        ];
        let pipeline = compose(&configs, &registry);
        assert_eq!(pipeline.names, vec!["a"]);
    }

    #[test]
    fn test_compose_disabled_wins_over_registry() {
        let registry = registry_of(&["a"]);
        let configs = vec![("a".to_string(), source(false, Value::Null))];
        let pipeline = compose(&configs, &registry);
        assert!(pipeline.is_empty());
    }

    #[test]
    fn test_compose_is_idempotent() {
        let registry = registry_of(&["a", "b"]);
        let configs = vec![
            ("b".to_string(), source(true, json!({"x": 1}))),
            ("a".to_string(), source(true, json!({"x": 2}))),
        ];
        let first = compose(&configs, &registry);
        let second = compose(&configs, &registry);
        assert_eq!(first.names, second.names);
        assert_eq!(first.configs, second.configs);
        let first_ptrs: Vec<_> = first.fetchers.iter().map(Arc::as_ptr).collect();
        let second_ptrs: Vec<_> = second.fetchers.iter().map(Arc::as_ptr).collect();
        assert_eq!(first_ptrs, second_ptrs);
    }

    #[test]
    fn test_compose_empty_input_yields_empty_pipeline() {
        let registry = registry_of(&["a"]);
        let pipeline = compose(&[], &registry);
        assert!(pipeline.is_empty());
        assert_eq!(pipeline.len(), 0);
    }
}
