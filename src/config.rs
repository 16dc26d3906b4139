//! Workflow configuration loading.
//!
//! A workflow is declared in YAML: a `sources` mapping of source name to
//! [`SourceConfig`] plus a global `execution` block. The loader preserves
//! the declaration order of the source map, because that order is what the
//! composed pipeline and the result sequence mirror. Environment-variable
//! placeholders are expected to be resolved before the file reaches this
//! loader; an unresolved `${...}` value is passed through untouched.
//!
//! ```yaml
//! sources:
//!   arxiv:
//!     enabled: true
//!     config:
//!       categories: ["cs.AI", "cs.CL"]
//!       max_papers: 10
//!   chatgpt:
//!     enabled: false
//!     config:
//!       api_key: "${OPENAI_API_KEY}"
//! execution:
//!   parallel: true
//!   timeout: 300
//!   output_dir: "./outputs"
//! ```

use anyhow::{Context, Result};
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fmt;
use std::path::Path;

/// Declarative configuration for one named source.
///
/// Immutable once loaded. `schedule` and `dependencies` are carried
/// through from the schema but not enacted by the engine.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Source-specific parameters, passed opaquely to the fetcher.
    #[serde(default)]
    pub config: Value,
    #[serde(default)]
    pub schedule: Option<String>,
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// Per-source override of the global execution timeout, in seconds.
    #[serde(default)]
    pub timeout: Option<u64>,
    /// Per-source override of the global retry count.
    #[serde(default)]
    pub retries: Option<u32>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            config: Value::Null,
            schedule: None,
            dependencies: Vec::new(),
            timeout: None,
            retries: None,
        }
    }
}

fn default_enabled() -> bool {
    true
}

/// Global execution settings for one run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    pub parallel: bool,
    /// Per-attempt fetch timeout in seconds. Must be positive.
    pub timeout: u64,
    /// Retries after a failed or timed-out attempt.
    pub retries: u32,
    pub output_dir: String,
    pub log_level: String,
    pub save_results: bool,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            timeout: 300,
            retries: 0,
            output_dir: "./outputs".to_string(),
            log_level: "info".to_string(),
            save_results: true,
        }
    }
}

/// The full parsed workflow file.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowConfig {
    /// Source declarations in file order; duplicate names collapse to the
    /// last declaration.
    #[serde(deserialize_with = "ordered_source_map", default)]
    pub sources: Vec<(String, SourceConfig)>,
    #[serde(default)]
    pub execution: ExecutionConfig,
}

impl WorkflowConfig {
    /// Restrict the declared sources to an explicit selection, keeping
    /// declaration order. Unknown selections are simply absent from the
    /// output, mirroring how the composer treats unknown registry names.
    pub fn select_sources(&self, selected: &[String]) -> Vec<(String, SourceConfig)> {
        if selected.is_empty() {
            return self.sources.clone();
        }
        self.sources
            .iter()
            .filter(|(name, _)| selected.iter().any(|s| s == name))
            .cloned()
            .collect()
    }
}

/// Deserialize a YAML mapping into an order-preserving list of
/// `(name, SourceConfig)` pairs with last-declaration-wins semantics.
fn ordered_source_map<'de, D>(deserializer: D) -> Result<Vec<(String, SourceConfig)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct SourceMapVisitor;

    impl<'de> Visitor<'de> for SourceMapVisitor {
        type Value = Vec<(String, SourceConfig)>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a mapping of source name to source configuration")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut sources: Vec<(String, SourceConfig)> = Vec::new();
            while let Some((name, config)) = map.next_entry::<String, SourceConfig>()? {
                if let Some(slot) = sources.iter_mut().find(|(n, _)| *n == name) {
                    slot.1 = config;
                } else {
                    sources.push((name, config));
                }
            }
            Ok(sources)
        }
    }

    deserializer.deserialize_map(SourceMapVisitor)
}

/// Load and parse a workflow configuration file.
///
/// Runs before the tracing subscriber exists (the configured log level is
/// what initializes it), so this function emits no log events; the caller
/// logs the load summary once logging is up.
///
/// # Errors
///
/// Fails on unreadable files, malformed YAML, or a non-positive execution
/// timeout. All of these abort the run before any execution starts.
pub fn load_config(path: &Path) -> Result<WorkflowConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading workflow config {}", path.display()))?;
    let config: WorkflowConfig = serde_yaml::from_str(&text)
        .with_context(|| format!("parsing workflow config {}", path.display()))?;

    anyhow::ensure!(
        config.execution.timeout > 0,
        "execution.timeout must be positive (got 0)"
    );

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
sources:
  arxiv:
    enabled: true
    config:
      categories: ["cs.AI", "cs.CL"]
      max_papers: 5
  reddit:
    enabled: false
    config:
      subreddits: ["MachineLearning"]
  twitter:
    config:
      keywords: ["llm"]
    schedule: "0 8 * * *"
    dependencies: ["arxiv"]
    timeout: 10
    retries: 2
execution:
  parallel: false
  timeout: 120
  output_dir: "./out"
"#;

    #[test]
    fn test_parse_preserves_declaration_order() {
        let config: WorkflowConfig = serde_yaml::from_str(SAMPLE).unwrap();
        let names: Vec<&str> = config.sources.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["arxiv", "reddit", "twitter"]);
    }

    #[test]
    fn test_enabled_defaults_to_true() {
        let config: WorkflowConfig = serde_yaml::from_str(SAMPLE).unwrap();
        let twitter = &config.sources[2].1;
        assert!(twitter.enabled);
        assert_eq!(twitter.timeout, Some(10));
        assert_eq!(twitter.retries, Some(2));
    }

    #[test]
    fn test_schedule_and_dependencies_are_carried() {
        let config: WorkflowConfig = serde_yaml::from_str(SAMPLE).unwrap();
        let twitter = &config.sources[2].1;
        assert_eq!(twitter.schedule.as_deref(), Some("0 8 * * *"));
        assert_eq!(twitter.dependencies, vec!["arxiv"]);
    }

    #[test]
    fn test_source_params_are_opaque_json() {
        let config: WorkflowConfig = serde_yaml::from_str(SAMPLE).unwrap();
        let arxiv = &config.sources[0].1;
        assert_eq!(arxiv.config["max_papers"], 5);
        assert_eq!(arxiv.config["categories"][0], "cs.AI");
    }

    #[test]
    fn test_execution_block_overrides_defaults() {
        let config: WorkflowConfig = serde_yaml::from_str(SAMPLE).unwrap();
        assert!(!config.execution.parallel);
        assert_eq!(config.execution.timeout, 120);
        assert_eq!(config.execution.output_dir, "./out");
        // untouched fields keep their defaults
        assert_eq!(config.execution.retries, 0);
        assert!(config.execution.save_results);
    }

    #[test]
    fn test_missing_execution_block_uses_defaults() {
        let config: WorkflowConfig =
            serde_yaml::from_str("sources:\n  arxiv:\n    enabled: true\n").unwrap();
        assert!(config.execution.parallel);
        assert_eq!(config.execution.timeout, 300);
        assert_eq!(config.execution.log_level, "info");
    }

    #[test]
    fn test_select_sources_keeps_order_and_drops_unknown() {
        let config: WorkflowConfig = serde_yaml::from_str(SAMPLE).unwrap();
        let picked = config.select_sources(&["twitter".into(), "arxiv".into(), "nope".into()]);
        let names: Vec<&str> = picked.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["arxiv", "twitter"]);
    }

    #[test]
    fn test_select_sources_empty_selection_means_all() {
        let config: WorkflowConfig = serde_yaml::from_str(SAMPLE).unwrap();
        assert_eq!(config.select_sources(&[]).len(), 3);
    }

    fn write_temp_config(tag: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!(
            "research_pulse_config_{tag}_{}.yml",
            std::process::id()
        ));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_config_rejects_zero_timeout() {
        let path = write_temp_config(
            "zero_timeout",
            "sources:\n  arxiv: {}\nexecution:\n  timeout: 0\n",
        );
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("timeout must be positive"));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_load_config_emits_no_log_events() {
        // load_config runs before the tracing subscriber is installed, so
        // anything it logged would be dropped silently. Keep it quiet.
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        struct CountingSubscriber(Arc<AtomicUsize>);

        impl tracing::Subscriber for CountingSubscriber {
            fn enabled(&self, _metadata: &tracing::Metadata<'_>) -> bool {
                true
            }

            fn new_span(&self, _attrs: &tracing::span::Attributes<'_>) -> tracing::span::Id {
                tracing::span::Id::from_u64(1)
            }

            fn record(&self, _span: &tracing::span::Id, _values: &tracing::span::Record<'_>) {}

            fn record_follows_from(&self, _span: &tracing::span::Id, _follows: &tracing::span::Id) {}

            fn event(&self, _event: &tracing::Event<'_>) {
                self.0.fetch_add(1, Ordering::SeqCst);
            }

            fn enter(&self, _span: &tracing::span::Id) {}

            fn exit(&self, _span: &tracing::span::Id) {}
        }

        let events = Arc::new(AtomicUsize::new(0));
        let subscriber = CountingSubscriber(Arc::clone(&events));

        let path = write_temp_config("quiet", SAMPLE);
        let loaded = tracing::subscriber::with_default(subscriber, || load_config(&path));
        let _ = std::fs::remove_file(&path);

        assert!(loaded.is_ok());
        assert_eq!(events.load(Ordering::SeqCst), 0);
    }
}
