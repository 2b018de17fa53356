//! Cache-backed summarization of a single message.
//!
//! Flow per call: cache lookup by identity, then on a miss one model call,
//! normalization, allow-list check and a cache write. Only records that pass
//! every step are cached, so a live entry always holds a valid record and
//! the model is asked at most once per identity per TTL window.

use std::time::Duration;
use thiserror::Error;

use crate::domain::email::MessageMetadata;
use crate::domain::summary::SummaryRecord;
use crate::llm::Generator;
use crate::llm::normalize::{NormalizationError, normalize};
use crate::llm::prompt::build_prompt;
use crate::llm::taxonomy::{Disallowed, Taxonomy};
use crate::store::repo::{CacheStore, summary_key};

#[derive(Debug, Error)]
pub enum SummarizeError {
    #[error("message has no identity")]
    MissingIdentity,
    #[error("cache unavailable: {0}")]
    Cache(anyhow::Error),
    #[error("model call failed: {0}")]
    Model(anyhow::Error),
    #[error(transparent)]
    Normalize(#[from] NormalizationError),
    #[error(transparent)]
    Disallowed(#[from] Disallowed),
    #[error("model returned the failure marker as its summary")]
    ReservedSummary,
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub taxonomy: Taxonomy,
    pub ttl: Duration,
    pub max_output_tokens: u32,
    pub include_date: bool,
}

impl EngineConfig {
    pub fn from_config(cfg: &crate::config::Config) -> Self {
        Self {
            taxonomy: cfg.taxonomy.clone(),
            ttl: cfg.cache_ttl(),
            max_output_tokens: cfg.model.max_output_tokens,
            include_date: cfg.model.include_date,
        }
    }
}

pub struct SummaryEngine<'a> {
    cache: &'a dyn CacheStore,
    model: &'a dyn Generator,
    cfg: EngineConfig,
}

impl<'a> SummaryEngine<'a> {
    pub fn new(cache: &'a dyn CacheStore, model: &'a dyn Generator, cfg: EngineConfig) -> Self {
        Self { cache, model, cfg }
    }

    /// Summarize `meta`, returning [`SummaryRecord::failure`] on any error.
    pub fn summarize(&self, meta: &MessageMetadata) -> SummaryRecord {
        match self.try_summarize(meta) {
            Ok(record) => record,
            Err(e) => {
                log::warn!("summarize {:?} failed: {e}", meta.identity);
                SummaryRecord::failure()
            }
        }
    }

    pub fn try_summarize(&self, meta: &MessageMetadata) -> Result<SummaryRecord, SummarizeError> {
        if meta.identity.trim().is_empty() {
            return Err(SummarizeError::MissingIdentity);
        }
        let key = summary_key(&meta.identity);

        // A cache error is not a miss: falling through to the model here would
        // let every caller regenerate while the backend is down.
        let cached = self.cache.get(&key).map_err(SummarizeError::Cache)?;
        if let Some(raw) = cached {
            match serde_json::from_str::<SummaryRecord>(&raw) {
                Ok(record) => {
                    log::debug!("cache hit for {}", meta.identity);
                    return Ok(record);
                }
                // only valid records are written, so this is a foreign or stale format
                Err(e) => log::warn!("ignoring unreadable cache entry {key}: {e}"),
            }
        }

        let prompt = build_prompt(meta, &self.cfg.taxonomy, self.cfg.include_date);
        let raw = self
            .model
            .generate(&prompt, self.cfg.max_output_tokens)
            .map_err(SummarizeError::Model)?;

        let record = normalize(&raw).inspect_err(|e| {
            log::debug!("unusable model output for {}: {e}; raw: {raw:?}", meta.identity);
        })?;
        self.cfg
            .taxonomy
            .check(&record)
            .map_err(SummarizeError::Disallowed)?;
        // would read back as a failure for the whole TTL
        if !record.is_success() {
            return Err(SummarizeError::ReservedSummary);
        }

        let value = serde_json::to_string(&record).map_err(|e| SummarizeError::Cache(e.into()))?;
        self.cache
            .set(&key, &value, Some(self.cfg.ttl))
            .map_err(SummarizeError::Cache)?;

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::sqlite::SqliteStore;
    use anyhow::{Result, anyhow};
    use std::cell::{Cell, RefCell};

    const GOOD: &str = r#"Sure! {"summary":"Invoice reminder","category":"Shopping","priority":"Important","response_required":"No"} Hope this helps!"#;

    struct FakeModel {
        replies: RefCell<Vec<String>>,
        calls: Cell<usize>,
        last_cap: Cell<u32>,
    }

    impl FakeModel {
        fn new(replies: &[&str]) -> Self {
            Self {
                replies: RefCell::new(replies.iter().rev().map(|s| s.to_string()).collect()),
                calls: Cell::new(0),
                last_cap: Cell::new(0),
            }
        }
    }

    impl Generator for FakeModel {
        fn generate(&self, _prompt: &str, max_output_tokens: u32) -> Result<String> {
            self.calls.set(self.calls.get() + 1);
            self.last_cap.set(max_output_tokens);
            self.replies
                .borrow_mut()
                .pop()
                .ok_or_else(|| anyhow!("model offline"))
        }
    }

    struct BrokenCache;

    impl CacheStore for BrokenCache {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(anyhow!("connection refused"))
        }
        fn set(&self, _key: &str, _value: &str, _ttl: Option<Duration>) -> Result<()> {
            Err(anyhow!("connection refused"))
        }
        fn purge_expired(&self) -> Result<usize> {
            Ok(0)
        }
        fn get_meta_i64(&self, _key: &str) -> Result<Option<i64>> {
            Ok(None)
        }
        fn set_meta_i64(&self, _key: &str, _value: i64) -> Result<()> {
            Ok(())
        }
    }

    fn cfg() -> EngineConfig {
        EngineConfig {
            taxonomy: Taxonomy::default(),
            ttl: Duration::from_secs(4 * 3600),
            max_output_tokens: 100,
            include_date: false,
        }
    }

    fn meta(identity: &str) -> MessageMetadata {
        MessageMetadata {
            subject: "Invoice due".into(),
            sender: "billing@x.com".into(),
            date: "Unknown Date".into(),
            identity: identity.into(),
        }
    }

    #[test]
    fn miss_calls_model_and_caches_record() {
        let store = SqliteStore::open_in_memory().unwrap();
        let model = FakeModel::new(&[GOOD]);
        let engine = SummaryEngine::new(&store, &model, cfg());

        let rec = engine.summarize(&meta("abc123"));
        assert!(rec.is_success());
        assert_eq!(rec.summary, "Invoice reminder");
        assert_eq!(rec.category, "Shopping");
        assert_eq!(model.last_cap.get(), 100);

        let cached = store.get("summary:abc123").unwrap().unwrap();
        assert_eq!(serde_json::from_str::<SummaryRecord>(&cached).unwrap(), rec);
    }

    #[test]
    fn live_entry_means_at_most_one_model_call() {
        let store = SqliteStore::open_in_memory().unwrap();
        let model = FakeModel::new(&[GOOD, GOOD]);
        let engine = SummaryEngine::new(&store, &model, cfg());

        let first = engine.summarize(&meta("abc123"));
        let second = engine.summarize(&meta("abc123"));
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
        assert_eq!(model.calls.get(), 1);
    }

    #[test]
    fn expired_entry_regenerates() {
        let store = SqliteStore::open_in_memory().unwrap();
        let other = GOOD.replace("Invoice reminder", "Payment overdue");
        let model = FakeModel::new(&[GOOD, other.as_str()]);
        let engine = SummaryEngine::new(
            &store,
            &model,
            EngineConfig {
                ttl: Duration::ZERO,
                ..cfg()
            },
        );

        assert_eq!(engine.summarize(&meta("abc123")).summary, "Invoice reminder");
        assert_eq!(engine.summarize(&meta("abc123")).summary, "Payment overdue");
        assert_eq!(model.calls.get(), 2);
    }

    #[test]
    fn unstructured_output_is_not_cached() {
        let store = SqliteStore::open_in_memory().unwrap();
        let model = FakeModel::new(&["I cannot help with that."]);
        let engine = SummaryEngine::new(&store, &model, cfg());

        let err = engine.try_summarize(&meta("abc123")).unwrap_err();
        assert!(matches!(
            err,
            SummarizeError::Normalize(NormalizationError::NoStructureFound)
        ));
        assert_eq!(store.get("summary:abc123").unwrap(), None);
    }

    #[test]
    fn failures_collapse_to_sentinel() {
        let store = SqliteStore::open_in_memory().unwrap();
        let model = FakeModel::new(&[r#"{"summary":"Hi","category":"Work"}"#]);
        let engine = SummaryEngine::new(&store, &model, cfg());

        assert_eq!(engine.summarize(&meta("abc123")), SummaryRecord::failure());
        assert_eq!(store.get("summary:abc123").unwrap(), None);

        // model has no more replies: transport-style failure
        assert_eq!(engine.summarize(&meta("abc123")), SummaryRecord::failure());
    }

    #[test]
    fn disallowed_category_is_not_cached() {
        let store = SqliteStore::open_in_memory().unwrap();
        let model = FakeModel::new(&[GOOD.replace("Shopping", "Spam").as_str()]);
        let engine = SummaryEngine::new(&store, &model, cfg());

        let err = engine.try_summarize(&meta("abc123")).unwrap_err();
        assert!(matches!(err, SummarizeError::Disallowed(d) if d.field == "category"));
        assert_eq!(store.get("summary:abc123").unwrap(), None);
    }

    #[test]
    fn failure_marker_summary_is_not_cached() {
        let store = SqliteStore::open_in_memory().unwrap();
        let reply = GOOD.replace("Invoice reminder", "Error summarizing email");
        let model = FakeModel::new(&[reply.as_str()]);
        let engine = SummaryEngine::new(&store, &model, cfg());

        assert!(matches!(
            engine.try_summarize(&meta("abc123")),
            Err(SummarizeError::ReservedSummary)
        ));
        assert_eq!(store.get("summary:abc123").unwrap(), None);
    }

    #[test]
    fn padded_category_fails_allow_list() {
        let store = SqliteStore::open_in_memory().unwrap();
        let reply = GOOD.replace("\"Shopping\"", "\" Shopping \"");
        let model = FakeModel::new(&[reply.as_str()]);
        let engine = SummaryEngine::new(&store, &model, cfg());

        assert_eq!(engine.summarize(&meta("abc123")), SummaryRecord::failure());
        assert_eq!(store.get("summary:abc123").unwrap(), None);
    }

    #[test]
    fn empty_identity_never_reaches_model() {
        let store = SqliteStore::open_in_memory().unwrap();
        let model = FakeModel::new(&[GOOD]);
        let engine = SummaryEngine::new(&store, &model, cfg());

        assert!(matches!(
            engine.try_summarize(&meta("")),
            Err(SummarizeError::MissingIdentity)
        ));
        assert_eq!(model.calls.get(), 0);
    }

    #[test]
    fn cache_outage_does_not_fall_back_to_model() {
        let model = FakeModel::new(&[GOOD]);
        let engine = SummaryEngine::new(&BrokenCache, &model, cfg());

        assert!(matches!(
            engine.try_summarize(&meta("abc123")),
            Err(SummarizeError::Cache(_))
        ));
        assert_eq!(model.calls.get(), 0);
    }

    #[test]
    fn unreadable_cache_entry_is_replaced() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .set("summary:abc123", "not json", Some(Duration::from_secs(60)))
            .unwrap();
        let model = FakeModel::new(&[GOOD]);
        let engine = SummaryEngine::new(&store, &model, cfg());

        assert!(engine.summarize(&meta("abc123")).is_success());
        assert_eq!(model.calls.get(), 1);
        assert_ne!(store.get("summary:abc123").unwrap().as_deref(), Some("not json"));
    }
}
