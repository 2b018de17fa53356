use anyhow::Result;

use crate::domain::email::{MessageHandle, MessageMetadata};
use crate::domain::summary::ProcessedResult;
use crate::engine::SummaryEngine;
use crate::store::repo::{CacheStore, email_key};

/// Where messages come from.
pub trait MailSource {
    /// Newest-first handles matching `query`, at most `max` of them.
    fn list_message_ids(&mut self, query: &str, max: usize) -> Result<Vec<MessageHandle>>;
    /// Raw `(name, value)` header pairs for one message.
    fn get_headers(&mut self, handle: &MessageHandle) -> Result<Vec<(String, String)>>;
}

/// Receives each successful result as soon as it is produced.
pub trait Presenter {
    fn present(&mut self, result: &ProcessedResult) -> Result<()>;
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub results: Vec<ProcessedResult>,
    pub considered: usize,
    pub skipped_metadata: usize,
    pub failed_summaries: usize,
}

/// Summarize up to `limit` of `handles`, in order.
///
/// A message whose headers cannot be fetched, that has no `Message-ID`, or
/// whose summary fails is left out of the results; the batch carries on.
/// When `metadata_cache` is given, fetched metadata is stored under
/// `email:<handle>`.
pub fn run(
    source: &mut dyn MailSource,
    engine: &SummaryEngine,
    presenter: &mut dyn Presenter,
    metadata_cache: Option<&dyn CacheStore>,
    handles: &[MessageHandle],
    limit: usize,
) -> BatchReport {
    let mut report = BatchReport::default();

    for handle in handles.iter().take(limit) {
        report.considered += 1;

        let meta = match source.get_headers(handle) {
            Ok(headers) => MessageMetadata::from_headers(&headers),
            Err(e) => {
                log::warn!("fetching headers for {handle} failed: {e}");
                None
            }
        };
        let Some(meta) = meta else {
            log::debug!("skipping {handle}: no usable metadata");
            report.skipped_metadata += 1;
            continue;
        };

        if let Some(cache) = metadata_cache {
            remember_metadata(cache, handle, &meta);
        }

        let record = engine.summarize(&meta);
        if !record.is_success() {
            report.failed_summaries += 1;
            continue;
        }

        let result = ProcessedResult::new(&meta, record);
        if let Err(e) = presenter.present(&result) {
            log::warn!("presenting {handle} failed: {e}");
        }
        report.results.push(result);
    }

    log::info!(
        "batch done: {} summarized, {} without metadata, {} failed of {} considered",
        report.results.len(),
        report.skipped_metadata,
        report.failed_summaries,
        report.considered
    );
    report
}

fn remember_metadata(cache: &dyn CacheStore, handle: &MessageHandle, meta: &MessageMetadata) {
    let stored = serde_json::to_string(meta)
        .map_err(anyhow::Error::from)
        .and_then(|json| cache.set(&email_key(handle.as_str()), &json, None));
    if let Err(e) = stored {
        log::warn!("could not store metadata for {handle}: {e}");
    }
}
