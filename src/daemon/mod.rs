use anyhow::{Result, anyhow};
use std::{
    sync::Arc,
    sync::atomic::{AtomicBool, Ordering},
    thread,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use crate::batch::{self, BatchReport, MailSource, Presenter};
use crate::engine::SummaryEngine;
use crate::store::repo::{CacheStore, LAST_PROCESSED_KEY};

pub const MIN_INTERVAL_SECS: u64 = 10;

pub struct RunOptions {
    pub query: String,
    pub limit: usize,
}

/// One pass over the mailbox.
///
/// Failing to list messages aborts the run. `Ok(None)` means the query
/// matched nothing and the last-run marker was left untouched.
pub fn run_once(
    source: &mut dyn MailSource,
    engine: &SummaryEngine,
    presenter: &mut dyn Presenter,
    store: &dyn CacheStore,
    opts: &RunOptions,
) -> Result<Option<BatchReport>> {
    let handles = source.list_message_ids(&opts.query, opts.limit)?;
    log::info!("retrieved {} message ids", handles.len());
    if handles.is_empty() {
        return Ok(None);
    }

    let report = batch::run(source, engine, presenter, Some(store), &handles, opts.limit);

    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as i64;
    store.set_meta_i64(LAST_PROCESSED_KEY, now)?;
    Ok(Some(report))
}

/// Poll every `interval_secs` (at least [`MIN_INTERVAL_SECS`]) until Ctrl-C.
pub fn run_daemon(
    source: &mut dyn MailSource,
    engine: &SummaryEngine,
    presenter: &mut dyn Presenter,
    store: &dyn CacheStore,
    opts: &RunOptions,
    interval_secs: u64,
) -> Result<()> {
    if interval_secs < MIN_INTERVAL_SECS {
        return Err(anyhow!(
            "poll interval must be at least {MIN_INTERVAL_SECS}s, got {interval_secs}s"
        ));
    }

    let running = Arc::new(AtomicBool::new(true));
    let r2 = running.clone();
    ctrlc::set_handler(move || {
        r2.store(false, Ordering::SeqCst);
    })?;

    while running.load(Ordering::SeqCst) {
        match store.purge_expired() {
            Ok(0) => {}
            Ok(n) => log::debug!("purged {n} expired cache entries"),
            Err(e) => log::warn!("cache purge failed: {e}"),
        }

        match run_once(source, engine, presenter, store, opts) {
            Ok(Some(report)) => log::info!(
                "cycle done: {} of {} summarized",
                report.results.len(),
                report.considered
            ),
            Ok(None) => log::info!("cycle done: no messages matched"),
            Err(e) => log::error!("cycle failed: {e:#}"),
        }

        // sleep in short steps so Ctrl-C is not held up by a long interval
        for _ in 0..interval_secs {
            if !running.load(Ordering::SeqCst) {
                break;
            }
            thread::sleep(Duration::from_secs(1));
        }
    }

    Ok(())
}
