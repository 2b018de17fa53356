use anyhow::Result;
use std::time::Duration;

/// Key under which the summary for a message identity is cached.
pub fn summary_key(identity: &str) -> String {
    format!("summary:{identity}")
}

/// Key under which fetched metadata for a provider id is kept.
pub fn email_key(provider_id: &str) -> String {
    format!("email:{provider_id}")
}

pub const LAST_PROCESSED_KEY: &str = "last_processed_ts";

/// Key-value cache with per-entry expiry, plus a small integer meta table.
pub trait CacheStore {
    /// Live value for `key`; expired entries read as absent.
    fn get(&self, key: &str) -> Result<Option<String>>;
    /// Insert or replace. `None` ttl never expires.
    fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()>;
    /// Drop expired entries, returning how many were removed.
    fn purge_expired(&self) -> Result<usize>;

    fn get_meta_i64(&self, key: &str) -> Result<Option<i64>>;
    fn set_meta_i64(&self, key: &str, value: i64) -> Result<()>;
}
