use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::llm::taxonomy::Taxonomy;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    pub user_email: String,
    #[serde(default = "default_imap_server")]
    pub imap_server: String,
    #[serde(default = "default_imap_port")]
    pub imap_port: u16,
    #[serde(default = "default_mailbox")]
    pub mailbox: String,
    /// IMAP SEARCH criteria selecting the messages to triage.
    #[serde(default = "default_query")]
    pub query: String,
    #[serde(default = "default_batch_limit")]
    pub batch_limit: usize,
    pub db_path: Option<String>,
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub taxonomy: Taxonomy,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ModelConfig {
    pub endpoint: String,
    pub name: String,
    pub max_output_tokens: u32,
    pub top_p: f64,
    pub timeout_secs: u64,
    pub include_date: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434/api/generate".to_string(),
            name: "nous-hermes2-mixtral".to_string(),
            max_output_tokens: 100,
            top_p: 0.9,
            timeout_secs: 120,
            include_date: false,
        }
    }
}

fn default_imap_server() -> String {
    "imap.gmail.com".to_string()
}

fn default_imap_port() -> u16 {
    993
}

fn default_mailbox() -> String {
    "INBOX".to_string()
}

fn default_query() -> String {
    "ALL".to_string()
}

fn default_batch_limit() -> usize {
    100
}

fn default_cache_ttl_secs() -> u64 {
    4 * 60 * 60
}

pub const MAX_CACHE_TTL_SECS: u64 = 365 * 24 * 60 * 60;

impl Config {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_limit == 0 {
            return Err(anyhow!("batch_limit must be at least 1"));
        }
        if self.cache_ttl_secs > MAX_CACHE_TTL_SECS {
            return Err(anyhow!(
                "cache_ttl_secs must be at most {MAX_CACHE_TTL_SECS} (one year)"
            ));
        }
        if self.model.max_output_tokens == 0 {
            return Err(anyhow!("model.max_output_tokens must be at least 1"));
        }
        if self.taxonomy.categories.is_empty() || self.taxonomy.priorities.is_empty() {
            return Err(anyhow!("taxonomy categories and priorities must not be empty"));
        }
        Ok(())
    }
}

fn config_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .ok_or_else(|| anyhow!("no config dir available"))?
        .join("mailsift"))
}

pub fn config_path() -> Result<PathBuf> {
    let mut p = config_dir()?;
    fs::create_dir_all(&p)?;
    p.push("config.toml");
    Ok(p)
}

pub fn default_db_path() -> Result<PathBuf> {
    let mut p = config_dir()?;
    fs::create_dir_all(&p)?;
    p.push("cache.db");
    Ok(p)
}

pub fn parse_config(s: &str) -> Result<Config> {
    let cfg: Config = toml::from_str(s)?;
    cfg.validate()?;
    Ok(cfg)
}

pub fn load_config() -> Result<Config> {
    let path = config_path()?;
    if !path.exists() {
        // create a template config for users to edit
        let sample = Config {
            user_email: "you@example.com".to_string(),
            imap_server: default_imap_server(),
            imap_port: default_imap_port(),
            mailbox: default_mailbox(),
            query: default_query(),
            batch_limit: default_batch_limit(),
            db_path: None,
            cache_ttl_secs: default_cache_ttl_secs(),
            model: ModelConfig::default(),
            taxonomy: Taxonomy::default(),
        };
        let tom = toml::to_string_pretty(&sample)?;
        fs::write(&path, tom)?;
        return Err(anyhow!(
            "Created template config at {}, edit it and run again",
            path.display()
        ));
    }
    let s = fs::read_to_string(&path)?;
    parse_config(&s).map_err(|e| anyhow!("{}: {e}", path.display()))
}

pub fn resolve_db_path(cfg: &Config) -> Result<PathBuf> {
    if let Some(p) = &cfg.db_path {
        Ok(PathBuf::from(p))
    } else {
        default_db_path()
    }
}
