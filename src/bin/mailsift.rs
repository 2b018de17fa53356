use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};

use mailsift::auth::credentials;
use mailsift::config::{Config, load_config, resolve_db_path};
use mailsift::daemon::{MIN_INTERVAL_SECS, RunOptions, run_daemon, run_once};
use mailsift::engine::{EngineConfig, SummaryEngine};
use mailsift::llm::ollama::OllamaClient;
use mailsift::mail::imap_client::ImapSource;
use mailsift::present::Presenters;
use mailsift::present::analytics::Breakdown;
use mailsift::present::console::ConsolePresenter;
use mailsift::present::notifier::DesktopNotifier;
use mailsift::store::repo::{CacheStore, LAST_PROCESSED_KEY};
use mailsift::store::sqlite::SqliteStore;

#[derive(Parser)]
#[command(name = "mailsift")]
#[command(about = "Summarize and categorize mail with a local model", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Summarize one batch of messages and exit
    Run {
        /// Maximum number of messages to process (defaults to batch_limit)
        #[arg(long)]
        limit: Option<usize>,

        /// IMAP SEARCH criteria (defaults to the configured query)
        #[arg(long)]
        query: Option<String>,

        /// Print results as JSON instead of text
        #[arg(long)]
        json: bool,

        /// Desktop notification for urgent messages needing a reply
        #[arg(long)]
        notify: bool,
    },

    /// Poll the mailbox until interrupted
    Watch {
        /// Seconds between polls (minimum 10)
        #[arg(long, default_value_t = 300, value_parser = clap::value_parser!(u64).range(MIN_INTERVAL_SECS..))]
        interval: u64,

        #[arg(long)]
        notify: bool,
    },

    /// Store the IMAP password in keyring
    SetPassword,

    /// Show when the last batch finished
    LastRun,

    /// Drop expired cache entries
    Purge,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.cmd {
        Command::SetPassword => {
            let cfg = load_cfg()?;
            eprintln!("Paste password for {} (end with Ctrl-D):", cfg.user_email);
            let mut secret = String::new();
            std::io::Read::read_to_string(&mut std::io::stdin(), &mut secret)?;
            credentials::save_password(&cfg.user_email, secret.trim())?;
            println!("Saved password for {}", cfg.user_email);
            Ok(())
        }

        Command::LastRun => {
            let store = open_store(&load_cfg()?)?;
            match store.get_meta_i64(LAST_PROCESSED_KEY)? {
                Some(ts) => println!("{ts}"),
                None => println!("never"),
            }
            Ok(())
        }

        Command::Purge => {
            let store = open_store(&load_cfg()?)?;
            let n = store.purge_expired()?;
            println!("Removed {n} expired entries");
            Ok(())
        }

        Command::Run {
            limit,
            query,
            json,
            notify,
        } => {
            let cfg = load_cfg()?;
            let store = open_store(&cfg)?;
            let model = OllamaClient::new(&cfg.model)?;
            let engine = SummaryEngine::new(&store, &model, EngineConfig::from_config(&cfg));
            let mut source = imap_source(&cfg)?;

            let mut presenters = Presenters::default();
            if !json {
                presenters.push(ConsolePresenter::stdout());
            }
            if notify {
                presenters.push(DesktopNotifier::new(urgent_priority(&cfg)));
            }

            let opts = RunOptions {
                query: query.unwrap_or_else(|| cfg.query.clone()),
                limit: limit.unwrap_or(cfg.batch_limit),
            };
            if opts.limit == 0 {
                return Err(anyhow!("--limit must be at least 1"));
            }

            println!("Retrieving emails from {}...", cfg.mailbox);
            let Some(report) = run_once(&mut source, &engine, &mut presenters, &store, &opts)?
            else {
                println!("No emails found.");
                return Ok(());
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&report.results)?);
            } else {
                print!("{}", Breakdown::from_results(&report.results));
                println!(
                    "Skipped {} without metadata, {} failed to summarize",
                    report.skipped_metadata, report.failed_summaries
                );
            }
            Ok(())
        }

        Command::Watch { interval, notify } => {
            let cfg = load_cfg()?;
            let store = open_store(&cfg)?;
            let model = OllamaClient::new(&cfg.model)?;
            let engine = SummaryEngine::new(&store, &model, EngineConfig::from_config(&cfg));
            let mut source = imap_source(&cfg)?;

            let mut presenters = Presenters::default();
            if notify {
                presenters.push(DesktopNotifier::new(urgent_priority(&cfg)));
            }

            let opts = RunOptions {
                query: cfg.query.clone(),
                limit: cfg.batch_limit,
            };
            run_daemon(&mut source, &engine, &mut presenters, &store, &opts, interval)
        }
    }
}

fn load_cfg() -> Result<Config> {
    load_config().map_err(|e| anyhow!("Configuration error: {e}"))
}

fn open_store(cfg: &Config) -> Result<SqliteStore> {
    let db_path = resolve_db_path(cfg)?;
    SqliteStore::open(&db_path).map_err(|e| anyhow!("cannot open cache {}: {e}", db_path.display()))
}

fn imap_source(cfg: &Config) -> Result<ImapSource> {
    let password = credentials::resolve_password(&cfg.user_email)?;
    Ok(ImapSource::new(
        cfg.imap_server.clone(),
        cfg.imap_port,
        cfg.user_email.clone(),
        password,
        cfg.mailbox.clone(),
    ))
}

// The first configured priority is the most pressing one.
fn urgent_priority(cfg: &Config) -> String {
    cfg.taxonomy
        .priorities
        .first()
        .cloned()
        .unwrap_or_else(|| "Urgent".to_string())
}
