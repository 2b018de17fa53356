//! Mailbox triage: summarize and categorize messages with a local model,
//! caching each result by message identity.

pub mod auth;
pub mod batch;
pub mod config;
pub mod daemon;
pub mod domain;
pub mod engine;
pub mod llm;
pub mod mail;
pub mod present;
pub mod store;
