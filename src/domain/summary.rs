use serde::{Deserialize, Serialize};

use crate::domain::email::MessageMetadata;

/// Summary text carried by the failure sentinel. Callers compare against it.
pub const FAILED_SUMMARY: &str = "Error summarizing email";
pub const ERROR_MARKER: &str = "Error";

/// Structured output of the model for one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub summary: String,
    pub category: String,
    pub priority: String,
    pub response_required: String,
}

impl SummaryRecord {
    /// The record returned for any message that could not be summarized.
    pub fn failure() -> Self {
        Self {
            summary: FAILED_SUMMARY.to_string(),
            category: ERROR_MARKER.to_string(),
            priority: ERROR_MARKER.to_string(),
            response_required: ERROR_MARKER.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.summary != FAILED_SUMMARY
    }
}

/// One successfully summarized message, as handed to presenters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedResult {
    pub message_id: String,
    pub sender: String,
    pub summary: String,
    pub category: String,
    pub priority: String,
    pub response_required: String,
    pub date: String,
}

impl ProcessedResult {
    pub fn new(meta: &MessageMetadata, record: SummaryRecord) -> Self {
        Self {
            message_id: meta.identity.clone(),
            sender: meta.sender.clone(),
            summary: record.summary,
            category: record.category,
            priority: record.priority,
            response_required: record.response_required,
            date: meta.date.clone(),
        }
    }

    pub fn needs_response(&self) -> bool {
        self.response_required == "Yes"
    }
}
