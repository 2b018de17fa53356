use serde::{Deserialize, Serialize};

pub const DEFAULT_SUBJECT: &str = "No Subject";
pub const DEFAULT_SENDER: &str = "Unknown Sender";
pub const DEFAULT_DATE: &str = "Unknown Date";

/// Provider-side reference to a message (an IMAP UID, for instance).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageHandle(pub String);

impl MessageHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MessageHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Headers of one fetched message, with defaults applied.
///
/// `identity` is the `Message-ID` header: stable across mailboxes and
/// independent of the message content, so it is what cache entries are keyed by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageMetadata {
    pub subject: String,
    pub sender: String,
    pub date: String,
    pub identity: String,
}

impl MessageMetadata {
    /// Build metadata from raw `(name, value)` header pairs.
    ///
    /// Returns `None` when there is no usable `Message-ID`; such messages are
    /// never summarized.
    pub fn from_headers(headers: &[(String, String)]) -> Option<Self> {
        let identity = header_value(headers, "Message-ID")?;

        Some(Self {
            subject: header_value(headers, "Subject").unwrap_or_else(|| DEFAULT_SUBJECT.to_string()),
            sender: header_value(headers, "From").unwrap_or_else(|| DEFAULT_SENDER.to_string()),
            date: header_value(headers, "Date").unwrap_or_else(|| DEFAULT_DATE.to_string()),
            identity,
        })
    }
}

// First header with this name (case-insensitive), trimmed; blank counts as absent.
fn header_value(headers: &[(String, String)], name: &str) -> Option<String> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
