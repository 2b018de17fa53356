use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::summary::SummaryRecord;

pub const RESPONSE_VALUES: [&str; 2] = ["Yes", "No"];

/// Allowed values for the enum-like fields of a [`SummaryRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Taxonomy {
    pub categories: Vec<String>,
    pub priorities: Vec<String>,
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self {
            categories: ["Work", "School", "Shopping", "Social", "Personal"]
                .map(String::from)
                .to_vec(),
            priorities: ["Urgent", "Important", "Normal"].map(String::from).to_vec(),
        }
    }
}

/// A field value outside its allow-list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field} {value:?} is not an allowed value")]
pub struct Disallowed {
    pub field: &'static str,
    pub value: String,
}

impl Taxonomy {
    pub fn check(&self, record: &SummaryRecord) -> Result<(), Disallowed> {
        if !self.categories.iter().any(|c| *c == record.category) {
            return Err(Disallowed {
                field: "category",
                value: record.category.clone(),
            });
        }
        if !self.priorities.iter().any(|p| *p == record.priority) {
            return Err(Disallowed {
                field: "priority",
                value: record.priority.clone(),
            });
        }
        if !RESPONSE_VALUES.contains(&record.response_required.as_str()) {
            return Err(Disallowed {
                field: "response_required",
                value: record.response_required.clone(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(category: &str, priority: &str, response: &str) -> SummaryRecord {
        SummaryRecord {
            summary: "s".into(),
            category: category.into(),
            priority: priority.into(),
            response_required: response.into(),
        }
    }

    #[test]
    fn default_lists_accept_known_values() {
        let t = Taxonomy::default();
        assert!(t.check(&record("Shopping", "Important", "No")).is_ok());
        assert!(t.check(&record("Personal", "Urgent", "Yes")).is_ok());
    }

    #[test]
    fn rejects_values_outside_lists() {
        let t = Taxonomy::default();
        let err = t.check(&record("Spam", "Normal", "No")).unwrap_err();
        assert_eq!(err.field, "category");

        let err = t.check(&record("Work", "Low", "No")).unwrap_err();
        assert_eq!(err.field, "priority");

        let err = t.check(&record("Work", "Normal", "Maybe")).unwrap_err();
        assert_eq!(err.field, "response_required");
    }

    #[test]
    fn comparison_is_exact() {
        let t = Taxonomy::default();
        let err = t.check(&record(" Shopping ", "Normal", "No")).unwrap_err();
        assert_eq!(err.to_string(), r#"category " Shopping " is not an allowed value"#);
        assert!(t.check(&record("work", "Normal", "No")).is_err());
    }

    #[test]
    fn custom_lists_replace_defaults() {
        let t = Taxonomy {
            categories: vec!["School".into(), "Spam".into()],
            priorities: vec!["High".into(), "Low".into()],
        };
        assert!(t.check(&record("Spam", "Low", "No")).is_ok());
        assert!(t.check(&record("Work", "Low", "No")).is_err());
    }
}
