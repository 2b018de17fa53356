//! Aggregate counts over a batch of results.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::domain::summary::ProcessedResult;

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct Breakdown {
    pub total: usize,
    pub by_category: BTreeMap<String, usize>,
    pub by_priority: BTreeMap<String, usize>,
    pub by_response: BTreeMap<String, usize>,
    pub by_sender: BTreeMap<String, usize>,
}

impl Breakdown {
    pub fn from_results(results: &[ProcessedResult]) -> Self {
        let mut b = Self::default();
        for r in results {
            b.total += 1;
            *b.by_category.entry(r.category.clone()).or_default() += 1;
            *b.by_priority.entry(r.priority.clone()).or_default() += 1;
            *b.by_response.entry(r.response_required.clone()).or_default() += 1;
            *b.by_sender.entry(r.sender.clone()).or_default() += 1;
        }
        b
    }

    /// Senders by message count, highest first, ties by name.
    pub fn top_senders(&self, n: usize) -> Vec<(&str, usize)> {
        let mut v: Vec<_> = self
            .by_sender
            .iter()
            .map(|(k, c)| (k.as_str(), *c))
            .collect();
        v.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
        v.truncate(n);
        v
    }
}

fn write_section(f: &mut fmt::Formatter<'_>, title: &str, rows: &BTreeMap<String, usize>) -> fmt::Result {
    writeln!(f, "{title}:")?;
    for (k, c) in rows {
        writeln!(f, "  {k:<20} {c:>4}")?;
    }
    Ok(())
}

impl fmt::Display for Breakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Processed: {}", self.total)?;
        write_section(f, "By category", &self.by_category)?;
        write_section(f, "By priority", &self.by_priority)?;
        write_section(f, "Response required", &self.by_response)?;
        writeln!(f, "Top senders:")?;
        for (s, c) in self.top_senders(5) {
            writeln!(f, "  {s:<40} {c:>4}")?;
        }
        Ok(())
    }
}
