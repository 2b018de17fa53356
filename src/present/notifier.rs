use anyhow::Result;
use notify_rust::{Hint, Notification};
use std::collections::{HashSet, VecDeque};

use crate::batch::Presenter;
use crate::domain::summary::ProcessedResult;

/// Desktop notification for results at `priority` that need a reply.
///
/// The last `SEEN_CAPACITY` announced identities are remembered, so a
/// polling loop that re-reads cached summaries does not repeat itself.
pub struct DesktopNotifier {
    priority: String,
    capacity: usize,
    seen: HashSet<String>,
    order: VecDeque<String>,
}

pub const SEEN_CAPACITY: usize = 1024;

impl DesktopNotifier {
    pub fn new(priority: impl Into<String>) -> Self {
        Self::with_capacity(priority, SEEN_CAPACITY)
    }

    pub fn with_capacity(priority: impl Into<String>, capacity: usize) -> Self {
        Self {
            priority: priority.into(),
            capacity: capacity.max(1),
            seen: HashSet::new(),
            order: VecDeque::new(),
        }
    }

    fn should_notify(&mut self, r: &ProcessedResult) -> bool {
        if r.priority != self.priority || !r.needs_response() || self.seen.contains(&r.message_id) {
            return false;
        }
        // oldest identity goes first
        if self.order.len() == self.capacity
            && let Some(old) = self.order.pop_front()
        {
            self.seen.remove(&old);
        }
        self.seen.insert(r.message_id.clone());
        self.order.push_back(r.message_id.clone());
        true
    }
}

impl Presenter for DesktopNotifier {
    fn present(&mut self, r: &ProcessedResult) -> Result<()> {
        if !self.should_notify(r) {
            return Ok(());
        }

        let mut n = Notification::new();
        n.summary(&format!("{} from {}", r.priority, r.sender))
            .body(&r.summary)
            .appname("mailsift")
            .hint(Hint::Category("email".to_string()));

        if let Err(e) = n.show() {
            // no notification daemon is not worth failing the batch over
            log::warn!("Notification error: {e}");
        }
        Ok(())
    }
}
