pub mod analytics;
pub mod console;
pub mod notifier;

use anyhow::Result;

use crate::batch::Presenter;
use crate::domain::summary::ProcessedResult;

/// Forwards every result to each inner presenter, in order.
#[derive(Default)]
pub struct Presenters(pub Vec<Box<dyn Presenter>>);

impl Presenters {
    pub fn push(&mut self, p: impl Presenter + 'static) {
        self.0.push(Box::new(p));
    }
}

impl Presenter for Presenters {
    fn present(&mut self, result: &ProcessedResult) -> Result<()> {
        let mut first_err = None;
        for p in &mut self.0 {
            if let Err(e) = p.present(result) {
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}
