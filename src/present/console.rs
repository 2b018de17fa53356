use anyhow::Result;
use std::io::Write;

use crate::batch::Presenter;
use crate::domain::summary::ProcessedResult;

/// Plain-text block per result.
pub struct ConsolePresenter<W: Write> {
    out: W,
}

impl ConsolePresenter<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self {
            out: std::io::stdout(),
        }
    }
}

impl<W: Write> ConsolePresenter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Presenter for ConsolePresenter<W> {
    fn present(&mut self, r: &ProcessedResult) -> Result<()> {
        writeln!(self.out, "Sender: {}", r.sender)?;
        writeln!(self.out, "Summary: {}", r.summary)?;
        writeln!(self.out, "Category: {}", r.category)?;
        writeln!(self.out, "Priority: {}", r.priority)?;
        writeln!(self.out, "Response Required: {}", r.response_required)?;
        writeln!(self.out, "Date: {}", r.date)?;
        writeln!(self.out, "{}", "-".repeat(50))?;
        Ok(())
    }
}
