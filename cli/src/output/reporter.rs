//! `TerminalReporter` — Presentation-layer implementation of `ProgressReporter`.
//!
//! Wraps `&OutputContext` and implements the `application::ports::ProgressReporter`
//! trait so application services can emit progress events without depending on
//! any presentation type directly.

use std::cell::RefCell;

use indicatif::ProgressBar;
use owo_colors::OwoColorize as _;

use crate::application::ports::ProgressReporter;
use crate::output::{OutputContext, progress};

/// Terminal progress reporter that wraps an `OutputContext`.
///
/// On a TTY, `step()` starts a spinner that the next `success()` finishes in
/// place; otherwise every event is a plain line. Everything is suppressed
/// when `ctx.quiet`.
pub struct TerminalReporter<'a> {
    ctx: &'a OutputContext,
    spinner: RefCell<Option<ProgressBar>>,
}

impl<'a> TerminalReporter<'a> {
    /// Create a new `TerminalReporter` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self {
            ctx,
            spinner: RefCell::new(None),
        }
    }

    fn take_spinner(&self) -> Option<ProgressBar> {
        self.spinner.borrow_mut().take()
    }
}

impl ProgressReporter for TerminalReporter<'_> {
    fn step(&self, message: &str) {
        if self.ctx.quiet {
            return;
        }
        if let Some(pb) = self.take_spinner() {
            pb.finish_and_clear();
        }
        if self.ctx.show_progress() {
            *self.spinner.borrow_mut() = Some(progress::spinner(message));
        } else {
            println!("  {} {message}", "→".style(self.ctx.styles.info));
        }
    }

    fn success(&self, message: &str) {
        if self.ctx.quiet {
            return;
        }
        match self.take_spinner() {
            Some(pb) => progress::finish_ok(&pb, message),
            None => self.ctx.success(message),
        }
    }

    fn warn(&self, message: &str) {
        if self.ctx.quiet {
            return;
        }
        if let Some(pb) = self.take_spinner() {
            pb.finish_and_clear();
        }
        self.ctx.warn(message);
    }
}

impl Drop for TerminalReporter<'_> {
    fn drop(&mut self) {
        if let Some(pb) = self.spinner.get_mut().take() {
            pb.finish_and_clear();
        }
    }
}
