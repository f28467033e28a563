#![forbid(unsafe_code)]

//! What a callable step can do while it runs.
//!
//! A callable receives a [`CallScope`] borrowing the runner. The scope
//! records how the step wants the tour to continue; the runner acts on it
//! once the callable returns. A callable that neither advances nor holds
//! stalls the tour, exactly like a script waiting on an element that never
//! appears.
//!
//! ```ignore
//! Step::call(|scope| {
//!     scope.page_mut().activate_tab(&"Trade".into());
//!     scope.advance_after(Duration::from_millis(200));
//! })
//! ```

use std::time::Duration;

use guidepost_core::skip::SkipMode;

use crate::log::LogEntry;
use crate::page::{Page, TargetDescriptor};
use crate::runner::Runner;
use crate::tour::Step;

/// Token for a step that will finish later.
///
/// Hand it to [`Runner::resume_continuation`] to release the tour. Tokens
/// from an earlier run (or after [`Runner::end`]) are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Continuation {
    pub(crate) run: u64,
    pub(crate) id: u64,
}

/// How a callable step finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    /// Nothing requested: the tour stalls.
    Pending,
    /// Advance after the step gap.
    Advance,
    /// Advance after exactly this long (zero: now).
    AdvanceAfter(Duration),
    /// Advance when the continuation is released.
    Held(Continuation),
    /// End the tour now.
    End,
    /// Fade the guide out, then end.
    HideSlow,
}

/// Handle given to callable steps.
pub struct CallScope<'a> {
    runner: &'a mut Runner,
    outcome: Outcome,
}

impl<'a> CallScope<'a> {
    pub(crate) fn new(runner: &'a mut Runner) -> Self {
        Self {
            runner,
            outcome: Outcome::Pending,
        }
    }

    pub(crate) fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Continue after the usual gap between interactions.
    pub fn advance(&mut self) {
        self.outcome = Outcome::Advance;
    }

    /// Continue right away.
    pub fn advance_now(&mut self) {
        self.outcome = Outcome::AdvanceAfter(Duration::ZERO);
    }

    /// Continue after `delay`.
    pub fn advance_after(&mut self, delay: Duration) {
        self.outcome = Outcome::AdvanceAfter(delay);
    }

    /// Keep the tour waiting until the returned token is released.
    pub fn hold(&mut self) -> Continuation {
        let token = self.runner.issue_continuation();
        self.outcome = Outcome::Held(token);
        token
    }

    /// End the tour once this step returns.
    pub fn end(&mut self) {
        self.outcome = Outcome::End;
    }

    /// Fade the guide out and end once this step returns.
    pub fn hide_slow(&mut self) {
        self.outcome = Outcome::HideSlow;
    }

    /// Append a step after everything already queued.
    pub fn enqueue(&mut self, step: Step) {
        self.runner.enqueue_step(&step);
    }

    /// Flash an element (skipped in instant mode).
    pub fn signal(&mut self, target: &TargetDescriptor) {
        self.runner.signal_target(target);
    }

    /// Log narration (suppressed in instant mode).
    pub fn log_message(&mut self, text: &str) {
        self.runner.log_message(text);
    }

    /// Log an entry regardless of the playback mode.
    pub fn log_exempt(&mut self, entry: LogEntry) {
        self.runner.log_mut().push_exempt(entry);
    }

    /// The page.
    pub fn page(&self) -> &dyn Page {
        self.runner.page()
    }

    /// The page, mutably.
    pub fn page_mut(&mut self) -> &mut dyn Page {
        self.runner.page_mut()
    }

    /// Current playback mode.
    pub fn skip_mode(&self) -> SkipMode {
        self.runner.skip_mode()
    }

    /// Change the playback mode (without touching the saved mode).
    pub fn set_skip_mode(&mut self, mode: SkipMode) {
        self.runner.set_skip_mode(mode);
    }

    /// Virtual time.
    pub fn now(&self) -> Duration {
        self.runner.now()
    }
}
