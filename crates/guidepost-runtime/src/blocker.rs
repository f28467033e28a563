#![forbid(unsafe_code)]

//! Interaction blocker.
//!
//! While attached, the blocker stands between the user and the page. Any
//! interaction attempt raises a warning carrying the tour's control surface
//! ([`BlockerControl`]). The runner owns the blocker and interprets the
//! controls; this module only tracks what is showing.

use std::fmt;

use crate::page::Page;

/// Text shown in the blocker warning.
pub const WARNING_TEXT: &str = "A guided tour is currently in progress and interaction is disabled. \
You can choose to view a log, pause the tour, continue the tour, \
or to end it so you may regain interactivity.";

/// Buttons on the blocker warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockerControl {
    /// Stop before the next step.
    Pause,
    /// Normal speed, resume.
    Play,
    /// Fast-forward, resume, and cut pending waits short.
    FastForward,
    /// Open the log viewer.
    ViewLog,
    /// End the tour.
    EndTour,
    /// Dismiss the warning only.
    HideMessage,
}

impl BlockerControl {
    /// Every control, in display order.
    pub const ALL: [Self; 6] = [
        Self::Pause,
        Self::Play,
        Self::FastForward,
        Self::ViewLog,
        Self::EndTour,
        Self::HideMessage,
    ];

    /// Button caption.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pause => "Pause",
            Self::Play => "Play",
            Self::FastForward => "Fast-forward",
            Self::ViewLog => "View Log",
            Self::EndTour => "End Tour",
            Self::HideMessage => "Hide Message",
        }
    }
}

impl fmt::Display for BlockerControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Overlay state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Blocker {
    attached: bool,
    warning: bool,
}

impl Blocker {
    /// A detached blocker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the overlay is up.
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Whether the warning is showing.
    pub fn is_warning_visible(&self) -> bool {
        self.warning
    }

    /// Attach (if needed) and show the warning. Attaching hides the page's
    /// landmarks.
    pub fn create(&mut self, page: &mut dyn Page) {
        if !self.attached {
            tracing::debug!("blocker attached");
            self.attached = true;
            page.set_landmarks_hidden(true);
        }
        self.warn();
    }

    /// A blocked interaction attempt: raise the warning again.
    pub fn warn(&mut self) {
        if self.attached {
            self.warning = true;
        }
    }

    /// Dismiss the warning, leaving the overlay up.
    pub fn hide_warning(&mut self) {
        self.warning = false;
    }

    /// Detach. Returns whether anything was attached.
    pub fn destroy(&mut self, page: &mut dyn Page) -> bool {
        if !self.attached {
            return false;
        }
        tracing::debug!("blocker destroyed");
        self.warning = false;
        self.attached = false;
        page.set_landmarks_hidden(false);
        true
    }
}
