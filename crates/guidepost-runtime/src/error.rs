#![forbid(unsafe_code)]

//! Errors surfaced to the code driving a tour.
//!
//! Nothing here reaches the end user: unresolved targets, unknown widget
//! kinds and malformed steps degrade silently inside the runner. These are
//! the mistakes a host program can make (or observe) while driving it.

use std::fmt;
use std::time::Duration;

use crate::flag_store::StoreError;

/// Errors returned by [`Runner`](crate::runner::Runner) operations.
#[derive(Debug)]
pub enum TourError {
    /// A tour is already running or paused.
    AlreadyRunning,
    /// No tour with this name in the book.
    UnknownTour(String),
    /// No prompt is showing.
    NoPrompt,
    /// Prompt choice out of range.
    PromptChoice {
        /// Requested item.
        index: usize,
        /// Items available.
        len: usize,
    },
    /// A blocker control was used with no blocker attached.
    NoBlocker,
    /// The run is waiting on a continuation nobody will release.
    Stalled {
        /// Virtual time at which the run stalled.
        at: Duration,
    },
    /// The flag store failed.
    Store(StoreError),
}

impl fmt::Display for TourError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TourError::AlreadyRunning => write!(f, "a tour is already running"),
            TourError::UnknownTour(name) => write!(f, "unknown tour: {name:?}"),
            TourError::NoPrompt => write!(f, "no prompt is showing"),
            TourError::PromptChoice { index, len } => {
                write!(f, "prompt choice {index} out of range ({len} items)")
            }
            TourError::NoBlocker => write!(f, "no blocker is attached"),
            TourError::Stalled { at } => {
                write!(f, "tour stalled at {} ms", at.as_millis())
            }
            TourError::Store(e) => write!(f, "flag store: {e}"),
        }
    }
}

impl std::error::Error for TourError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TourError::Store(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for TourError {
    fn from(e: StoreError) -> Self {
        TourError::Store(e)
    }
}

/// Result type for runner operations.
pub type TourResult<T> = Result<T, TourError>;
