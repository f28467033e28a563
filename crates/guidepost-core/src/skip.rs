#![forbid(unsafe_code)]

//! Playback-speed ("skip") register.
//!
//! A tour plays at one of three speeds. The register keeps the current mode
//! and exactly one saved previous mode, which is enough for a tour to force
//! [`SkipMode::Instant`] for its reset script and hand the caller's mode back
//! afterwards.
//!
//! # Invariants
//!
//! 1. [`SkipRegister::resolve`] is the only way callers branch on the mode,
//!    and it must be called at the moment the value is used. The mode can
//!    change mid-run from the blocker's controls.
//! 2. The history is one deep: `set_with_history` twice in a row loses the
//!    first saved mode.

use std::fmt;
use std::str::FromStr;

/// Playback speed of a tour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SkipMode {
    /// Full-length animations and narration.
    #[default]
    Normal,
    /// Shortened animations; narration collapses to its fade time.
    FastForward,
    /// Effectively no animation, narration or highlight.
    Instant,
}

impl SkipMode {
    /// Short code used in configuration (`n`, `ff`, `i`).
    pub const fn code(self) -> &'static str {
        match self {
            Self::Normal => "n",
            Self::FastForward => "ff",
            Self::Instant => "i",
        }
    }
}

impl fmt::Display for SkipMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Normal => "normal",
            Self::FastForward => "fast-forward",
            Self::Instant => "instant",
        };
        f.write_str(name)
    }
}

/// Error returned when parsing an unknown skip mode name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseSkipModeError(String);

impl fmt::Display for ParseSkipModeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown skip mode {:?} (expected n, ff, or i)",
            self.0
        )
    }
}

impl std::error::Error for ParseSkipModeError {}

impl FromStr for SkipMode {
    type Err = ParseSkipModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "n" | "normal" => Ok(Self::Normal),
            "ff" | "fast-forward" | "fastforward" => Ok(Self::FastForward),
            "i" | "instant" => Ok(Self::Instant),
            _ => Err(ParseSkipModeError(s.to_string())),
        }
    }
}

/// Current plus one saved playback mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SkipRegister {
    current: SkipMode,
    previous: SkipMode,
}

impl SkipRegister {
    /// Create a register starting (and remembering) `mode`.
    pub const fn new(mode: SkipMode) -> Self {
        Self {
            current: mode,
            previous: mode,
        }
    }

    /// The mode in effect right now.
    #[inline]
    pub const fn current(&self) -> SkipMode {
        self.current
    }

    /// The saved mode that [`reset`](Self::reset) will restore.
    #[inline]
    pub const fn previous(&self) -> SkipMode {
        self.previous
    }

    /// Set the mode. `None` leaves it unchanged.
    pub fn set(&mut self, mode: Option<SkipMode>) {
        if let Some(mode) = mode {
            crate::debug!(from = %self.current, to = %mode, "skip mode set");
            self.current = mode;
        }
    }

    /// Save the current mode, then [`set`](Self::set).
    pub fn set_with_history(&mut self, mode: Option<SkipMode>) {
        self.previous = self.current;
        self.set(mode);
    }

    /// Restore the saved mode.
    pub fn reset(&mut self) {
        self.current = self.previous;
    }

    /// Pick the value for the current mode.
    #[inline]
    pub fn resolve<T>(&self, normal: T, fast_forward: T, instant: T) -> T {
        match self.current {
            SkipMode::Normal => normal,
            SkipMode::FastForward => fast_forward,
            SkipMode::Instant => instant,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_codes_and_names() {
        assert_eq!("n".parse::<SkipMode>(), Ok(SkipMode::Normal));
        assert_eq!("FF".parse::<SkipMode>(), Ok(SkipMode::FastForward));
        assert_eq!("fast-forward".parse::<SkipMode>(), Ok(SkipMode::FastForward));
        assert_eq!(" instant ".parse::<SkipMode>(), Ok(SkipMode::Instant));
        assert!("warp".parse::<SkipMode>().is_err());
    }

    #[test]
    fn display_round_trips_through_parse() {
        for mode in [SkipMode::Normal, SkipMode::FastForward, SkipMode::Instant] {
            assert_eq!(mode.to_string().parse::<SkipMode>(), Ok(mode));
            assert_eq!(mode.code().parse::<SkipMode>(), Ok(mode));
        }
    }

    #[test]
    fn history_is_one_deep() {
        let mut reg = SkipRegister::default();
        reg.set_with_history(Some(SkipMode::FastForward));
        reg.set_with_history(Some(SkipMode::Instant));
        assert_eq!(reg.current(), SkipMode::Instant);
        reg.reset();
        assert_eq!(reg.current(), SkipMode::FastForward);
        reg.reset();
        assert_eq!(reg.current(), SkipMode::FastForward);
    }

    #[test]
    fn set_none_keeps_mode_but_saves_history() {
        let mut reg = SkipRegister::new(SkipMode::FastForward);
        reg.set_with_history(None);
        assert_eq!(reg.current(), SkipMode::FastForward);
        assert_eq!(reg.previous(), SkipMode::FastForward);
    }

    #[test]
    fn resolve_follows_mode() {
        let mut reg = SkipRegister::default();
        assert_eq!(reg.resolve(1, 2, 3), 1);
        reg.set(Some(SkipMode::FastForward));
        assert_eq!(reg.resolve(1, 2, 3), 2);
        reg.set(Some(SkipMode::Instant));
        assert_eq!(reg.resolve(1, 2, 3), 3);
    }
}
