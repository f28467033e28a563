#![forbid(unsafe_code)]

//! Runner configuration.
//!
//! # Environment
//!
//! | Variable | Effect |
//! |----------|--------|
//! | `GUIDEPOST_SKIP_MODE` | Initial playback mode (`n`, `ff`, `i`). Invalid values are ignored with a warning. |
//! | `GUIDEPOST_NO_AUTO_KEY` | Flag-store key for "don't auto-start". |

use std::env;

use guidepost_core::skip::SkipMode;
use guidepost_core::timing::TourTiming;

use crate::flag_store::NO_AUTO_TOUR_KEY;

/// Environment variable for the initial skip mode.
pub const ENV_SKIP_MODE: &str = "GUIDEPOST_SKIP_MODE";
/// Environment variable for the auto-start flag key.
pub const ENV_NO_AUTO_KEY: &str = "GUIDEPOST_NO_AUTO_KEY";

/// Settings for a [`Runner`](crate::runner::Runner).
#[derive(Debug, Clone, PartialEq)]
pub struct RunnerConfig {
    /// Durations and speeds.
    pub timing: TourTiming,
    /// Mode the skip register starts in.
    pub skip_mode: SkipMode,
    /// Flag-store key recording that auto-start is disabled.
    pub no_auto_key: String,
    /// Title of the log viewer.
    pub log_title: String,
    /// Title of the builder dialog.
    pub builder_title: String,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            timing: TourTiming::default(),
            skip_mode: SkipMode::Normal,
            no_auto_key: NO_AUTO_TOUR_KEY.to_string(),
            log_title: "Tour Log".to_string(),
            builder_title: "What do you want to know about?".to_string(),
        }
    }
}

impl RunnerConfig {
    /// Defaults overridden from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Defaults overridden through `lookup` (an environment stand-in).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(raw) = lookup(ENV_SKIP_MODE) {
            match raw.parse::<SkipMode>() {
                Ok(mode) => config.skip_mode = mode,
                Err(e) => tracing::warn!(error = %e, "ignoring {ENV_SKIP_MODE}"),
            }
        }
        if let Some(key) = lookup(ENV_NO_AUTO_KEY).filter(|k| !k.trim().is_empty()) {
            config.no_auto_key = key.trim().to_string();
        }
        config
    }

    /// Set the timing.
    #[must_use]
    pub fn with_timing(mut self, timing: TourTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Set the initial skip mode.
    #[must_use]
    pub fn with_skip_mode(mut self, mode: SkipMode) -> Self {
        self.skip_mode = mode;
        self
    }

    /// Set the auto-start flag key.
    #[must_use]
    pub fn with_no_auto_key(mut self, key: impl Into<String>) -> Self {
        self.no_auto_key = key.into();
        self
    }

    /// Set the dialog titles.
    #[must_use]
    pub fn with_titles(mut self, log: impl Into<String>, builder: impl Into<String>) -> Self {
        self.log_title = log.into();
        self.builder_title = builder.into();
        self
    }
}
