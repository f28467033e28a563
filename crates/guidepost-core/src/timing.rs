#![forbid(unsafe_code)]

//! Timing constants and the duration math built on them.
//!
//! All durations are computed from the skip mode *at the moment of use*, so
//! every function here takes the [`SkipRegister`] rather than a cached mode.
//!
//! | Quantity | Normal | Fast-forward | Instant |
//! |----------|--------|--------------|---------|
//! | move | `min(max_move, px * ms_per_px)` | ×`fast_forward_factor` | 1 ms |
//! | narration | `msg_base + msg_per_word * separators`, ≥ `msg_fade + 100` | `msg_fade` | 0 |
//! | step gap | `step_delay` | `step_delay` | 0 |
//! | highlight fade | `fade` | `fade` | skipped |

use std::time::Duration;

use crate::geometry::{Bounds, Point};
use crate::skip::SkipRegister;

/// Fractions of a target's box where the guide lands (down, across).
pub const LANDING_FRACTION: (f64, f64) = (0.3, 0.3);

/// Tunable timings for a tour.
#[derive(Debug, Clone, PartialEq)]
pub struct TourTiming {
    /// Milliseconds of movement per pixel of distance. Default: 2.5.
    pub ms_per_px: f64,
    /// Cap on a single move, in ms. Default: 1500.
    pub max_move_ms: f64,
    /// Move-duration multiplier in fast-forward. Default: 0.2.
    pub fast_forward_factor: f64,
    /// Move duration in instant mode, in ms. Default: 1.
    pub instant_move_ms: f64,
    /// Highlight and slow-hide fade time, in ms. Default: 500.
    pub fade_ms: f64,
    /// Gap after an interaction before the next task, in ms. Default: 500.
    pub step_delay_ms: f64,
    /// Base narration duration, in ms. Default: 2000.
    pub msg_base_ms: f64,
    /// Additional narration time per word separator, in ms. Default: 300.
    pub msg_per_word_ms: f64,
    /// Bubble fade-out time (inside the narration duration), in ms. Default: 400.
    pub msg_fade_ms: f64,
}

impl Default for TourTiming {
    fn default() -> Self {
        Self {
            ms_per_px: 2.5,
            max_move_ms: 1500.0,
            fast_forward_factor: 0.2,
            instant_move_ms: 1.0,
            fade_ms: 500.0,
            step_delay_ms: 500.0,
            msg_base_ms: 2000.0,
            msg_per_word_ms: 300.0,
            msg_fade_ms: 400.0,
        }
    }
}

impl TourTiming {
    /// Set the per-pixel movement speed.
    #[must_use]
    pub fn with_ms_per_px(mut self, ms: f64) -> Self {
        self.ms_per_px = ms.max(0.0);
        self
    }

    /// Set the maximum move duration.
    #[must_use]
    pub fn with_max_move_ms(mut self, ms: f64) -> Self {
        self.max_move_ms = ms.max(0.0);
        self
    }

    /// Set the fast-forward movement factor.
    #[must_use]
    pub fn with_fast_forward_factor(mut self, factor: f64) -> Self {
        self.fast_forward_factor = factor.clamp(0.0, 1.0);
        self
    }

    /// Set the highlight fade time.
    #[must_use]
    pub fn with_fade_ms(mut self, ms: f64) -> Self {
        self.fade_ms = ms.max(0.0);
        self
    }

    /// Set the gap between interactions.
    #[must_use]
    pub fn with_step_delay_ms(mut self, ms: f64) -> Self {
        self.step_delay_ms = ms.max(0.0);
        self
    }

    /// Set the narration base and per-word times.
    #[must_use]
    pub fn with_message_times(mut self, base_ms: f64, per_word_ms: f64) -> Self {
        self.msg_base_ms = base_ms.max(0.0);
        self.msg_per_word_ms = per_word_ms.max(0.0);
        self
    }

    /// Set the bubble fade time.
    #[must_use]
    pub fn with_msg_fade_ms(mut self, ms: f64) -> Self {
        self.msg_fade_ms = ms.max(0.0);
        self
    }

    /// Where the guide lands on a target box.
    pub fn landing_point(bounds: &Bounds) -> Point {
        bounds.point_at(LANDING_FRACTION.1, LANDING_FRACTION.0)
    }

    /// Duration of a move between two points under the current mode.
    pub fn move_duration(&self, from: Point, to: Point, skip: &SkipRegister) -> Duration {
        let dist = from.distance_to(to);
        let ms = self.max_move_ms.min(dist * self.ms_per_px);
        ms_to_duration(skip.resolve(
            ms,
            ms * self.fast_forward_factor,
            self.instant_move_ms,
        ))
    }

    /// Unscaled narration length for `message`.
    ///
    /// Word separators (spaces) stand in for a word count, so
    /// `"abc def ghi"` costs two increments.
    pub fn base_message_ms(&self, message: &str) -> f64 {
        let separators = message.matches(' ').count() as f64;
        self.msg_base_ms + self.msg_per_word_ms * separators
    }

    /// Narration duration under the current mode.
    ///
    /// `explicit_ms` overrides the computed length; either way the result is
    /// floored at `msg_fade + 100` before the mode is applied.
    pub fn message_duration(
        &self,
        message: &str,
        explicit_ms: Option<f64>,
        skip: &SkipRegister,
    ) -> Duration {
        let ms = explicit_ms.unwrap_or_else(|| self.base_message_ms(message));
        let ms = ms.max(self.msg_fade_ms + 100.0);
        ms_to_duration(skip.resolve(ms, self.msg_fade_ms, 0.0))
    }

    /// Gap after an interaction under the current mode.
    pub fn step_delay(&self, skip: &SkipRegister) -> Duration {
        ms_to_duration(skip.resolve(self.step_delay_ms, self.step_delay_ms, 0.0))
    }

    /// Highlight and slow-hide fade time.
    pub fn fade(&self) -> Duration {
        ms_to_duration(self.fade_ms)
    }

    /// Bubble fade time.
    pub fn msg_fade(&self) -> Duration {
        ms_to_duration(self.msg_fade_ms)
    }
}

/// Convert fractional milliseconds to a [`Duration`], rounding to the
/// microsecond. Negative and non-finite inputs become zero.
pub fn ms_to_duration(ms: f64) -> Duration {
    if !ms.is_finite() || ms <= 0.0 {
        return Duration::ZERO;
    }
    let micros = (ms * 1000.0).round().min(u64::MAX as f64) as u64;
    Duration::from_micros(micros)
}

/// Scale a duration by a non-negative fraction, rounding to the microsecond.
pub fn scale_duration(d: Duration, fraction: f64) -> Duration {
    ms_to_duration(d.as_secs_f64() * 1000.0 * fraction.max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skip::SkipMode;

    fn reg(mode: SkipMode) -> SkipRegister {
        SkipRegister::new(mode)
    }

    #[test]
    fn message_duration_counts_separators() {
        let t = TourTiming::default();
        let d = t.message_duration("abc def ghi", None, &reg(SkipMode::Normal));
        assert_eq!(d, Duration::from_millis(2600));
    }

    #[test]
    fn message_duration_is_floored() {
        let t = TourTiming::default().with_message_times(10.0, 0.0);
        let d = t.message_duration("hi", None, &reg(SkipMode::Normal));
        assert_eq!(d, Duration::from_millis(500));
        let d = t.message_duration("hi", Some(50.0), &reg(SkipMode::Normal));
        assert_eq!(d, Duration::from_millis(500));
    }

    #[test]
    fn message_duration_per_mode() {
        let t = TourTiming::default();
        assert_eq!(
            t.message_duration("a b", None, &reg(SkipMode::FastForward)),
            Duration::from_millis(400)
        );
        assert_eq!(
            t.message_duration("a b", None, &reg(SkipMode::Instant)),
            Duration::ZERO
        );
        assert_eq!(
            t.message_duration("a b", Some(600.0), &reg(SkipMode::Normal)),
            Duration::from_millis(600)
        );
    }

    #[test]
    fn move_duration_is_capped_and_scaled() {
        let t = TourTiming::default();
        let a = Point::new(0.0, 0.0);
        let near = Point::new(0.0, 100.0);
        let far = Point::new(0.0, 10_000.0);
        assert_eq!(
            t.move_duration(a, near, &reg(SkipMode::Normal)),
            Duration::from_millis(250)
        );
        assert_eq!(
            t.move_duration(a, far, &reg(SkipMode::Normal)),
            Duration::from_millis(1500)
        );
        assert_eq!(
            t.move_duration(a, near, &reg(SkipMode::FastForward)),
            Duration::from_millis(50)
        );
        assert_eq!(
            t.move_duration(a, far, &reg(SkipMode::Instant)),
            Duration::from_millis(1)
        );
    }

    #[test]
    fn fast_forward_factor_is_configurable() {
        let a = Point::new(0.0, 0.0);
        let near = Point::new(0.0, 100.0);
        let half = TourTiming::default().with_fast_forward_factor(0.5);
        assert_eq!(
            half.move_duration(a, near, &reg(SkipMode::FastForward)),
            Duration::from_millis(125)
        );
        assert_eq!(
            half.move_duration(a, near, &reg(SkipMode::Normal)),
            Duration::from_millis(250)
        );
        let clamped = TourTiming::default().with_fast_forward_factor(3.0);
        assert_eq!(clamped.fast_forward_factor, 1.0);
    }

    #[test]
    fn step_delay_collapses_in_instant() {
        let t = TourTiming::default();
        assert_eq!(t.step_delay(&reg(SkipMode::Normal)), Duration::from_millis(500));
        assert_eq!(
            t.step_delay(&reg(SkipMode::FastForward)),
            Duration::from_millis(500)
        );
        assert_eq!(t.step_delay(&reg(SkipMode::Instant)), Duration::ZERO);
    }

    #[test]
    fn ms_conversion_edges() {
        assert_eq!(ms_to_duration(-5.0), Duration::ZERO);
        assert_eq!(ms_to_duration(f64::NAN), Duration::ZERO);
        assert_eq!(ms_to_duration(1.5), Duration::from_micros(1500));
        assert_eq!(
            scale_duration(Duration::from_millis(2300), 0.5),
            Duration::from_millis(1150)
        );
    }

    #[test]
    fn landing_point_is_inside_box() {
        let b = Bounds::new(10.0, 20.0, 100.0, 40.0);
        let p = TourTiming::landing_point(&b);
        assert!((p.x - 40.0).abs() < 1e-9);
        assert!((p.y - 32.0).abs() < 1e-9);
    }
}
