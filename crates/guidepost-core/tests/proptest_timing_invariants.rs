#![forbid(unsafe_code)]

//! Property-based invariants for skip-mode timing.
//!
//! 1. Instant mode never produces a move longer than 1 ms.
//! 2. Instant mode never produces narration time.
//! 3. Normal mode returns the unmodified, capped movement time.
//! 4. Fast-forward never exceeds normal.
//! 5. Narration under normal mode is never shorter than fade + 100 ms.
//! 6. The timeline pops in non-decreasing deadline order.

use std::time::Duration;

use guidepost_core::timing::ms_to_duration;
use guidepost_core::{Point, SkipMode, SkipRegister, Timeline, TourTiming};
use proptest::prelude::*;

fn point_strategy() -> impl Strategy<Value = Point> {
    (-5_000.0f64..5_000.0, -5_000.0f64..50_000.0).prop_map(|(x, y)| Point::new(x, y))
}

fn message_strategy() -> impl Strategy<Value = String> {
    "[a-z ]{0,200}"
}

proptest! {
    #[test]
    fn instant_moves_are_at_most_one_ms(a in point_strategy(), b in point_strategy()) {
        let t = TourTiming::default();
        let d = t.move_duration(a, b, &SkipRegister::new(SkipMode::Instant));
        prop_assert!(d <= Duration::from_millis(1), "instant move took {:?}", d);
    }

    #[test]
    fn instant_narration_is_zero(msg in message_strategy(), explicit in proptest::option::of(0.0f64..10_000.0)) {
        let t = TourTiming::default();
        let d = t.message_duration(&msg, explicit, &SkipRegister::new(SkipMode::Instant));
        prop_assert_eq!(d, Duration::ZERO);
    }

    #[test]
    fn normal_move_is_unmodified(a in point_strategy(), b in point_strategy()) {
        let t = TourTiming::default();
        let d = t.move_duration(a, b, &SkipRegister::new(SkipMode::Normal));
        let expected = ms_to_duration(t.max_move_ms.min(a.distance_to(b) * t.ms_per_px));
        prop_assert_eq!(d, expected);
        prop_assert!(d <= Duration::from_millis(1500));
    }

    #[test]
    fn fast_forward_never_slower(a in point_strategy(), b in point_strategy()) {
        let t = TourTiming::default();
        let ff = t.move_duration(a, b, &SkipRegister::new(SkipMode::FastForward));
        let n = t.move_duration(a, b, &SkipRegister::new(SkipMode::Normal));
        prop_assert!(ff <= n);
    }

    #[test]
    fn normal_narration_is_floored(msg in message_strategy(), explicit in proptest::option::of(0.0f64..10_000.0)) {
        let t = TourTiming::default();
        let d = t.message_duration(&msg, explicit, &SkipRegister::new(SkipMode::Normal));
        prop_assert!(d >= Duration::from_millis(500));
    }

    #[test]
    fn timeline_pops_monotonically(delays in proptest::collection::vec(0u64..1_000, 1..64)) {
        let mut tl = Timeline::new();
        for (i, d) in delays.iter().enumerate() {
            tl.schedule(Duration::from_millis(*d), i);
        }
        let mut last = Duration::ZERO;
        let mut seen = 0;
        while let Some((at, _)) = tl.pop_due(Duration::from_secs(10)) {
            prop_assert!(at >= last);
            last = at;
            seen += 1;
        }
        prop_assert_eq!(seen, delays.len());
    }
}
