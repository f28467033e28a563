#![forbid(unsafe_code)]

//! Time-based animation primitives for the guide and its decorations.
//!
//! Every animation is driven by explicit [`Animation::tick`] calls with a
//! virtual time delta; nothing here reads a wall clock. Completion is
//! reported through [`Animation::is_complete`], but the tour scheduler never
//! polls it to decide when to advance: it schedules its own wake-ups on the
//! [`Timeline`](crate::timeline::Timeline) for the same duration, so an
//! animation only has to answer "where am I now" for rendering.
//!
//! # Invariants
//!
//! 1. `value()` is always in [0.0, 1.0].
//! 2. A zero duration is treated as one nanosecond, so a fresh animation is
//!    never complete before its first tick.
//! 3. `tick` saturates; elapsed time never wraps.

use std::time::Duration;

use crate::geometry::Point;

// ---------------------------------------------------------------------------
// Easing functions
// ---------------------------------------------------------------------------

/// Easing function signature: maps `t` in [0, 1] to output in [0, 1].
pub type EasingFn = fn(f64) -> f64;

/// Constant velocity.
#[inline]
pub fn linear(t: f64) -> f64 {
    t.clamp(0.0, 1.0)
}

/// Cosine ease-in-out, the classic "swing" curve.
#[inline]
pub fn swing(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    0.5 - (std::f64::consts::PI * t).cos() / 2.0
}

// ---------------------------------------------------------------------------
// Animation trait
// ---------------------------------------------------------------------------

/// A time-based animation producing values in [0.0, 1.0].
pub trait Animation {
    /// Advance the animation by `dt`.
    fn tick(&mut self, dt: Duration);

    /// Whether the animation has reached its end.
    fn is_complete(&self) -> bool;

    /// Current eased progress, clamped to [0.0, 1.0].
    fn value(&self) -> f64;

    /// Jump straight to the end state.
    fn finish(&mut self);

    /// Time elapsed past completion.
    fn overshoot(&self) -> Duration {
        Duration::ZERO
    }
}

fn nonzero(duration: Duration) -> Duration {
    if duration.is_zero() {
        Duration::from_nanos(1)
    } else {
        duration
    }
}

fn progress(elapsed: Duration, duration: Duration) -> f64 {
    (elapsed.as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0)
}

// ---------------------------------------------------------------------------
// Fade
// ---------------------------------------------------------------------------

/// Linear progression from 0.0 to 1.0 over a duration.
///
/// Used for opacity fades; a fade-out renders at `1.0 - value()`.
#[derive(Debug, Clone, Copy)]
pub struct Fade {
    elapsed: Duration,
    duration: Duration,
    easing: EasingFn,
}

impl Fade {
    /// Create a fade with linear easing.
    pub fn new(duration: Duration) -> Self {
        Self {
            elapsed: Duration::ZERO,
            duration: nonzero(duration),
            easing: linear,
        }
    }

    /// Set the easing function.
    pub fn easing(mut self, easing: EasingFn) -> Self {
        self.easing = easing;
        self
    }

    /// Opacity of something fading out with this animation.
    pub fn remaining_opacity(&self) -> f64 {
        1.0 - self.value()
    }
}

impl Animation for Fade {
    fn tick(&mut self, dt: Duration) {
        self.elapsed = self.elapsed.saturating_add(dt);
    }

    fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }

    fn value(&self) -> f64 {
        (self.easing)(progress(self.elapsed, self.duration))
    }

    fn finish(&mut self) {
        self.elapsed = self.elapsed.max(self.duration);
    }

    fn overshoot(&self) -> Duration {
        self.elapsed.saturating_sub(self.duration)
    }
}

// ---------------------------------------------------------------------------
// Tween
// ---------------------------------------------------------------------------

/// Interpolates a scalar between `from` and `to`.
///
/// Drives the viewport scroll offset.
#[derive(Debug, Clone, Copy)]
pub struct Tween {
    from: f64,
    to: f64,
    elapsed: Duration,
    duration: Duration,
    easing: EasingFn,
}

impl Tween {
    /// Create a linear tween.
    pub fn new(from: f64, to: f64, duration: Duration) -> Self {
        Self {
            from,
            to,
            elapsed: Duration::ZERO,
            duration: nonzero(duration),
            easing: linear,
        }
    }

    /// Set the easing function (builder).
    pub fn easing(mut self, easing: EasingFn) -> Self {
        self.easing = easing;
        self
    }

    /// Current interpolated value.
    pub fn current(&self) -> f64 {
        self.from + (self.to - self.from) * self.value()
    }
}

impl Animation for Tween {
    fn tick(&mut self, dt: Duration) {
        self.elapsed = self.elapsed.saturating_add(dt);
    }

    fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }

    fn value(&self) -> f64 {
        (self.easing)(progress(self.elapsed, self.duration))
    }

    fn finish(&mut self) {
        self.elapsed = self.elapsed.max(self.duration);
    }

    fn overshoot(&self) -> Duration {
        self.elapsed.saturating_sub(self.duration)
    }
}

// ---------------------------------------------------------------------------
// Glide
// ---------------------------------------------------------------------------

/// Moves a point in a straight line at constant velocity.
#[derive(Debug, Clone, Copy)]
pub struct Glide {
    from: Point,
    to: Point,
    elapsed: Duration,
    duration: Duration,
}

impl Glide {
    /// Create a glide from `from` to `to` over `duration`.
    pub fn new(from: Point, to: Point, duration: Duration) -> Self {
        Self {
            from,
            to,
            elapsed: Duration::ZERO,
            duration: nonzero(duration),
        }
    }

    /// Current interpolated position.
    pub fn position(&self) -> Point {
        self.from.lerp(self.to, self.value())
    }

    /// Destination.
    pub fn destination(&self) -> Point {
        self.to
    }
}

impl Animation for Glide {
    fn tick(&mut self, dt: Duration) {
        self.elapsed = self.elapsed.saturating_add(dt);
    }

    fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }

    fn value(&self) -> f64 {
        linear(progress(self.elapsed, self.duration))
    }

    fn finish(&mut self) {
        self.elapsed = self.elapsed.max(self.duration);
    }

    fn overshoot(&self) -> Duration {
        self.elapsed.saturating_sub(self.duration)
    }
}

// ---------------------------------------------------------------------------
// Delayed
// ---------------------------------------------------------------------------

/// Hold for a delay, then play the inner animation.
///
/// A speech bubble is a `Delayed<Fade>`: fully visible while holding, then
/// fading out.
#[derive(Debug, Clone, Copy)]
pub struct Delayed<A> {
    delay: Duration,
    elapsed: Duration,
    inner: A,
    started: bool,
}

impl<A: Animation> Delayed<A> {
    /// Create a delayed animation that waits `delay` before starting `inner`.
    pub fn new(delay: Duration, inner: A) -> Self {
        Self {
            delay,
            elapsed: Duration::ZERO,
            inner,
            started: delay.is_zero(),
        }
    }

    /// Whether the hold has elapsed and the inner animation has started.
    pub fn has_started(&self) -> bool {
        self.started
    }

    /// Cut the hold short; the inner animation starts from the next tick.
    pub fn skip_delay(&mut self) {
        self.started = true;
    }
}

impl<A: Animation> Animation for Delayed<A> {
    fn tick(&mut self, dt: Duration) {
        if self.started {
            self.inner.tick(dt);
            return;
        }
        self.elapsed = self.elapsed.saturating_add(dt);
        if self.elapsed >= self.delay {
            self.started = true;
            let os = self.elapsed.saturating_sub(self.delay);
            if !os.is_zero() {
                self.inner.tick(os);
            }
        }
    }

    fn is_complete(&self) -> bool {
        self.started && self.inner.is_complete()
    }

    fn value(&self) -> f64 {
        if self.started {
            self.inner.value()
        } else {
            0.0
        }
    }

    fn finish(&mut self) {
        self.started = true;
        self.inner.finish();
    }

    fn overshoot(&self) -> Duration {
        if self.started {
            self.inner.overshoot()
        } else {
            Duration::ZERO
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
