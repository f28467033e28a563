#![forbid(unsafe_code)]

//! Everything the tour draws: the guide, confirmation highlights, speech
//! bubbles and the viewport scroll.
//!
//! The stage is pure animation state driven by [`Stage::tick`]. It never
//! decides when the tour advances; the runner schedules its own wake-ups
//! for the same durations. Highlights and bubbles remove themselves when
//! their animations finish, so they outlive [`Runner::end`] only as long as
//! their fade.
//!
//! [`Runner::end`]: crate::runner::Runner::end

use std::time::Duration;

use guidepost_core::animation::{Animation, Delayed, Fade, Glide, Tween, swing};
use guidepost_core::geometry::{Bounds, Point};

/// Identifier for a highlight or bubble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DecorationId(pub u64);

/// A fading rectangle confirming an interaction.
#[derive(Debug, Clone)]
pub struct Highlight {
    /// Identifier.
    pub id: DecorationId,
    /// Box being flashed.
    pub bounds: Bounds,
    fade: Fade,
}

impl Highlight {
    /// Current opacity.
    pub fn opacity(&self) -> f64 {
        self.fade.remaining_opacity()
    }
}

/// A speech bubble: fully visible for a hold, then fading out.
#[derive(Debug, Clone)]
pub struct Bubble {
    /// Identifier.
    pub id: DecorationId,
    /// Narration text.
    pub text: String,
    anim: Delayed<Fade>,
}

impl Bubble {
    /// Current opacity.
    pub fn opacity(&self) -> f64 {
        1.0 - self.anim.value()
    }

    /// Whether the bubble is still in its hold.
    pub fn is_holding(&self) -> bool {
        !self.anim.has_started()
    }
}

/// Visual state of a tour.
#[derive(Debug, Clone)]
pub struct Stage {
    clock: Duration,
    settles_at: Duration,
    position: Point,
    visible: bool,
    glide: Option<Glide>,
    fade_out: Option<Fade>,
    scroll: Option<Tween>,
    highlights: Vec<Highlight>,
    bubbles: Vec<Bubble>,
    next_id: u64,
}

impl Default for Stage {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage {
    /// A hidden guide at the origin, nothing else.
    pub fn new() -> Self {
        Self {
            clock: Duration::ZERO,
            settles_at: Duration::ZERO,
            position: Point::ORIGIN,
            visible: false,
            glide: None,
            fade_out: None,
            scroll: None,
            highlights: Vec::new(),
            bubbles: Vec::new(),
            next_id: 0,
        }
    }

    fn id(&mut self) -> DecorationId {
        self.next_id += 1;
        DecorationId(self.next_id)
    }

    fn settle_after(&mut self, d: Duration) {
        self.settles_at = self.settles_at.max(self.clock.saturating_add(d));
    }

    // -- guide ---------------------------------------------------------------

    /// Guide position (mid-glide if moving).
    pub fn position(&self) -> Point {
        self.glide.as_ref().map_or(self.position, Glide::position)
    }

    /// Whether the guide is shown.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Guide opacity.
    pub fn opacity(&self) -> f64 {
        if !self.visible {
            return 0.0;
        }
        self.fade_out.as_ref().map_or(1.0, Fade::remaining_opacity)
    }

    /// Whether the guide is gliding.
    pub fn is_moving(&self) -> bool {
        self.glide.is_some()
    }

    /// Show the guide at full opacity.
    pub fn show(&mut self) {
        self.visible = true;
        self.fade_out = None;
    }

    /// Hide the guide, stop it where it is, and drop every bubble and the
    /// scroll. Highlights keep fading.
    pub fn hide(&mut self) {
        self.position = self.position();
        self.visible = false;
        self.glide = None;
        self.fade_out = None;
        self.scroll = None;
        self.bubbles.clear();
    }

    /// Start fading the guide out.
    pub fn fade_out(&mut self, duration: Duration) {
        self.fade_out = Some(Fade::new(duration).easing(swing));
        self.settle_after(duration);
    }

    /// Glide from the current position to `to`.
    pub fn glide_to(&mut self, to: Point, duration: Duration) {
        let from = self.position();
        self.position = from;
        self.glide = Some(Glide::new(from, to, duration));
        self.settle_after(duration);
    }

    // -- scroll --------------------------------------------------------------

    /// Animate the viewport's vertical offset.
    pub fn scroll(&mut self, from: f64, to: f64, duration: Duration) {
        self.scroll = Some(Tween::new(from, to, duration));
        self.settle_after(duration);
    }

    /// Whether a scroll is in progress.
    pub fn is_scrolling(&self) -> bool {
        self.scroll.is_some()
    }

    // -- decorations ---------------------------------------------------------

    /// Flash `bounds`, fading over `duration`.
    pub fn flash(&mut self, bounds: Bounds, duration: Duration) -> DecorationId {
        let id = self.id();
        self.highlights.push(Highlight {
            id,
            bounds,
            fade: Fade::new(duration),
        });
        self.settle_after(duration);
        id
    }

    /// Show a bubble for `duration` in total, the last `fade` of which is
    /// spent fading. Empty text or a zero duration shows nothing.
    pub fn talk(&mut self, text: &str, duration: Duration, fade: Duration) -> Option<DecorationId> {
        if text.is_empty() || duration.is_zero() {
            return None;
        }
        let id = self.id();
        let hold = duration.saturating_sub(fade);
        self.bubbles.push(Bubble {
            id,
            text: text.to_string(),
            anim: Delayed::new(hold, Fade::new(fade)),
        });
        self.settle_after(hold.saturating_add(fade));
        Some(id)
    }

    /// Cut every holding bubble short so it starts fading now.
    pub fn flush_bubbles(&mut self) -> usize {
        let mut flushed = 0;
        for bubble in self.bubbles.iter_mut().filter(|b| b.is_holding()) {
            bubble.anim.skip_delay();
            flushed += 1;
        }
        flushed
    }

    /// Active highlights.
    pub fn highlights(&self) -> &[Highlight] {
        &self.highlights
    }

    /// Active bubbles, oldest first.
    pub fn bubbles(&self) -> &[Bubble] {
        &self.bubbles
    }

    /// Stage-local time at which every running animation will have ended.
    pub fn settles_at(&self) -> Duration {
        self.settles_at
    }

    /// Stage-local time.
    pub fn clock(&self) -> Duration {
        self.clock
    }

    // -- time ----------------------------------------------------------------

    /// Advance every animation by `dt`.
    ///
    /// Returns the scroll offset to apply to the page, if a scroll is
    /// running.
    pub fn tick(&mut self, dt: Duration) -> Option<f64> {
        self.clock = self.clock.saturating_add(dt);

        if let Some(glide) = self.glide.as_mut() {
            glide.tick(dt);
            if glide.is_complete() {
                self.position = glide.destination();
                self.glide = None;
            }
        }
        if let Some(fade) = self.fade_out.as_mut() {
            fade.tick(dt);
        }

        self.highlights.retain_mut(|h| {
            h.fade.tick(dt);
            !h.fade.is_complete()
        });
        self.bubbles.retain_mut(|b| {
            b.anim.tick(dt);
            !b.anim.is_complete()
        });

        let tween = self.scroll.as_mut()?;
        tween.tick(dt);
        let offset = tween.current();
        if tween.is_complete() {
            self.scroll = None;
        }
        Some(offset)
    }
}
