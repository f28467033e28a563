#![forbid(unsafe_code)]

//! Core: playback modes, timing math, a virtual clock, and the animation
//! primitives the tour runtime builds on.
//!
//! Nothing in this crate knows about pages, targets or tours. It answers
//! three questions for the runtime: how long should this take right now
//! ([`timing`], [`skip`]), when is the next thing due ([`timeline`]), and
//! where is a moving thing at this instant ([`animation`], [`geometry`]).

pub mod animation;
pub mod geometry;
pub mod logging;
pub mod skip;
pub mod timeline;
pub mod timing;

pub use geometry::{Bounds, Point};
pub use skip::{ParseSkipModeError, SkipMode, SkipRegister};
pub use timeline::{Timeline, TimerId};
pub use timing::TourTiming;

// Re-export the tracing macro at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::debug;
