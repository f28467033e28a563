#![forbid(unsafe_code)]

//! Guidepost Runtime
//!
//! Plays scripted guided tours against a host page: an animated guide that
//! moves to elements, narrates in speech bubbles, fills in controls, and
//! keeps a readable log of what it did.
//!
//! # Key Components
//!
//! - [`Runner`] - FIFO task scheduler on a virtual clock
//! - [`Tour`] / [`Step`] - Declarative tour scripts
//! - [`Page`] - Host collaborator interface (resolve, inspect, mutate)
//! - [`HeadlessPage`] - In-memory page for tests and headless hosts
//! - [`TourLog`] - Narration and action log with element back-links
//! - [`Blocker`] - Interaction blocker with playback controls
//! - [`FlagStore`] - Persistent "don't auto-start" preference
//! - [`Collector`] - Lists page inputs to help write tour scripts
//!
//! # How it fits in the system
//! `guidepost-core` answers timing questions; this crate owns everything
//! that touches a page. Hosts construct a [`Runner`] over their [`Page`],
//! register tours in a [`TourBook`], and call [`Runner::tick`] every frame.

pub mod blocker;
pub mod collect;
pub mod config;
pub mod error;
pub mod flag_store;
pub mod headless;
pub mod log;
pub mod page;
pub mod prompt;
pub mod resolver;
pub mod runner;
pub mod scope;
pub mod stage;
pub mod tour;

pub use blocker::{Blocker, BlockerControl};
pub use collect::{Collected, Collector, InputFamily};
pub use config::RunnerConfig;
pub use error::{TourError, TourResult};
#[cfg(feature = "flag-persistence")]
pub use flag_store::FileFlags;
pub use flag_store::{FlagStore, MemoryFlags, NO_AUTO_TOUR_KEY, StoreError, StoreResult};
pub use headless::{FieldState, HeadlessPage};
pub use log::{Fragment, LabeledDialog, LogEntry, TourLog};
pub use page::{
    ChoiceInfo, ElementId, ElementInfo, Mutation, Page, TabId, TargetDescriptor, TargetKind, Value,
};
pub use prompt::{ActivePrompt, BuilderEntry, PromptAction, PromptDef, PromptItem};
pub use runner::{
    RunState, Runner, RunnerEvent, TaskKind, install_default, take_default, with_default,
};
pub use scope::{CallScope, Continuation};
pub use stage::Stage;
pub use tour::{Interaction, Step, StepFn, StepValue, Tour, TourBook};

pub use guidepost_core::{Bounds, Point, SkipMode, SkipRegister, TourTiming};
