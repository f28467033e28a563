#![forbid(unsafe_code)]

//! Declarative tour scripts.
//!
//! A [`Tour`] is immutable data built once (usually in code) and read by the
//! runner each time it is played. A script is a list of [`Step`]s, each a
//! five-slot record: target, value, message, wait fraction, duration.
//!
//! | target | value | meaning |
//! |--------|-------|---------|
//! | some | text/flag | move to the target and set it |
//! | some | `"<moveonly>"` | only move there |
//! | some | `"<clickonly>"` | click without the confirmation flash |
//! | some | none | click it |
//! | none | callable | call it with a continuation |
//! | none | none | narration only, or a plain delay if no message |
//!
//! A `"<noscroll>"` marker anywhere in a text value is stripped before use
//! and suppresses the scroll for that step.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use guidepost_core::skip::SkipMode;

use crate::page::{TabId, TargetDescriptor, Value};
use crate::prompt::PromptDef;
use crate::scope::CallScope;

/// Marker: only reposition the guide.
pub const MOVE_ONLY: &str = "<moveonly>";
/// Marker: click without flashing the target.
pub const CLICK_ONLY: &str = "<clickonly>";
/// Marker: do not scroll the viewport for this step.
pub const NO_SCROLL: &str = "<noscroll>";

/// A side-effecting script step. It must eventually advance the tour
/// through its [`CallScope`] (or a held continuation), or the tour stalls.
///
/// Tours live on the thread that plays them, so callables may capture
/// `Rc`/`Cell` state.
pub type StepFn = Rc<dyn Fn(&mut CallScope<'_>)>;

/// The value slot of a step.
#[derive(Clone)]
pub enum StepValue {
    /// Text, possibly carrying markers.
    Text(String),
    /// Boolean for toggles.
    Flag(bool),
    /// A callable step.
    Call(StepFn),
}

impl fmt::Debug for StepValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.debug_tuple("Text").field(s).finish(),
            Self::Flag(b) => f.debug_tuple("Flag").field(b).finish(),
            Self::Call(_) => f.write_str("Call(..)"),
        }
    }
}

impl From<&str> for StepValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for StepValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<bool> for StepValue {
    fn from(b: bool) -> Self {
        Self::Flag(b)
    }
}

/// What a target step does once the guide gets there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interaction {
    /// Move only.
    MoveOnly,
    /// Click, no flash.
    ClickOnly,
    /// Click with flash.
    Click,
    /// Write a value.
    Set(Value),
}

/// One scripted interaction, narration or delay.
#[derive(Debug, Clone)]
pub struct Step {
    /// Element to interact with.
    pub target: Option<TargetDescriptor>,
    /// Value, marker or callable.
    pub value: Option<StepValue>,
    /// Narration shown before the interaction.
    pub message: Option<String>,
    /// Fraction of the narration to wait before continuing, in [0, 1].
    pub wait_fraction: f64,
    /// Explicit narration length in ms.
    pub duration_ms: Option<f64>,
}

impl Default for Step {
    fn default() -> Self {
        Self {
            target: None,
            value: None,
            message: None,
            wait_fraction: 1.0,
            duration_ms: None,
        }
    }
}

impl Step {
    /// A step aimed at `target`.
    pub fn at(target: impl Into<TargetDescriptor>) -> Self {
        Self {
            target: Some(target.into()),
            ..Self::default()
        }
    }

    /// Move to `target` without touching it.
    pub fn move_to(target: impl Into<TargetDescriptor>) -> Self {
        Self::at(target).value(MOVE_ONLY)
    }

    /// Narration only.
    pub fn say(message: impl Into<String>) -> Self {
        Self::default().message(message)
    }

    /// A callable step.
    pub fn call(f: impl Fn(&mut CallScope<'_>) + 'static) -> Self {
        Self {
            value: Some(StepValue::Call(Rc::new(f))),
            ..Self::default()
        }
    }

    /// Set the value slot.
    #[must_use]
    pub fn value(mut self, value: impl Into<StepValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Set the narration.
    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Set the wait fraction (clamped to [0, 1]).
    #[must_use]
    pub fn wait(mut self, fraction: f64) -> Self {
        self.wait_fraction = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            1.0
        };
        self
    }

    /// Set an explicit narration length.
    #[must_use]
    pub fn duration_ms(mut self, ms: f64) -> Self {
        self.duration_ms = Some(ms.max(0.0));
        self
    }

    /// The callable, for target-less call steps.
    pub fn callable(&self) -> Option<&StepFn> {
        match (&self.target, &self.value) {
            (None, Some(StepValue::Call(f))) => Some(f),
            _ => None,
        }
    }

    /// Interpret the value slot for a target step.
    ///
    /// Returns the interaction and whether scrolling is suppressed.
    pub fn interaction(&self) -> (Interaction, bool) {
        interpret(self.value.as_ref())
    }
}

fn interpret(value: Option<&StepValue>) -> (Interaction, bool) {
    match value {
        None | Some(StepValue::Call(_)) => (Interaction::Click, false),
        Some(StepValue::Flag(b)) => (Interaction::Set(Value::Flag(*b)), false),
        Some(StepValue::Text(raw)) => {
            let no_scroll = raw.contains(NO_SCROLL);
            let text = raw.replace(NO_SCROLL, "");
            let interaction = match text.as_str() {
                MOVE_ONLY => Interaction::MoveOnly,
                CLICK_ONLY => Interaction::ClickOnly,
                _ => Interaction::Set(Value::Text(text)),
            };
            (interaction, no_scroll)
        }
    }
}

/// A complete tour: framing plus a script.
#[derive(Debug, Clone, Default)]
pub struct Tour {
    /// Title shown in the builder menu.
    pub title: Option<String>,
    /// Attach the interaction blocker while running.
    pub uses_blocker: bool,
    /// Opening narration.
    pub intro: Option<String>,
    /// Tab the script expects to be showing.
    pub required_tab: Option<TabId>,
    /// The steps.
    pub script: Vec<Step>,
    /// Reset tour run (in instant mode) before this one.
    pub init: Option<Box<Tour>>,
    /// Menu shown after the script.
    pub prompt: Option<PromptDef>,
    /// Playback mode forced for this tour, if any.
    pub mode: Option<SkipMode>,
}

impl Tour {
    /// An empty tour.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the builder-menu title.
    #[must_use]
    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Attach the blocker while running.
    #[must_use]
    pub fn with_blocker(mut self) -> Self {
        self.uses_blocker = true;
        self
    }

    /// Set the intro narration.
    #[must_use]
    pub fn intro(mut self, message: impl Into<String>) -> Self {
        self.intro = Some(message.into());
        self
    }

    /// Require a tab.
    #[must_use]
    pub fn on_tab(mut self, tab: impl Into<TabId>) -> Self {
        self.required_tab = Some(tab.into());
        self
    }

    /// Append a step.
    #[must_use]
    pub fn step(mut self, step: Step) -> Self {
        self.script.push(step);
        self
    }

    /// Append several steps.
    #[must_use]
    pub fn steps(mut self, steps: impl IntoIterator<Item = Step>) -> Self {
        self.script.extend(steps);
        self
    }

    /// Set the reset tour. Its own `init` is dropped: init tours do not nest.
    #[must_use]
    pub fn init(mut self, mut init: Tour) -> Self {
        init.init = None;
        self.init = Some(Box::new(init));
        self
    }

    /// Set the follow-up prompt.
    #[must_use]
    pub fn prompt(mut self, prompt: PromptDef) -> Self {
        self.prompt = Some(prompt);
        self
    }
}

/// Named collection of tours, the unit prompts and the builder refer to.
#[derive(Debug, Clone, Default)]
pub struct TourBook {
    tours: BTreeMap<String, Tour>,
}

impl TourBook {
    /// An empty book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a tour.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, tour: Tour) -> Self {
        self.insert(name, tour);
        self
    }

    /// Add (or replace) a tour.
    pub fn insert(&mut self, name: impl Into<String>, tour: Tour) {
        self.tours.insert(name.into(), tour);
    }

    /// Look up a tour.
    pub fn get(&self, name: &str) -> Option<&Tour> {
        self.tours.get(name)
    }

    /// Tours that have a title, as `(name, title)`, in name order.
    pub fn menu(&self) -> Vec<(String, String)> {
        self.tours
            .iter()
            .filter_map(|(name, tour)| tour.title.clone().map(|t| (name.clone(), t)))
            .collect()
    }

    /// Number of tours.
    pub fn len(&self) -> usize {
        self.tours.len()
    }

    /// Whether the book is empty.
    pub fn is_empty(&self) -> bool {
        self.tours.is_empty()
    }
}
