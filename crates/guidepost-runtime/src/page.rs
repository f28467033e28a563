#![forbid(unsafe_code)]

//! The page the tour plays on, seen only through what the scheduler needs.
//!
//! Everything about rendering widgets, running filters or drawing charts
//! lives on the other side of the [`Page`] trait. The scheduler asks it to
//! resolve a [`TargetDescriptor`] to at most one live element, describe that
//! element ([`ElementInfo`]), apply a [`Mutation`], and manage tabs, scroll
//! and landmark visibility.
//!
//! Resolution happens when a task executes, never when it is enqueued, so
//! the same descriptor may name different elements as the page changes.

use std::any::Any;
use std::fmt;

use guidepost_core::geometry::Bounds;

/// Opaque locator for a UI element (typically a selector string).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetDescriptor(String);

impl TargetDescriptor {
    /// Wrap a locator.
    pub fn new(locator: impl Into<String>) -> Self {
        Self(locator.into())
    }

    /// The raw locator text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TargetDescriptor {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for TargetDescriptor {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Identifier of a tab pane.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TabId(String);

impl TabId {
    /// Wrap a tab name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The tab name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TabId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Handle to a live element, valid until the page changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u64);

/// The input kinds the tour knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    /// Free-text search box that adds items to a selection.
    SearchSelect,
    /// Plain single-choice selection list.
    SelectList,
    /// Group of mutually exclusive options (radio group).
    ChoiceGroup,
    /// Binary toggle (checkbox).
    Toggle,
    /// Free-text field.
    TextField,
    /// Push button.
    Button,
    /// Tab header that switches panes.
    Tab,
    /// Anything else: clicked, never flashed or logged.
    Unrecognized,
}

impl TargetKind {
    /// Upper-case keyword used in log sentences.
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::SearchSelect | Self::SelectList => "SELECT",
            Self::ChoiceGroup => "RADIO",
            Self::Toggle => "CHECKBOX",
            Self::TextField => "TEXT",
            Self::Button => "BUTTON",
            Self::Tab => "TAB",
            Self::Unrecognized => "ELEMENT",
        }
    }
}

/// One option inside a selection list or choice group.
#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceInfo {
    /// Value submitted when chosen.
    pub value: String,
    /// Text shown to the user.
    pub label: String,
    /// Box of the option's own control, if it has one.
    pub bounds: Option<Bounds>,
    /// Box of the option's wrapper (label row), if it has one.
    pub container: Option<Bounds>,
}

impl ChoiceInfo {
    /// An option without geometry (e.g. inside a native select).
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            bounds: None,
            container: None,
        }
    }

    /// Attach the option's control box.
    #[must_use]
    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Attach the option's wrapper box.
    #[must_use]
    pub fn with_container(mut self, container: Bounds) -> Self {
        self.container = Some(container);
        self
    }
}

/// Introspection of a resolved element.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementInfo {
    /// Detected input kind.
    pub kind: TargetKind,
    /// Outer box of the element.
    pub bounds: Bounds,
    /// Box of the surrounding input container, if different.
    pub container: Option<Bounds>,
    /// Visible label text (from an associated `<label>`).
    pub label: Option<String>,
    /// Form name, used when there is no label.
    pub name: Option<String>,
    /// Element id, used when there is neither label nor name.
    pub id: Option<String>,
    /// Options for lists and choice groups.
    pub choices: Vec<ChoiceInfo>,
}

impl ElementInfo {
    /// Minimal description: a kind and a box.
    pub fn new(kind: TargetKind, bounds: Bounds) -> Self {
        Self {
            kind,
            bounds,
            container: None,
            label: None,
            name: None,
            id: None,
            choices: Vec::new(),
        }
    }

    /// Set the visible label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the element id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the form name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the container box.
    #[must_use]
    pub fn with_container(mut self, container: Bounds) -> Self {
        self.container = Some(container);
        self
    }

    /// Add an option.
    #[must_use]
    pub fn with_choice(mut self, choice: ChoiceInfo) -> Self {
        self.choices.push(choice);
        self
    }

    /// The option whose value is `value`.
    pub fn choice(&self, value: &str) -> Option<&ChoiceInfo> {
        self.choices.iter().find(|c| c.value == value)
    }

    /// Best human-readable name: label (without a trailing colon), then
    /// name, then `#id`, then the kind keyword.
    pub fn display_label(&self) -> String {
        if let Some(label) = self.label.as_deref() {
            let trimmed = label.trim();
            return trimmed.strip_suffix(':').unwrap_or(trimmed).to_string();
        }
        if let Some(name) = self.name.as_deref() {
            return name.to_string();
        }
        if let Some(id) = self.id.as_deref() {
            return format!("#{id}");
        }
        self.kind.keyword().to_string()
    }
}

/// A value to write into an input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Text (option value, field contents, search term).
    Text(String),
    /// Boolean (toggle state).
    Flag(bool),
}

impl Value {
    /// Textual form for list-like inputs and log sentences.
    pub fn as_text(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Flag(b) => b.to_string(),
        }
    }

    /// Boolean form for toggles; text is true unless empty or `"false"`.
    pub fn as_flag(&self) -> bool {
        match self {
            Self::Flag(b) => *b,
            Self::Text(s) => !(s.is_empty() || s.eq_ignore_ascii_case("false")),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Flag(b)
    }
}

/// A change the page should make to an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// Add an item to a search-select.
    AddItem(String),
    /// Select an option of a selection list.
    Select(String),
    /// Check the option with this value in a choice group.
    Choose(String),
    /// Set a toggle.
    SetChecked(bool),
    /// Replace a text field's contents.
    SetText(String),
    /// Click the element.
    Click,
}

/// Collaborator interface for the page hosting a tour.
///
/// Implementations should be cheap to query; the scheduler calls
/// [`resolve`](Page::resolve) and [`inspect`](Page::inspect) every time a
/// task starts. The `Any` bound lets hosts get their concrete page back
/// through [`Runner::page_as`](crate::runner::Runner::page_as).
pub trait Page: Any {
    /// Resolve a descriptor to zero or one live element.
    fn resolve(&self, target: &TargetDescriptor) -> Option<ElementId>;

    /// Describe a resolved element, or `None` if it has gone away.
    fn inspect(&self, id: ElementId) -> Option<ElementInfo>;

    /// Apply a mutation. Unknown elements are ignored.
    fn apply(&mut self, id: ElementId, mutation: &Mutation);

    /// Current viewport box; `y` is the scroll offset.
    fn viewport(&self) -> Bounds;

    /// Whole-document box, used when a target cannot be resolved.
    fn document(&self) -> Bounds;

    /// Set the vertical scroll offset.
    fn scroll_to(&mut self, top: f64);

    /// Whether the given tab pane is showing.
    fn is_tab_active(&self, tab: &TabId) -> bool;

    /// Locator of the header that switches to `tab`, if it has one.
    /// Clicking it must activate the tab.
    fn tab_button(&self, tab: &TabId) -> Option<TargetDescriptor>;

    /// Switch to `tab` directly (used when there is no header to click).
    fn activate_tab(&mut self, tab: &TabId);

    /// Hide (or reveal) page landmarks from assistive technology while the
    /// blocker is up.
    fn set_landmarks_hidden(&mut self, _hidden: bool) {}

    /// Every visible element, in document order, by a descriptor that
    /// resolves back to it. Only tour authoring ([`crate::collect`]) asks;
    /// pages that cannot enumerate themselves report nothing.
    fn visible_targets(&self) -> Vec<TargetDescriptor> {
        Vec::new()
    }
}
