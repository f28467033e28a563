#![forbid(unsafe_code)]

//! In-memory page for tests and headless hosts.
//!
//! `HeadlessPage` holds a fixed set of elements addressed by descriptor
//! string, records every mutation the runner applies, and keeps just enough
//! state (field values, tabs, scroll offset) to assert on afterwards.
//!
//! ```ignore
//! let page = HeadlessPage::new()
//!     .with_element("#title", ElementInfo::new(TargetKind::TextField, bounds).with_label("Title:"));
//! let mut runner = Runner::new(page, RunnerConfig::default());
//! runner.run(&tour, None)?;
//! runner.run_until_complete()?;
//! ```

use std::collections::BTreeMap;

use guidepost_core::geometry::Bounds;

use crate::page::{ElementId, ElementInfo, Mutation, Page, TabId, TargetDescriptor};

/// What the page remembers about one element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldState {
    /// Text, selected value or chosen option.
    pub text: Option<String>,
    /// Toggle state.
    pub checked: bool,
    /// Items added to a search-select, in order, without duplicates.
    pub items: Vec<String>,
    /// Times clicked.
    pub clicks: u32,
}

#[derive(Debug, Clone)]
struct Element {
    target: TargetDescriptor,
    info: ElementInfo,
    state: FieldState,
    opens_tab: Option<TabId>,
}

/// A deterministic [`Page`] with no rendering.
#[derive(Debug, Clone)]
pub struct HeadlessPage {
    elements: BTreeMap<ElementId, Element>,
    by_target: BTreeMap<String, ElementId>,
    next_id: u64,
    viewport: Bounds,
    document: Bounds,
    active_tab: Option<TabId>,
    tabs: BTreeMap<TabId, TargetDescriptor>,
    landmarks_hidden: bool,
    mutations: Vec<(TargetDescriptor, Mutation)>,
    scrolls: Vec<f64>,
}

impl Default for HeadlessPage {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessPage {
    /// An empty 1280x800 viewport over a 1280x3000 document.
    pub fn new() -> Self {
        Self {
            elements: BTreeMap::new(),
            by_target: BTreeMap::new(),
            next_id: 0,
            viewport: Bounds::from_size(1280.0, 800.0),
            document: Bounds::from_size(1280.0, 3000.0),
            active_tab: None,
            tabs: BTreeMap::new(),
            landmarks_hidden: false,
            mutations: Vec::new(),
            scrolls: Vec::new(),
        }
    }

    /// Replace the viewport and document sizes.
    #[must_use]
    pub fn with_size(mut self, viewport: Bounds, document: Bounds) -> Self {
        self.viewport = viewport;
        self.document = document;
        self
    }

    /// Add an element reachable through `target`. A second element under
    /// the same descriptor replaces the first.
    #[must_use]
    pub fn with_element(mut self, target: impl Into<TargetDescriptor>, info: ElementInfo) -> Self {
        self.insert(target.into(), info, None);
        self
    }

    /// Add a tab whose header lives at `header`.
    #[must_use]
    pub fn with_tab(
        mut self,
        tab: impl Into<TabId>,
        header: impl Into<TargetDescriptor>,
        info: ElementInfo,
    ) -> Self {
        let tab = tab.into();
        let header = header.into();
        self.insert(header.clone(), info, Some(tab.clone()));
        self.tabs.insert(tab, header);
        self
    }

    /// Make `tab` the showing one.
    #[must_use]
    pub fn with_active_tab(mut self, tab: impl Into<TabId>) -> Self {
        self.active_tab = Some(tab.into());
        self
    }

    fn insert(&mut self, target: TargetDescriptor, info: ElementInfo, opens_tab: Option<TabId>) {
        if let Some(old) = self.by_target.remove(target.as_str()) {
            self.elements.remove(&old);
        }
        self.next_id += 1;
        let id = ElementId(self.next_id);
        self.by_target.insert(target.as_str().to_string(), id);
        self.elements.insert(
            id,
            Element {
                target,
                info,
                state: FieldState::default(),
                opens_tab,
            },
        );
    }

    /// Drop the element at `target`, as if it left the page.
    pub fn remove(&mut self, target: &TargetDescriptor) -> bool {
        match self.by_target.remove(target.as_str()) {
            Some(id) => self.elements.remove(&id).is_some(),
            None => false,
        }
    }

    /// State of the element at `target`.
    pub fn field(&self, target: impl Into<TargetDescriptor>) -> Option<&FieldState> {
        let target = target.into();
        let id = self.by_target.get(target.as_str())?;
        self.elements.get(id).map(|e| &e.state)
    }

    /// Every mutation applied, in order.
    pub fn mutations(&self) -> &[(TargetDescriptor, Mutation)] {
        &self.mutations
    }

    /// Whether landmarks are hidden.
    pub fn landmarks_hidden(&self) -> bool {
        self.landmarks_hidden
    }

    /// The showing tab.
    pub fn active_tab(&self) -> Option<&TabId> {
        self.active_tab.as_ref()
    }

    /// Current vertical scroll offset.
    pub fn scroll_offset(&self) -> f64 {
        self.viewport.y
    }

    /// Every offset passed to [`Page::scroll_to`].
    pub fn scroll_history(&self) -> &[f64] {
        &self.scrolls
    }
}

impl Page for HeadlessPage {
    fn resolve(&self, target: &TargetDescriptor) -> Option<ElementId> {
        self.by_target.get(target.as_str()).copied()
    }

    fn inspect(&self, id: ElementId) -> Option<ElementInfo> {
        self.elements.get(&id).map(|e| e.info.clone())
    }

    fn apply(&mut self, id: ElementId, mutation: &Mutation) {
        let Some(element) = self.elements.get_mut(&id) else {
            return;
        };
        self.mutations
            .push((element.target.clone(), mutation.clone()));
        let state = &mut element.state;
        match mutation {
            Mutation::AddItem(item) => {
                if !state.items.contains(item) {
                    state.items.push(item.clone());
                }
            }
            Mutation::Select(v) | Mutation::Choose(v) | Mutation::SetText(v) => {
                state.text = Some(v.clone());
            }
            Mutation::SetChecked(on) => state.checked = *on,
            Mutation::Click => {
                state.clicks += 1;
                if let Some(tab) = element.opens_tab.clone() {
                    self.active_tab = Some(tab);
                }
            }
        }
    }

    fn viewport(&self) -> Bounds {
        self.viewport
    }

    fn document(&self) -> Bounds {
        self.document
    }

    fn scroll_to(&mut self, top: f64) {
        let top = top.max(0.0);
        self.viewport.y = top;
        self.scrolls.push(top);
    }

    fn is_tab_active(&self, tab: &TabId) -> bool {
        self.active_tab.as_ref() == Some(tab)
    }

    fn tab_button(&self, tab: &TabId) -> Option<TargetDescriptor> {
        let header = self.tabs.get(tab)?;
        self.by_target
            .contains_key(header.as_str())
            .then(|| header.clone())
    }

    fn activate_tab(&mut self, tab: &TabId) {
        self.active_tab = Some(tab.clone());
    }

    fn set_landmarks_hidden(&mut self, hidden: bool) {
        self.landmarks_hidden = hidden;
    }

    fn visible_targets(&self) -> Vec<TargetDescriptor> {
        self.elements.values().map(|e| e.target.clone()).collect()
    }
}
