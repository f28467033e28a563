#![forbid(unsafe_code)]

//! Post-tour prompt and the tour builder menu.
//!
//! A prompt is a bubble with a question and a list of choices, shown after
//! a tour's script finishes. Choosing an item removes the prompt and then
//! acts on it: start another tour from the book, or end. An "end the tour"
//! item is always appended.
//!
//! The builder is the same idea in a dialog: every titled tour of the book,
//! any of which can be started.

/// Caption of the item appended to every prompt.
pub const END_ITEM_LABEL: &str = "I don't need help at the moment (End the tour)";

/// What a prompt item does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptAction {
    /// Run the named tour from the runner's book.
    RunTour(String),
    /// Fade the guide out and end.
    End,
    /// End and stop the tour from starting automatically next time.
    EndAndDisableAuto,
}

/// One prompt choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptItem {
    /// Caption.
    pub label: String,
    /// Effect.
    pub action: PromptAction,
}

impl PromptItem {
    /// Item starting another tour.
    pub fn run(label: impl Into<String>, tour: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            action: PromptAction::RunTour(tour.into()),
        }
    }

    /// Item ending the tour.
    pub fn end(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            action: PromptAction::End,
        }
    }

    /// Item ending the tour and disabling auto-start.
    pub fn end_and_disable_auto(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            action: PromptAction::EndAndDisableAuto,
        }
    }
}

/// Prompt declared on a tour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptDef {
    /// Question text.
    pub message: String,
    /// Author-supplied items.
    pub items: Vec<PromptItem>,
}

impl PromptDef {
    /// A prompt with no items yet.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            items: Vec::new(),
        }
    }

    /// Append an item.
    #[must_use]
    pub fn item(mut self, item: PromptItem) -> Self {
        self.items.push(item);
        self
    }

    /// Items as shown: the declared ones plus the end item.
    pub fn display_items(&self) -> Vec<PromptItem> {
        let mut items = self.items.clone();
        items.push(PromptItem::end(END_ITEM_LABEL));
        items
    }
}

/// A prompt on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivePrompt {
    /// Question text.
    pub message: String,
    /// Items including the appended end item.
    pub items: Vec<PromptItem>,
}

impl ActivePrompt {
    /// Materialise a declared prompt.
    pub fn from_def(def: &PromptDef) -> Self {
        Self {
            message: def.message.clone(),
            items: def.display_items(),
        }
    }

    /// Item at `index`.
    pub fn get(&self, index: usize) -> Option<&PromptItem> {
        self.items.get(index)
    }
}

/// One line of the builder dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuilderEntry {
    /// Tour name in the book.
    pub name: String,
    /// Caption.
    pub title: String,
}
