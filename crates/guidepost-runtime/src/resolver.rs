#![forbid(unsafe_code)]

//! Interaction planning per input kind.
//!
//! Given what the page says about a resolved element and what the step
//! wants to do with it, [`plan`] produces a [`Recipe`]: where the guide
//! should go, what to change, and what to flash afterwards.
//!
//! | Kind | move toward | mutation | flash |
//! |------|-------------|----------|-------|
//! | SearchSelect | element | `AddItem` | container |
//! | SelectList | element | `Select` | element |
//! | ChoiceGroup | matching option, else group | `Choose` | option row |
//! | Toggle | element | `SetChecked` | container |
//! | TextField | element | `SetText` | element |
//! | Button / Tab | element | `Click` | element |
//! | Unrecognized | element | `Click` | nothing |
//!
//! An unresolved target moves to the document box and changes nothing.

use guidepost_core::geometry::Bounds;

use crate::page::{ElementInfo, Mutation, TargetKind, Value};
use crate::tour::Interaction;

/// What to do for one interaction step.
#[derive(Debug, Clone, PartialEq)]
pub struct Recipe {
    /// Box the guide glides toward.
    pub move_to: Bounds,
    /// Change applied once the guide arrives.
    pub mutation: Option<Mutation>,
    /// Box flashed as confirmation.
    pub signal: Option<Bounds>,
}

impl Recipe {
    /// Move somewhere and do nothing else.
    pub fn move_only(bounds: Bounds) -> Self {
        Self {
            move_to: bounds,
            mutation: None,
            signal: None,
        }
    }
}

/// Plan an interaction.
///
/// `info` is `None` when the target did not resolve; `document` is the
/// fallback box in that case.
pub fn plan(info: Option<&ElementInfo>, interaction: &Interaction, document: Bounds) -> Recipe {
    let Some(info) = info else {
        return Recipe::move_only(document);
    };
    let element = info.bounds;
    let container = info.container.unwrap_or(element);

    match interaction {
        Interaction::MoveOnly => Recipe::move_only(element),
        Interaction::ClickOnly => Recipe {
            move_to: element,
            mutation: Some(Mutation::Click),
            signal: None,
        },
        Interaction::Click => Recipe {
            move_to: element,
            mutation: Some(Mutation::Click),
            signal: flash_for_click(info.kind, element),
        },
        Interaction::Set(value) => plan_set(info, value, element, container),
    }
}

fn flash_for_click(kind: TargetKind, element: Bounds) -> Option<Bounds> {
    match kind {
        TargetKind::Unrecognized => None,
        _ => Some(element),
    }
}

fn plan_set(info: &ElementInfo, value: &Value, element: Bounds, container: Bounds) -> Recipe {
    match info.kind {
        TargetKind::SearchSelect => Recipe {
            move_to: element,
            mutation: Some(Mutation::AddItem(value.as_text())),
            signal: Some(container),
        },
        TargetKind::SelectList => Recipe {
            move_to: element,
            mutation: Some(Mutation::Select(value.as_text())),
            signal: Some(element),
        },
        TargetKind::ChoiceGroup => {
            let text = value.as_text();
            let option = info.choice(&text);
            let move_to = option.and_then(|o| o.bounds).unwrap_or(element);
            let signal = option
                .and_then(|o| o.container.or(o.bounds))
                .unwrap_or(element);
            Recipe {
                move_to,
                mutation: Some(Mutation::Choose(text)),
                signal: Some(signal),
            }
        }
        TargetKind::Toggle => Recipe {
            move_to: element,
            mutation: Some(Mutation::SetChecked(value.as_flag())),
            signal: Some(container),
        },
        TargetKind::TextField => Recipe {
            move_to: element,
            mutation: Some(Mutation::SetText(value.as_text())),
            signal: Some(element),
        },
        TargetKind::Button | TargetKind::Tab => Recipe {
            move_to: element,
            mutation: Some(Mutation::Click),
            signal: Some(element),
        },
        TargetKind::Unrecognized => Recipe {
            move_to: element,
            mutation: Some(Mutation::Click),
            signal: None,
        },
    }
}

/// Box to flash when pointing at an element from outside a step (log
/// links): the input container for search-selects, else the element.
pub fn reveal_bounds(info: &ElementInfo) -> Bounds {
    match info.kind {
        TargetKind::SearchSelect => info.container.unwrap_or(info.bounds),
        _ => info.bounds,
    }
}
