#![forbid(unsafe_code)]

//! Tour authoring helpers: list the inputs on a page and turn a listing
//! into a ready-made [`Step`].
//!
//! Writing a script means knowing each input's descriptor and the values it
//! accepts. [`Collector`] asks the page for every visible element of one
//! family and keeps the last listing, so an author can go from "the second
//! select, third option" to a step without reading the page's markup.
//!
//! ```ignore
//! let mut collect = Collector::new();
//! for (i, entry) in collect.select(runner.page()).iter().enumerate() {
//!     println!("{i}: {} {} {:?}", entry.target, entry.label, entry.options);
//! }
//! let step = collect.get(0, Some(1)).expect("listing has a first select");
//! ```

use crate::page::{ElementInfo, Page, TargetDescriptor, TargetKind};
use crate::tour::Step;

/// Families of inputs an author can list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputFamily {
    /// Selection lists and search-selects.
    Select,
    /// Choice (radio) groups.
    Radio,
    /// Toggles (checkboxes).
    Checkbox,
    /// Push buttons.
    Button,
    /// Tab headers.
    Tabs,
}

impl InputFamily {
    /// Whether elements of `kind` belong to this family.
    pub const fn contains(self, kind: TargetKind) -> bool {
        matches!(
            (self, kind),
            (Self::Select, TargetKind::SelectList | TargetKind::SearchSelect)
                | (Self::Radio, TargetKind::ChoiceGroup)
                | (Self::Checkbox, TargetKind::Toggle)
                | (Self::Button, TargetKind::Button)
                | (Self::Tabs, TargetKind::Tab)
        )
    }

    /// Whether entries of this family carry option values.
    pub const fn has_options(self) -> bool {
        matches!(self, Self::Select | Self::Radio | Self::Checkbox)
    }
}

/// One listed input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collected {
    /// Descriptor that resolves to the input.
    pub target: TargetDescriptor,
    /// Human-readable name.
    pub label: String,
    /// Values the input accepts; `None` for buttons and tabs.
    pub options: Option<Vec<String>>,
}

impl Collected {
    fn from_info(target: TargetDescriptor, info: &ElementInfo, family: InputFamily) -> Self {
        let options = family
            .has_options()
            .then(|| info.choices.iter().map(|c| c.value.clone()).collect());
        Self {
            target,
            label: info.display_label(),
            options,
        }
    }
}

/// Every visible input of `family`, in page order.
pub fn inventory(page: &dyn Page, family: InputFamily) -> Vec<Collected> {
    page.visible_targets()
        .into_iter()
        .filter_map(|target| {
            let info = page.resolve(&target).and_then(|id| page.inspect(id))?;
            family
                .contains(info.kind)
                .then(|| Collected::from_info(target, &info, family))
        })
        .collect()
}

/// Keeps the most recent listing so steps can be built from it by index.
#[derive(Debug, Clone, Default)]
pub struct Collector {
    last: Option<Vec<Collected>>,
}

impl Collector {
    /// A collector with nothing listed yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// List `family` on `page`, replacing the previous listing.
    pub fn collect(&mut self, page: &dyn Page, family: InputFamily) -> &[Collected] {
        self.last.insert(inventory(page, family))
    }

    /// List selection lists and search-selects.
    pub fn select(&mut self, page: &dyn Page) -> &[Collected] {
        self.collect(page, InputFamily::Select)
    }

    /// List choice groups.
    pub fn radio(&mut self, page: &dyn Page) -> &[Collected] {
        self.collect(page, InputFamily::Radio)
    }

    /// List toggles.
    pub fn checkbox(&mut self, page: &dyn Page) -> &[Collected] {
        self.collect(page, InputFamily::Checkbox)
    }

    /// List buttons.
    pub fn button(&mut self, page: &dyn Page) -> &[Collected] {
        self.collect(page, InputFamily::Button)
    }

    /// List tab headers.
    pub fn tabs(&mut self, page: &dyn Page) -> &[Collected] {
        self.collect(page, InputFamily::Tabs)
    }

    /// The last listing, if any.
    pub fn last(&self) -> Option<&[Collected]> {
        self.last.as_deref()
    }

    /// A step aimed at entry `i` of the last listing, set to its option `j`
    /// when given. Without `j` the step clicks the input.
    ///
    /// `None` when nothing has been listed or either index is out of range.
    pub fn get(&self, i: usize, j: Option<usize>) -> Option<Step> {
        let entry = self.last.as_ref()?.get(i)?;
        let step = Step::at(entry.target.clone());
        match j {
            None => Some(step),
            Some(j) => {
                let value = entry.options.as_ref()?.get(j)?;
                Some(step.value(value.as_str()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessPage;
    use crate::page::ChoiceInfo;
    use crate::runner::Runner;
    use crate::tour::{StepValue, Tour};
    use crate::{RunnerConfig, SkipMode};
    use guidepost_core::geometry::Bounds;

    fn page() -> HeadlessPage {
        let b = |y: f64| Bounds::new(20.0, y, 200.0, 30.0);
        HeadlessPage::new()
            .with_element(
                "#dname",
                ElementInfo::new(TargetKind::SelectList, b(100.0))
                    .with_label("Dataset:")
                    .with_choice(ChoiceInfo::new("pop", "Population"))
                    .with_choice(ChoiceInfo::new("flow", "Flows")),
            )
            .with_element(
                "#go",
                ElementInfo::new(TargetKind::Button, b(150.0)).with_label("Go"),
            )
            .with_element(
                "#dvars",
                ElementInfo::new(TargetKind::SearchSelect, b(200.0)).with_id("dvars"),
            )
            .with_element(
                "#period",
                ElementInfo::new(TargetKind::ChoiceGroup, b(250.0))
                    .with_label("Period:")
                    .with_choice(ChoiceInfo::new("m", "Monthly"))
                    .with_choice(ChoiceInfo::new("q", "Quarterly")),
            )
            .with_tab(
                "Chart",
                "#tab-chart",
                ElementInfo::new(TargetKind::Tab, b(0.0)).with_label("Chart"),
            )
    }

    fn targets(listing: &[Collected]) -> Vec<&str> {
        listing.iter().map(|c| c.target.as_str()).collect()
    }

    #[test]
    fn lists_each_family_in_page_order() {
        let page = page();
        let mut collect = Collector::new();
        assert!(collect.last().is_none());

        let selects = collect.select(&page);
        assert_eq!(targets(selects), vec!["#dname", "#dvars"]);
        assert_eq!(selects[0].label, "Dataset");
        assert_eq!(
            selects[0].options,
            Some(vec!["pop".to_string(), "flow".to_string()])
        );
        assert_eq!(selects[1].label, "#dvars");
        assert_eq!(selects[1].options, Some(Vec::new()));

        assert_eq!(targets(collect.radio(&page)), vec!["#period"]);
        assert!(collect.checkbox(&page).is_empty());

        let buttons = collect.button(&page);
        assert_eq!(targets(buttons), vec!["#go"]);
        assert_eq!(buttons[0].options, None);

        assert_eq!(targets(collect.tabs(&page)), vec!["#tab-chart"]);
        assert_eq!(collect.last().map(<[Collected]>::len), Some(1));
    }

    #[test]
    fn get_builds_steps_from_the_last_listing() {
        let page = page();
        let mut collect = Collector::new();
        assert!(collect.get(0, None).is_none());

        collect.radio(&page);
        let Some(step) = collect.get(0, Some(1)) else {
            panic!("first radio group, second option");
        };
        assert_eq!(step.target, Some(TargetDescriptor::from("#period")));
        assert!(matches!(step.value, Some(StepValue::Text(ref v)) if v == "q"));

        let Some(click) = collect.get(0, None) else {
            panic!("first radio group");
        };
        assert!(click.value.is_none());

        assert!(collect.get(1, None).is_none());
        assert!(collect.get(0, Some(2)).is_none());

        collect.button(&page);
        assert!(collect.get(0, Some(0)).is_none());
    }

    #[test]
    fn collected_steps_play_on_the_page() {
        let mut collect = Collector::new();
        collect.select(&page());
        let Some(step) = collect.get(0, Some(1)) else {
            panic!("first select, second option");
        };

        let mut r = Runner::new(page(), RunnerConfig::default());
        assert!(r.run(&Tour::new().step(step), Some(SkipMode::Instant)).is_ok());
        assert!(r.run_until_complete().is_ok());
        let Some(page) = r.page_as::<HeadlessPage>() else {
            panic!("runner is not on a HeadlessPage");
        };
        assert_eq!(
            page.field("#dname").and_then(|f| f.text.as_deref()),
            Some("flow")
        );
    }

    #[test]
    fn pages_without_enumeration_list_nothing() {
        struct Opaque(HeadlessPage);

        impl Page for Opaque {
            fn resolve(&self, target: &TargetDescriptor) -> Option<crate::page::ElementId> {
                self.0.resolve(target)
            }
            fn inspect(&self, id: crate::page::ElementId) -> Option<ElementInfo> {
                self.0.inspect(id)
            }
            fn apply(&mut self, id: crate::page::ElementId, mutation: &crate::page::Mutation) {
                self.0.apply(id, mutation);
            }
            fn viewport(&self) -> Bounds {
                self.0.viewport()
            }
            fn document(&self) -> Bounds {
                self.0.document()
            }
            fn scroll_to(&mut self, top: f64) {
                self.0.scroll_to(top);
            }
            fn is_tab_active(&self, tab: &crate::page::TabId) -> bool {
                self.0.is_tab_active(tab)
            }
            fn tab_button(&self, tab: &crate::page::TabId) -> Option<TargetDescriptor> {
                self.0.tab_button(tab)
            }
            fn activate_tab(&mut self, tab: &crate::page::TabId) {
                self.0.activate_tab(tab);
            }
        }

        assert!(inventory(&Opaque(page()), InputFamily::Select).is_empty());
    }
}
