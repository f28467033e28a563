#![forbid(unsafe_code)]

//! Sample page and tours: a small data explorer with a dataset picker,
//! a variables search-select, filters, and chart/table tabs.

use std::time::Duration;

use guidepost_core::geometry::Bounds;
use guidepost_runtime::{
    ChoiceInfo, Collector, ElementInfo, HeadlessPage, InputFamily, Page, PromptDef, PromptItem,
    Runner, Step, TabId, TargetKind, Tour, TourBook, TourError, TourResult,
};

/// Targets whose state [`summary`] reports.
pub const FIELDS: [&str; 5] = ["#dname", "#datekind", "#dvars", "#seas", "#cond-var"];

/// The explorer page, on the table tab with nothing selected.
pub fn page() -> HeadlessPage {
    HeadlessPage::new()
        .with_tab(
            "Chart",
            "#tab-chart",
            ElementInfo::new(TargetKind::Tab, Bounds::new(320.0, 60.0, 90.0, 32.0))
                .with_label("Chart"),
        )
        .with_tab(
            "Table",
            "#tab-table",
            ElementInfo::new(TargetKind::Tab, Bounds::new(410.0, 60.0, 90.0, 32.0))
                .with_label("Table"),
        )
        .with_active_tab("Table")
        .with_element(
            "#dname",
            ElementInfo::new(TargetKind::SelectList, Bounds::new(20.0, 120.0, 260.0, 34.0))
                .with_label("Dataset:")
                .with_choice(ChoiceInfo::new("pop", "Population"))
                .with_choice(ChoiceInfo::new("flow", "Flows")),
        )
        .with_element(
            "#datekind",
            ElementInfo::new(TargetKind::ChoiceGroup, Bounds::new(20.0, 180.0, 260.0, 60.0))
                .with_label("Date kind:")
                .with_choice(
                    ChoiceInfo::new("m", "Monthly")
                        .with_bounds(Bounds::new(24.0, 200.0, 16.0, 16.0))
                        .with_container(Bounds::new(20.0, 196.0, 120.0, 24.0)),
                )
                .with_choice(
                    ChoiceInfo::new("q", "Quarterly")
                        .with_bounds(Bounds::new(24.0, 222.0, 16.0, 16.0))
                        .with_container(Bounds::new(20.0, 218.0, 120.0, 24.0)),
                ),
        )
        .with_element(
            "#dvars",
            ElementInfo::new(TargetKind::SearchSelect, Bounds::new(24.0, 270.0, 250.0, 28.0))
                .with_label("Variables:")
                .with_container(Bounds::new(20.0, 262.0, 260.0, 44.0)),
        )
        .with_element(
            "#seas",
            ElementInfo::new(TargetKind::Toggle, Bounds::new(24.0, 330.0, 16.0, 16.0))
                .with_label("Seasonal adjustment")
                .with_container(Bounds::new(20.0, 324.0, 220.0, 28.0)),
        )
        .with_element(
            "#cond-add",
            ElementInfo::new(TargetKind::Button, Bounds::new(20.0, 380.0, 110.0, 30.0))
                .with_label("Add filter"),
        )
        .with_element(
            "#cond-var",
            ElementInfo::new(TargetKind::TextField, Bounds::new(20.0, 420.0, 260.0, 30.0))
                .with_label("Filter variable:"),
        )
        .with_element(
            "#hc-ts",
            ElementInfo::new(TargetKind::Unrecognized, Bounds::new(320.0, 110.0, 900.0, 480.0)),
        )
        .with_element(
            "#csv-down",
            ElementInfo::new(TargetKind::Button, Bounds::new(1100.0, 620.0, 120.0, 32.0))
                .with_label("Download CSV"),
        )
}

fn init_csv() -> Tour {
    Tour::new()
        .step(Step::call(|scope| {
            scope.page_mut().activate_tab(&TabId::from("Chart"));
            scope.advance_now();
        }))
        .step(Step::at("#dname").value("NO DATA SELECTED"))
        .step(Step::at("#datekind").value("m"))
        .step(Step::at("#seas").value(false))
}

/// Every sample tour, keyed by name.
pub fn book() -> TourBook {
    TourBook::new()
        .with(
            "intro",
            Tour::new().titled("Welcome").intro("Hello!").prompt(
                PromptDef::new("What would you like to know about?")
                    .item(PromptItem::run("Give me a quick tour", "quick_pop"))
                    .item(PromptItem::run("How do I compare quarters?", "seasonal"))
                    .item(PromptItem::end_and_disable_auto(
                        "Don't show this again (End the tour)",
                    )),
            ),
        )
        .with("init_csv", init_csv())
        .with(
            "quick_pop",
            Tour::new()
                .titled("Quick tour of the Data Explorer")
                .with_blocker()
                .init(init_csv())
                .intro("Hello! Let me give you a quick tour of the Data Explorer.")
                .on_tab("Chart")
                .steps([
                    Step::at("#dname")
                        .value("<noscroll>pop")
                        .message("First, select the dataset of interest."),
                    Step::move_to("#hc-ts"),
                    Step::say("The time-series chart provides an overview of the data."),
                    Step::at("#tab-table").message("You can view the data as a table instead."),
                    Step::move_to("#csv-down").message(
                        "This is only a preview table, the full data is available in the CSV download.",
                    ),
                    Step::say("").duration_ms(600.0),
                    Step::at("#dvars")
                        .value("Nationality")
                        .message("Add variables for further breakdowns of the data."),
                    Step::at("#cond-add").value("<noscroll>"),
                    Step::at("#cond-var")
                        .value("<noscroll>Visa_Type")
                        .message("Use filters to narrow down the data."),
                    Step::at("#tab-chart"),
                    Step::move_to("#seas"),
                    Step::at("#seas")
                        .value(true)
                        .message("Seasonally adjusted trends can also be added on-the-fly."),
                    Step::call(|scope| scope.hide_slow()).message(
                        "That concludes the quick tour. Additional tours are available in the Help tab if you need more assistance.",
                    ),
                ]),
        )
        .with(
            "seasonal",
            Tour::new()
                .titled("Comparing quarters")
                .with_blocker()
                .init(init_csv())
                .on_tab("Chart")
                .steps([
                    Step::at("#dname").value("pop"),
                    Step::at("#datekind")
                        .value("q")
                        .message("Switch to quarterly data to smooth out monthly noise.")
                        .wait(0.5),
                    Step::at("#seas")
                        .value(true)
                        .message("Seasonal adjustment makes quarters directly comparable."),
                    Step::move_to("#hc-ts"),
                    Step::call(|scope| scope.hide_slow())
                        .message("That's it from me, have a play yourself to discover more!"),
                ]),
        )
}

/// Drive `runner` until its run is over.
///
/// `frame_ms == 0` jumps from wake-up to wake-up; otherwise the clock moves
/// in fixed frames, as a host render loop would drive it.
pub fn play(runner: &mut Runner, frame_ms: u64) -> TourResult<Duration> {
    if frame_ms == 0 {
        return runner.run_until_complete();
    }
    let frame = Duration::from_millis(frame_ms);
    let start = runner.now();
    while runner.is_active() {
        if runner.pending_wakes() == 0 {
            return Err(TourError::Stalled { at: runner.now() });
        }
        runner.tick(frame);
    }
    Ok(runner.now().saturating_sub(start))
}

/// Every scriptable input on `page`, one line each, grouped by family:
/// `[i] target  label  options`.
pub fn inputs(page: &dyn Page) -> Vec<String> {
    let mut collect = Collector::new();
    let mut lines = Vec::new();
    for family in [
        InputFamily::Select,
        InputFamily::Radio,
        InputFamily::Checkbox,
        InputFamily::Button,
        InputFamily::Tabs,
    ] {
        let listing = collect.collect(page, family);
        if listing.is_empty() {
            continue;
        }
        lines.push(format!("{family:?}:"));
        for (i, entry) in listing.iter().enumerate() {
            let mut line = format!("  [{i}] {:<12} {}", entry.target.as_str(), entry.label);
            if let Some(options) = entry.options.as_ref().filter(|o| !o.is_empty()) {
                line.push_str(&format!(" ({})", options.join(", ")));
            }
            lines.push(line);
        }
    }
    lines
}

/// One line per tracked field: `target: value`.
pub fn summary(page: &HeadlessPage) -> Vec<String> {
    FIELDS
        .iter()
        .filter_map(|target| {
            let field = page.field(*target)?;
            let value = if !field.items.is_empty() {
                field.items.join(", ")
            } else if let Some(text) = &field.text {
                text.clone()
            } else if *target == "#seas" {
                field.checked.to_string()
            } else {
                "-".to_string()
            };
            Some(format!("{target}: {value}"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use guidepost_runtime::{RunState, RunnerConfig, SkipMode};

    fn runner(mode: SkipMode) -> Runner {
        Runner::new(page(), RunnerConfig::default().with_skip_mode(mode)).with_book(book())
    }

    fn explorer(r: &Runner) -> &HeadlessPage {
        match r.page_as::<HeadlessPage>() {
            Some(page) => page,
            None => panic!("runner is not on the explorer page"),
        }
    }

    #[test]
    fn every_tour_completes_in_every_mode() {
        let names: Vec<String> = book().menu().into_iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["intro", "quick_pop", "seasonal"]);
        for mode in [SkipMode::Normal, SkipMode::FastForward, SkipMode::Instant] {
            for name in &names {
                let mut r = runner(mode);
                assert!(r.run_named(name).is_ok());
                assert!(play(&mut r, 0).is_ok(), "{name} stalled in {mode}");
                assert_eq!(r.state(), RunState::Completed);
            }
        }
    }

    #[test]
    fn quick_tour_leaves_the_explorer_configured() {
        let mut r = runner(SkipMode::FastForward);
        assert!(r.run_named("quick_pop").is_ok());
        assert!(play(&mut r, 16).is_ok());
        let page = explorer(&r);
        assert_eq!(
            summary(page),
            vec![
                "#dname: pop",
                "#datekind: m",
                "#dvars: Nationality",
                "#seas: true",
                "#cond-var: Visa_Type",
            ]
        );
        assert_eq!(page.active_tab(), Some(&TabId::from("Chart")));
        assert!(!r.stage().is_visible());
        assert!(!r.blocker().is_attached());
    }

    #[test]
    fn quick_tour_log_reads_as_a_walkthrough() {
        let mut r = runner(SkipMode::Normal);
        assert!(r.run_named("quick_pop").is_ok());
        assert!(play(&mut r, 0).is_ok());
        let lines = r.log().lines();
        assert_eq!(
            lines.first().map(String::as_str),
            Some("Hello! Let me give you a quick tour of the Data Explorer.")
        );
        assert!(lines.contains(&"<ACTION> change SELECT Input Dataset to Population".to_string()));
        assert!(lines.contains(&"<ACTION> add Nationality to SELECT Input Variables".to_string()));
        assert!(lines.contains(&"<ACTION> change TAB to Table".to_string()));
    }

    #[test]
    fn intro_offers_a_prompt() {
        let mut r = runner(SkipMode::Instant);
        assert!(r.run_named("intro").is_ok());
        assert!(play(&mut r, 0).is_ok());
        let Some(prompt) = r.prompt() else {
            panic!("intro should end on a prompt");
        };
        assert_eq!(prompt.items.len(), 4);

        assert!(r.choose_prompt(1).is_ok());
        assert!(play(&mut r, 0).is_ok());
        assert_eq!(
            explorer(&r).field("#datekind").and_then(|f| f.text.clone()),
            Some("q".to_string())
        );
    }

    #[test]
    fn inputs_cover_the_explorer() {
        let lines = inputs(&page());
        assert_eq!(lines.first().map(String::as_str), Some("Select:"));
        assert!(lines.contains(&"  [0] #dname       Dataset (pop, flow)".to_string()));
        assert!(lines.contains(&"  [1] #dvars       Variables".to_string()));
        assert!(lines.contains(&"  [0] #datekind    Date kind (m, q)".to_string()));
        assert!(lines.contains(&"Tabs:".to_string()));
        assert!(!lines.iter().any(|l| l.contains("#hc-ts")));
    }

    #[test]
    fn framed_play_reports_stalls() {
        let mut r = runner(SkipMode::Normal);
        let tour = Tour::new().step(Step::call(|scope| {
            scope.hold();
        }));
        assert!(r.run(&tour, None).is_ok());
        assert!(matches!(play(&mut r, 16), Err(TourError::Stalled { .. })));
    }
}
