#![forbid(unsafe_code)]

//! Property-based invariants for pause and resume.
//!
//! 1. No task starts while the runner is paused, however much time passes.
//! 2. Resuming starts at most one task (the deferred advance), and only if
//!    an advance was actually deferred.
//! 3. Any pause schedule ends with the same field values as an
//!    uninterrupted run.

use std::time::Duration;

use guidepost_runtime::{
    Bounds, ElementInfo, HeadlessPage, Runner, RunnerConfig, RunnerEvent, SkipMode, Step,
    TargetKind, Tour,
};
use proptest::prelude::*;

const FIELDS: [&str; 3] = ["#f0", "#f1", "#f2"];

#[derive(Debug, Clone)]
enum Op {
    Tick(u64),
    Pause,
    Resume,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0u64..3_000).prop_map(Op::Tick),
        1 => Just(Op::Pause),
        1 => Just(Op::Resume),
    ]
}

fn step_strategy() -> impl Strategy<Value = (bool, usize, u8)> {
    (any::<bool>(), 0usize..FIELDS.len(), any::<u8>())
}

fn page() -> HeadlessPage {
    FIELDS
        .iter()
        .enumerate()
        .fold(HeadlessPage::new(), |page, (i, target)| {
            let y = 150.0 * (i as f64 + 1.0);
            page.with_element(
                *target,
                ElementInfo::new(TargetKind::TextField, Bounds::new(40.0, y, 200.0, 24.0)),
            )
        })
}

fn tour(steps: &[(bool, usize, u8)]) -> Tour {
    Tour::new().steps(steps.iter().map(|(talk, field, value)| {
        let step = Step::at(FIELDS[*field]).value(value.to_string());
        if *talk {
            step.message(format!("setting field {field}"))
        } else {
            step
        }
    }))
}

fn final_fields(r: &Runner) -> Vec<Option<String>> {
    let Some(page) = r.page_as::<HeadlessPage>() else {
        return Vec::new();
    };
    FIELDS
        .iter()
        .map(|t| page.field(*t).and_then(|f| f.text.clone()))
        .collect()
}

fn count_started(events: &[RunnerEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, RunnerEvent::TaskStarted { .. }))
        .count()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn paused_runner_starts_nothing(
        steps in prop::collection::vec(step_strategy(), 1..6),
        ops in prop::collection::vec(op_strategy(), 0..40),
        mode in prop_oneof![Just(SkipMode::Normal), Just(SkipMode::FastForward)],
    ) {
        let tour = tour(&steps);

        let mut reference = Runner::new(page(), RunnerConfig::default());
        prop_assert!(reference.run(&tour, Some(mode)).is_ok());
        prop_assert!(reference.run_until_complete().is_ok());

        let mut r = Runner::new(page(), RunnerConfig::default());
        prop_assert!(r.run(&tour, Some(mode)).is_ok());
        r.drain_events();

        for op in &ops {
            match op {
                Op::Tick(ms) => {
                    let paused = r.is_paused();
                    r.tick(Duration::from_millis(*ms));
                    let events = r.drain_events();
                    if paused {
                        prop_assert_eq!(count_started(&events), 0);
                    }
                }
                Op::Pause => r.pause(),
                Op::Resume => {
                    let was_paused = r.is_paused();
                    r.resume();
                    let events = r.drain_events();
                    let replayed = events
                        .iter()
                        .any(|e| matches!(e, RunnerEvent::Replayed { .. }));
                    prop_assert!(count_started(&events) <= 1);
                    prop_assert!(replayed || count_started(&events) == 0);
                    prop_assert!(!replayed || was_paused);
                }
            }
        }

        r.resume();
        prop_assert!(r.run_until_complete().is_ok());
        prop_assert_eq!(final_fields(&r), final_fields(&reference));
    }
}
