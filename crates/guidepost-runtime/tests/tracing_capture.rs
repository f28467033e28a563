#![forbid(unsafe_code)]

//! Structured logging emitted by the runner.
//!
//! ```sh
//! cargo test -p guidepost-runtime --test tracing_capture
//! ```

use std::sync::{Arc, Mutex};

use guidepost_runtime::{
    BlockerControl, Bounds, ElementInfo, HeadlessPage, Runner, RunnerConfig, SkipMode, Step,
    TargetKind, Tour,
};
use tracing_subscriber::layer::SubscriberExt;

#[derive(Debug, Clone)]
struct CapturedEvent {
    level: tracing::Level,
    message: String,
    fields: Vec<(String, String)>,
}

#[derive(Clone, Default)]
struct EventCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl EventCapture {
    fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    fn messages(&self) -> Vec<String> {
        self.events().into_iter().map(|e| e.message).collect()
    }
}

struct FieldVisitor {
    message: String,
    fields: Vec<(String, String)>,
}

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.fields
                .push((field.name().to_string(), format!("{value:?}")));
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.push((field.name().to_string(), value.to_string()));
        }
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for EventCapture {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor {
            message: String::new(),
            fields: Vec::new(),
        };
        event.record(&mut visitor);
        if let Ok(mut events) = self.events.lock() {
            events.push(CapturedEvent {
                level: *event.metadata().level(),
                message: visitor.message,
                fields: visitor.fields,
            });
        }
    }
}

fn runner() -> Runner {
    let page = HeadlessPage::new().with_element(
        "#a",
        ElementInfo::new(TargetKind::TextField, Bounds::new(0.0, 40.0, 100.0, 20.0)),
    );
    Runner::new(page, RunnerConfig::default())
}

#[test]
fn run_lifecycle_is_logged() {
    let capture = EventCapture::default();
    let subscriber = tracing_subscriber::registry().with(capture.clone());

    tracing::subscriber::with_default(subscriber, || {
        let mut r = runner();
        let tour = Tour::new()
            .with_blocker()
            .step(Step::at("#a").value("x"));
        assert!(r.run(&tour, Some(SkipMode::FastForward)).is_ok());
        assert!(r.control(BlockerControl::Pause).is_ok());
        r.end();
    });

    let messages = capture.messages();
    for expected in ["tour started", "blocker attached", "blocker control", "tour ended"] {
        assert!(
            messages.iter().any(|m| m == expected),
            "missing {expected:?} in {messages:?}"
        );
    }

    let started = capture
        .events()
        .into_iter()
        .find(|e| e.message == "tour started");
    let Some(started) = started else {
        panic!("no start event");
    };
    assert_eq!(started.level, tracing::Level::DEBUG);
    assert!(
        started
            .fields
            .iter()
            .any(|(k, v)| k == "mode" && v == "fast-forward")
    );
}

#[test]
fn rejected_start_warns() {
    let capture = EventCapture::default();
    let subscriber = tracing_subscriber::registry().with(capture.clone());

    tracing::subscriber::with_default(subscriber, || {
        let mut r = runner();
        let tour = Tour::new().step(Step::say("hello there"));
        assert!(r.run(&tour, None).is_ok());
        assert!(r.run(&tour, None).is_err());
    });

    assert!(capture.events().iter().any(|e| {
        e.level == tracing::Level::WARN && e.message.contains("already running")
    }));
}
