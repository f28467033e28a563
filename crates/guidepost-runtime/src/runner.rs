#![forbid(unsafe_code)]

//! The tour scheduler.
//!
//! A [`Runner`] turns a [`Tour`] into a FIFO of tasks and plays them one at
//! a time on a virtual clock. A task never finishes implicitly: it ends by
//! advancing the queue, either immediately or through a wake-up scheduled
//! on the [`Timeline`] (a finished move, a delay, a slow hide).
//!
//! ```text
//!            run / run_tour
//!   Idle ─────────────────────▶ Running ◀──── resume ────┐
//!                                 │   └────── pause ────▶ Paused
//!                  cleanup+prompt │ end()                   │ end()
//!                                 ▼                         ▼
//!                              Completed ◀──────────────────┘
//! ```
//!
//! # Invariants
//!
//! 1. At most one task is in flight. An advance requested while paused is
//!    remembered once and replayed once on resume.
//! 2. Durations are resolved through the skip register when a task starts,
//!    never when it is queued.
//! 3. Tasks queued by a running task go to the tail.
//! 4. After [`Runner::end`] nothing queued before it runs; highlights that
//!    are already fading finish on their own.
//! 5. Starting a tour while one is running or paused is an error.
//!
//! # Driving time
//!
//! Hosts call [`Runner::tick`] with real frame deltas. Tests and headless
//! hosts use [`Runner::run_until_complete`] / [`Runner::run_until_idle`],
//! which jump straight to each pending wake-up.

use std::any::Any;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::time::Duration;

use guidepost_core::geometry::Bounds;
use guidepost_core::skip::{SkipMode, SkipRegister};
use guidepost_core::timeline::{Timeline, TimerId};
use guidepost_core::timing::{TourTiming, scale_duration};

use crate::blocker::{Blocker, BlockerControl};
use crate::config::RunnerConfig;
use crate::error::{TourError, TourResult};
use crate::flag_store::{FlagStore, MemoryFlags};
use crate::log::{LabeledDialog, TourLog};
use crate::page::{ElementId, ElementInfo, Mutation, Page, TabId, TargetDescriptor};
use crate::prompt::{ActivePrompt, BuilderEntry, PromptAction, PromptDef};
use crate::resolver::{self, Recipe};
use crate::scope::{CallScope, Continuation, Outcome};
use crate::stage::Stage;
use crate::tour::{Interaction, Step, StepFn, Tour, TourBook};

// ---------------------------------------------------------------------------
// Public state
// ---------------------------------------------------------------------------

/// Lifecycle of the current (or last) run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Nothing has run yet.
    Idle,
    /// Tasks are being played.
    Running,
    /// Running, but the next advance is held back.
    Paused,
    /// The last run finished or was ended.
    Completed,
}

/// Kind of a queued task, reported in [`RunnerEvent::TaskStarted`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    /// Move to the viewport before the intro narration.
    Intro,
    /// Narration.
    Talk,
    /// Switch to the tour's tab.
    SwitchTab,
    /// Move to a target and act on it.
    Interact,
    /// Callable step.
    Call,
    /// Plain wait.
    Delay,
    /// Detach the blocker and restore the skip mode.
    Cleanup,
    /// Show the follow-up prompt.
    Prompt,
    /// Start the real tour after its reset tour.
    Chain,
}

/// Milestones, collected during dispatch and drained by the host.
#[derive(Debug, Clone, PartialEq)]
pub enum RunnerEvent {
    /// A run began.
    RunStarted {
        /// Virtual time.
        at: Duration,
        /// Mode in effect.
        mode: SkipMode,
    },
    /// A task left the queue.
    TaskStarted {
        /// Virtual time.
        at: Duration,
        /// What it was.
        task: TaskKind,
    },
    /// An advance was held back by a pause.
    Deferred {
        /// Virtual time.
        at: Duration,
    },
    /// A held-back advance was replayed.
    Replayed {
        /// Virtual time.
        at: Duration,
    },
    /// The cleanup task ran.
    CleanupDone {
        /// Virtual time.
        at: Duration,
    },
    /// A prompt appeared.
    PromptShown {
        /// Virtual time.
        at: Duration,
    },
    /// The queue ran dry.
    Completed {
        /// Virtual time.
        at: Duration,
    },
    /// [`Runner::end`] ran.
    Ended {
        /// Virtual time.
        at: Duration,
    },
}

// ---------------------------------------------------------------------------
// Internal queue types
// ---------------------------------------------------------------------------

enum Task {
    Intro,
    Talk {
        message: String,
        wait_fraction: f64,
        duration_ms: Option<f64>,
    },
    SwitchTab {
        tab: TabId,
        then: Then,
    },
    Interact(Step),
    Call(StepFn),
    Delay,
    Cleanup,
    Prompt(PromptDef),
    Chain(Box<Tour>),
}

impl Task {
    fn kind(&self) -> TaskKind {
        match self {
            Task::Intro => TaskKind::Intro,
            Task::Talk { .. } => TaskKind::Talk,
            Task::SwitchTab { .. } => TaskKind::SwitchTab,
            Task::Interact(_) => TaskKind::Interact,
            Task::Call(_) => TaskKind::Call,
            Task::Delay => TaskKind::Delay,
            Task::Cleanup => TaskKind::Cleanup,
            Task::Prompt(_) => TaskKind::Prompt,
            Task::Chain(_) => TaskKind::Chain,
        }
    }
}

/// How to continue once an interaction is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Then {
    Advance,
    Gap,
}

#[derive(Debug, Clone)]
enum AfterMove {
    Then(Then),
    Apply {
        id: Option<ElementId>,
        info: Option<ElementInfo>,
        target: TargetDescriptor,
        mutation: Mutation,
        signal: Option<Bounds>,
        then: Then,
    },
    Flash(Bounds),
}

#[derive(Debug, Clone)]
enum Wake {
    MoveDone(Box<AfterMove>),
    Delay(u64),
    HideSlowDone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Active,
    Completed,
}

// ---------------------------------------------------------------------------
// Runner
// ---------------------------------------------------------------------------

/// Plays tours against a [`Page`].
pub struct Runner {
    config: RunnerConfig,
    page: Box<dyn Page>,
    flags: Box<dyn FlagStore>,
    book: TourBook,

    skip: SkipRegister,
    timeline: Timeline<Wake>,
    stage: Stage,
    blocker: Blocker,
    log: TourLog,
    builder: LabeledDialog<BuilderEntry>,
    prompt: Option<ActivePrompt>,

    queue: VecDeque<Task>,
    delays: VecDeque<(u64, TimerId)>,
    next_delay: u64,
    hide_timer: Option<TimerId>,

    phase: Phase,
    paused: bool,
    stalled: bool,
    ready: bool,
    pumping: bool,

    run_id: u64,
    next_hold: u64,
    held: Option<Continuation>,

    events: Vec<RunnerEvent>,
}

impl std::fmt::Debug for Runner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runner")
            .field("state", &self.state())
            .field("skip", &self.skip.current())
            .field("queued", &self.queue.len())
            .field("pending_wakes", &self.timeline.len())
            .field("now", &self.timeline.now())
            .finish()
    }
}

impl Runner {
    /// A runner over `page` with an in-memory flag store and no tours.
    pub fn new(page: impl Page + 'static, config: RunnerConfig) -> Self {
        let log = TourLog::new(config.log_title.clone());
        let builder = LabeledDialog::new(config.builder_title.clone());
        Self {
            skip: SkipRegister::new(config.skip_mode),
            config,
            page: Box::new(page),
            flags: Box::new(MemoryFlags::new()),
            book: TourBook::new(),
            timeline: Timeline::new(),
            stage: Stage::new(),
            blocker: Blocker::new(),
            log,
            builder,
            prompt: None,
            queue: VecDeque::new(),
            delays: VecDeque::new(),
            next_delay: 0,
            hide_timer: None,
            phase: Phase::Idle,
            paused: false,
            stalled: false,
            ready: false,
            pumping: false,
            run_id: 0,
            next_hold: 0,
            held: None,
            events: Vec::new(),
        }
    }

    /// Use `flags` for the auto-start preference.
    #[must_use]
    pub fn with_flags(mut self, flags: impl FlagStore + 'static) -> Self {
        self.flags = Box::new(flags);
        self
    }

    /// Use `book` for named tours, prompts and the builder.
    #[must_use]
    pub fn with_book(mut self, book: TourBook) -> Self {
        self.book = book;
        self
    }

    // -- accessors -----------------------------------------------------------

    /// Lifecycle state.
    pub fn state(&self) -> RunState {
        match self.phase {
            Phase::Idle => RunState::Idle,
            Phase::Completed => RunState::Completed,
            Phase::Active if self.paused => RunState::Paused,
            Phase::Active => RunState::Running,
        }
    }

    /// Whether a run is in progress (running or paused).
    pub fn is_active(&self) -> bool {
        self.phase == Phase::Active
    }

    /// Whether the pause flag is set.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Virtual time.
    pub fn now(&self) -> Duration {
        self.timeline.now()
    }

    /// Configuration.
    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Timing constants.
    pub fn timing(&self) -> &TourTiming {
        &self.config.timing
    }

    /// The page.
    pub fn page(&self) -> &dyn Page {
        self.page.as_ref()
    }

    /// The page, mutably.
    pub fn page_mut(&mut self) -> &mut dyn Page {
        self.page.as_mut()
    }

    /// The page as its concrete type, if it is a `P`.
    pub fn page_as<P: Page>(&self) -> Option<&P> {
        let page: &dyn Any = &*self.page;
        page.downcast_ref::<P>()
    }

    /// The page as its concrete type, mutably.
    pub fn page_as_mut<P: Page>(&mut self) -> Option<&mut P> {
        let page: &mut dyn Any = &mut *self.page;
        page.downcast_mut::<P>()
    }

    /// The flag store.
    pub fn flags(&self) -> &dyn FlagStore {
        self.flags.as_ref()
    }

    /// Tours known by name.
    pub fn book(&self) -> &TourBook {
        &self.book
    }

    /// Tours known by name, mutably.
    pub fn book_mut(&mut self) -> &mut TourBook {
        &mut self.book
    }

    /// Guide and decorations.
    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    /// Blocker state.
    pub fn blocker(&self) -> &Blocker {
        &self.blocker
    }

    /// The tour log.
    pub fn log(&self) -> &TourLog {
        &self.log
    }

    /// The tour log, mutably (e.g. to show or hide the viewer).
    pub fn log_mut(&mut self) -> &mut TourLog {
        &mut self.log
    }

    /// The builder dialog.
    pub fn builder(&self) -> &LabeledDialog<BuilderEntry> {
        &self.builder
    }

    /// The prompt on screen, if any.
    pub fn prompt(&self) -> Option<&ActivePrompt> {
        self.prompt.as_ref()
    }

    /// Current playback mode.
    pub fn skip_mode(&self) -> SkipMode {
        self.skip.current()
    }

    /// Change the playback mode without touching the saved mode.
    pub fn set_skip_mode(&mut self, mode: SkipMode) {
        self.skip.set(Some(mode));
    }

    /// Tasks waiting behind the one in flight.
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Pending wake-ups (moves, delays, slow hide).
    pub fn pending_wakes(&self) -> usize {
        self.timeline.len()
    }

    /// Take the events collected so far.
    pub fn drain_events(&mut self) -> Vec<RunnerEvent> {
        std::mem::take(&mut self.events)
    }

    fn emit(&mut self, event: RunnerEvent) {
        self.events.push(event);
    }

    // -- starting tours ------------------------------------------------------

    fn ensure_not_running(&self) -> TourResult<()> {
        if self.is_active() {
            tracing::warn!("tour start rejected: a tour is already running");
            return Err(TourError::AlreadyRunning);
        }
        Ok(())
    }

    /// Play `tour` as-is. `mode` (or the tour's own mode) replaces the
    /// current playback mode for the run; the caller's mode comes back at
    /// cleanup.
    pub fn run(&mut self, tour: &Tour, mode: Option<SkipMode>) -> TourResult<()> {
        self.ensure_not_running()?;
        self.queue.clear();
        self.prepare(tour, mode);
        self.advance();
        Ok(())
    }

    /// Play `tour`, first running its reset tour in instant mode if it has
    /// one. The real tour starts only after the reset tour's cleanup.
    pub fn run_tour(&mut self, tour: &Tour) -> TourResult<()> {
        self.ensure_not_running()?;
        self.queue.clear();
        match tour.init.as_deref() {
            Some(init) => {
                self.prepare(init, Some(SkipMode::Instant));
                let mut real = tour.clone();
                real.init = None;
                self.queue.push_back(Task::Chain(Box::new(real)));
            }
            None => self.prepare(tour, None),
        }
        self.advance();
        Ok(())
    }

    /// Play the tour called `name` from the book.
    pub fn run_named(&mut self, name: &str) -> TourResult<()> {
        let tour = self
            .book
            .get(name)
            .cloned()
            .ok_or_else(|| TourError::UnknownTour(name.to_string()))?;
        self.run_tour(&tour)
    }

    /// Play `name` unless the user opted out of auto-start. Returns whether
    /// a tour started.
    pub fn show_auto(&mut self, name: &str) -> TourResult<bool> {
        if self.auto_disabled() {
            tracing::debug!(tour = name, "auto tour disabled");
            return Ok(false);
        }
        self.run_named(name)?;
        Ok(true)
    }

    /// Whether the auto-start opt-out flag is set. Store failures read as
    /// "not set".
    pub fn auto_disabled(&self) -> bool {
        match self.flags.get(&self.config.no_auto_key) {
            Ok(flag) => flag == Some(true),
            Err(e) => {
                tracing::warn!(store = self.flags.name(), error = %e, "flag store read failed");
                false
            }
        }
    }

    /// Opt out of auto-start.
    pub fn disable_auto(&mut self) -> TourResult<()> {
        self.flags.set(&self.config.no_auto_key, true)?;
        Ok(())
    }

    /// Opt back in to auto-start.
    pub fn enable_auto(&mut self) -> TourResult<()> {
        self.flags.remove(&self.config.no_auto_key)?;
        Ok(())
    }

    fn prepare(&mut self, tour: &Tour, mode: Option<SkipMode>) {
        self.run_id += 1;
        self.held = None;
        self.paused = false;
        self.stalled = false;
        self.prompt = None;
        self.skip.set_with_history(mode.or(tour.mode));
        self.log.clear();
        self.show();
        if tour.uses_blocker {
            self.blocker.create(self.page.as_mut());
        }
        self.phase = Phase::Active;
        tracing::debug!(
            run = self.run_id,
            mode = %self.skip.current(),
            steps = tour.script.len(),
            "tour started"
        );
        self.emit(RunnerEvent::RunStarted {
            at: self.now(),
            mode: self.skip.current(),
        });

        if let Some(intro) = &tour.intro {
            self.queue.push_back(Task::Intro);
            self.queue.push_back(Task::Talk {
                message: intro.clone(),
                wait_fraction: 1.0,
                duration_ms: None,
            });
        }

        if let Some(tab) = &tour.required_tab
            && !self.page.is_tab_active(tab)
        {
            if self.skip.resolve(true, true, false) {
                self.queue.push_back(Task::Talk {
                    message: format!("First we need to change tabs to \"{tab}\"..."),
                    wait_fraction: 1.0,
                    duration_ms: None,
                });
                self.queue.push_back(Task::SwitchTab {
                    tab: tab.clone(),
                    then: Then::Gap,
                });
            } else {
                self.queue.push_back(Task::SwitchTab {
                    tab: tab.clone(),
                    then: Then::Advance,
                });
            }
        }

        for step in &tour.script {
            self.enqueue_step(step);
        }
        self.queue.push_back(Task::Cleanup);
        if let Some(prompt) = &tour.prompt {
            self.queue.push_back(Task::Prompt(prompt.clone()));
        }
    }

    /// Append the tasks for one step at the tail of the queue.
    pub(crate) fn enqueue_step(&mut self, step: &Step) {
        if let Some(message) = &step.message {
            self.queue.push_back(Task::Talk {
                message: message.clone(),
                wait_fraction: step.wait_fraction,
                duration_ms: step.duration_ms,
            });
        }
        if step.target.is_some() {
            self.queue.push_back(Task::Interact(step.clone()));
        } else if let Some(f) = step.callable() {
            self.queue.push_back(Task::Call(f.clone()));
        } else if step.message.is_none() {
            self.queue.push_back(Task::Delay);
        }
    }

    // -- queue ---------------------------------------------------------------

    fn advance(&mut self) {
        if self.paused {
            if !self.stalled {
                self.emit(RunnerEvent::Deferred { at: self.now() });
            }
            self.stalled = true;
            return;
        }
        self.ready = true;
        if self.pumping {
            return;
        }
        self.pumping = true;
        while std::mem::take(&mut self.ready) {
            match self.queue.pop_front() {
                Some(task) => self.execute(task),
                None => self.finish(),
            }
        }
        self.pumping = false;
    }

    fn finish(&mut self) {
        if self.phase == Phase::Active {
            self.phase = Phase::Completed;
            tracing::debug!(run = self.run_id, "tour completed");
            self.emit(RunnerEvent::Completed { at: self.now() });
        }
    }

    fn execute(&mut self, task: Task) {
        let kind = task.kind();
        tracing::trace!(?kind, at_ms = self.now().as_millis() as u64, "task started");
        self.emit(RunnerEvent::TaskStarted {
            at: self.now(),
            task: kind,
        });

        match task {
            Task::Intro => {
                let viewport = self.page.viewport();
                self.move_guide(viewport, false, AfterMove::Then(Then::Advance));
            }
            Task::Talk {
                message,
                wait_fraction,
                duration_ms,
            } => {
                let timing = &self.config.timing;
                let duration = timing.message_duration(&message, duration_ms, &self.skip);
                self.stage.talk(&message, duration, timing.msg_fade());
                self.log.message(&message, &self.skip);
                self.delay(scale_duration(duration, wait_fraction));
            }
            Task::SwitchTab { tab, then } => match self.page.tab_button(&tab) {
                Some(button) => self.interact(&button, Interaction::Click, false, then),
                None => {
                    self.page.activate_tab(&tab);
                    self.continue_with(then);
                }
            },
            Task::Interact(step) => {
                let Some(target) = step.target.as_ref() else {
                    self.delay(self.config.timing.step_delay(&self.skip));
                    return;
                };
                let (interaction, no_scroll) = step.interaction();
                self.interact(target, interaction, no_scroll, Then::Gap);
            }
            Task::Call(f) => self.call(&f),
            Task::Delay => self.delay(self.config.timing.step_delay(&self.skip)),
            Task::Cleanup => {
                self.destroy_blocker();
                self.skip.reset();
                self.emit(RunnerEvent::CleanupDone { at: self.now() });
                self.advance();
            }
            Task::Prompt(def) => {
                self.prompt = Some(ActivePrompt::from_def(&def));
                self.emit(RunnerEvent::PromptShown { at: self.now() });
                self.advance();
            }
            Task::Chain(tour) => {
                self.prepare(&tour, None);
                self.advance();
            }
        }
    }

    fn continue_with(&mut self, then: Then) {
        match then {
            Then::Advance => self.advance(),
            Then::Gap => self.delay(self.config.timing.step_delay(&self.skip)),
        }
    }

    fn delay(&mut self, after: Duration) {
        self.next_delay += 1;
        let seq = self.next_delay;
        let id = self.timeline.schedule(after, Wake::Delay(seq));
        self.delays.push_back((seq, id));
    }

    fn call(&mut self, f: &StepFn) {
        let outcome = {
            let mut scope = CallScope::new(self);
            f(&mut scope);
            scope.outcome()
        };
        match outcome {
            Outcome::Pending => {
                tracing::warn!("callable step neither advanced nor held; tour stalls");
            }
            Outcome::Advance => self.delay(self.config.timing.step_delay(&self.skip)),
            Outcome::AdvanceAfter(d) if d.is_zero() => self.advance(),
            Outcome::AdvanceAfter(d) => self.delay(d),
            Outcome::Held(token) => self.held = Some(token),
            Outcome::End => self.end(),
            Outcome::HideSlow => self.hide_slow(),
        }
    }

    pub(crate) fn issue_continuation(&mut self) -> Continuation {
        self.next_hold += 1;
        Continuation {
            run: self.run_id,
            id: self.next_hold,
        }
    }

    /// Release a continuation handed out by [`CallScope::hold`]. Returns
    /// whether it was the one the tour is waiting on.
    pub fn resume_continuation(&mut self, token: Continuation) -> bool {
        if self.held != Some(token) || token.run != self.run_id {
            return false;
        }
        self.held = None;
        self.advance();
        true
    }

    // -- interactions --------------------------------------------------------

    fn interact(
        &mut self,
        target: &TargetDescriptor,
        interaction: Interaction,
        no_scroll: bool,
        then: Then,
    ) {
        let id = self.page.resolve(target);
        let info = id.and_then(|id| self.page.inspect(id));
        if info.is_none() {
            tracing::debug!(%target, "target did not resolve");
        }
        let Recipe {
            move_to,
            mutation,
            signal,
        } = resolver::plan(info.as_ref(), &interaction, self.page.document());
        let after = match mutation {
            Some(mutation) => AfterMove::Apply {
                id,
                info,
                target: target.clone(),
                mutation,
                signal,
                then,
            },
            None => AfterMove::Then(then),
        };
        self.move_guide(move_to, no_scroll, after);
    }

    fn move_guide(&mut self, bounds: Bounds, no_scroll: bool, after: AfterMove) {
        let to = TourTiming::landing_point(&bounds);
        let duration = self
            .config
            .timing
            .move_duration(self.stage.position(), to, &self.skip);
        self.stage.glide_to(to, duration);
        if !no_scroll {
            let viewport = self.page.viewport();
            let desired = (to.y - viewport.height / 4.0).floor().max(0.0);
            self.stage.scroll(viewport.y, desired, duration);
        }
        self.timeline
            .schedule(duration, Wake::MoveDone(Box::new(after)));
    }

    fn flash(&mut self, bounds: Bounds) {
        if self.skip.resolve(true, true, false) {
            self.stage.flash(bounds, self.config.timing.fade());
        }
    }

    pub(crate) fn signal_target(&mut self, target: &TargetDescriptor) {
        let bounds = self
            .page
            .resolve(target)
            .and_then(|id| self.page.inspect(id))
            .map(|info| resolver::reveal_bounds(&info));
        if let Some(bounds) = bounds {
            self.flash(bounds);
        }
    }

    pub(crate) fn log_message(&mut self, text: &str) {
        self.log.message(text, &self.skip);
    }

    // -- time ----------------------------------------------------------------

    /// Advance virtual time by `dt`, firing every wake-up that falls due in
    /// order and keeping animations in step.
    pub fn tick(&mut self, dt: Duration) {
        let target = self.now().saturating_add(dt);
        while let Some((at, wake)) = self.timeline.pop_due(target) {
            self.sync_stage(at);
            self.dispatch(wake);
        }
        self.timeline.advance_to(target);
        self.sync_stage(target);
    }

    fn sync_stage(&mut self, to: Duration) {
        let dt = to.saturating_sub(self.stage.clock());
        if dt.is_zero() {
            return;
        }
        if let Some(offset) = self.stage.tick(dt) {
            self.page.scroll_to(offset);
        }
    }

    fn dispatch(&mut self, wake: Wake) {
        match wake {
            Wake::MoveDone(after) => self.after_move(*after),
            Wake::Delay(seq) => {
                self.delays.retain(|(s, _)| *s != seq);
                self.advance();
            }
            Wake::HideSlowDone => {
                self.hide_timer = None;
                self.end();
            }
        }
    }

    fn after_move(&mut self, after: AfterMove) {
        match after {
            AfterMove::Then(then) => self.continue_with(then),
            AfterMove::Apply {
                id,
                info,
                target,
                mutation,
                signal,
                then,
            } => {
                if let Some(id) = id {
                    self.page.apply(id, &mutation);
                }
                if let Some(info) = &info {
                    self.log.action(info, &target, &mutation, &self.skip);
                }
                if let Some(bounds) = signal {
                    self.flash(bounds);
                }
                self.continue_with(then);
            }
            AfterMove::Flash(bounds) => self.flash(bounds),
        }
    }

    /// Jump from wake-up to wake-up until the run is over.
    ///
    /// Returns the virtual time that passed, or [`TourError::Stalled`] if
    /// the run is waiting on something with no wake-up pending (a pause or
    /// a held continuation).
    pub fn run_until_complete(&mut self) -> TourResult<Duration> {
        let start = self.now();
        while self.is_active() {
            let Some(deadline) = self.timeline.next_deadline() else {
                return Err(TourError::Stalled { at: self.now() });
            };
            self.tick(deadline.saturating_sub(self.now()));
        }
        Ok(self.now().saturating_sub(start))
    }

    /// Jump from wake-up to wake-up until nothing is pending and every
    /// animation has settled. Returns the virtual time that passed.
    pub fn run_until_idle(&mut self) -> Duration {
        let start = self.now();
        while let Some(deadline) = self.timeline.next_deadline() {
            self.tick(deadline.saturating_sub(self.now()));
        }
        let settle = self.stage.settles_at().saturating_sub(self.now());
        self.tick(settle);
        self.now().saturating_sub(start)
    }

    // -- control -------------------------------------------------------------

    /// Hold back the next advance. Animations in flight keep going.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Clear the pause and replay a held-back advance, if any.
    pub fn resume(&mut self) {
        if !self.paused {
            return;
        }
        self.paused = false;
        if std::mem::take(&mut self.stalled) {
            self.emit(RunnerEvent::Replayed { at: self.now() });
            self.advance();
        }
    }

    /// Show the guide and clear the auto-start opt-out.
    pub fn show(&mut self) {
        self.stage.show();
        if let Some(id) = self.hide_timer.take() {
            self.timeline.cancel(id);
        }
        if let Err(e) = self.flags.remove(&self.config.no_auto_key) {
            tracing::warn!(store = self.flags.name(), error = %e, "flag store write failed");
        }
    }

    /// Fade the guide out, then [`end`](Self::end).
    pub fn hide_slow(&mut self) {
        if self.hide_timer.is_some() {
            return;
        }
        let fade = self.config.timing.fade();
        self.stage.fade_out(fade);
        self.hide_timer = Some(self.timeline.schedule(fade, Wake::HideSlowDone));
    }

    /// Stop everything now: hide the guide, drop queued work and pending
    /// waits, remove bubbles and the prompt, detach the blocker, restore
    /// the saved playback mode and clear the pause.
    pub fn end(&mut self) {
        self.stage.hide();
        self.queue.clear();
        self.timeline.retain(|_| false);
        self.delays.clear();
        self.hide_timer = None;
        self.prompt = None;
        self.destroy_blocker();
        self.paused = false;
        self.stalled = false;
        self.ready = false;
        self.skip.reset();
        self.held = None;
        self.run_id += 1;
        if self.phase == Phase::Active {
            self.phase = Phase::Completed;
        }
        tracing::debug!("tour ended");
        self.emit(RunnerEvent::Ended { at: self.now() });
    }

    fn destroy_blocker(&mut self) {
        if self.blocker.destroy(self.page.as_mut()) {
            self.paused = false;
        }
    }

    /// A blocked interaction attempt: bring the warning back.
    pub fn blocker_interaction(&mut self) {
        self.blocker.warn();
    }

    /// Act on a blocker button.
    pub fn control(&mut self, control: BlockerControl) -> TourResult<()> {
        if !self.blocker.is_attached() {
            return Err(TourError::NoBlocker);
        }
        tracing::debug!(%control, "blocker control");
        match control {
            BlockerControl::Pause => self.pause(),
            BlockerControl::Play => {
                self.skip.set(Some(SkipMode::Normal));
                self.resume();
            }
            BlockerControl::FastForward => {
                self.skip.set(Some(SkipMode::FastForward));
                self.resume();
                self.flush_delay();
                self.stage.flush_bubbles();
            }
            BlockerControl::ViewLog => self.log.show(),
            BlockerControl::EndTour => self.end(),
            BlockerControl::HideMessage => self.blocker.hide_warning(),
        }
        Ok(())
    }

    fn flush_delay(&mut self) {
        if let Some((_, id)) = self.delays.pop_front()
            && self.timeline.cancel(id).is_some()
        {
            self.advance();
        }
    }

    /// Point at `target` from outside the script (a log link): pause,
    /// make sure the guide and blocker are up, move there and flash it.
    pub fn reveal(&mut self, target: &TargetDescriptor) {
        self.pause();
        if !self.stage.is_visible() {
            self.show();
        }
        if !self.blocker.is_attached() {
            self.blocker.create(self.page.as_mut());
        }
        let bounds = self
            .page
            .resolve(target)
            .and_then(|id| self.page.inspect(id))
            .map_or_else(|| self.page.document(), |info| resolver::reveal_bounds(&info));
        self.move_guide(bounds, false, AfterMove::Flash(bounds));
    }

    // -- prompt and builder --------------------------------------------------

    /// Pick item `index` of the prompt on screen.
    pub fn choose_prompt(&mut self, index: usize) -> TourResult<()> {
        let prompt = self.prompt.take().ok_or(TourError::NoPrompt)?;
        let Some(item) = prompt.get(index).cloned() else {
            let len = prompt.items.len();
            self.prompt = Some(prompt);
            return Err(TourError::PromptChoice { index, len });
        };
        tracing::debug!(label = %item.label, "prompt item chosen");
        match item.action {
            PromptAction::RunTour(name) => self.run_named(&name)?,
            PromptAction::End => self.hide_slow(),
            PromptAction::EndAndDisableAuto => {
                if let Err(e) = self.disable_auto() {
                    tracing::warn!(error = %e, "could not disable auto tour");
                }
                self.hide_slow();
            }
        }
        Ok(())
    }

    /// Fill the builder with every titled tour and show it.
    pub fn open_builder(&mut self) {
        let entries = self
            .book
            .menu()
            .into_iter()
            .map(|(name, title)| BuilderEntry { name, title })
            .collect();
        self.builder.set_body(entries);
        self.builder.show();
    }

    /// Close the builder and run the chosen tour.
    pub fn builder_choose(&mut self, name: &str) -> TourResult<()> {
        self.builder.hide();
        self.run_named(name)
    }
}

// ---------------------------------------------------------------------------
// Process-wide default
// ---------------------------------------------------------------------------

thread_local! {
    /// The runner used by hosts that don't thread one through.
    static DEFAULT_RUNNER: RefCell<Option<Runner>> = const { RefCell::new(None) };
}

/// Install the default runner for this thread, returning the previous one.
pub fn install_default(runner: Runner) -> Option<Runner> {
    DEFAULT_RUNNER.with(|slot| slot.borrow_mut().replace(runner))
}

/// Remove the default runner for this thread.
pub fn take_default() -> Option<Runner> {
    DEFAULT_RUNNER.with(|slot| slot.borrow_mut().take())
}

/// Run `f` on the default runner. Returns `None` if none is installed or
/// if called from inside another `with_default`.
pub fn with_default<R>(f: impl FnOnce(&mut Runner) -> R) -> Option<R> {
    DEFAULT_RUNNER.with(|slot| {
        let mut guard = slot.try_borrow_mut().ok()?;
        guard.as_mut().map(f)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessPage;
    use crate::page::TargetKind;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn page() -> HeadlessPage {
        HeadlessPage::new()
            .with_element(
                "#a",
                ElementInfo::new(TargetKind::TextField, Bounds::new(0.0, 100.0, 100.0, 20.0))
                    .with_label("Title:"),
            )
            .with_element(
                "#go",
                ElementInfo::new(TargetKind::Button, Bounds::new(200.0, 100.0, 60.0, 20.0))
                    .with_label("Go"),
            )
    }

    fn runner() -> Runner {
        Runner::new(page(), RunnerConfig::default())
    }

    fn started(events: &[RunnerEvent]) -> Vec<TaskKind> {
        events
            .iter()
            .filter_map(|e| match e {
                RunnerEvent::TaskStarted { task, .. } => Some(*task),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn empty_tour_completes_synchronously() {
        let mut r = runner();
        assert_eq!(r.state(), RunState::Idle);
        assert!(r.run(&Tour::new(), None).is_ok());
        assert_eq!(r.state(), RunState::Completed);
        assert_eq!(started(&r.drain_events()), vec![TaskKind::Cleanup]);
    }

    #[test]
    fn rejects_reentrant_runs() {
        let mut r = runner();
        let tour = Tour::new().step(Step::say("one two"));
        assert!(r.run(&tour, None).is_ok());
        assert!(matches!(r.run(&tour, None), Err(TourError::AlreadyRunning)));
        assert!(matches!(r.run_tour(&tour), Err(TourError::AlreadyRunning)));
        assert!(r.run_until_complete().is_ok());
        assert!(r.run(&tour, None).is_ok());
    }

    #[test]
    fn pause_defers_exactly_one_advance() {
        let mut r = runner();
        let tour = Tour::new()
            .step(Step::say("first"))
            .step(Step::say("second"));
        assert!(r.run(&tour, None).is_ok());
        r.drain_events();
        r.pause();
        assert_eq!(r.state(), RunState::Paused);
        r.tick(ms(10_000));
        let events = r.drain_events();
        assert!(started(&events).is_empty());
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, RunnerEvent::Deferred { .. }))
                .count(),
            1
        );
        r.resume();
        assert_eq!(started(&r.drain_events()), vec![TaskKind::Talk]);
        assert_eq!(r.state(), RunState::Running);
    }

    #[test]
    fn callable_can_hold_and_release() {
        let mut r = runner();
        let tour = Tour::new().step(Step::call(|scope| {
            let _token = scope.hold();
            scope.log_exempt(crate::log::LogEntry::Message("waiting".into()));
        }));
        assert!(r.run(&tour, None).is_ok());
        assert!(matches!(
            r.run_until_complete(),
            Err(TourError::Stalled { .. })
        ));
        assert_eq!(r.log().len(), 1);
        let Some(token) = r.held else {
            panic!("no continuation held");
        };
        assert!(r.resume_continuation(token));
        assert!(!r.resume_continuation(token));
        assert!(r.run_until_complete().is_ok());
        assert_eq!(r.state(), RunState::Completed);
    }

    #[test]
    fn stale_continuation_is_ignored_after_end() {
        let mut r = runner();
        let tour = Tour::new().step(Step::call(|scope| {
            scope.hold();
        }));
        assert!(r.run(&tour, None).is_ok());
        let Some(token) = r.held else {
            panic!("no continuation held");
        };
        r.end();
        assert!(!r.resume_continuation(token));
    }

    #[test]
    fn callable_enqueues_at_tail() {
        let mut r = runner();
        let tour = Tour::new()
            .step(Step::call(|scope| {
                scope.enqueue(Step::at("#go").value("<clickonly>"));
                scope.advance_now();
            }))
            .step(Step::at("#a").value("typed"));
        assert!(r.run(&tour, Some(SkipMode::Instant)).is_ok());
        assert!(r.run_until_complete().is_ok());
        let kinds = started(&r.drain_events());
        assert_eq!(
            kinds,
            vec![
                TaskKind::Call,
                TaskKind::Interact,
                TaskKind::Cleanup,
                TaskKind::Interact
            ]
        );
    }

    #[test]
    fn end_clears_everything() {
        let mut r = runner();
        let tour = Tour::new()
            .with_blocker()
            .step(Step::at("#a").value("x").message("typing now"))
            .step(Step::at("#go"));
        assert!(r.run(&tour, Some(SkipMode::FastForward)).is_ok());
        r.tick(ms(100));
        r.end();
        assert_eq!(r.state(), RunState::Completed);
        assert!(!r.stage().is_visible());
        assert!(!r.blocker().is_attached());
        assert_eq!(r.skip_mode(), SkipMode::Normal);
        assert_eq!(r.pending_wakes(), 0);
        assert_eq!(r.queued(), 0);
        r.drain_events();
        r.run_until_idle();
        assert!(started(&r.drain_events()).is_empty());
    }

    #[test]
    fn controls_need_blocker() {
        let mut r = runner();
        assert!(matches!(
            r.control(BlockerControl::Pause),
            Err(TourError::NoBlocker)
        ));
    }

    #[test]
    fn default_runner_slot() {
        assert!(with_default(|r| r.state()).is_none());
        assert!(install_default(runner()).is_none());
        assert_eq!(with_default(|r| r.state()), Some(RunState::Idle));
        let nested = with_default(|_| with_default(|r| r.state()));
        assert_eq!(nested, Some(None));
        assert!(take_default().is_some());
        assert!(take_default().is_none());
    }
}
