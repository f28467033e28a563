#![forbid(unsafe_code)]

//! Tour log: an ordered record of narration and actions.
//!
//! Entries are structured ([`Fragment`]s) so a host can style keywords and
//! turn element references into links that point the guide back at the
//! element (see `Runner::reveal`). [`TourLog::lines`] renders plain text for
//! terminals and tests.
//!
//! The log lives inside a [`LabeledDialog`], the same small show/hide/clear
//! container the tour builder uses.

use std::fmt;

use guidepost_core::skip::{SkipMode, SkipRegister};

use crate::page::{ElementInfo, Mutation, TargetDescriptor, TargetKind};

/// Keyword that opens every action sentence.
pub const ACTION_KEYWORD: &str = "<ACTION>";

// ---------------------------------------------------------------------------
// Labeled dialog
// ---------------------------------------------------------------------------

/// A titled, hideable list: the host-side modal used by the log viewer and
/// the tour builder.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledDialog<T> {
    title: String,
    body: Vec<T>,
    visible: bool,
}

impl<T> LabeledDialog<T> {
    /// An empty, hidden dialog.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: Vec::new(),
            visible: false,
        }
    }

    /// Dialog title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Body items in insertion order.
    pub fn body(&self) -> &[T] {
        &self.body
    }

    /// Append an item.
    pub fn push(&mut self, item: T) {
        self.body.push(item);
    }

    /// Replace the body.
    pub fn set_body(&mut self, body: Vec<T>) {
        self.body = body;
    }

    /// Remove every item.
    pub fn clear(&mut self) {
        self.body.clear();
    }

    /// Show the dialog.
    pub fn show(&mut self) {
        self.visible = true;
    }

    /// Hide the dialog.
    pub fn hide(&mut self) {
        self.visible = false;
    }

    /// Whether the dialog is showing.
    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

/// A piece of a log sentence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// Plain connecting text.
    Text(String),
    /// Emphasised word (kind keyword, value).
    Keyword(String),
    /// Element reference the host can render as a link.
    Link {
        /// Shown text.
        label: String,
        /// Element to point at when followed.
        target: TargetDescriptor,
    },
}

impl Fragment {
    fn text(s: &str) -> Self {
        Self::Text(s.to_string())
    }

    fn keyword(s: impl Into<String>) -> Self {
        Self::Keyword(s.into())
    }

    fn link(label: impl Into<String>, target: &TargetDescriptor) -> Self {
        Self::Link {
            label: label.into(),
            target: target.clone(),
        }
    }

    /// Visible text of the fragment.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text(s) | Self::Keyword(s) => s,
            Self::Link { label, .. } => label,
        }
    }
}

/// One log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEntry {
    /// Narration shown to the user.
    Message(String),
    /// Described action.
    Action(Vec<Fragment>),
}

impl LogEntry {
    /// Every link in the entry.
    pub fn links(&self) -> impl Iterator<Item = (&str, &TargetDescriptor)> {
        let fragments: &[Fragment] = match self {
            Self::Message(_) => &[],
            Self::Action(f) => f,
        };
        fragments.iter().filter_map(|f| match f {
            Fragment::Link { label, target } => Some((label.as_str(), target)),
            _ => None,
        })
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Message(text) => f.write_str(text),
            Self::Action(fragments) => {
                for fragment in fragments {
                    f.write_str(fragment.as_str())?;
                }
                Ok(())
            }
        }
    }
}

/// Sentence describing `mutation` applied to the element at `target`.
///
/// Returns `None` for unrecognized kinds: those are clicked silently.
pub fn describe(
    info: &ElementInfo,
    target: &TargetDescriptor,
    mutation: &Mutation,
) -> Option<Vec<Fragment>> {
    if info.kind == TargetKind::Unrecognized {
        return None;
    }
    let label = info.display_label();
    let keyword = info.kind.keyword();
    let link = Fragment::link(label.clone(), target);

    let mut out = vec![Fragment::keyword(ACTION_KEYWORD)];
    match (info.kind, mutation) {
        (TargetKind::Tab, Mutation::Click) => {
            out.extend([
                Fragment::text(" change "),
                Fragment::keyword(keyword),
                Fragment::text(" to "),
                Fragment::link(label, target),
            ]);
        }
        (_, Mutation::Click) => {
            out.extend([
                Fragment::text(" click "),
                Fragment::keyword(keyword),
                Fragment::text(" - "),
                link,
            ]);
        }
        (_, Mutation::AddItem(value)) => {
            out.extend([
                Fragment::text(" add "),
                Fragment::keyword(value.clone()),
                Fragment::text(" to "),
                Fragment::keyword(keyword),
                Fragment::text(" Input "),
                link,
            ]);
        }
        (_, Mutation::Select(value) | Mutation::Choose(value)) => {
            let shown = info
                .choice(value)
                .map_or_else(|| value.clone(), |c| c.label.clone());
            out.extend([
                Fragment::text(" change "),
                Fragment::keyword(keyword),
                Fragment::text(" Input "),
                link,
                Fragment::text(" to "),
                Fragment::keyword(shown),
            ]);
        }
        (_, Mutation::SetChecked(checked)) => {
            let verb = if *checked { " check " } else { " uncheck " };
            out.extend([
                Fragment::text(verb),
                Fragment::keyword(keyword),
                Fragment::text(" Input "),
                link,
            ]);
        }
        (_, Mutation::SetText(value)) => {
            out.extend([
                Fragment::text(" change "),
                Fragment::keyword(keyword),
                Fragment::text(" Input "),
                link,
                Fragment::text(" to "),
                Fragment::keyword(value.clone()),
            ]);
        }
    }
    Some(out)
}

// ---------------------------------------------------------------------------
// Recorder
// ---------------------------------------------------------------------------

/// Ordered tour log, held in its viewer dialog.
#[derive(Debug, Clone, PartialEq)]
pub struct TourLog {
    dialog: LabeledDialog<LogEntry>,
}

impl TourLog {
    /// An empty log whose viewer carries `title`.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            dialog: LabeledDialog::new(title),
        }
    }

    /// Forget every entry.
    pub fn clear(&mut self) {
        self.dialog.clear();
    }

    /// Record narration. Suppressed in instant mode.
    pub fn message(&mut self, text: &str, skip: &SkipRegister) {
        if text.is_empty() {
            return;
        }
        self.record(LogEntry::Message(text.to_string()), skip);
    }

    /// Record an action. Suppressed in instant mode and for unrecognized
    /// kinds.
    pub fn action(
        &mut self,
        info: &ElementInfo,
        target: &TargetDescriptor,
        mutation: &Mutation,
        skip: &SkipRegister,
    ) {
        if let Some(fragments) = describe(info, target, mutation) {
            self.record(LogEntry::Action(fragments), skip);
        }
    }

    /// Record an entry regardless of the playback mode.
    pub fn push_exempt(&mut self, entry: LogEntry) {
        self.dialog.push(entry);
    }

    fn record(&mut self, entry: LogEntry, skip: &SkipRegister) {
        if skip.current() == SkipMode::Instant {
            tracing::trace!(%entry, "log write suppressed");
            return;
        }
        self.dialog.push(entry);
    }

    /// Entries in order.
    pub fn entries(&self) -> &[LogEntry] {
        self.dialog.body()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.dialog.body().len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.dialog.body().is_empty()
    }

    /// Entries rendered as plain text.
    pub fn lines(&self) -> Vec<String> {
        self.entries().iter().map(ToString::to_string).collect()
    }

    /// The viewer.
    pub fn dialog(&self) -> &LabeledDialog<LogEntry> {
        &self.dialog
    }

    /// Show the viewer.
    pub fn show(&mut self) {
        self.dialog.show();
    }

    /// Hide the viewer.
    pub fn hide(&mut self) {
        self.dialog.hide();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::ChoiceInfo;
    use guidepost_core::geometry::Bounds;

    fn info(kind: TargetKind) -> ElementInfo {
        ElementInfo::new(kind, Bounds::from_size(10.0, 10.0))
    }

    fn line(info: &ElementInfo, m: Mutation) -> Option<String> {
        describe(info, &"#t".into(), &m)
            .map(|f| LogEntry::Action(f).to_string())
    }

    #[test]
    fn sentences_per_kind() {
        let text = info(TargetKind::TextField).with_label("Title:");
        assert_eq!(
            line(&text, Mutation::SetText("Hi".into())).as_deref(),
            Some("<ACTION> change TEXT Input Title to Hi")
        );

        let select = info(TargetKind::SelectList)
            .with_id("ds")
            .with_choice(ChoiceInfo::new("gdp", "Gross product"));
        assert_eq!(
            line(&select, Mutation::Select("gdp".into())).as_deref(),
            Some("<ACTION> change SELECT Input #ds to Gross product")
        );

        let search = info(TargetKind::SearchSelect).with_name("countries");
        assert_eq!(
            line(&search, Mutation::AddItem("NZ".into())).as_deref(),
            Some("<ACTION> add NZ to SELECT Input countries")
        );

        let button = info(TargetKind::Button).with_label("Go");
        assert_eq!(
            line(&button, Mutation::Click).as_deref(),
            Some("<ACTION> click BUTTON - Go")
        );

        let tab = info(TargetKind::Tab).with_label("Trade");
        assert_eq!(
            line(&tab, Mutation::Click).as_deref(),
            Some("<ACTION> change TAB to Trade")
        );

        let toggle = info(TargetKind::Toggle).with_label("Seasonal");
        assert_eq!(
            line(&toggle, Mutation::SetChecked(false)).as_deref(),
            Some("<ACTION> uncheck CHECKBOX Input Seasonal")
        );

        assert_eq!(line(&info(TargetKind::Unrecognized), Mutation::Click), None);
    }

    #[test]
    fn instant_suppresses_unless_exempt() {
        let mut log = TourLog::new("Tour Log");
        let instant = SkipRegister::new(SkipMode::Instant);
        log.message("hello", &instant);
        log.action(
            &info(TargetKind::Button),
            &"#b".into(),
            &Mutation::Click,
            &instant,
        );
        assert!(log.is_empty());
        log.push_exempt(LogEntry::Message("kept".into()));
        assert_eq!(log.lines(), vec!["kept".to_string()]);
    }

    #[test]
    fn empty_messages_are_not_logged() {
        let mut log = TourLog::new("Tour Log");
        log.message("", &SkipRegister::default());
        assert!(log.is_empty());
    }

    #[test]
    fn links_point_at_target() {
        let entry = LogEntry::Action(
            describe(&info(TargetKind::Button).with_label("Go"), &"#go".into(), &Mutation::Click)
                .unwrap_or_default(),
        );
        let links: Vec<_> = entry.links().collect();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].0, "Go");
        assert_eq!(links[0].1.as_str(), "#go");
    }

    #[test]
    fn dialog_visibility() {
        let mut d: LabeledDialog<u8> = LabeledDialog::new("T");
        assert!(!d.is_visible());
        d.push(1);
        d.show();
        assert!(d.is_visible());
        d.clear();
        assert!(d.body().is_empty());
        assert_eq!(d.title(), "T");
    }
}
