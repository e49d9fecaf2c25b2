//! Session lifecycle: select → convert → result → reset, forever.
//!
//! ## State machine
//!
//! ```text
//!            select                 begin_convert              finish
//!   Empty ───────────▶ Selected ─────────────────▶ Converting ─────────▶ Result
//!     ▲                 │   ▲ select (replace)                             │
//!     │     reset       │   └──────────────────────────────────────────────┤
//!     └─────────────────┴──────────────────────────────────────────────────┘
//!                                   reset
//! ```
//!
//! [`SessionState::apply`] is the pure transition function; it knows nothing
//! about networks or terminals. [`SessionController`] owns one state value
//! plus a [`Converter`] and performs the single suspension point of the
//! lifecycle: awaiting the conversion.
//!
//! The `Converting` phase is the only mutual exclusion. While in it, a
//! second `BeginConvert` is ignored, selections are ignored and resets are
//! ignored; the only way out is the outcome of the attempt in flight.

use crate::client::{ConversionOutcome, Converter};
use crate::error::File2JsonError;
use crate::export;
use crate::progress::ObserverHandle;
use crate::selection::{select_from_drop, select_from_picker, DragEvent, PickerInput, SelectedFile};
use crate::summary::Summary;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Discrete stage of the session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// No file selected.
    #[default]
    Empty,
    /// A file is selected and no result exists for it.
    Selected,
    /// The single conversion request is in flight.
    Converting,
    /// An outcome (success or failure) is available.
    Result,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Empty => "empty",
            Phase::Selected => "selected",
            Phase::Converting => "converting",
            Phase::Result => "result",
        };
        f.write_str(s)
    }
}

/// Inputs to the state machine.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// A file was chosen directly.
    Select(SelectedFile),
    /// The picker reported a change.
    Picker(PickerInput),
    /// A drag gesture over the drop zone.
    Drag(DragEvent),
    /// The user asked for a conversion.
    BeginConvert,
    /// The attempt in flight produced its outcome.
    Finish(ConversionOutcome),
    /// Discard the file and any result.
    Reset,
}

/// The single coordinating record of a session.
///
/// Fields are only changed through [`SessionState::apply`], which keeps
/// these invariants:
/// - `Converting` implies no outcome,
/// - `Result` implies an outcome,
/// - no selected file implies `Empty`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    selected_file: Option<SelectedFile>,
    phase: Phase,
    outcome: Option<ConversionOutcome>,
    is_drag_active: bool,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_file(&self) -> Option<&SelectedFile> {
        self.selected_file.as_ref()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn outcome(&self) -> Option<&ConversionOutcome> {
        self.outcome.as_ref()
    }

    pub fn is_drag_active(&self) -> bool {
        self.is_drag_active
    }

    /// Whether the documented invariants hold.
    pub fn holds_invariants(&self) -> bool {
        let converting_ok = self.phase != Phase::Converting || self.outcome.is_none();
        let result_ok = self.phase != Phase::Result || self.outcome.is_some();
        let empty_ok = self.selected_file.is_some() || self.phase == Phase::Empty;
        let outcome_ok = self.outcome.is_none() || self.phase == Phase::Result;
        converting_ok && result_ok && empty_ok && outcome_ok
    }

    /// Pure transition: `(state, event) -> state'`.
    ///
    /// Events that are not valid in the current phase leave the state as it
    /// was.
    pub fn apply(mut self, event: SessionEvent) -> Self {
        match event {
            SessionEvent::Select(file) => self.select(file),
            SessionEvent::Picker(input) => match select_from_picker(input) {
                Some(file) => self.select(file),
                None => self,
            },
            SessionEvent::Drag(drag) => match drag {
                DragEvent::Over => {
                    self.is_drag_active = true;
                    self
                }
                DragEvent::Leave => {
                    self.is_drag_active = false;
                    self
                }
                DragEvent::Drop { .. } => {
                    self.is_drag_active = false;
                    match select_from_drop(&drag) {
                        Some(file) => self.select(file),
                        None => self,
                    }
                }
            },
            SessionEvent::BeginConvert => match self.phase {
                Phase::Selected if self.selected_file.is_some() => {
                    self.phase = Phase::Converting;
                    self
                }
                _ => self,
            },
            SessionEvent::Finish(outcome) => {
                if self.phase == Phase::Converting {
                    self.outcome = Some(outcome);
                    self.phase = Phase::Result;
                }
                self
            }
            SessionEvent::Reset => {
                if self.phase != Phase::Converting {
                    self.selected_file = None;
                    self.outcome = None;
                    self.phase = Phase::Empty;
                }
                self
            }
        }
    }

    fn select(mut self, file: SelectedFile) -> Self {
        if self.phase == Phase::Converting {
            debug!("Ignoring selection of '{}' while converting", file.name());
            return self;
        }
        self.outcome = None;
        self.selected_file = Some(file);
        self.phase = Phase::Selected;
        self
    }
}

/// Top-level holder of one session and its converter.
pub struct SessionController<C: Converter> {
    state: SessionState,
    converter: C,
    observers: Vec<ObserverHandle>,
}

impl<C: Converter> SessionController<C> {
    pub fn new(converter: C) -> Self {
        Self {
            state: SessionState::new(),
            converter,
            observers: Vec::new(),
        }
    }

    /// Attach an observer notified on every phase change.
    pub fn with_observer(mut self, observer: ObserverHandle) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn converter(&self) -> &C {
        &self.converter
    }

    /// Feed one event through the state machine.
    pub fn dispatch(&mut self, event: SessionEvent) {
        let from = self.state.phase;
        self.state = std::mem::take(&mut self.state).apply(event);
        debug_assert!(self.state.holds_invariants(), "{:?}", self.state);

        let to = self.state.phase;
        if from != to {
            debug!("Session phase {} → {}", from, to);
            for obs in &self.observers {
                obs.on_phase_change(from, to);
            }
        }
    }

    /// Select `file`, discarding any previous result.
    pub fn select(&mut self, file: SelectedFile) {
        self.dispatch(SessionEvent::Select(file));
    }

    /// Handle a picker change. Returns whether a file was taken.
    pub fn handle_picker(&mut self, input: PickerInput) -> bool {
        if self.state.phase == Phase::Converting {
            return false;
        }
        match select_from_picker(input) {
            Some(file) => {
                self.select(file);
                true
            }
            None => false,
        }
    }

    /// Handle a drag gesture. Returns whether default handling must be
    /// suppressed by the caller.
    pub fn handle_drag(&mut self, event: DragEvent) -> bool {
        let suppress = event.suppresses_default();
        self.dispatch(SessionEvent::Drag(event));
        suppress
    }

    /// Enter `Converting` and hand back the file to upload.
    ///
    /// Returns `None` (and changes nothing) when no file is selected or a
    /// conversion is already in flight. A caller that holds the session
    /// behind a lock can release it between this and
    /// [`finish_convert`](Self::finish_convert).
    pub fn begin_convert(&mut self) -> Option<SelectedFile> {
        if self.state.phase == Phase::Converting {
            debug!("Conversion already in flight; ignoring request");
            return None;
        }
        self.dispatch(SessionEvent::BeginConvert);
        if self.state.phase == Phase::Converting {
            self.state.selected_file.clone()
        } else {
            None
        }
    }

    /// Record the outcome of the attempt in flight.
    pub fn finish_convert(&mut self, outcome: ConversionOutcome) {
        self.dispatch(SessionEvent::Finish(outcome));
    }

    /// Run one conversion of the selected file.
    ///
    /// Returns `false` without issuing a request when there is nothing to
    /// convert or a conversion is already in flight.
    pub async fn convert(&mut self) -> bool {
        let Some(file) = self.begin_convert() else {
            return false;
        };
        for obs in &self.observers {
            obs.on_conversion_start(&file);
        }

        let outcome = self.converter.convert(&file).await;

        for obs in &self.observers {
            obs.on_conversion_complete(&file, &outcome);
        }
        self.finish_convert(outcome);
        true
    }

    /// Clear the file and result. No-op while converting.
    pub fn reset(&mut self) {
        self.dispatch(SessionEvent::Reset);
    }

    /// Summary of the current successful payload, if any.
    pub fn summary(&self) -> Option<Summary> {
        self.success_payload().map(Summary::of)
    }

    /// Save the current successful payload next to `dir`.
    pub fn export_artifact(&self, dir: impl AsRef<Path>) -> Result<PathBuf, File2JsonError> {
        let file = self
            .state
            .selected_file
            .as_ref()
            .ok_or(File2JsonError::NothingToExport)?;
        let payload = self
            .success_payload()
            .filter(|p| !p.is_null())
            .ok_or(File2JsonError::NothingToExport)?;
        export::export_as_download(file.name(), payload, dir)
    }

    fn success_payload(&self) -> Option<&serde_json::Value> {
        match self.state.phase {
            Phase::Result => self.state.outcome.as_ref().and_then(ConversionOutcome::payload),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn file(name: &str) -> SelectedFile {
        SelectedFile::from_bytes(name, b"data".to_vec())
    }

    fn success() -> ConversionOutcome {
        ConversionOutcome::Success {
            message: "ok".into(),
            payload: json!({"totalPages": 2}),
        }
    }

    fn run(events: Vec<SessionEvent>) -> SessionState {
        events.into_iter().fold(SessionState::new(), |s, e| {
            let next = s.apply(e);
            assert!(next.holds_invariants(), "{next:?}");
            next
        })
    }

    #[test]
    fn starts_empty() {
        let s = SessionState::new();
        assert_eq!(s.phase(), Phase::Empty);
        assert!(s.selected_file().is_none());
        assert!(s.outcome().is_none());
        assert!(!s.is_drag_active());
    }

    #[test]
    fn select_then_convert_then_finish() {
        let s = run(vec![
            SessionEvent::Select(file("a.pdf")),
            SessionEvent::BeginConvert,
        ]);
        assert_eq!(s.phase(), Phase::Converting);
        assert!(s.outcome().is_none());

        let s = s.apply(SessionEvent::Finish(success()));
        assert_eq!(s.phase(), Phase::Result);
        assert!(s.outcome().unwrap().is_success());
        assert_eq!(s.selected_file().unwrap().name(), "a.pdf");
    }

    #[test]
    fn begin_convert_without_file_is_noop() {
        let s = run(vec![SessionEvent::BeginConvert]);
        assert_eq!(s, SessionState::new());
    }

    #[test]
    fn begin_convert_twice_stays_converting() {
        let once = run(vec![
            SessionEvent::Select(file("a.pdf")),
            SessionEvent::BeginConvert,
        ]);
        let twice = once.clone().apply(SessionEvent::BeginConvert);
        assert_eq!(once, twice);
    }

    #[test]
    fn new_selection_clears_previous_result() {
        let s = run(vec![
            SessionEvent::Select(file("a.pdf")),
            SessionEvent::BeginConvert,
            SessionEvent::Finish(success()),
            SessionEvent::Select(file("b.xlsx")),
        ]);
        assert_eq!(s.phase(), Phase::Selected);
        assert!(s.outcome().is_none());
        assert_eq!(s.selected_file().unwrap().name(), "b.xlsx");
    }

    #[test]
    fn selection_is_ignored_while_converting() {
        let s = run(vec![
            SessionEvent::Select(file("a.pdf")),
            SessionEvent::BeginConvert,
            SessionEvent::Select(file("b.pdf")),
            SessionEvent::Reset,
        ]);
        assert_eq!(s.phase(), Phase::Converting);
        assert_eq!(s.selected_file().unwrap().name(), "a.pdf");
    }

    #[test]
    fn stale_finish_is_ignored() {
        let s = run(vec![
            SessionEvent::Select(file("a.pdf")),
            SessionEvent::Finish(success()),
        ]);
        assert_eq!(s.phase(), Phase::Selected);
        assert!(s.outcome().is_none());
    }

    #[test]
    fn reset_clears_everything_and_is_idempotent() {
        let s = run(vec![
            SessionEvent::Select(file("a.pdf")),
            SessionEvent::BeginConvert,
            SessionEvent::Finish(success()),
            SessionEvent::Reset,
        ]);
        assert_eq!(s, SessionState::new());
        assert_eq!(s.clone().apply(SessionEvent::Reset), s);
    }

    #[test]
    fn reset_from_selected_removes_file() {
        let s = run(vec![SessionEvent::Select(file("a.pdf")), SessionEvent::Reset]);
        assert_eq!(s.phase(), Phase::Empty);
    }

    #[test]
    fn result_must_pass_through_selected_before_converting() {
        let failed = run(vec![
            SessionEvent::Select(file("a.pdf")),
            SessionEvent::BeginConvert,
            SessionEvent::Finish(ConversionOutcome::Failure {
                message: "down".into(),
                error_detail: None,
            }),
        ]);
        let s = failed.clone().apply(SessionEvent::BeginConvert);
        assert_eq!(s, failed);

        let s = s
            .apply(SessionEvent::Select(file("a.pdf")))
            .apply(SessionEvent::BeginConvert);
        assert_eq!(s.phase(), Phase::Converting);
        assert!(s.outcome().is_none());
    }

    #[test]
    fn drag_flags_and_drop_selection() {
        let s = run(vec![SessionEvent::Drag(DragEvent::Over)]);
        assert!(s.is_drag_active());
        let s = s.apply(SessionEvent::Drag(DragEvent::Leave));
        assert!(!s.is_drag_active());

        let s = run(vec![
            SessionEvent::Drag(DragEvent::Over),
            SessionEvent::Drag(DragEvent::Drop {
                files: vec![file("x.log"), file("y.log")],
            }),
        ]);
        assert!(!s.is_drag_active());
        assert_eq!(s.phase(), Phase::Selected);
        assert_eq!(s.selected_file().unwrap().name(), "x.log");
    }

    #[test]
    fn empty_drop_keeps_state() {
        let s = run(vec![
            SessionEvent::Select(file("a.pdf")),
            SessionEvent::Drag(DragEvent::Over),
            SessionEvent::Drag(DragEvent::Drop { files: vec![] }),
        ]);
        assert_eq!(s.selected_file().unwrap().name(), "a.pdf");
        assert!(!s.is_drag_active());
    }

    #[test]
    fn picker_with_no_files_is_ignored() {
        let s = run(vec![SessionEvent::Picker(PickerInput::default())]);
        assert_eq!(s.phase(), Phase::Empty);
    }

    #[test]
    fn phase_display() {
        assert_eq!(Phase::Converting.to_string(), "converting");
    }
}
