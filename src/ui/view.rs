//! View state mirrored from broadcast events
//!
//! The renderer never reaches into the state machines; it folds their
//! events into this mirror and draws from it.

use crate::chord::Overlay;
use crate::events::UiEvent;
use crate::script;

/// Render state of one scripted command line
#[derive(Debug, Clone, Default)]
pub struct LineView {
    /// Visible prefix of the command
    pub visible: String,
    /// The line finished typing
    pub done: bool,
    /// The canned output block below the line is visible
    pub output_shown: bool,
}

/// Everything the renderer needs, folded from `UiEvent`s
#[derive(Debug, Clone)]
pub struct ViewState {
    pub lines: Vec<LineView>,
    pub awaiting: bool,
    pub active_window: usize,
    pub help_visible: bool,
    pub status: Option<String>,
    pub overlay: Option<Overlay>,
    pub pane_shift: bool,
}

impl ViewState {
    pub fn new() -> Self {
        Self {
            lines: vec![LineView::default(); script::LINES.len()],
            awaiting: false,
            active_window: 0,
            help_visible: false,
            status: None,
            overlay: None,
            pane_shift: false,
        }
    }

    /// Fold one event into the mirror
    pub fn apply(&mut self, event: &UiEvent) {
        match event {
            UiEvent::CommandReveal { line, visible } => {
                if let Some(lv) = self.lines.get_mut(*line) {
                    lv.visible = visible.clone();
                }
            }
            UiEvent::CommandDone { line } => {
                if let Some(lv) = self.lines.get_mut(*line) {
                    lv.done = true;
                }
            }
            UiEvent::OutputRevealed { line } => {
                if let Some(lv) = self.lines.get_mut(*line) {
                    lv.output_shown = true;
                }
            }
            UiEvent::PrefixArmed => self.awaiting = true,
            UiEvent::PrefixReleased => self.awaiting = false,
            UiEvent::StatusShown { text } => self.status = Some(text.clone()),
            UiEvent::StatusCleared => self.status = None,
            UiEvent::OverlayShown { overlay } => self.overlay = Some(*overlay),
            UiEvent::OverlayCleared => self.overlay = None,
            UiEvent::HelpOpened => self.help_visible = true,
            UiEvent::HelpClosed => self.help_visible = false,
            UiEvent::WindowSelected { index } => self.active_window = *index,
            UiEvent::PaneShiftStarted => self.pane_shift = true,
            UiEvent::PaneShiftEnded => self.pane_shift = false,
        }
    }

    /// Whether the block cursor should be drawn on `line`
    pub fn cursor_on(&self, line: usize) -> bool {
        let Some(lv) = self.lines.get(line) else {
            return false;
        };
        if !lv.done {
            // only the line currently typing carries the cursor
            return !lv.visible.is_empty() || self.typing_line() == Some(line);
        }
        script::LINES
            .get(line)
            .is_some_and(|l| l.cursor_after_done && self.is_last_started(line))
    }

    /// Index of the line currently typing, if any
    fn typing_line(&self) -> Option<usize> {
        self.lines.iter().position(|l| !l.done)
    }

    /// True when no later line has started typing
    fn is_last_started(&self, line: usize) -> bool {
        self.lines
            .iter()
            .skip(line + 1)
            .all(|l| l.visible.is_empty() && !l.done)
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new()
    }
}
