//! Events emitted by the typing script and the chord interpreter
//!
//! Both state machines broadcast `UiEvent`s; the renderer mirrors them
//! into its view state and redraws.

use serde::{Deserialize, Serialize};

use crate::chord::Overlay;

/// Events consumed by the rendering surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UiEvent {
    /// One more character of a scripted command line is visible
    CommandReveal {
        /// Index of the line in the session script
        line: usize,
        /// Currently visible prefix of the command
        visible: String,
    },

    /// A scripted command line finished typing
    CommandDone { line: usize },

    /// The canned output block under a command line became visible
    OutputRevealed { line: usize },

    /// Prefix chord armed (ctrl+b)
    PrefixArmed,

    /// Prefix chord released (command dispatched or deadline elapsed)
    PrefixReleased,

    /// Transient status message replaced the current one
    StatusShown { text: String },

    /// Status message auto-cleared
    StatusCleared,

    /// Split overlay became visible
    OverlayShown { overlay: Overlay },

    /// Split overlay auto-cleared
    OverlayCleared,

    /// Help panel opened
    HelpOpened,

    /// Help panel closed (toggle or Escape)
    HelpClosed,

    /// Active window changed
    WindowSelected { index: usize },

    /// New-window pane shift started
    PaneShiftStarted,

    /// New-window pane shift ended
    PaneShiftEnded,
}

impl std::fmt::Display for UiEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UiEvent::CommandReveal { line, visible } => {
                write!(f, "COMMAND_REVEAL line={} len={}", line, visible.len())
            }
            UiEvent::CommandDone { line } => write!(f, "COMMAND_DONE line={}", line),
            UiEvent::OutputRevealed { line } => write!(f, "OUTPUT_REVEALED line={}", line),
            UiEvent::PrefixArmed => write!(f, "PREFIX_ARMED"),
            UiEvent::PrefixReleased => write!(f, "PREFIX_RELEASED"),
            UiEvent::StatusShown { text } => write!(f, "STATUS_SHOWN ({})", text),
            UiEvent::StatusCleared => write!(f, "STATUS_CLEARED"),
            UiEvent::OverlayShown { overlay } => write!(f, "OVERLAY_SHOWN ({:?})", overlay),
            UiEvent::OverlayCleared => write!(f, "OVERLAY_CLEARED"),
            UiEvent::HelpOpened => write!(f, "HELP_OPENED"),
            UiEvent::HelpClosed => write!(f, "HELP_CLOSED"),
            UiEvent::WindowSelected { index } => write!(f, "WINDOW_SELECTED ({})", index),
            UiEvent::PaneShiftStarted => write!(f, "PANE_SHIFT_STARTED"),
            UiEvent::PaneShiftEnded => write!(f, "PANE_SHIFT_ENDED"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = UiEvent::StatusShown {
            text: "next-window".to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("status_shown"));
        assert!(json.contains("next-window"));
    }

    #[test]
    fn test_event_deserialization() {
        let json = r#"{"type":"window_selected","index":2}"#;
        let event: UiEvent = serde_json::from_str(json).unwrap();
        assert!(matches!(event, UiEvent::WindowSelected { index: 2 }));
    }
}
