//! Two-stage chord state machine
//!
//! Idle until ctrl+b arms the prefix; the next key is dispatched and
//! the machine returns to Idle. An armed prefix expires silently after
//! the configured timeout. Entry points take `now` explicitly so tests
//! never sleep; the async driver owns the real timers.

use tokio::sync::{broadcast, mpsc};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info};

use serde::{Deserialize, Serialize};

use crate::chord::keys::{Key, KeyPress};
use crate::config::ChordConfig;
use crate::events::UiEvent;
use crate::input::InputEvent;

/// Status text shown when `?` toggles the help panel
const HELP_STATUS: &str = "display panes: ?  split: % or \"  new: c";

/// Split overlay kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Overlay {
    /// A vertical divider down the middle (`%`)
    VerticalSplit,
    /// A horizontal divider across the middle (`"`)
    HorizontalSplit,
}

/// What the interpreter did with a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// The key was part of the chord protocol or closed the help panel
    Consumed,
    /// The key meant nothing here; default handling applies
    Ignored,
    /// The key asked the application to exit
    Quit,
}

/// The chord interpreter and the status-bar state it drives
pub struct ChordInterpreter {
    /// True between prefix activation and dispatch or timeout
    awaiting: bool,
    prefix_deadline: Option<Instant>,
    /// Always a valid index into `windows`
    active_window: usize,
    windows: Vec<String>,
    help_visible: bool,
    status: Option<String>,
    status_deadline: Option<Instant>,
    overlay: Option<Overlay>,
    overlay_deadline: Option<Instant>,
    pane_shift: bool,
    shift_deadline: Option<Instant>,
    config: ChordConfig,
    /// Channel for emitting UI events
    event_tx: broadcast::Sender<UiEvent>,
}

impl ChordInterpreter {
    /// Create a new interpreter over the given window list
    pub fn new(
        config: ChordConfig,
        windows: Vec<String>,
        event_tx: broadcast::Sender<UiEvent>,
    ) -> Self {
        debug_assert!(!windows.is_empty(), "window list must not be empty");
        Self {
            awaiting: false,
            prefix_deadline: None,
            active_window: 0,
            windows,
            help_visible: false,
            status: None,
            status_deadline: None,
            overlay: None,
            overlay_deadline: None,
            pane_shift: false,
            shift_deadline: None,
            config,
            event_tx,
        }
    }

    pub fn awaiting(&self) -> bool {
        self.awaiting
    }

    pub fn active_window(&self) -> usize {
        self.active_window
    }

    pub fn help_visible(&self) -> bool {
        self.help_visible
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn overlay(&self) -> Option<Overlay> {
        self.overlay
    }

    /// Handle a key-down event observed at `now`
    ///
    /// Expired deadlines are settled first, so a key that races the
    /// driver's timer is never interpreted against a stale prefix.
    pub fn handle_key(&mut self, key: KeyPress, now: Instant) -> KeyOutcome {
        self.tick(now);

        // A plain Escape closes the help panel regardless of chord state
        if self.help_visible && key.code == Key::Escape && key.mods.is_empty() {
            self.set_help(false);
            return KeyOutcome::Consumed;
        }

        if !self.awaiting {
            if key.is_prefix() {
                self.arm_prefix(now);
                return KeyOutcome::Consumed;
            }
            if key.code == Key::Char('q') && key.mods.is_empty() && !self.help_visible {
                return KeyOutcome::Quit;
            }
            // Not ours; leave default handling to the terminal
            return KeyOutcome::Ignored;
        }

        // Bare modifier presses keep the chord armed
        if key.is_pure_modifier() {
            return KeyOutcome::Consumed;
        }

        self.release_prefix();
        self.dispatch(key, now);
        KeyOutcome::Consumed
    }

    /// Clear transient state whose deadline has elapsed
    pub fn tick(&mut self, now: Instant) {
        if self.awaiting && self.prefix_deadline.is_some_and(|d| now >= d) {
            debug!("prefix expired");
            self.release_prefix();
        }
        if self.status.is_some() && self.status_deadline.is_some_and(|d| now >= d) {
            self.status = None;
            self.status_deadline = None;
            let _ = self.event_tx.send(UiEvent::StatusCleared);
        }
        if self.overlay.is_some() && self.overlay_deadline.is_some_and(|d| now >= d) {
            self.overlay = None;
            self.overlay_deadline = None;
            let _ = self.event_tx.send(UiEvent::OverlayCleared);
        }
        if self.pane_shift && self.shift_deadline.is_some_and(|d| now >= d) {
            self.pane_shift = false;
            self.shift_deadline = None;
            let _ = self.event_tx.send(UiEvent::PaneShiftEnded);
        }
    }

    /// Earliest pending transient deadline, if any
    pub fn next_deadline(&self) -> Option<Instant> {
        [
            self.prefix_deadline,
            self.status_deadline,
            self.overlay_deadline,
            self.shift_deadline,
        ]
        .into_iter()
        .flatten()
        .min()
    }

    /// Run the interpreter over the input channel until quit
    pub async fn run(&mut self, mut input_rx: mpsc::Receiver<InputEvent>) {
        info!(windows = self.windows.len(), "chord interpreter started");

        loop {
            let deadline = self.next_deadline();
            tokio::select! {
                maybe = input_rx.recv() => {
                    match maybe {
                        Some(InputEvent::Key(key)) => {
                            if self.handle_key(key, Instant::now()) == KeyOutcome::Quit {
                                break;
                            }
                        }
                        Some(InputEvent::Quit) | None => break,
                    }
                }
                _ = async {
                    match deadline {
                        Some(d) => sleep_until(d).await,
                        None => std::future::pending().await,
                    }
                } => {
                    self.tick(Instant::now());
                }
            }
        }

        info!("chord interpreter stopped");
    }

    /// Interpret the command key that followed the prefix
    fn dispatch(&mut self, key: KeyPress, now: Instant) {
        match key.code {
            Key::Char('?') => {
                self.set_help(!self.help_visible);
                self.show_status(HELP_STATUS, now);
            }
            Key::Char('%') => {
                self.show_overlay(Overlay::VerticalSplit, now);
                self.show_status("split-window -h", now);
            }
            Key::Char('"') => {
                self.show_overlay(Overlay::HorizontalSplit, now);
                self.show_status("split-window -v", now);
            }
            Key::Char(c) if c.eq_ignore_ascii_case(&'c') => {
                self.show_status("new-window", now);
                self.start_pane_shift(now);
            }
            Key::Char(c) if c.eq_ignore_ascii_case(&'n') => {
                let next = (self.active_window + 1) % self.windows.len();
                self.select_window(next);
                self.show_status("next-window", now);
            }
            Key::Char(c) if c.eq_ignore_ascii_case(&'p') => {
                let prev =
                    (self.active_window + self.windows.len() - 1) % self.windows.len();
                self.select_window(prev);
                self.show_status("previous-window", now);
            }
            Key::Char(c) if c.is_ascii_digit() => {
                let index = c.to_digit(10).unwrap() as usize;
                if index < self.windows.len() {
                    self.select_window(index);
                    self.show_status(&format!("select-window -t {}", index), now);
                } else {
                    self.show_status(&format!("window {} not found", index), now);
                }
            }
            Key::Char(c) if c.eq_ignore_ascii_case(&'d') => {
                self.show_status("detached (simulated)", now);
            }
            _ => {
                self.show_status(&format!("unbound key: {}", key.label()), now);
            }
        }
    }

    fn arm_prefix(&mut self, now: Instant) {
        debug!("prefix armed");
        self.awaiting = true;
        self.prefix_deadline = Some(now + self.config.prefix_timeout);
        let _ = self.event_tx.send(UiEvent::PrefixArmed);
    }

    fn release_prefix(&mut self) {
        self.awaiting = false;
        self.prefix_deadline = None;
        let _ = self.event_tx.send(UiEvent::PrefixReleased);
    }

    /// Show a status message, replacing any current one and restarting
    /// the clear timer
    fn show_status(&mut self, text: &str, now: Instant) {
        debug!(status = text, "status message");
        self.status = Some(text.to_string());
        self.status_deadline = Some(now + self.config.status_duration);
        let _ = self.event_tx.send(UiEvent::StatusShown {
            text: text.to_string(),
        });
    }

    fn show_overlay(&mut self, overlay: Overlay, now: Instant) {
        self.overlay = Some(overlay);
        self.overlay_deadline = Some(now + self.config.overlay_duration);
        let _ = self.event_tx.send(UiEvent::OverlayShown { overlay });
    }

    fn start_pane_shift(&mut self, now: Instant) {
        self.pane_shift = true;
        self.shift_deadline = Some(now + self.config.shift_duration);
        let _ = self.event_tx.send(UiEvent::PaneShiftStarted);
    }

    fn select_window(&mut self, index: usize) {
        self.active_window = index;
        let _ = self.event_tx.send(UiEvent::WindowSelected { index });
    }

    fn set_help(&mut self, visible: bool) {
        self.help_visible = visible;
        let _ = self.event_tx.send(if visible {
            UiEvent::HelpOpened
        } else {
            UiEvent::HelpClosed
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chord::keys::Modifiers;
    use std::time::Duration;

    fn interpreter() -> (ChordInterpreter, broadcast::Receiver<UiEvent>) {
        let (tx, rx) = broadcast::channel(64);
        let windows = vec!["zsh".to_string(), "vim".to_string(), "node".to_string()];
        (ChordInterpreter::new(ChordConfig::default(), windows, tx), rx)
    }

    fn drain(rx: &mut broadcast::Receiver<UiEvent>) -> Vec<UiEvent> {
        let mut events = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            events.push(ev);
        }
        events
    }

    fn ctrl_b() -> KeyPress {
        KeyPress::new(
            Key::Char('b'),
            Modifiers {
                control: true,
                ..Modifiers::default()
            },
        )
    }

    fn plain(c: char) -> KeyPress {
        KeyPress::new(Key::Char(c), Modifiers::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_prefix_arms_and_expires_silently() {
        let (mut chord, mut rx) = interpreter();
        let t0 = Instant::now();

        assert_eq!(chord.handle_key(ctrl_b(), t0), KeyOutcome::Consumed);
        assert!(chord.awaiting());

        // not yet expired
        chord.tick(t0 + Duration::from_millis(1499));
        assert!(chord.awaiting());

        chord.tick(t0 + Duration::from_millis(1500));
        assert!(!chord.awaiting());

        // armed and released, nothing dispatched
        let events = drain(&mut rx);
        assert_eq!(events, vec![UiEvent::PrefixArmed, UiEvent::PrefixReleased]);
        assert_eq!(chord.status(), None);
        assert_eq!(chord.active_window(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_key_after_expired_deadline_is_not_dispatched() {
        let (mut chord, _rx) = interpreter();
        let t0 = Instant::now();

        chord.handle_key(ctrl_b(), t0);
        assert!(chord.awaiting());

        // the key arrives after the deadline but before any tick ran
        let late = t0 + Duration::from_millis(2000);
        assert_eq!(chord.handle_key(plain('n'), late), KeyOutcome::Ignored);
        assert!(!chord.awaiting());
        assert_eq!(chord.active_window(), 0);
        assert_eq!(chord.status(), None);
    }

    #[tokio::test(start_paused = true)]
    #[should_panic(expected = "window list must not be empty")]
    async fn test_empty_window_list_rejected() {
        let (tx, _rx) = broadcast::channel(1);
        let _ = ChordInterpreter::new(ChordConfig::default(), Vec::new(), tx);
    }

    #[tokio::test(start_paused = true)]
    async fn test_next_window_wraps() {
        let (mut chord, _rx) = interpreter();
        let t0 = Instant::now();

        chord.handle_key(ctrl_b(), t0);
        chord.handle_key(plain('n'), t0);
        assert_eq!(chord.active_window(), 1);
        assert_eq!(chord.status(), Some("next-window"));
        assert!(!chord.awaiting());

        chord.handle_key(ctrl_b(), t0);
        chord.handle_key(plain('n'), t0);
        chord.handle_key(ctrl_b(), t0);
        chord.handle_key(plain('n'), t0);
        assert_eq!(chord.active_window(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_previous_window_wraps_backward() {
        let (mut chord, _rx) = interpreter();
        let t0 = Instant::now();

        chord.handle_key(ctrl_b(), t0);
        chord.handle_key(plain('p'), t0);
        assert_eq!(chord.active_window(), 2);
        assert_eq!(chord.status(), Some("previous-window"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_digit_selects_window() {
        let (mut chord, _rx) = interpreter();
        let t0 = Instant::now();

        chord.handle_key(ctrl_b(), t0);
        chord.handle_key(plain('2'), t0);
        assert_eq!(chord.active_window(), 2);
        assert_eq!(chord.status(), Some("select-window -t 2"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_out_of_range_digit_leaves_index_unchanged() {
        let (mut chord, _rx) = interpreter();
        let t0 = Instant::now();

        chord.handle_key(ctrl_b(), t0);
        chord.handle_key(plain('9'), t0);
        assert_eq!(chord.active_window(), 0);
        assert_eq!(chord.status(), Some("window 9 not found"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_help_toggles_and_escape_closes() {
        let (mut chord, _rx) = interpreter();
        let t0 = Instant::now();

        chord.handle_key(ctrl_b(), t0);
        chord.handle_key(plain('?'), t0);
        assert!(chord.help_visible());

        // plain Escape, no prefix needed
        let esc = KeyPress::new(Key::Escape, Modifiers::default());
        assert_eq!(chord.handle_key(esc, t0), KeyOutcome::Consumed);
        assert!(!chord.help_visible());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unmodified_b_never_arms() {
        let (mut chord, _rx) = interpreter();
        let t0 = Instant::now();

        assert_eq!(chord.handle_key(plain('b'), t0), KeyOutcome::Ignored);
        assert!(!chord.awaiting());

        let ctrl_shift_b = KeyPress::new(
            Key::Char('B'),
            Modifiers {
                control: true,
                shift: true,
                ..Modifiers::default()
            },
        );
        assert_eq!(chord.handle_key(ctrl_shift_b, t0), KeyOutcome::Ignored);
        assert!(!chord.awaiting());
    }

    #[tokio::test(start_paused = true)]
    async fn test_modifier_press_keeps_chord_armed() {
        let (mut chord, _rx) = interpreter();
        let t0 = Instant::now();

        chord.handle_key(ctrl_b(), t0);
        let shift = KeyPress::new(Key::Modifier, Modifiers::default());
        assert_eq!(chord.handle_key(shift, t0), KeyOutcome::Consumed);
        assert!(chord.awaiting());

        chord.handle_key(plain('n'), t0);
        assert_eq!(chord.active_window(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_splits_show_transient_overlays() {
        let (mut chord, _rx) = interpreter();
        let t0 = Instant::now();

        chord.handle_key(ctrl_b(), t0);
        chord.handle_key(plain('%'), t0);
        assert_eq!(chord.overlay(), Some(Overlay::VerticalSplit));
        assert_eq!(chord.status(), Some("split-window -h"));

        // overlay clears before the status message
        chord.tick(t0 + Duration::from_millis(700));
        assert_eq!(chord.overlay(), None);
        assert_eq!(chord.status(), Some("split-window -h"));

        chord.tick(t0 + Duration::from_millis(1200));
        assert_eq!(chord.status(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_timer_restarts_on_new_message() {
        let (mut chord, _rx) = interpreter();
        let t0 = Instant::now();

        chord.handle_key(ctrl_b(), t0);
        chord.handle_key(plain('d'), t0);
        assert_eq!(chord.status(), Some("detached (simulated)"));

        // a second message at t0+1s extends the deadline past t0+1.2s
        let t1 = t0 + Duration::from_millis(1000);
        chord.handle_key(ctrl_b(), t1);
        chord.handle_key(plain('n'), t1);

        chord.tick(t0 + Duration::from_millis(1300));
        assert_eq!(chord.status(), Some("next-window"));

        chord.tick(t1 + Duration::from_millis(1200));
        assert_eq!(chord.status(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unbound_key_echoes_name() {
        let (mut chord, _rx) = interpreter();
        let t0 = Instant::now();

        chord.handle_key(ctrl_b(), t0);
        chord.handle_key(plain('x'), t0);
        assert_eq!(chord.status(), Some("unbound key: x"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_quit_only_when_idle() {
        let (mut chord, _rx) = interpreter();
        let t0 = Instant::now();

        // armed: q is a command key, not a quit request
        chord.handle_key(ctrl_b(), t0);
        assert_eq!(chord.handle_key(plain('q'), t0), KeyOutcome::Consumed);
        assert_eq!(chord.status(), Some("unbound key: q"));

        assert_eq!(chord.handle_key(plain('q'), t0), KeyOutcome::Quit);
    }
}
