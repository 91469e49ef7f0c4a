//! Character-by-character reveal state machine
//!
//! Owns a reveal cursor over an immutable command string. The async
//! driver arms one timer at a time, so reveals are strictly sequential
//! even though each delay is drawn at random.

use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::sleep;
use tracing::debug;

use crate::config::TypingConfig;
use crate::events::UiEvent;
use crate::typing::delay::{DelaySource, UniformDelay};

/// Types out one command line and signals completion exactly once
pub struct TypingAnimator {
    /// Characters of the full command
    chars: Vec<char>,
    /// Reveal cursor, monotonically non-decreasing
    revealed: usize,
    /// True once the start delay has elapsed
    started: bool,
    /// Guards the completion signal
    done_fired: bool,
    /// Keep drawing the cursor after the line finishes
    cursor_after_done: bool,
    config: TypingConfig,
    delays: Box<dyn DelaySource>,
}

impl TypingAnimator {
    /// Create an animator with the production delay source
    pub fn new(command: &str, config: TypingConfig) -> Self {
        Self::with_delay_source(command, config, Box::new(UniformDelay))
    }

    /// Create an animator with an injected delay source
    pub fn with_delay_source(
        command: &str,
        config: TypingConfig,
        delays: Box<dyn DelaySource>,
    ) -> Self {
        Self {
            chars: command.chars().collect(),
            revealed: 0,
            started: false,
            done_fired: false,
            cursor_after_done: true,
            config,
            delays,
        }
    }

    /// Hide the cursor once the line finishes typing
    pub fn hide_cursor_when_done(mut self) -> Self {
        self.cursor_after_done = false;
        self
    }

    /// Currently visible prefix of the command
    pub fn visible_text(&self) -> String {
        self.chars[..self.revealed].iter().collect()
    }

    /// True when every character is revealed
    pub fn is_done(&self) -> bool {
        self.revealed >= self.chars.len()
    }

    /// Whether the rendering surface should draw the block cursor
    pub fn cursor_visible(&self) -> bool {
        !self.is_done() || self.cursor_after_done
    }

    /// Delay before the next character, or `None` when done.
    ///
    /// Pause characters get `pause_extra` on top of the base draw.
    fn next_delay(&mut self) -> Option<Duration> {
        let ch = *self.chars.get(self.revealed)?;
        let base = self
            .delays
            .next_delay(self.config.min_char_delay, self.config.max_char_delay);
        if self.config.pause_chars.contains(ch) {
            Some(base + self.config.pause_extra)
        } else {
            Some(base)
        }
    }

    /// Reveal one more character
    fn advance(&mut self) {
        if self.revealed < self.chars.len() {
            self.revealed += 1;
        }
    }

    /// Mark completion; returns true only on the first call after the
    /// last character is revealed
    fn complete(&mut self) -> bool {
        if self.is_done() && !self.done_fired {
            self.done_fired = true;
            true
        } else {
            false
        }
    }

    /// Run the animation to completion, emitting reveal events for
    /// `line` and a single `CommandDone`.
    ///
    /// Dropping the future cancels the pending timer; no further events
    /// are emitted after cancellation.
    pub async fn run(&mut self, line: usize, event_tx: &broadcast::Sender<UiEvent>) {
        if !self.chars.is_empty() {
            // the initial thinking beat happens once; a resumed run
            // picks up at the reveal cursor
            if !self.started {
                sleep(self.config.start_delay).await;
                self.started = true;
                debug!(line, chars = self.chars.len(), "typing started");
            }

            while let Some(delay) = self.next_delay() {
                sleep(delay).await;
                self.advance();
                let _ = event_tx.send(UiEvent::CommandReveal {
                    line,
                    visible: self.visible_text(),
                });
            }
        }

        if self.complete() {
            debug!(line, "typing complete");
            let _ = event_tx.send(UiEvent::CommandDone { line });
        }
    }
}
