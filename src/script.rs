//! The scripted landing-page session
//!
//! Two command lines type themselves out in sequence; each reveals a
//! canned output block when it finishes. The renderer owns all
//! presentation, this module only emits events.

use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::sleep;
use tracing::info;

use crate::config::TypingConfig;
use crate::events::UiEvent;
use crate::typing::{DelaySource, FixedDelay, TypingAnimator, UniformDelay};

/// Shell prompt shown before every scripted command
pub const PROMPT_USER: &str = "guest@lucky-falcon";
pub const PROMPT_PATH: &str = " ~ $ ";

/// Pause between a finished output block and the next command line
const BETWEEN_LINES: Duration = Duration::from_millis(300);

/// One command line of the session and its canned output
pub struct ScriptLine {
    pub command: &'static str,
    pub output: &'static [&'static str],
    /// Keep the block cursor once the line finishes
    pub cursor_after_done: bool,
}

/// The landing-page session script
pub const LINES: &[ScriptLine] = &[
    ScriptLine {
        command: "me -h",
        output: &[
            "",
            "Systems tinkerer. I build terminal tools in Rust and obsess",
            "over my tmux setup. Yes, I'm a vim guy (archbtw).",
            "",
            "Off-screen, I'm hunting for the best coffee and food joints.",
            "",
        ],
        cursor_after_done: false,
    },
    ScriptLine {
        command: "bat more-info.md",
        output: &[
            "",
            "-- [email me](mailto:hello@lucky-falcon.dev)",
            "-- [github](https://github.com/lucky-falcon)",
            "-- [linkedin](https://linkedin.com/in/lucky-falcon)",
            "",
            "Designed in a terminal and coded in Neovim. Built with",
            "ratatui and crossterm. Styled using Catppuccin.",
        ],
        cursor_after_done: true,
    },
];

/// Runs the session script, one animator at a time
pub struct SessionScript {
    typing: TypingConfig,
    /// Use fixed minimum delays instead of random draws
    reduced_motion: bool,
    event_tx: broadcast::Sender<UiEvent>,
}

impl SessionScript {
    pub fn new(
        typing: TypingConfig,
        reduced_motion: bool,
        event_tx: broadcast::Sender<UiEvent>,
    ) -> Self {
        Self {
            typing,
            reduced_motion,
            event_tx,
        }
    }

    /// Type out every line in order, revealing outputs between lines
    pub async fn run(&self) {
        info!(lines = LINES.len(), "session script started");

        for (index, line) in LINES.iter().enumerate() {
            if index > 0 {
                sleep(BETWEEN_LINES).await;
            }

            let mut animator = self.animator(line);
            animator.run(index, &self.event_tx).await;

            let _ = self.event_tx.send(UiEvent::OutputRevealed { line: index });
        }

        info!("session script finished");
    }

    fn animator(&self, line: &ScriptLine) -> TypingAnimator {
        let delays: Box<dyn DelaySource> = if self.reduced_motion {
            Box::new(FixedDelay)
        } else {
            Box::new(UniformDelay)
        };
        let animator = TypingAnimator::with_delay_source(line.command, self.typing.clone(), delays);
        if line.cursor_after_done {
            animator
        } else {
            animator.hide_cursor_when_done()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_config() -> TypingConfig {
        TypingConfig {
            start_delay: Duration::from_millis(10),
            min_char_delay: Duration::from_millis(5),
            max_char_delay: Duration::from_millis(5),
            pause_chars: String::new(),
            pause_extra: Duration::ZERO,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_script_reveals_lines_in_order() {
        let (tx, mut rx) = broadcast::channel(256);
        let script = SessionScript::new(fast_config(), true, tx);

        script.run().await;

        let mut milestones = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            match ev {
                UiEvent::CommandDone { line } => milestones.push(format!("done {}", line)),
                UiEvent::OutputRevealed { line } => milestones.push(format!("output {}", line)),
                _ => {}
            }
        }
        assert_eq!(milestones, vec!["done 0", "output 0", "done 1", "output 1"]);
    }
}
