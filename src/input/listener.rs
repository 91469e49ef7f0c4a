//! Keyboard listener thread
//!
//! Polls the crossterm event stream on a dedicated thread and forwards
//! key-down events to the interpreter. The terminal runs in raw mode,
//! so ctrl+c arrives here as a key event and is mapped to `Quit`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::chord::KeyPress;

/// How often the listener thread checks the running flag
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Events sent from the listener to the interpreter
#[derive(Debug, Clone)]
pub enum InputEvent {
    /// A key was pressed
    Key(KeyPress),
    /// The user asked to exit (ctrl+c)
    Quit,
}

/// Keyboard listener running on a dedicated thread
pub struct InputListener {
    event_tx: mpsc::Sender<InputEvent>,
    running: Arc<AtomicBool>,
}

impl InputListener {
    /// Create a new listener
    pub fn new(event_tx: mpsc::Sender<InputEvent>) -> Self {
        Self {
            event_tx,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Start the listener thread
    ///
    /// Runs until `stop()` is called or the receiving side closes.
    pub fn start(&self) -> Result<(), InputError> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(InputError::AlreadyRunning);
        }

        let event_tx = self.event_tx.clone();
        let running = Arc::clone(&self.running);

        thread::Builder::new()
            .name("input-listener".to_string())
            .spawn(move || {
                info!("input listener thread started");

                if let Err(e) = run_poll_loop(event_tx, running.clone()) {
                    error!(?e, "input listener error");
                }

                running.store(false, Ordering::SeqCst);
                info!("input listener thread stopped");
            })
            .map_err(|e| InputError::ThreadSpawn(e.to_string()))?;

        Ok(())
    }

    /// Stop the listener thread
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Check if the listener is currently running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// Errors that can occur in the input listener
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("input listener is already running")]
    AlreadyRunning,

    #[error("failed to spawn listener thread: {0}")]
    ThreadSpawn(String),

    #[error("terminal event read failed: {0}")]
    Read(#[from] std::io::Error),
}

/// Poll crossterm events until stopped
fn run_poll_loop(
    event_tx: mpsc::Sender<InputEvent>,
    running: Arc<AtomicBool>,
) -> Result<(), InputError> {
    while running.load(Ordering::SeqCst) {
        if !event::poll(POLL_INTERVAL)? {
            continue;
        }

        let Event::Key(key) = event::read()? else {
            continue;
        };
        // key-up/repeat events arrive on some terminals; chords only
        // care about the down edge
        if key.kind != KeyEventKind::Press {
            continue;
        }

        let input = if key.code == KeyCode::Char('c')
            && key.modifiers.contains(KeyModifiers::CONTROL)
        {
            InputEvent::Quit
        } else {
            InputEvent::Key(KeyPress::from_crossterm(&key))
        };

        debug!(?input, "key event");
        if event_tx.blocking_send(input).is_err() {
            warn!("input channel closed, stopping listener");
            break;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listener_creation() {
        let (tx, _rx) = mpsc::channel(32);
        let listener = InputListener::new(tx);
        assert!(!listener.is_running());
    }
}
