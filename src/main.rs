//! termfolio: a terminal-native personal landing page
//!
//! A simulated shell session types itself out under a simulated tmux
//! status bar:
//! - typing animation with randomized, punctuation-aware delays
//! - ctrl+b prefix chord driving window switching, splits, and help
//! - raw keyboard input on a dedicated thread
//! - ratatui rendering surface mirroring broadcast events
//!
//! Quit with q (outside a chord) or ctrl+c.

mod chord;
mod config;
mod events;
mod input;
mod lifecycle;
mod script;
mod typing;
mod ui;

use anyhow::Result;
use tokio::sync::{broadcast, mpsc};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::chord::ChordInterpreter;
use crate::config::Config;
use crate::events::UiEvent;
use crate::input::InputListener;
use crate::lifecycle::ShutdownSignal;
use crate::script::SessionScript;
use crate::ui::Renderer;

#[tokio::main]
async fn main() -> Result<()> {
    // stderr keeps the alternate screen clean; redirect 2> for logs
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "termfolio starting");

    let config = Config::load()?;

    let shutdown = ShutdownSignal::new();

    // Input listener -> chord interpreter
    let (input_tx, input_rx) = mpsc::channel(32);
    // State machines -> renderer
    let (event_tx, _event_rx) = broadcast::channel::<UiEvent>(64);

    let mut interpreter = ChordInterpreter::new(
        config.chord.clone(),
        config.windows.clone(),
        event_tx.clone(),
    );

    let session = SessionScript::new(config.typing.clone(), config.reduced_motion, event_tx.clone());
    let renderer = Renderer::new(config.clone(), event_tx.subscribe());

    let listener = InputListener::new(input_tx);
    listener.start()?;
    info!("input listener started");

    // The scripted session runs on its own; quitting mid-animation
    // just aborts it
    let script_task = tokio::spawn(async move { session.run().await });

    info!("initialized, entering main loop");

    tokio::select! {
        // Interpret key chords until quit
        _ = interpreter.run(input_rx) => {
            info!("chord interpreter exited");
        }

        // Redraw on events and clock ticks
        result = renderer.run() => {
            if let Err(e) = result {
                error!(?e, "renderer error");
            }
        }

        // Wait for shutdown signal
        _ = shutdown.wait() => {
            info!("shutdown signal received");
        }
    }

    info!("shutting down...");

    script_task.abort();
    listener.stop();
    // restore even when the renderer future was dropped mid-run
    ratatui::restore();

    info!("termfolio stopped");

    Ok(())
}
