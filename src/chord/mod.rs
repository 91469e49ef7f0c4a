//! Prefix chord interpretation for the simulated tmux status bar
//!
//! Implements the two-stage command protocol: ctrl+b arms the prefix,
//! the next key is dispatched against a fixed table, and an armed
//! prefix silently expires after a timeout.

mod interpreter;
mod keys;

pub use interpreter::{ChordInterpreter, KeyOutcome, Overlay};
pub use keys::{Key, KeyPress, Modifiers};
