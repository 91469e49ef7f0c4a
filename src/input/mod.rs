//! Raw keyboard input source
//!
//! Reads crossterm key events on a dedicated thread and forwards them
//! to the chord interpreter over a channel.

mod listener;

pub use listener::{InputError, InputEvent, InputListener};
