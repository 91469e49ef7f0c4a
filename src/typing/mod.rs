//! Typing animation for the scripted terminal session
//!
//! Reveals a command string one character at a time on a randomized,
//! punctuation-aware delay schedule and signals completion exactly once.

mod animator;
mod delay;

pub use animator::TypingAnimator;
pub use delay::{DelaySource, FixedDelay, UniformDelay};
