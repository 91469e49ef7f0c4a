//! Configuration loading and management

use std::time::Duration;

use anyhow::{Context, Result};

/// Per-character typing animation timings
#[derive(Debug, Clone)]
pub struct TypingConfig {
    /// Delay before the first character appears
    pub start_delay: Duration,
    /// Minimum delay per character
    pub min_char_delay: Duration,
    /// Maximum delay per character
    pub max_char_delay: Duration,
    /// Characters that get an extra pause after the base delay
    pub pause_chars: String,
    /// Extra pause for `pause_chars`
    pub pause_extra: Duration,
}

impl Default for TypingConfig {
    fn default() -> Self {
        Self {
            start_delay: Duration::from_millis(200),
            min_char_delay: Duration::from_millis(22),
            max_char_delay: Duration::from_millis(60),
            pause_chars: ",.;: ".to_string(),
            pause_extra: Duration::from_millis(120),
        }
    }
}

/// Prefix chord and transient UI timings
#[derive(Debug, Clone)]
pub struct ChordConfig {
    /// How long the prefix stays armed waiting for a command key
    pub prefix_timeout: Duration,
    /// How long a status message stays visible
    pub status_duration: Duration,
    /// How long a split overlay stays visible
    pub overlay_duration: Duration,
    /// How long the new-window pane shift lasts
    pub shift_duration: Duration,
}

impl Default for ChordConfig {
    fn default() -> Self {
        Self {
            prefix_timeout: Duration::from_millis(1500),
            status_duration: Duration::from_millis(1200),
            overlay_duration: Duration::from_millis(700),
            shift_duration: Duration::from_millis(650),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub typing: TypingConfig,
    pub chord: ChordConfig,
    /// Simulated window names shown in the status bar
    pub windows: Vec<String>,
    /// Hostname shown in the left status segment
    pub hostname: String,
    /// Session name shown in the left status segment
    pub session: String,
    /// Type with fixed minimum delays instead of random draws
    pub reduced_motion: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            typing: TypingConfig::default(),
            chord: ChordConfig::default(),
            windows: vec!["zsh".to_string(), "vim".to_string(), "node".to_string()],
            hostname: "lucky-falcon".to_string(),
            session: "0".to_string(),
            reduced_motion: false,
        }
    }
}

impl Config {
    /// Load configuration from defaults and environment overrides
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        if let Some(ms) = env_ms("TERMFOLIO_PREFIX_TIMEOUT_MS")? {
            config.chord.prefix_timeout = ms;
        }
        if let Some(ms) = env_ms("TERMFOLIO_STATUS_MS")? {
            config.chord.status_duration = ms;
        }
        config.reduced_motion = std::env::var("TERMFOLIO_REDUCED_MOTION").is_ok();

        Ok(config)
    }
}

/// Read an optional millisecond duration from the environment
fn env_ms(var: &str) -> Result<Option<Duration>> {
    match std::env::var(var) {
        Ok(raw) => {
            let ms: u64 = raw
                .parse()
                .with_context(|| format!("{} must be a millisecond count, got {:?}", var, raw))?;
            Ok(Some(Duration::from_millis(ms)))
        }
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_windows() {
        let config = Config::default();
        assert_eq!(config.windows.len(), 3);
        assert_eq!(config.windows[0], "zsh");
    }

    #[test]
    fn test_default_timings() {
        let config = Config::default();
        assert_eq!(config.chord.prefix_timeout, Duration::from_millis(1500));
        assert_eq!(config.typing.pause_extra, Duration::from_millis(120));
    }
}
