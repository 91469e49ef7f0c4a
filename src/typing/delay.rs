//! Injectable per-character delay source
//!
//! The animator draws every delay through this trait so tests can make
//! timing deterministic.

use std::time::Duration;

use rand::Rng;

/// Source of per-character base delays
pub trait DelaySource: Send {
    /// Draw a delay from the inclusive range `[min, max]`.
    ///
    /// A degenerate range (`min > max`) collapses to `min`.
    fn next_delay(&mut self, min: Duration, max: Duration) -> Duration;
}

/// Uniform draw from the thread RNG
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformDelay;

impl DelaySource for UniformDelay {
    fn next_delay(&mut self, min: Duration, max: Duration) -> Duration {
        if min >= max {
            return min;
        }
        let min_ms = min.as_millis() as u64;
        let max_ms = max.as_millis() as u64;
        Duration::from_millis(rand::thread_rng().gen_range(min_ms..=max_ms))
    }
}

/// Deterministic source that always returns the lower bound
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedDelay;

impl DelaySource for FixedDelay {
    fn next_delay(&mut self, min: Duration, _max: Duration) -> Duration {
        min
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_stays_in_range() {
        let mut source = UniformDelay;
        let min = Duration::from_millis(22);
        let max = Duration::from_millis(60);
        for _ in 0..100 {
            let d = source.next_delay(min, max);
            assert!(d >= min && d <= max);
        }
    }

    #[test]
    fn test_inverted_range_collapses_to_min() {
        let mut source = UniformDelay;
        let d = source.next_delay(Duration::from_millis(60), Duration::from_millis(22));
        assert_eq!(d, Duration::from_millis(60));
    }

    #[test]
    fn test_fixed_returns_min() {
        let mut source = FixedDelay;
        let d = source.next_delay(Duration::from_millis(30), Duration::from_millis(90));
        assert_eq!(d, Duration::from_millis(30));
    }
}
