//! Timer interval helpers

/// Scale an interval down by a speed factor, never going below 1ms
///
/// Used by the CLI `--speed` flag to run the simulation faster than wall clock.
pub fn scale_interval_ms(interval_ms: u64, speed: f64) -> u64 {
    if !speed.is_finite() || speed <= 0.0 {
        return interval_ms;
    }
    ((interval_ms as f64 / speed).round() as u64).max(1)
}
