//! Progress display helpers

use std::time::Duration;

/// Format a duration as `m:ss`
pub fn format_time(duration: Duration) -> String {
    let total = duration.as_secs();
    format!("{}:{:02}", total / 60, total % 60)
}

/// `position / duration`, clamped to 0.0-1.0
///
/// Returns `None` when the duration is unknown or zero, so callers skip the
/// update instead of propagating NaN or infinity.
pub fn progress_fraction(position: Duration, duration: Option<Duration>) -> Option<f32> {
    let duration = duration.filter(|d| !d.is_zero())?;
    let fraction = position.as_secs_f64() / duration.as_secs_f64();
    Some(fraction.clamp(0.0, 1.0) as f32)
}
