//! Time labels and progress math

use crate::types::TimeStyle;
use std::time::Duration;

/// Format seconds as `minutes:seconds`
///
/// Seconds are always two digits; minutes follow `style`. Negative or
/// non-finite input renders as zero.
pub fn format_time(seconds: f64, style: TimeStyle) -> String {
    let whole = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    let (minutes, secs) = (whole / 60, whole % 60);

    match style {
        TimeStyle::Compact => format!("{}:{:02}", minutes, secs),
        TimeStyle::Padded => format!("{:02}:{:02}", minutes, secs),
    }
}

/// Format an optional duration; unknown renders as zero
pub fn format_duration(duration: Option<Duration>, style: TimeStyle) -> String {
    format_time(duration.map_or(0.0, |d| d.as_secs_f64()), style)
}

/// Progress ratio `elapsed / total` in `[0, 1]`
///
/// `None` until a non-zero total is known.
pub fn progress_ratio(elapsed: Duration, total: Option<Duration>) -> Option<f64> {
    let total = total?;
    if total.is_zero() {
        return None;
    }
    Some((elapsed.as_secs_f64() / total.as_secs_f64()).clamp(0.0, 1.0))
}

/// Convert media-element seconds into a `Duration`, flooring bad input at zero
pub(crate) fn duration_from_secs(seconds: f64) -> Duration {
    if seconds.is_finite() && seconds > 0.0 {
        Duration::try_from_secs_f64(seconds).unwrap_or(Duration::MAX)
    } else {
        Duration::ZERO
    }
}
