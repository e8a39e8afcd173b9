//! Display formatting for times, percentages and chart numbers.

/// Format seconds as `M:SS`, e.g. `125.7` → `"2:05"`.
///
/// Negative and non-finite inputs render as `"0:00"`.
///
/// # Examples
/// ```
/// use vdet_models::timestamp::format_clock;
/// assert_eq!(format_clock(0.0), "0:00");
/// assert_eq!(format_clock(125.7), "2:05");
/// ```
pub fn format_clock(seconds: f64) -> String {
    let seconds = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
    let mins = (seconds / 60.0).floor() as u64;
    let secs = (seconds % 60.0).floor() as u64;
    format!("{}:{:02}", mins, secs)
}

/// Format with a fixed number of decimals, rounding ties away from zero.
///
/// Plain `{:.N}` formatting rounds exact ties to even (`12.25` → `"12.2"`);
/// display labels expect `"12.3"`.
///
/// # Examples
/// ```
/// use vdet_models::timestamp::to_fixed;
/// assert_eq!(to_fixed(12.25, 1), "12.3");
/// assert_eq!(to_fixed(100.5, 0), "101");
/// ```
pub fn to_fixed(value: f64, digits: u32) -> String {
    let scale = 10f64.powi(digits as i32);
    let rounded = (value * scale).round() / scale;
    if rounded.is_finite() {
        format!("{:.*}", digits as usize, rounded)
    } else {
        format!("{:.*}", digits as usize, value)
    }
}

/// Format seconds with two decimals and a unit suffix, e.g. `"2.04s"`.
pub fn format_seconds(seconds: f64) -> String {
    format!("{}s", to_fixed(seconds, 2))
}

/// Format a [0, 1] fraction as a one-decimal percentage, e.g. `"95.3%"`.
pub fn format_percent(fraction: f64) -> String {
    format!("{}%", to_fixed(fraction * 100.0, 1))
}

/// Format a number the way chart labels print it.
///
/// Integral values have no fractional part (`5.0` → `"5"`); everything
/// else uses the shortest round-trip form (`2.5` → `"2.5"`).
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}
