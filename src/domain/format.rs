use serde::{Deserialize, Serialize};

const KIB: f64 = 1024.0;
const MIB: f64 = 1024.0 * 1024.0;
const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Rounding policy for the percentage shown next to a progress bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PercentFormat {
    /// Never show "0%" once bytes are flowing.
    pub hide_stalled_zero: bool,
    /// Floor applied while bytes are flowing and `hide_stalled_zero` is set.
    pub min_visible_percent: u8,
}

impl Default for PercentFormat {
    fn default() -> Self {
        Self {
            hide_stalled_zero: true,
            min_visible_percent: 1,
        }
    }
}

/// Whole percent for a fraction in `[0, 1]`, floored.
///
/// Out-of-range and non-finite input is clamped, so the result is always 0..=100
/// and never decreases as `fraction` grows.
pub fn whole_percent(fraction: f64, transfer_started: bool, format: &PercentFormat) -> u8 {
    let fraction = if fraction.is_finite() {
        fraction.clamp(0.0, 1.0)
    } else {
        0.0
    };

    // The epsilon keeps values like 0.29 * 100 = 28.999.. from flooring a step low.
    let floored = (fraction * 100.0 + 1e-9).floor().min(100.0) as u8;

    if transfer_started && format.hide_stalled_zero {
        floored.max(format.min_visible_percent.min(100))
    } else {
        floored
    }
}

/// Percentage label such as `"42%"`.
pub fn format_download_percentage(
    fraction: f64,
    transfer_started: bool,
    format: &PercentFormat,
) -> String {
    format!("{}%", whole_percent(fraction, transfer_started, format))
}

/// Progress bar fill from 0 to 100, without rounding.
pub fn progress_value(fraction: f64) -> f64 {
    if fraction.is_finite() {
        fraction.clamp(0.0, 1.0) * 100.0
    } else {
        0.0
    }
}

/// Human-readable file size. Empty for an unknown (zero) size.
pub fn to_gibibytes(bytes: u64) -> String {
    if bytes == 0 {
        return String::new();
    }

    let value = bytes as f64;
    if value > GIB {
        format!("{:.2}GB", value / GIB)
    } else if value > MIB {
        format!("{:.2}MB", value / MIB)
    } else if value > KIB {
        format!("{:.2}KB", value / KIB)
    } else {
        format!("{}B", bytes)
    }
}
