use crate::probe::error::{ProbeError, Result};
use tracing::debug;

/// Base of the unit tiers used when scaling a raw rate
pub const SCALE_BASE: f64 = 1024.0;

/// Throughput in bytes per second, as returned by a probe
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct RawRate(pub f64);

/// Raw rate divided by the power of 1024 that brings it into a human-scale range
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct ScaledRate(pub f64);

impl ScaledRate {
    /// Value rounded to one decimal place, as shown in the report
    pub fn rounded(&self) -> f64 {
        (self.0 * 10.0).round() / 10.0
    }
}

/// Converts a raw byte rate into a scaled rate.
///
/// Picks `i = floor(log_1024(raw))` and returns `raw / 1024^i`, so any finite
/// positive input yields a mantissa in `[1, 1024)`. Inputs below one byte per
/// second select a negative tier. The tier itself is not reported; callers
/// always present the mantissa under a fixed "Mbps" label.
///
/// # Errors
///
/// Returns [`ProbeError::Domain`] when `raw` is zero, negative or not finite,
/// since the logarithm is undefined there.
///
/// # Examples
///
/// ```
/// use speednet::probe::{convert_to_scaled_rate, RawRate};
///
/// let scaled = convert_to_scaled_rate(RawRate(3.0 * 1024.0 * 1024.0)).unwrap();
/// assert_eq!(scaled.0, 3.0);
/// ```
pub fn convert_to_scaled_rate(raw: RawRate) -> Result<ScaledRate> {
    let value = raw.0;
    if !value.is_finite() || value <= 0.0 {
        debug!(raw = value, "Rejected rate outside conversion domain");
        return Err(ProbeError::Domain { raw: value });
    }

    let mut tier = (value.ln() / SCALE_BASE.ln()).floor() as i32;
    // ln ratios can land a hair off an exact power of 1024
    if SCALE_BASE.powi(tier) > value {
        tier -= 1;
    } else if SCALE_BASE.powi(tier + 1) <= value {
        tier += 1;
    }

    let scaled = value / SCALE_BASE.powi(tier);
    debug!(raw = value, tier = tier, scaled = scaled, "Converted raw rate");
    Ok(ScaledRate(scaled))
}
