//! Two-point linear calibration for analog transducers.
//!
//! Maps a raw ADC sample onto a physical range and clamps the result to
//! that range.  The raw bounds may be given in either order: a capacitive
//! soil probe reads *lower* when wet, so its wet bound maps to 100 % while
//! being the smaller ADC value.

use serde::{Deserialize, Serialize};

/// Raw-to-physical mapping endpoints for one sensor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearMap {
    pub in_low: f32,
    pub in_high: f32,
    pub out_low: f32,
    pub out_high: f32,
}

impl LinearMap {
    /// Map `raw_zero` to 0 % and `raw_full` to 100 %.
    pub const fn percent(raw_zero: f32, raw_full: f32) -> Self {
        Self {
            in_low: raw_zero,
            in_high: raw_full,
            out_low: 0.0,
            out_high: 100.0,
        }
    }

    /// Apply the mapping to one raw sample.
    pub fn apply(&self, raw: f32) -> f32 {
        linear_map(raw, self.in_low, self.in_high, self.out_low, self.out_high)
    }
}

/// `(x - in_low) * (out_high - out_low) / (in_high - in_low) + out_low`,
/// clamped to `[min(out_low, out_high), max(out_low, out_high)]`.
///
/// Degenerate input bounds (`in_low == in_high`) collapse to `out_low`;
/// [`NodeConfig::validate`](crate::config::NodeConfig::validate) rejects
/// them before they can reach a sensor.
pub fn linear_map(x: f32, in_low: f32, in_high: f32, out_low: f32, out_high: f32) -> f32 {
    let span = in_high - in_low;
    if span == 0.0 {
        return out_low;
    }
    let mapped = (x - in_low) * (out_high - out_low) / span + out_low;
    let (lo, hi) = if out_low <= out_high {
        (out_low, out_high)
    } else {
        (out_high, out_low)
    };
    mapped.clamp(lo, hi)
}
