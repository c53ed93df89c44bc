// File: crates/chart-core/src/types.rs
// Summary: Shared types (value ranges, viewport projection snapshot, indicator keys).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Closed numeric range reported by indicators.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MinMax {
    pub min: f64,
    pub max: f64,
}

impl MinMax {
    /// Placeholder range returned when there is nothing to measure.
    /// Never a real measurement; callers special-case empty series first.
    pub const SENTINEL: MinMax = MinMax { min: 0.0, max: 1.0 };

    pub const fn new(min: f64, max: f64) -> Self { Self { min, max } }

    /// Smallest range covering both `self` and `other`.
    pub fn union(self, other: MinMax) -> MinMax {
        MinMax { min: self.min.min(other.min), max: self.max.max(other.max) }
    }
}

/// Per-frame viewport projection handed to every plugin draw call.
/// Contract: `start_index <= end_index` for any range that should draw.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawParams {
    /// Height in pixels of the price region (volume area excluded).
    pub candle_region_height: f32,
    pub candle_width: f32,
    pub start_index: usize,
    pub end_index: usize,
    /// Horizontal distance between neighbouring bar origins.
    pub stride: f32,
    pub offset_x: f32,
    pub min_price: f64,
    pub max_price: f64,
}

impl DrawParams {
    /// Bar center for `index`.
    #[inline]
    pub fn x_for_index(&self, index: usize) -> f32 {
        self.offset_x + index as f32 * self.stride + self.candle_width * 0.5
    }

    /// Price to pixel. The range is floored at 1 so a flat viewport gives a finite line.
    #[inline]
    pub fn y_for_price(&self, price: f64) -> f32 {
        let region = self.candle_region_height as f64;
        let range = (self.max_price - self.min_price).max(1.0);
        (region - ((price - self.min_price) / range) * region) as f32
    }
}

/// Identifier of a built-in indicator plugin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IndicatorKey {
    #[serde(rename = "EMA9")]
    Ema9,
    #[serde(rename = "EMA20")]
    Ema20,
    #[serde(rename = "EMA50")]
    Ema50,
}

impl IndicatorKey {
    pub const ALL: [IndicatorKey; 3] = [IndicatorKey::Ema9, IndicatorKey::Ema20, IndicatorKey::Ema50];

    pub const fn period(self) -> usize {
        match self {
            IndicatorKey::Ema9 => 9,
            IndicatorKey::Ema20 => 20,
            IndicatorKey::Ema50 => 50,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            IndicatorKey::Ema9 => "EMA9",
            IndicatorKey::Ema20 => "EMA20",
            IndicatorKey::Ema50 => "EMA50",
        }
    }
}

impl fmt::Display for IndicatorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.label()) }
}
