// File: crates/chart-core/src/series.rs
// Summary: Bar (candle) model supplied by the host and the derived per-indicator value buffer.
// Notes:
// - Bars are read-only to the engine; indicators only ever borrow the host's slice.
// - `DerivedSeries` is sized to the bar count and recomputed in full on every pass.

use crate::types::MinMax;

/// One OHLC sample for a fixed time bucket. `timestamp` is Unix seconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bar {
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Bar {
    pub const fn new(timestamp: i64, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self { timestamp, open, high, low, close }
    }

    /// Try to construct a bar enforcing OHLC invariants:
    /// low <= min(open,close) and high >= max(open,close), and low <= high.
    pub fn try_new(timestamp: i64, open: f64, high: f64, low: f64, close: f64) -> Result<Self, &'static str> {
        let lo = open.min(close);
        let hi = open.max(close);
        if low > lo { return Err("low above min(open,close)"); }
        if high < hi { return Err("high below max(open,close)"); }
        if low > high { return Err("low above high"); }
        Ok(Self { timestamp, open, high, low, close })
    }

    /// True when the bar closed at or above its open.
    pub fn is_up(&self) -> bool { self.close >= self.open }
}

/// Derived numeric series, one value per bar index.
#[derive(Clone, Debug, Default)]
pub struct DerivedSeries {
    values: Vec<f64>,
}

impl DerivedSeries {
    pub fn new() -> Self { Self { values: Vec::new() } }

    pub fn len(&self) -> usize { self.values.len() }

    pub fn is_empty(&self) -> bool { self.values.is_empty() }

    pub fn values(&self) -> &[f64] { &self.values }

    pub fn get(&self, index: usize) -> Option<f64> { self.values.get(index).copied() }

    /// Drop all values, keeping the allocation for the next pass.
    pub fn clear(&mut self) { self.values.clear(); }

    /// Replace the buffer contents with the output of `fill`, reusing capacity.
    pub fn recompute_with(&mut self, len: usize, fill: impl FnOnce(&mut Vec<f64>)) {
        self.values.clear();
        self.values.reserve(len);
        fill(&mut self.values);
    }

    /// Clamp `[start, end]` to the buffer. `None` if the range is reversed,
    /// the buffer is empty, or `start` is past the last index.
    pub fn clamp_range(&self, start: usize, end: usize) -> Option<(usize, usize)> {
        if self.values.is_empty() || start > end || start >= self.values.len() {
            return None;
        }
        Some((start, end.min(self.values.len() - 1)))
    }

    /// Literal min/max over `[start, end]` inclusive, or `None` for an invalid range.
    pub fn min_max(&self, start: usize, end: usize) -> Option<MinMax> {
        let (s, e) = self.clamp_range(start, end)?;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &v in &self.values[s..=e] {
            if v < min { min = v; }
            if v > max { max = v; }
        }
        Some(MinMax { min, max })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn try_new_rejects_inverted_wicks() {
        assert!(Bar::try_new(0, 10.0, 12.0, 9.0, 11.0).is_ok());
        assert_eq!(Bar::try_new(0, 10.0, 9.5, 9.0, 11.0), Err("high below max(open,close)"));
        assert_eq!(Bar::try_new(0, 10.0, 12.0, 10.5, 11.0), Err("low above min(open,close)"));
    }

    #[test]
    fn min_max_is_inclusive_and_clamped() {
        let mut s = DerivedSeries::new();
        s.recompute_with(5, |v| v.extend_from_slice(&[3.0, 1.0, 4.0, 1.5, 9.0]));
        assert_eq!(s.min_max(1, 2), Some(MinMax { min: 1.0, max: 4.0 }));
        assert_eq!(s.min_max(3, 100), Some(MinMax { min: 1.5, max: 9.0 }));
        assert_eq!(s.min_max(2, 1), None);
        assert_eq!(s.min_max(5, 7), None);
    }

    #[test]
    fn empty_series_has_no_range() {
        let s = DerivedSeries::new();
        assert!(s.is_empty());
        assert_eq!(s.min_max(0, 0), None);
    }
}
