// File: crates/chart-plugins-example/src/lib.rs
// Summary: Out-of-tree plugins: an SMA study mixed with the built-in EMA, and price-level overlays.

use std::fmt;

use chart_core::{
    stroke_paint, Bar, DerivedSeries, DrawParams, DrawingSurface, EmaIndicator, IndicatorBuilder, IndicatorKey,
    IndicatorPlugin, MinMax, Theme,
};
use log::trace;
use skia_safe as skia;

pub mod price_level;

pub use price_level::{LevelPosition, PriceLevel, PriceLevelBuilder, PriceLevelKey, PriceLevelStyle, PriceLevels};

/// Key space for a chart that carries both built-in and plugin studies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StudyKey {
    Ema(IndicatorKey),
    Sma(usize),
}

impl fmt::Display for StudyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StudyKey::Ema(k) => write!(f, "{k}"),
            StudyKey::Sma(p) => write!(f, "SMA{p}"),
        }
    }
}

/// Simple moving average of closes over a trailing window.
/// Returns one value per complete window; the first lands at index `period - 1`.
pub fn sma_closes(bars: &[Bar], period: usize, out: &mut Vec<f64>) {
    if period == 0 || bars.len() < period {
        return;
    }
    let mut sum = 0.0f64;
    for i in 0..bars.len() {
        sum += bars[i].close;
        if i + 1 >= period {
            if i + 1 > period {
                sum -= bars[i - period].close;
            }
            out.push(sum / period as f64);
        }
    }
}

/// SMA plugin. Indices before the first full window have no value and are
/// skipped by both the range query and the draw.
pub struct SmaIndicator<K> {
    key: K,
    period: usize,
    values: DerivedSeries,
    paint: Option<skia::Paint>,
}

impl<K: Copy> SmaIndicator<K> {
    /// `period` is floored at 1.
    pub fn new(key: K, period: usize, color: skia::Color, stroke_width: f32) -> Self {
        Self { key, period: period.max(1), values: DerivedSeries::new(), paint: Some(stroke_paint(color, stroke_width)) }
    }

    pub fn period(&self) -> usize { self.period }

    /// Bar index of the first value.
    pub fn first_index(&self) -> usize { self.period - 1 }

    pub fn value_at(&self, bar_index: usize) -> Option<f64> {
        bar_index.checked_sub(self.first_index()).and_then(|i| self.values.get(i))
    }

    /// Map a bar-index range onto the value buffer.
    fn local_range(&self, start_index: usize, end_index: usize) -> Option<(usize, usize)> {
        let first = self.first_index();
        if start_index > end_index || end_index < first {
            return None;
        }
        self.values.clamp_range(start_index.max(first) - first, end_index - first)
    }
}

impl<K: Copy> IndicatorPlugin<K> for SmaIndicator<K> {
    fn key(&self) -> K { self.key }

    fn compute_data(&mut self, bars: &[Bar]) {
        let period = self.period;
        self.values.recompute_with(bars.len(), |out| sma_closes(bars, period, out));
        trace!("sma({period}) recomputed: {} values", self.values.len());
    }

    fn try_min_max_in_range(&self, start_index: usize, end_index: usize) -> Option<MinMax> {
        let (s, e) = self.local_range(start_index, end_index)?;
        self.values.min_max(s, e)
    }

    fn draw(&self, surface: &mut dyn DrawingSurface, path: &mut skia::Path, params: &DrawParams) {
        let Some(paint) = &self.paint else { return };
        let Some((s, e)) = self.local_range(params.start_index, params.end_index) else { return };
        let first = self.first_index();
        let values = self.values.values();
        path.move_to((params.x_for_index(s + first), params.y_for_price(values[s])));
        for i in s + 1..=e {
            path.line_to((params.x_for_index(i + first), params.y_for_price(values[i])));
        }
        surface.stroke_path(path, paint);
    }

    fn dispose(&mut self) {
        self.paint = None;
        self.values.clear();
    }
}

/// Builder with EMA9/20/50 plus an SMA for each of `sma_periods`, all hidden.
pub fn study_builder(sma_periods: &[usize], sma_color: skia::Color, stroke_width: f32, theme: &Theme) -> IndicatorBuilder<StudyKey> {
    let mut builder = IndicatorBuilder::new();
    for key in IndicatorKey::ALL {
        let color = theme.color_for(key);
        // Built-in periods are never zero.
        if let Ok(ema) = EmaIndicator::new(StudyKey::Ema(key), key.period(), color, stroke_width) {
            builder.register_indicator(Box::new(ema));
        }
    }
    builder.register_indicators(sma_periods.iter().map(|&p| {
        Box::new(SmaIndicator::new(StudyKey::Sma(p), p, sma_color, stroke_width)) as Box<dyn IndicatorPlugin<StudyKey>>
    }));
    builder
}
