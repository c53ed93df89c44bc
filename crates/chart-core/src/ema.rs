// File: crates/chart-core/src/ema.rs
// Summary: Exponential moving average over bar closes, drawn as a stroked polyline.

use log::trace;
use skia_safe as skia;

use crate::error::{ChartError, Result};
use crate::plugin::IndicatorPlugin;
use crate::series::{Bar, DerivedSeries};
use crate::surface::{stroke_paint, DrawingSurface};
use crate::types::{DrawParams, IndicatorKey, MinMax};

/// Default stroke width for indicator lines, in pixels.
pub const DEFAULT_STROKE_WIDTH: f32 = 4.0 / 3.0;

/// EMA seeded with the first close: `ema[0] = close[0]`,
/// `ema[i] = alpha * close[i] + (1 - alpha) * ema[i-1]`.
pub fn ema_closes(bars: &[Bar], period: usize, out: &mut Vec<f64>) {
    let Some(first) = bars.first() else { return };
    let alpha = 2.0 / (period as f64 + 1.0);
    let mut prev = first.close;
    out.push(prev);
    for bar in &bars[1..] {
        prev = alpha * bar.close + (1.0 - alpha) * prev;
        out.push(prev);
    }
}

pub struct EmaIndicator<K = IndicatorKey> {
    key: K,
    period: usize,
    values: DerivedSeries,
    paint: Option<skia::Paint>,
}

impl<K: Copy> EmaIndicator<K> {
    pub fn new(key: K, period: usize, color: skia::Color, stroke_width: f32) -> Result<Self> {
        if period == 0 {
            return Err(ChartError::InvalidPeriod(period));
        }
        Ok(Self { key, period, values: DerivedSeries::new(), paint: Some(stroke_paint(color, stroke_width)) })
    }

    pub fn period(&self) -> usize { self.period }

    pub fn alpha(&self) -> f64 { 2.0 / (self.period as f64 + 1.0) }

    pub fn values(&self) -> &[f64] { self.values.values() }

    pub fn is_disposed(&self) -> bool { self.paint.is_none() }
}

impl EmaIndicator<IndicatorKey> {
    /// Built-in EMA for `key`, using the key's period.
    pub fn for_key(key: IndicatorKey, color: skia::Color, stroke_width: f32) -> Self {
        Self { key, period: key.period(), values: DerivedSeries::new(), paint: Some(stroke_paint(color, stroke_width)) }
    }
}

impl<K: Copy> IndicatorPlugin<K> for EmaIndicator<K> {
    fn key(&self) -> K { self.key }

    fn compute_data(&mut self, bars: &[Bar]) {
        let period = self.period;
        self.values.recompute_with(bars.len(), |out| ema_closes(bars, period, out));
        trace!("ema({period}) recomputed over {} bars", bars.len());
    }

    fn try_min_max_in_range(&self, start_index: usize, end_index: usize) -> Option<MinMax> {
        self.values.min_max(start_index, end_index)
    }

    fn draw(&self, surface: &mut dyn DrawingSurface, path: &mut skia::Path, params: &DrawParams) {
        let Some(paint) = &self.paint else { return };
        let Some((start, end)) = self.values.clamp_range(params.start_index, params.end_index) else { return };

        let values = self.values.values();
        path.move_to((params.x_for_index(start), params.y_for_price(values[start])));
        for (i, &v) in values.iter().enumerate().take(end + 1).skip(start + 1) {
            path.line_to((params.x_for_index(i), params.y_for_price(v)));
        }
        surface.stroke_path(path, paint);
    }

    fn dispose(&mut self) {
        self.paint = None;
        self.values.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::RecordingSurface;

    fn bars(closes: &[f64]) -> Vec<Bar> {
        closes.iter().enumerate().map(|(i, &c)| Bar::new(i as i64 * 60, c, c, c, c)).collect()
    }

    fn ema9() -> EmaIndicator {
        EmaIndicator::for_key(IndicatorKey::Ema9, skia::Color::WHITE, DEFAULT_STROKE_WIDTH)
    }

    fn params(start_index: usize, end_index: usize) -> DrawParams {
        DrawParams {
            candle_region_height: 200.0,
            candle_width: 10.0,
            start_index,
            end_index,
            stride: 12.0,
            offset_x: 0.0,
            min_price: 90.0,
            max_price: 110.0,
        }
    }

    #[test]
    fn ema_matches_worked_example() {
        let mut ema = ema9();
        ema.compute_data(&bars(&[100.0, 110.0, 90.0]));
        assert_eq!(ema.alpha(), 0.2);
        assert_eq!(ema.values().len(), 3);
        assert_eq!(ema.values()[0], 100.0);
        assert!((ema.values()[1] - 102.0).abs() < 1e-12);
        assert!((ema.values()[2] - 99.6).abs() < 1e-12);
    }

    #[test]
    fn ema_follows_recurrence_bit_for_bit() {
        let closes: Vec<f64> = (0..64).map(|i| 100.0 + (i as f64 * 0.37).sin() * 7.5).collect();
        let mut ema = EmaIndicator::new(IndicatorKey::Ema20, 20, skia::Color::WHITE, 1.0).unwrap();
        ema.compute_data(&bars(&closes));
        let alpha = 2.0 / 21.0;
        let v = ema.values();
        assert_eq!(v[0], closes[0]);
        for i in 1..closes.len() {
            assert_eq!(v[i], alpha * closes[i] + (1.0 - alpha) * v[i - 1]);
        }
    }

    #[test]
    fn zero_period_is_rejected() {
        assert!(matches!(
            EmaIndicator::new(IndicatorKey::Ema9, 0, skia::Color::WHITE, 1.0),
            Err(ChartError::InvalidPeriod(0))
        ));
    }

    #[test]
    fn empty_input_gives_sentinel_and_no_draw() {
        let mut ema = ema9();
        ema.compute_data(&bars(&[100.0, 101.0]));
        ema.compute_data(&[]);
        assert!(ema.values().is_empty());
        assert_eq!(ema.min_max_in_range(0, 5), MinMax::SENTINEL);

        let mut surface = RecordingSurface::new();
        let mut path = skia::Path::new();
        ema.draw(&mut surface, &mut path, &params(0, 5));
        assert_eq!(surface.call_count(), 0);
    }

    #[test]
    fn range_query_matches_literal_slice() {
        let mut ema = ema9();
        ema.compute_data(&bars(&[100.0, 110.0, 90.0, 120.0, 80.0]));
        let v = ema.values().to_vec();
        let want_min = v[1..=3].iter().cloned().fold(f64::INFINITY, f64::min);
        let want_max = v[1..=3].iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(ema.min_max_in_range(1, 3), MinMax::new(want_min, want_max));
        assert_eq!(ema.min_max_in_range(3, 1), MinMax::SENTINEL);
    }

    #[test]
    fn draw_projects_each_index_in_range() {
        let mut ema = ema9();
        ema.compute_data(&bars(&[100.0, 110.0, 90.0, 105.0]));
        let mut surface = RecordingSurface::new();
        let mut path = skia::Path::new();
        let p = params(1, 2);
        ema.draw(&mut surface, &mut path, &p);

        assert_eq!(surface.call_count(), 1);
        let pts = &surface.strokes[0].points;
        assert_eq!(pts.len(), 2);
        assert_eq!(pts[0], (p.x_for_index(1), p.y_for_price(ema.values()[1])));
        assert_eq!(pts[1], (p.x_for_index(2), p.y_for_price(ema.values()[2])));
    }

    #[test]
    fn reversed_range_draws_nothing() {
        let mut ema = ema9();
        ema.compute_data(&bars(&[100.0, 110.0, 90.0]));
        let mut surface = RecordingSurface::new();
        let mut path = skia::Path::new();
        ema.draw(&mut surface, &mut path, &params(2, 1));
        assert_eq!(surface.call_count(), 0);
    }

    #[test]
    fn dispose_releases_paint() {
        let mut ema = ema9();
        ema.compute_data(&bars(&[100.0, 110.0]));
        ema.dispose();
        assert!(ema.is_disposed());
        let mut surface = RecordingSurface::new();
        let mut path = skia::Path::new();
        ema.draw(&mut surface, &mut path, &params(0, 1));
        assert_eq!(surface.call_count(), 0);
    }
}
