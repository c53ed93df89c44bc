// File: crates/chart-plugins-example/src/price_level.rs
// Summary: Horizontal price-level overlays (liquidation, stop-loss, take-profit) with label layout.

use std::collections::BTreeMap;
use std::fmt;

use chart_core::{stroke_paint, Bar, DrawParams, DrawingSurface, IndicatorPlugin, MinMax, Theme};
use log::debug;
use skia_safe as skia;

/// Label pill height in pixels.
pub const LABEL_HEIGHT: f32 = 18.0;
/// Gap kept between neighbouring labels.
pub const LABEL_SPACING: f32 = 6.0;
/// Closest two label centers may sit.
pub const MIN_CENTER_DISTANCE: f32 = LABEL_HEIGHT + LABEL_SPACING;
/// Horizontal run of the bend joining a displaced label to its price.
const LINE_CURVE_REACH: f32 = 24.0;
const EPSILON: f32 = 1e-3;
const LINE_ALPHA: u8 = 102;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PriceLevelKey {
    Liquidation,
    StopLoss,
    TakeProfit,
}

impl PriceLevelKey {
    pub const ALL: [PriceLevelKey; 3] = [PriceLevelKey::Liquidation, PriceLevelKey::StopLoss, PriceLevelKey::TakeProfit];

    pub const fn label(self) -> &'static str {
        match self {
            PriceLevelKey::Liquidation => "LIQ",
            PriceLevelKey::StopLoss => "SL",
            PriceLevelKey::TakeProfit => "TP",
        }
    }
}

impl fmt::Display for PriceLevelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.label()) }
}

/// Latest price per level; `None` removes the level.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PriceLevels {
    pub liquidation: Option<f64>,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
}

impl PriceLevels {
    pub fn get(&self, key: PriceLevelKey) -> Option<f64> {
        match key {
            PriceLevelKey::Liquidation => self.liquidation,
            PriceLevelKey::StopLoss => self.stop_loss,
            PriceLevelKey::TakeProfit => self.take_profit,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PriceLevelStyle {
    pub color: skia::Color,
    pub line_width: f32,
    /// Whether the level joins [`PriceLevelBuilder::min_max_for_range`].
    pub adjust_y_axis: bool,
}

impl PriceLevelStyle {
    /// Default style for `key`: red liquidation, orange stop-loss, green take-profit.
    pub fn for_key(key: PriceLevelKey, theme: &Theme) -> Self {
        let color = match key {
            PriceLevelKey::Liquidation => theme.candle_down,
            PriceLevelKey::StopLoss => skia::Color::from_rgb(0xff, 0xa5, 0x00),
            PriceLevelKey::TakeProfit => theme.candle_up,
        };
        Self { color: color.with_a(LINE_ALPHA), line_width: 1.0, adjust_y_axis: true }
    }
}

/// One horizontal level. Its range ignores the bar window: a level is the
/// same price at every index.
pub struct PriceLevel {
    key: PriceLevelKey,
    price: Option<f64>,
    adjust_y_axis: bool,
    paint: Option<skia::Paint>,
}

impl PriceLevel {
    pub fn new(key: PriceLevelKey, price: f64, style: &PriceLevelStyle) -> Self {
        Self {
            key,
            price: Some(price),
            adjust_y_axis: style.adjust_y_axis,
            paint: Some(stroke_paint(style.color, style.line_width)),
        }
    }

    pub fn price(&self) -> Option<f64> { self.price }

    pub fn update_price(&mut self, price: f64) { self.price = Some(price); }

    pub fn adjusts_y_axis(&self) -> bool { self.adjust_y_axis }

    /// Price if it lies inside the visible price window.
    fn visible_price(&self, params: &DrawParams) -> Option<f64> {
        self.price.filter(|p| *p >= params.min_price && *p <= params.max_price)
    }

    /// Stroke from the label at `label_y` on the left edge to the price line on the right edge.
    /// A displaced label bends into the price row over a short cubic.
    pub fn draw_line(&self, surface: &mut dyn DrawingSurface, path: &mut skia::Path, params: &DrawParams, label_y: f32) {
        let Some(paint) = &self.paint else { return };
        let Some(price) = self.visible_price(params) else { return };
        if params.start_index > params.end_index {
            return;
        }
        let price_y = params.y_for_price(price);
        let left = params.x_for_index(params.start_index);
        let right = params.x_for_index(params.end_index);
        let reach = LINE_CURVE_REACH.min(right - left);

        path.move_to((left, label_y));
        if (price_y - label_y).abs() <= EPSILON || reach <= EPSILON {
            path.line_to((right, price_y));
        } else {
            let third = reach / 3.0;
            path.cubic_to((left + third, label_y), (left + third * 2.0, price_y), (left + reach, price_y));
            if left + reach < right {
                path.line_to((right, price_y));
            }
        }
        surface.stroke_path(path, paint);
    }
}

impl IndicatorPlugin<PriceLevelKey> for PriceLevel {
    fn key(&self) -> PriceLevelKey { self.key }

    fn compute_data(&mut self, _bars: &[Bar]) {}

    fn try_min_max_in_range(&self, _start_index: usize, _end_index: usize) -> Option<MinMax> {
        self.price.map(|p| MinMax::new(p, p))
    }

    fn draw(&self, surface: &mut dyn DrawingSurface, path: &mut skia::Path, params: &DrawParams) {
        if let Some(price) = self.visible_price(params) {
            self.draw_line(surface, path, params, params.y_for_price(price));
        }
    }

    fn dispose(&mut self) {
        self.paint = None;
        self.price = None;
    }
}

/// Where a level's label lands after collision layout.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LevelPosition {
    pub key: PriceLevelKey,
    pub price: f64,
    pub price_y: f32,
    pub label_y: f32,
}

/// Owns at most one [`PriceLevel`] per key and lays out their labels.
pub struct PriceLevelBuilder {
    styles: BTreeMap<PriceLevelKey, PriceLevelStyle>,
    levels: BTreeMap<PriceLevelKey, PriceLevel>,
    path: Option<skia::Path>,
}

impl PriceLevelBuilder {
    pub fn new(theme: &Theme) -> Self {
        Self {
            styles: PriceLevelKey::ALL.into_iter().map(|k| (k, PriceLevelStyle::for_key(k, theme))).collect(),
            levels: BTreeMap::new(),
            path: Some(skia::Path::new()),
        }
    }

    /// Override the style used the next time `key` is created.
    pub fn with_style(mut self, key: PriceLevelKey, style: PriceLevelStyle) -> Self {
        self.styles.insert(key, style);
        self
    }

    /// Create a level for each newly priced key, update the ones that persist,
    /// and dispose the ones whose price went away. `None` clears every level.
    pub fn update_data(&mut self, data: Option<&PriceLevels>) {
        if self.is_disposed() {
            return;
        }
        let Some(data) = data else {
            for (key, mut level) in std::mem::take(&mut self.levels) {
                debug!("disposing price level {key}");
                level.dispose();
            }
            return;
        };
        for key in PriceLevelKey::ALL {
            match (self.levels.get_mut(&key), data.get(key)) {
                (Some(level), Some(price)) => level.update_price(price),
                (Some(_), None) => {
                    if let Some(mut level) = self.levels.remove(&key) {
                        debug!("disposing price level {key}");
                        level.dispose();
                    }
                }
                (None, Some(price)) => {
                    if let Some(style) = self.styles.get(&key) {
                        debug!("creating price level {key} at {price}");
                        self.levels.insert(key, PriceLevel::new(key, price, style));
                    }
                }
                (None, None) => {}
            }
        }
    }

    pub fn level(&self, key: PriceLevelKey) -> Option<&PriceLevel> { self.levels.get(&key) }

    pub fn len(&self) -> usize { self.levels.len() }

    pub fn is_empty(&self) -> bool { self.levels.is_empty() }

    /// Range spanned by the levels that adjust the y-axis; `None` if there are none.
    pub fn min_max_for_range(&self, start_index: usize, end_index: usize) -> Option<MinMax> {
        self.levels
            .values()
            .filter(|l| l.adjusts_y_axis())
            .filter_map(|l| l.try_min_max_in_range(start_index, end_index))
            .reduce(MinMax::union)
    }

    /// Visible levels sorted top to bottom, labels pushed down until centers
    /// are at least [`MIN_CENTER_DISTANCE`] apart.
    pub fn calculate_positions(&self, params: &DrawParams) -> Vec<LevelPosition> {
        let mut positions: Vec<LevelPosition> = self
            .levels
            .values()
            .filter_map(|level| {
                let price = level.visible_price(params)?;
                let price_y = params.y_for_price(price);
                Some(LevelPosition { key: level.key, price, price_y, label_y: price_y })
            })
            .collect();
        // Stable, so equal rows keep key order.
        positions.sort_by(|a, b| a.price_y.total_cmp(&b.price_y));
        for i in 1..positions.len() {
            let min_y = positions[i - 1].label_y + MIN_CENTER_DISTANCE;
            if positions[i].label_y < min_y {
                positions[i].label_y = min_y;
            }
        }
        positions
    }

    /// Stroke every visible level from its laid-out label row and return the layout.
    pub fn draw_lines(&mut self, surface: &mut dyn DrawingSurface, params: &DrawParams) -> Vec<LevelPosition> {
        let positions = self.calculate_positions(params);
        let Some(path) = self.path.as_mut() else { return Vec::new() };
        for pos in &positions {
            if let Some(level) = self.levels.get(&pos.key) {
                level.draw_line(surface, path, params, pos.label_y);
                path.reset();
            }
        }
        positions
    }

    pub fn dispose(&mut self) {
        self.update_data(None);
        self.path = None;
    }

    pub fn is_disposed(&self) -> bool { self.path.is_none() }
}
