// File: crates/chart-core/src/builder.rs
// Summary: Indicator registry + orchestration: activation, recomputation, aggregate range, aggregate draw.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Debug;

use log::debug;
use skia_safe as skia;

use crate::ema::EmaIndicator;
use crate::plugin::IndicatorPlugin;
use crate::series::Bar;
use crate::surface::DrawingSurface;
use crate::theme::Theme;
use crate::types::{DrawParams, IndicatorKey, MinMax};

/// Registry of indicator plugins plus the subset currently drawn.
///
/// Active plugins are visited in ascending key order. A single scratch path
/// is shared by every plugin draw and reset between plugins, so draws must
/// stay sequential.
pub struct IndicatorBuilder<K: Copy + Ord + Debug = IndicatorKey> {
    registry: BTreeMap<K, Box<dyn IndicatorPlugin<K>>>,
    active: BTreeSet<K>,
    path: Option<skia::Path>,
}

impl<K: Copy + Ord + Debug> Default for IndicatorBuilder<K> {
    fn default() -> Self { Self::new() }
}

impl<K: Copy + Ord + Debug> IndicatorBuilder<K> {
    pub fn new() -> Self {
        Self { registry: BTreeMap::new(), active: BTreeSet::new(), path: Some(skia::Path::new()) }
    }

    /// Insert or replace plugins by key. Registration never activates.
    /// A disposed builder drops the plugins unregistered.
    pub fn register_indicators<I>(&mut self, plugins: I)
    where
        I: IntoIterator<Item = Box<dyn IndicatorPlugin<K>>>,
    {
        if self.is_disposed() {
            return;
        }
        for plugin in plugins {
            let key = plugin.key();
            if let Some(mut old) = self.registry.insert(key, plugin) {
                debug!("replacing indicator {key:?}");
                old.dispose();
            } else {
                debug!("registered indicator {key:?}");
            }
        }
    }

    pub fn register_indicator(&mut self, plugin: Box<dyn IndicatorPlugin<K>>) {
        self.register_indicators(std::iter::once(plugin));
    }

    /// Activate `keys` and recompute each against `bars`. Unregistered keys are ignored.
    pub fn show_indicators(&mut self, keys: impl IntoIterator<Item = K>, bars: &[Bar]) {
        if self.is_disposed() {
            return;
        }
        for key in keys {
            let Some(plugin) = self.registry.get_mut(&key) else {
                debug!("show ignored for unregistered indicator {key:?}");
                continue;
            };
            plugin.compute_data(bars);
            self.active.insert(key);
        }
    }

    pub fn show_indicator(&mut self, key: K, bars: &[Bar]) {
        self.show_indicators(std::iter::once(key), bars);
    }

    /// Deactivate `keys`. Computed buffers are kept for cheap re-activation.
    pub fn hide_indicators(&mut self, keys: impl IntoIterator<Item = K>) {
        for key in keys {
            self.active.remove(&key);
        }
    }

    pub fn hide_indicator(&mut self, key: K) {
        self.hide_indicators(std::iter::once(key));
    }

    /// Flip `key` between active and hidden and return the new state.
    ///
    /// Unlike [`Self::show_indicators`] this does not recompute: a plugin
    /// toggled back on draws whatever its last `compute_data` produced until
    /// the host calls [`Self::compute_all`].
    pub fn toggle_indicator(&mut self, key: K) -> bool {
        if self.is_disposed() || !self.registry.contains_key(&key) {
            return false;
        }
        if self.active.remove(&key) {
            false
        } else {
            self.active.insert(key);
            true
        }
    }

    /// Recompute every active plugin; call whenever the bar set changes.
    pub fn compute_all(&mut self, bars: &[Bar]) {
        if self.is_disposed() {
            return;
        }
        for key in &self.active {
            if let Some(plugin) = self.registry.get_mut(key) {
                plugin.compute_data(bars);
            }
        }
    }

    /// Union of the active plugins' ranges over `[start_index, end_index]`.
    /// `None` when nothing is active; [`MinMax::SENTINEL`] when every active
    /// plugin is empty over the range.
    pub fn min_max_for_range(&self, start_index: usize, end_index: usize) -> Option<MinMax> {
        if self.active.is_empty() {
            return None;
        }
        let merged = self
            .active
            .iter()
            .filter_map(|key| self.registry.get(key))
            .filter_map(|p| p.try_min_max_in_range(start_index, end_index))
            .reduce(MinMax::union);
        Some(merged.unwrap_or(MinMax::SENTINEL))
    }

    /// Draw every active plugin in order, resetting the shared path after each.
    pub fn draw_all(&mut self, surface: &mut dyn DrawingSurface, params: &DrawParams) {
        let Some(path) = self.path.as_mut() else { return };
        for key in &self.active {
            if let Some(plugin) = self.registry.get(key) {
                plugin.draw(surface, path, params);
                path.reset();
            }
        }
    }

    /// Dispose every registered plugin, clear all state and release the shared path.
    pub fn dispose(&mut self) {
        for (key, plugin) in self.registry.iter_mut() {
            debug!("disposing indicator {key:?}");
            plugin.dispose();
        }
        self.registry.clear();
        self.active.clear();
        self.path = None;
    }

    pub fn active_indicators(&self) -> &BTreeSet<K> { &self.active }

    pub fn is_active(&self, key: K) -> bool { self.active.contains(&key) }

    pub fn is_registered(&self, key: K) -> bool { self.registry.contains_key(&key) }

    pub fn len(&self) -> usize { self.registry.len() }

    pub fn is_empty(&self) -> bool { self.registry.is_empty() }

    pub fn is_disposed(&self) -> bool { self.path.is_none() }
}

impl IndicatorBuilder<IndicatorKey> {
    /// Builder with EMA9/20/50 registered (all hidden).
    pub fn with_default_ema(stroke_width: f32, theme: &Theme) -> Self {
        let mut builder = Self::new();
        builder.register_indicators(IndicatorKey::ALL.into_iter().map(|key| {
            Box::new(EmaIndicator::for_key(key, theme.color_for(key), stroke_width)) as Box<dyn IndicatorPlugin<IndicatorKey>>
        }));
        builder
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::RecordingSurface;

    struct FixedRange {
        key: IndicatorKey,
        range: Option<MinMax>,
    }

    impl IndicatorPlugin<IndicatorKey> for FixedRange {
        fn key(&self) -> IndicatorKey { self.key }
        fn compute_data(&mut self, _bars: &[Bar]) {}
        fn try_min_max_in_range(&self, _s: usize, _e: usize) -> Option<MinMax> { self.range }
        fn draw(&self, _surface: &mut dyn DrawingSurface, _path: &mut skia::Path, _params: &DrawParams) {}
        fn dispose(&mut self) {}
    }

    fn fixed(key: IndicatorKey, range: Option<MinMax>) -> Box<dyn IndicatorPlugin<IndicatorKey>> {
        Box::new(FixedRange { key, range })
    }

    #[test]
    fn aggregates_union_of_active_ranges() {
        let mut b = IndicatorBuilder::new();
        b.register_indicators([
            fixed(IndicatorKey::Ema9, Some(MinMax::new(5.0, 10.0))),
            fixed(IndicatorKey::Ema20, Some(MinMax::new(2.0, 8.0))),
        ]);
        assert_eq!(b.min_max_for_range(0, 10), None);
        b.show_indicators([IndicatorKey::Ema9, IndicatorKey::Ema20], &[]);
        assert_eq!(b.min_max_for_range(0, 10), Some(MinMax::new(2.0, 10.0)));
    }

    #[test]
    fn all_empty_active_plugins_fall_back_to_sentinel() {
        let mut b = IndicatorBuilder::new();
        b.register_indicator(fixed(IndicatorKey::Ema50, None));
        b.show_indicator(IndicatorKey::Ema50, &[]);
        assert_eq!(b.min_max_for_range(0, 3), Some(MinMax::SENTINEL));
    }

    #[test]
    fn unregistered_keys_are_ignored() {
        let mut b = IndicatorBuilder::new();
        b.show_indicator(IndicatorKey::Ema9, &[]);
        assert!(!b.toggle_indicator(IndicatorKey::Ema9));
        b.hide_indicator(IndicatorKey::Ema9);
        assert!(b.active_indicators().is_empty());
    }

    #[test]
    fn reregistration_replaces_mapping() {
        let mut b = IndicatorBuilder::new();
        b.register_indicator(fixed(IndicatorKey::Ema9, Some(MinMax::new(1.0, 2.0))));
        b.register_indicator(fixed(IndicatorKey::Ema9, Some(MinMax::new(3.0, 4.0))));
        assert_eq!(b.len(), 1);
        b.show_indicator(IndicatorKey::Ema9, &[]);
        assert_eq!(b.min_max_for_range(0, 0), Some(MinMax::new(3.0, 4.0)));
    }

    #[test]
    fn dispose_clears_everything() {
        let mut b = IndicatorBuilder::with_default_ema(1.0, &Theme::dark());
        b.show_indicators(IndicatorKey::ALL, &[Bar::new(0, 1.0, 1.0, 1.0, 1.0)]);
        b.dispose();
        assert!(b.is_empty());
        assert!(b.active_indicators().is_empty());
        assert!(b.is_disposed());

        let mut surface = RecordingSurface::new();
        let params = DrawParams {
            candle_region_height: 10.0,
            candle_width: 1.0,
            start_index: 0,
            end_index: 0,
            stride: 1.0,
            offset_x: 0.0,
            min_price: 0.0,
            max_price: 2.0,
        };
        b.draw_all(&mut surface, &params);
        assert_eq!(surface.call_count(), 0);

        // Nothing registered or shown after dispose may stretch the host's range.
        b.register_indicator(Box::new(EmaIndicator::for_key(IndicatorKey::Ema9, Theme::dark().ema9, 1.0)));
        b.show_indicator(IndicatorKey::Ema9, &[Bar::new(0, 5.0, 5.0, 5.0, 5.0)]);
        assert!(!b.toggle_indicator(IndicatorKey::Ema9));
        b.compute_all(&[Bar::new(0, 5.0, 5.0, 5.0, 5.0)]);
        assert_eq!(b.len(), 0);
        assert_eq!(b.min_max_for_range(0, 2), None);
        b.draw_all(&mut surface, &params);
        assert_eq!(surface.call_count(), 0);
        b.dispose();
    }
}
