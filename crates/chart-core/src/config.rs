// File: crates/chart-core/src/config.rs
// Summary: Engine settings (animation, pan momentum, indicator style, theme) loadable from JSON.

use std::path::Path;

use serde::{Deserialize, Serialize};
use skia_safe as skia;

use crate::builder::IndicatorBuilder;
use crate::ema::DEFAULT_STROKE_WIDTH;
use crate::error::Result;
use crate::motion::{DecayConfig, SpringConfig, TimingConfig};
use crate::theme::{self, Theme};
use crate::types::IndicatorKey;

/// Pan momentum deceleration used by the host chart.
pub const PAN_DECELERATION: f64 = 0.9975;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub animation: AnimationSettings,
    pub pan_deceleration: f64,
    pub indicators: IndicatorStyle,
    pub theme: ThemeSettings,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            animation: AnimationSettings::default(),
            pan_deceleration: PAN_DECELERATION,
            indicators: IndicatorStyle::default(),
            theme: ThemeSettings::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationSettings {
    pub spring: SpringConfig,
    pub timing: TimingConfig,
}

impl Default for AnimationSettings {
    fn default() -> Self { Self { spring: SpringConfig::chart_range(), timing: TimingConfig::default() } }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorStyle {
    pub stroke_width: f32,
    /// Indicators shown when the chart is first built.
    pub initially_active: [bool; 3],
}

impl Default for IndicatorStyle {
    fn default() -> Self { Self { stroke_width: DEFAULT_STROKE_WIDTH, initially_active: [false; 3] } }
}

/// Named base palette plus optional ARGB (`0xAARRGGBB`) overrides.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeSettings {
    pub name: String,
    pub background: Option<u32>,
    pub ema9: Option<u32>,
    pub ema20: Option<u32>,
    pub ema50: Option<u32>,
}

impl Default for ThemeSettings {
    fn default() -> Self {
        Self { name: "dark".to_string(), background: None, ema9: None, ema20: None, ema50: None }
    }
}

impl ThemeSettings {
    pub fn resolve(&self) -> Theme {
        let mut t = theme::find(&self.name);
        let apply = |slot: &mut skia::Color, argb: Option<u32>| {
            if let Some(argb) = argb {
                *slot = skia::Color::new(argb);
            }
        };
        apply(&mut t.background, self.background);
        apply(&mut t.ema9, self.ema9);
        apply(&mut t.ema20, self.ema20);
        apply(&mut t.ema50, self.ema50);
        t
    }
}

impl EngineConfig {
    pub fn from_json_str(s: &str) -> Result<Self> { Ok(serde_json::from_str(s)?) }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let cfg = Self::from_json_str(&text)?;
        log::debug!("loaded engine config from {}", path.as_ref().display());
        Ok(cfg)
    }

    pub fn to_json_string(&self) -> Result<String> { Ok(serde_json::to_string_pretty(self)?) }

    pub fn theme(&self) -> Theme { self.theme.resolve() }

    /// Momentum settings for a pan fling starting at `velocity` (units per second).
    pub fn pan_decay(&self, velocity: f64) -> DecayConfig {
        DecayConfig { velocity, deceleration: self.pan_deceleration, ..DecayConfig::default() }
    }

    /// Builder with the EMA set registered and the configured defaults shown.
    pub fn indicator_builder(&self) -> IndicatorBuilder<IndicatorKey> {
        let mut builder = IndicatorBuilder::with_default_ema(self.indicators.stroke_width, &self.theme());
        let shown = IndicatorKey::ALL
            .into_iter()
            .zip(self.indicators.initially_active)
            .filter_map(|(key, on)| on.then_some(key));
        // No bars yet; activation only.
        builder.show_indicators(shown, &[]);
        builder
    }
}
