// File: crates/chart-core/src/theme.rs
// Summary: Light/Dark palettes for indicator strokes and the chart background.

use skia_safe as skia;

use crate::types::IndicatorKey;

#[derive(Clone, Copy, Debug)]
pub struct Theme {
    pub name: &'static str,
    pub background: skia::Color,
    pub candle_up: skia::Color,
    pub candle_down: skia::Color,
    pub ema9: skia::Color,
    pub ema20: skia::Color,
    pub ema50: skia::Color,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            name: "dark",
            background: skia::Color::from_argb(255, 0x14, 0x16, 0x19),
            candle_up: skia::Color::from_argb(255, 0x28, 0xa7, 0x45),
            candle_down: skia::Color::from_argb(255, 0xd7, 0x3a, 0x49),
            ema9: skia::Color::from_argb(255, 0x3e, 0xcf, 0xff),
            ema20: skia::Color::from_argb(255, 0xff, 0xa4, 0x4f),
            ema50: skia::Color::from_argb(255, 0xc0, 0x7a, 0xff),
        }
    }

    pub fn light() -> Self {
        Self {
            name: "light",
            background: skia::Color::from_argb(255, 250, 250, 252),
            candle_up: skia::Color::from_argb(255, 0x1e, 0x8e, 0x3e),
            candle_down: skia::Color::from_argb(255, 0xc6, 0x28, 0x28),
            ema9: skia::Color::from_argb(255, 0x1a, 0x8c, 0xd8),
            ema20: skia::Color::from_argb(255, 0xe0, 0x7b, 0x1a),
            ema50: skia::Color::from_argb(255, 0x8a, 0x3f, 0xd1),
        }
    }

    pub fn color_for(&self, key: IndicatorKey) -> skia::Color {
        match key {
            IndicatorKey::Ema9 => self.ema9,
            IndicatorKey::Ema20 => self.ema20,
            IndicatorKey::Ema50 => self.ema50,
        }
    }
}

impl Default for Theme {
    fn default() -> Self { Theme::dark() }
}

/// Built-in palettes.
pub fn presets() -> [Theme; 2] { [Theme::dark(), Theme::light()] }

/// Palette named `name` (case-insensitive), or dark when unknown.
pub fn find(name: &str) -> Theme {
    presets().into_iter().find(|t| t.name.eq_ignore_ascii_case(name)).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive_with_dark_fallback() {
        assert_eq!(find("LIGHT").name, "light");
        assert_eq!(find("solarized").name, "dark");
        assert_eq!(Theme::light().color_for(IndicatorKey::Ema20), Theme::light().ema20);
    }
}
