// File: crates/chart-core/src/lib.rs
// Summary: Core library entry point; exports the animator, indicator pipeline and time-label API.

pub mod animator;
pub mod builder;
pub mod config;
pub mod ema;
pub mod error;
pub mod frame;
pub mod motion;
pub mod plugin;
pub mod series;
pub mod surface;
pub mod theme;
pub mod time_format;
pub mod types;

pub use animator::{Animator, FinishCallback};
pub use builder::IndicatorBuilder;
pub use config::{AnimationSettings, EngineConfig, IndicatorStyle, ThemeSettings};
pub use ema::{ema_closes, EmaIndicator, DEFAULT_STROKE_WIDTH};
pub use error::{ChartError, Result};
pub use frame::{FrameClock, FrameId, ManualFrameClock, PrimedClock};
pub use motion::{AnimatedValue, DecayConfig, Easing, SpringConfig, TimingConfig};
pub use plugin::IndicatorPlugin;
pub use series::{Bar, DerivedSeries};
pub use surface::{stroke_paint, DrawingSurface, RecordingSurface, SkiaSurface, StrokeRecord};
pub use theme::Theme;
pub use time_format::{locale_for, HourCycle, TimeFormatOptions, TimeFormatter, TimeZoneChoice};
pub use types::{DrawParams, IndicatorKey, MinMax};
