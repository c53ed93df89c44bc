// File: crates/chart-core/src/plugin.rs
// Summary: Indicator plugin contract: derived series computation, range query, drawing, disposal.

use skia_safe as skia;

use crate::series::Bar;
use crate::surface::DrawingSurface;
use crate::types::{DrawParams, MinMax};

/// A derived-series indicator managed by [`crate::IndicatorBuilder`].
///
/// Plugins own their computed buffer and any paint objects they create. The
/// builder guarantees calls arrive sequentially on the rendering context.
pub trait IndicatorPlugin<K> {
    /// Stable identity; the builder keys its registry on this.
    fn key(&self) -> K;

    /// Recompute the whole derived buffer from `bars`. Empty input leaves an empty buffer.
    fn compute_data(&mut self, bars: &[Bar]);

    /// Min/max over `[start_index, end_index]` inclusive, or `None` when the
    /// range is reversed or the buffer has nothing in it.
    fn try_min_max_in_range(&self, start_index: usize, end_index: usize) -> Option<MinMax>;

    /// Same as [`Self::try_min_max_in_range`] but collapses the empty case to
    /// [`MinMax::SENTINEL`].
    fn min_max_in_range(&self, start_index: usize, end_index: usize) -> MinMax {
        self.try_min_max_in_range(start_index, end_index).unwrap_or(MinMax::SENTINEL)
    }

    /// Stroke the indicator into `surface`. `path` is scratch space owned by
    /// the caller and reset after this returns; do not keep it.
    fn draw(&self, surface: &mut dyn DrawingSurface, path: &mut skia::Path, params: &DrawParams);

    /// Release paint resources. Called once at teardown; drawing afterwards is a no-op.
    fn dispose(&mut self);
}
