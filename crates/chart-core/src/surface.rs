// File: crates/chart-core/src/surface.rs
// Summary: Drawing-surface capability consumed by indicator plugins, with the Skia canvas adapter.

use skia_safe as skia;

/// The subset of a 2D canvas the indicator pipeline needs.
pub trait DrawingSurface {
    fn stroke_path(&mut self, path: &skia::Path, paint: &skia::Paint);
}

/// Anti-aliased round-capped stroke used for indicator polylines.
pub fn stroke_paint(color: skia::Color, stroke_width: f32) -> skia::Paint {
    let mut paint = skia::Paint::default();
    paint.set_anti_alias(true);
    paint.set_style(skia::paint::Style::Stroke);
    paint.set_stroke_width(stroke_width);
    paint.set_stroke_cap(skia::paint::Cap::Round);
    paint.set_stroke_join(skia::paint::Join::Round);
    paint.set_color(color);
    paint
}

/// Adapts a borrowed Skia canvas (raster or GPU backed).
pub struct SkiaSurface<'a> {
    canvas: &'a skia::Canvas,
}

impl<'a> SkiaSurface<'a> {
    pub fn new(canvas: &'a skia::Canvas) -> Self { Self { canvas } }

    pub fn canvas(&self) -> &skia::Canvas { self.canvas }
}

impl DrawingSurface for SkiaSurface<'_> {
    fn stroke_path(&mut self, path: &skia::Path, paint: &skia::Paint) {
        self.canvas.draw_path(path, paint);
    }
}

/// Stroke call captured by [`RecordingSurface`].
#[derive(Clone, Debug)]
pub struct StrokeRecord {
    pub points: Vec<(f32, f32)>,
    pub color: skia::Color,
    pub stroke_width: f32,
}

/// Surface that records stroke calls instead of rasterizing. Useful for
/// headless hosts and for asserting what a plugin drew.
#[derive(Default)]
pub struct RecordingSurface {
    pub strokes: Vec<StrokeRecord>,
}

impl RecordingSurface {
    pub fn new() -> Self { Self::default() }

    pub fn call_count(&self) -> usize { self.strokes.len() }
}

impl DrawingSurface for RecordingSurface {
    fn stroke_path(&mut self, path: &skia::Path, paint: &skia::Paint) {
        let points = (0..path.count_points())
            .filter_map(|i| path.get_point(i))
            .map(|p| (p.x, p.y))
            .collect();
        self.strokes.push(StrokeRecord {
            points,
            color: paint.color(),
            stroke_width: paint.stroke_width(),
        });
    }
}
