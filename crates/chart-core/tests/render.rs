// File: crates/chart-core/tests/render.rs
// Purpose: Draw active indicators into a Skia raster surface and check the decoded PNG.

use chart_core::{Bar, DrawParams, IndicatorBuilder, IndicatorKey, SkiaSurface, Theme};
use skia_safe as skia;

const W: i32 = 160;
const H: i32 = 100;

fn render_png(builder: &mut IndicatorBuilder, params: &DrawParams, theme: &Theme) -> anyhow::Result<Vec<u8>> {
    let mut surface =
        skia::surfaces::raster_n32_premul((W, H)).ok_or_else(|| anyhow::anyhow!("failed to create raster surface"))?;
    {
        let canvas = surface.canvas();
        canvas.clear(theme.background);
        let mut target = SkiaSurface::new(canvas);
        builder.draw_all(&mut target, params);
    }
    let image = surface.image_snapshot();
    let data = image
        .encode_to_data(skia::EncodedImageFormat::PNG)
        .ok_or_else(|| anyhow::anyhow!("encode PNG failed"))?;
    Ok(data.as_bytes().to_vec())
}

#[test]
fn flat_ema_draws_horizontal_line_in_theme_color() -> anyhow::Result<()> {
    let theme = Theme::dark();
    let bars: Vec<Bar> = (0..20).map(|i| Bar::new(i * 60, 50.0, 50.0, 50.0, 50.0)).collect();
    let mut builder = IndicatorBuilder::with_default_ema(3.0, &theme);
    builder.show_indicator(IndicatorKey::Ema9, &bars);

    // Price 50 in [0, 100] lands at mid-height.
    let params = DrawParams {
        candle_region_height: H as f32,
        candle_width: 6.0,
        start_index: 0,
        end_index: 19,
        stride: 8.0,
        offset_x: 0.0,
        min_price: 0.0,
        max_price: 100.0,
    };
    let bytes = render_png(&mut builder, &params, &theme)?;
    assert!(bytes.starts_with(&[137, 80, 78, 71]), "should be PNG header");

    let img = image::load_from_memory(&bytes)?.to_rgba8();
    assert_eq!((img.width(), img.height()), (W as u32, H as u32));

    let line = img.get_pixel(80, 50).0;
    let want = theme.ema9;
    assert_eq!((line[0], line[1], line[2]), (want.r(), want.g(), want.b()));

    let bg = img.get_pixel(80, 10).0;
    let want = theme.background;
    assert_eq!((bg[0], bg[1], bg[2], bg[3]), (want.r(), want.g(), want.b(), 255));
    Ok(())
}

#[test]
fn hidden_indicators_leave_the_canvas_untouched() -> anyhow::Result<()> {
    let theme = Theme::light();
    let bars: Vec<Bar> = (0..10).map(|i| Bar::new(i * 60, 10.0, 12.0, 9.0, 11.0)).collect();
    let mut builder = IndicatorBuilder::with_default_ema(2.0, &theme);
    builder.show_indicators(IndicatorKey::ALL, &bars);
    builder.hide_indicators(IndicatorKey::ALL);

    let params = DrawParams {
        candle_region_height: H as f32,
        candle_width: 10.0,
        start_index: 0,
        end_index: 9,
        stride: 16.0,
        offset_x: 0.0,
        min_price: 9.0,
        max_price: 12.0,
    };
    let img = image::load_from_memory(&render_png(&mut builder, &params, &theme)?)?.to_rgba8();
    let bg = theme.background;
    assert!(img.pixels().all(|p| p.0 == [bg.r(), bg.g(), bg.b(), 255]));
    Ok(())
}
