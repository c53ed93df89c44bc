// File: crates/demo/src/main.rs
// Summary: Demo host: loads OHLC CSV (or synthesizes bars), springs the price range to the
//          visible window with the Animator, then renders candles plus indicator overlays to PNG.

use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{Context, Result};
use chart_core::{
    AnimatedValue, Animator, Bar, DrawParams, EngineConfig, IndicatorKey, ManualFrameClock, SkiaSurface, SpringConfig,
    Theme, TimeFormatter,
};
use chart_plugins_example::{study_builder, PriceLevelBuilder, PriceLevels, StudyKey};
use log::{debug, info, warn};
use skia_safe as skia;

const WIDTH: i32 = 1200;
const HEIGHT: i32 = 600;
const VISIBLE_BARS: usize = 120;
const FRAME_MS: f64 = 1000.0 / 60.0;
/// Vertical padding above and below the visible price range, as a share of it.
const PADDING_RATIO: f64 = 0.1;

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let bars = match args.next() {
        Some(raw) => {
            let (path, used_alt) = resolve_path(&raw)?;
            info!("using input file {}{}", path.display(), if used_alt { " (extension swapped)" } else { "" });
            load_ohlc_csv(&path).with_context(|| format!("failed to load CSV '{}'", path.display()))?
        }
        None => {
            info!("no input file; synthesizing bars");
            synthetic_bars(600)
        }
    };
    if bars.is_empty() {
        anyhow::bail!("no bars loaded; check headers/delimiter");
    }
    let config = match args.next() {
        Some(p) => EngineConfig::from_json_file(&p).with_context(|| format!("reading config '{p}'"))?,
        None => EngineConfig::default(),
    };
    let theme = config.theme();
    println!("Loaded {} bars", bars.len());

    let mut studies = study_builder(&[30], skia::Color::from_argb(255, 0xe6, 0xe6, 0xe6), config.indicators.stroke_width, &theme);
    studies.show_indicators(
        [StudyKey::Ema(IndicatorKey::Ema9), StudyKey::Ema(IndicatorKey::Ema20), StudyKey::Sma(30)],
        &bars,
    );
    for (key, on) in IndicatorKey::ALL.into_iter().zip(config.indicators.initially_active) {
        if on {
            studies.show_indicator(StudyKey::Ema(key), &bars);
        }
    }

    let end_index = bars.len() - 1;
    let start_index = bars.len().saturating_sub(VISIBLE_BARS);

    // Hypothetical long position opened at the last close.
    let entry = bars[end_index].close;
    let mut levels = PriceLevelBuilder::new(&theme);
    levels.update_data(Some(&PriceLevels {
        liquidation: Some(entry * 0.9),
        stop_loss: Some(entry * 0.97),
        take_profit: Some(entry * 1.05),
    }));

    // Start from the full-history range and spring to the visible window.
    let (all_lo, all_hi) = price_range(&bars, 0, end_index);
    let (lo, hi) = visible_range(&bars, start_index, end_index, &studies, &levels);
    let min_price = AnimatedValue::new(all_lo);
    let max_price = AnimatedValue::new(all_hi);

    let clock = ManualFrameClock::new();
    let frames = Rc::new(Cell::new(0u32));
    let counter = frames.clone();
    let animator = Animator::new(move || counter.set(counter.get() + 1), clock.clone());

    let spring: SpringConfig = config.animation.spring.normalized(lo - all_lo, hi - all_hi);
    let settled = Rc::new(Cell::new(None));
    let flag = settled.clone();
    animator.spring_many(
        &[min_price.clone(), max_price.clone()],
        &[lo, hi],
        spring,
        Some(Box::new(move |finished| flag.set(Some(finished)))),
    )?;
    animator.run_after_animations(|| debug!("price range settled"));

    let mut now = 0.0;
    while clock.take_pending().is_some() {
        animator.tick(now);
        now += FRAME_MS;
        if now > 10_000.0 {
            warn!("price range still animating after 10s; stopping");
            animator.dispose(true);
            break;
        }
    }
    println!(
        "Price range [{:.4}, {:.4}] settled={:?} after {} frames ({} frame requests)",
        min_price.get(),
        max_price.get(),
        settled.get(),
        frames.get(),
        clock.requests()
    );

    let stride = WIDTH as f32 / VISIBLE_BARS as f32;
    let params = DrawParams {
        candle_region_height: HEIGHT as f32,
        candle_width: stride * 0.7,
        start_index,
        end_index,
        stride,
        offset_x: -(start_index as f32) * stride,
        min_price: min_price.get(),
        max_price: max_price.get(),
    };

    let mut surface =
        skia::surfaces::raster_n32_premul((WIDTH, HEIGHT)).ok_or_else(|| anyhow::anyhow!("failed to create raster surface"))?;
    {
        let canvas = surface.canvas();
        canvas.clear(theme.background);
        draw_candles(canvas, &bars, &params, &theme);
        let mut target = SkiaSurface::new(canvas);
        studies.draw_all(&mut target, &params);
        let placed = levels.draw_lines(&mut target, &params);
        debug!("placed {} price level labels", placed.len());
    }
    let image = surface.image_snapshot();
    let data = image
        .encode_to_data(skia::EncodedImageFormat::PNG)
        .ok_or_else(|| anyhow::anyhow!("encode PNG failed"))?;
    let out = out_path(Path::new("target/out"), "indicators")?;
    std::fs::write(&out, data.as_bytes()).with_context(|| format!("writing {}", out.display()))?;
    println!("Wrote {}", out.display());

    let labels = TimeFormatter::new();
    println!("Window: {} .. {}", labels.format(bars[start_index].timestamp), labels.format(bars[end_index].timestamp));

    studies.dispose();
    levels.dispose();
    animator.dispose(true);
    Ok(())
}

/// Visible price range including active studies and price levels, padded vertically.
fn visible_range(
    bars: &[Bar],
    start: usize,
    end: usize,
    studies: &chart_core::IndicatorBuilder<StudyKey>,
    levels: &PriceLevelBuilder,
) -> (f64, f64) {
    let (mut lo, mut hi) = price_range(bars, start, end);
    for mm in [studies.min_max_for_range(start, end), levels.min_max_for_range(start, end)].into_iter().flatten() {
        lo = lo.min(mm.min);
        hi = hi.max(mm.max);
    }
    let pad = (hi - lo) * PADDING_RATIO;
    (lo - pad, hi + pad)
}

fn price_range(bars: &[Bar], start: usize, end: usize) -> (f64, f64) {
    bars[start..=end].iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), b| (lo.min(b.low), hi.max(b.high)))
}

fn draw_candles(canvas: &skia::Canvas, bars: &[Bar], p: &DrawParams, theme: &Theme) {
    let mut paint = skia::Paint::default();
    paint.set_anti_alias(true);
    paint.set_stroke_width(1.0);
    for i in p.start_index..=p.end_index {
        let b = &bars[i];
        paint.set_color(if b.is_up() { theme.candle_up } else { theme.candle_down });
        let cx = p.x_for_index(i);
        canvas.draw_line((cx, p.y_for_price(b.high)), (cx, p.y_for_price(b.low)), &paint);
        let (top, bottom) = (p.y_for_price(b.open.max(b.close)), p.y_for_price(b.open.min(b.close)));
        let left = cx - p.candle_width * 0.5;
        let rect = skia::Rect::from_ltrb(left, top, left + p.candle_width, bottom.max(top + 1.0));
        canvas.draw_rect(rect, &paint);
    }
    debug!("drew {} candles on {} background", p.end_index + 1 - p.start_index, theme.name);
}

fn synthetic_bars(n: usize) -> Vec<Bar> {
    let mut out = Vec::with_capacity(n);
    let mut last = 100.0f64;
    for i in 0..n {
        let t = i as f64;
        let close = (last + (t * 0.11).sin() * 1.6 + (t * 0.017).cos() * 0.9).max(1.0);
        let open = last;
        let wick = 0.4 + (t * 0.7).sin().abs();
        out.push(Bar::new(1_700_000_000 + i as i64 * 3600, open, open.max(close) + wick, open.min(close) - wick, close));
        last = close;
    }
    out
}

/// Resolve path, trying .csv/.cvs swap if needed.
/// Returns (actual_path, used_alt)
fn resolve_path(raw: &str) -> Result<(PathBuf, bool)> {
    let p = Path::new(raw);
    if p.exists() {
        return Ok((p.to_path_buf(), false));
    }
    if let Some(alt) = swap_ext(p) {
        if alt.exists() {
            return Ok((alt, true));
        }
    }
    anyhow::bail!("file not found: {}", p.display());
}

fn swap_ext(p: &Path) -> Option<PathBuf> {
    let mut alt = p.to_path_buf();
    let ext = p.extension()?.to_string_lossy().to_lowercase();
    match ext.as_str() {
        "cvs" => alt.set_extension("csv"),
        "csv" => alt.set_extension("cvs"),
        _ => return None,
    };
    Some(alt)
}

/// <dir>/chart_<suffix>.png, creating `dir` if needed.
fn out_path(dir: &Path, suffix: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating output directory {}", dir.display()))?;
    Ok(dir.join(format!("chart_{suffix}.png")))
}

/// Load Binance-like OHLC CSV. Rows missing any price column are skipped.
fn load_ohlc_csv(path: &Path) -> Result<Vec<Bar>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;

    let headers = rdr.headers()?.iter().map(|h| h.to_lowercase()).collect::<Vec<_>>();
    debug!("headers: {headers:?}");
    let idx = |names: &[&str]| headers.iter().position(|h| names.contains(&h.as_str()));

    let i_time = idx(&["time", "timestamp", "open_time", "date", "datetime"]);
    let i_open = idx(&["open", "o"]);
    let i_high = idx(&["high", "h"]);
    let i_low = idx(&["low", "l"]);
    let i_close = idx(&["close", "c", "adj_close", "close_price"]);
    if i_open.is_none() || i_high.is_none() || i_low.is_none() || i_close.is_none() {
        warn!("could not find one of open/high/low/close columns");
    }

    let mut out = Vec::new();
    for (row, rec) in rdr.records().enumerate() {
        let rec = rec?;
        let parse = |i: Option<usize>| i.and_then(|ix| rec.get(ix)).and_then(|s| s.trim().parse::<f64>().ok());
        let t = i_time.and_then(|ix| rec.get(ix)).and_then(parse_timestamp).unwrap_or(row as i64);
        if let (Some(o), Some(h), Some(l), Some(c)) = (parse(i_open), parse(i_high), parse(i_low), parse(i_close)) {
            match Bar::try_new(t, o, h, l, c) {
                Ok(bar) => out.push(bar),
                Err(why) => warn!("row {row}: {why}; skipped"),
            }
        }
    }
    Ok(out)
}

/// Unix seconds from epoch seconds or milliseconds.
fn parse_timestamp(s: &str) -> Option<i64> {
    let n = s.trim().parse::<i64>().ok()?;
    Some(if n > 10_i64.pow(12) { n / 1000 } else { n })
}
