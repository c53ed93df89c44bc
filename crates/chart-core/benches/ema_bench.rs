use chart_core::{Bar, DrawParams, EmaIndicator, IndicatorBuilder, IndicatorKey, IndicatorPlugin, RecordingSurface, Theme};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn gen_bars(n: usize) -> Vec<Bar> {
    let mut out = Vec::with_capacity(n);
    let mut last = 100.0f64;
    for i in 0..n {
        let t = i as f64;
        let close = last + (t * 0.013).sin() * 0.8 + (t * 0.0007).cos() * 0.3;
        let open = last;
        out.push(Bar::new(i as i64 * 60, open, open.max(close) + 0.4, open.min(close) - 0.4, close));
        last = close;
    }
    out
}

fn bench_compute(c: &mut Criterion) {
    let mut group = c.benchmark_group("ema_compute");
    for &n in &[10_000usize, 200_000usize] {
        let bars = gen_bars(n);
        group.bench_function(format!("ema50_{n}"), |b| {
            let mut ema = EmaIndicator::for_key(IndicatorKey::Ema50, Theme::dark().ema50, 1.0);
            b.iter(|| {
                ema.compute_data(black_box(&bars));
                black_box(ema.values().len());
            });
        });
    }
    group.finish();
}

fn bench_builder_frame(c: &mut Criterion) {
    let bars = gen_bars(50_000);
    let mut builder = IndicatorBuilder::with_default_ema(4.0 / 3.0, &Theme::dark());
    builder.show_indicators(IndicatorKey::ALL, &bars);
    let params = DrawParams {
        candle_region_height: 600.0,
        candle_width: 6.0,
        start_index: 40_000,
        end_index: 40_199,
        stride: 8.0,
        offset_x: -320_000.0,
        min_price: 0.0,
        max_price: 1.0,
    };

    c.bench_function("builder_range_and_draw_200", |b| {
        b.iter(|| {
            let mut p = params;
            if let Some(mm) = builder.min_max_for_range(p.start_index, p.end_index) {
                p.min_price = mm.min;
                p.max_price = mm.max;
            }
            let mut surface = RecordingSurface::new();
            builder.draw_all(&mut surface, black_box(&p));
            black_box(surface.call_count());
        });
    });
}

criterion_group!(benches, bench_compute, bench_builder_frame);
criterion_main!(benches);
