use chart_core::{AnimatedValue, Animator, ManualFrameClock, SpringConfig};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn bench_settle(c: &mut Criterion) {
    let mut group = c.benchmark_group("animator_settle");
    for &n in &[2usize, 64usize] {
        group.bench_function(format!("spring_{n}_targets"), |b| {
            let clock = ManualFrameClock::new();
            let animator = Animator::new(|| {}, clock.clone());
            let targets: Vec<AnimatedValue> = (0..n).map(|_| AnimatedValue::new(0.0)).collect();
            let mut flip = false;
            b.iter(|| {
                flip = !flip;
                let to = if flip { 100.0 } else { 0.0 };
                let values = vec![to; n];
                let _ = animator.spring_many(&targets, &values, SpringConfig::chart_range(), None);
                let mut now = 0.0;
                while clock.take_pending().is_some() {
                    animator.tick(now);
                    now += 1000.0 / 60.0;
                }
                black_box(targets[0].get());
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_settle);
criterion_main!(benches);
