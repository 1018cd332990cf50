//! Fill and selection performance benchmark
//!
//! Measures the per-tick cost of the fill simulator and of quality selection,
//! the two operations that run under the engine state lock.

use abrsim_common::TierLadder;
use abrsim_player::playback::{BufferStore, FillSimulator, QualitySelector, Timeline};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn bench_fill_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("fill_tick");

    for segments in [12usize, 120, 1200] {
        group.bench_with_input(BenchmarkId::from_parameter(segments), &segments, |b, &segments| {
            let mut sim = FillSimulator::seeded(42, 0.6, 0.2);
            let mut buffers = BufferStore::new(TierLadder::default(), Timeline::new(segments));

            b.iter(|| {
                if buffers.tiers().all(|tier| buffers.is_complete(tier)) {
                    buffers = BufferStore::new(TierLadder::default(), Timeline::new(segments));
                }
                black_box(sim.tick(black_box(&mut buffers)));
            });
        });
    }

    group.finish();
}

fn bench_selection(c: &mut Criterion) {
    let mut group = c.benchmark_group("selection");

    let ladder = TierLadder::default();
    let worst = ladder.worst();
    let best = ladder.best();
    let mut buffers = BufferStore::new(ladder, Timeline::new(12));
    for segment in 0..12 {
        buffers.set_filled(worst, segment);
    }

    group.bench_function("fallback_to_worst", |b| {
        let selector = QualitySelector::new(&buffers);
        b.iter(|| black_box(selector.select_for_playback(black_box(6), best)));
    });

    group.bench_function("preferred_hit", |b| {
        let selector = QualitySelector::new(&buffers);
        b.iter(|| black_box(selector.select_for_playback(black_box(6), worst)));
    });

    group.finish();
}

criterion_group!(benches, bench_fill_tick, bench_selection);
criterion_main!(benches);
