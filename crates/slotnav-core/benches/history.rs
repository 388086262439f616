//! Benchmarks for back/forward history bookkeeping.

use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use slotnav_core::{Bookmark, ChangeType, History};
use slotnav_types::Location;

fn locations(n: usize) -> Vec<Location> {
    (0..n)
        .filter_map(|i| Location::parse(&format!("/data/dir_{i}")).ok())
        .collect()
}

/// A history built by `n` standard moves, and the location it ends at.
fn walked(locs: &[Location]) -> (History, Location) {
    let mut history = History::new();
    let mut current = Location::root();
    for next in locs {
        let last = Bookmark::new(current.clone());
        let _ = history.record(ChangeType::Standard, 0, Some(&current), Some(last), next);
        current = next.clone();
    }
    (history, current)
}

fn bench_standard(c: &mut Criterion) {
    let mut group = c.benchmark_group("history_standard");

    for n in [10, 100, 1_000] {
        let locs = locations(n);
        group.bench_function(BenchmarkId::new("record", n), |b| {
            b.iter(|| walked(&locs));
        });
    }

    group.finish();
}

fn bench_shift(c: &mut Criterion) {
    let mut group = c.benchmark_group("history_shift");

    for n in [10, 100, 1_000] {
        let locs = locations(n);
        let distance = n / 2;
        group.bench_function(BenchmarkId::new("back_half", n), |b| {
            b.iter_batched(
                || walked(&locs),
                |(mut history, current)| {
                    let target = history
                        .get(slotnav_core::Direction::Back, distance)
                        .map(|(_, bm)| bm.location().clone());
                    if let Some(target) = target {
                        let last = Bookmark::new(current.clone());
                        let _ = history.record(
                            ChangeType::Back,
                            distance,
                            Some(&current),
                            Some(last),
                            &target,
                        );
                    }
                    history
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_standard, bench_shift);
criterion_main!(benches);
