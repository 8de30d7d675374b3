use criterion::{Criterion, criterion_group, criterion_main};
use memprobe::memory::measure_allocations;
use memprobe::returns::{ReturnStrategy, Sink};
use std::hint::black_box;

const ALLOC_SAMPLE_ITERATIONS: u64 = 100_000;

fn bench_return_strategies(c: &mut Criterion) {
    let mut group = c.benchmark_group("return_strategies");
    let mut sink = Sink::default();

    for strategy in ReturnStrategy::ALL {
        group.bench_function(strategy.name(), |b| {
            b.iter(|| strategy.run(&mut sink));
        });
    }

    group.finish();

    println!("allocations per iteration:");
    for strategy in ReturnStrategy::ALL {
        let per_iter = measure_allocations(ALLOC_SAMPLE_ITERATIONS, || strategy.run(&mut sink));
        println!(
            "  {:<20} {:>6.2} allocs/op {:>8.1} B/op",
            strategy.name(),
            per_iter.allocations,
            per_iter.bytes
        );
    }

    black_box(sink.last());
}

criterion_group!(benches, bench_return_strategies);
criterion_main!(benches);
