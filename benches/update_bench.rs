use criterion::{BatchSize, BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use fragment_sieve::prelude::*;

/// A row of `n` quads cut horizontally through every element.
fn cut_strip(n: u32) -> TopologyDriver {
    let top = |i: u32| n + 1 + i;
    let mut driver = TopologyDriver::new();
    driver
        .add_2d_elements((0..n).map(|i| [i, i + 1, top(i + 1), top(i)]))
        .expect("strip elements");
    driver.update_edge_neighbors().expect("neighbors");
    driver.init_crack_tip_topology().expect("crack tips");
    driver
        .mark_edge_cut(ElementId::new(0), 3, 0.5)
        .expect("entry cut");
    for i in 0..n {
        driver
            .mark_edge_cut(ElementId::new(i), 1, 0.5)
            .expect("crossing cut");
    }
    driver
}

fn bench_topology_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("topology_update");

    for &n in &[16u32, 128, 512] {
        group.bench_with_input(BenchmarkId::new("neighbors", n), &n, |b, &n| {
            let mut driver = cut_strip(n);
            b.iter(|| {
                driver.update_edge_neighbors().expect("neighbors");
                black_box(driver.num_elements());
            });
        });

        group.bench_with_input(BenchmarkId::new("split_and_connect", n), &n, |b, &n| {
            b.iter_batched(
                || cut_strip(n),
                |mut driver| {
                    driver
                        .run_topology_update(TopologyUpdateOptions::default())
                        .expect("update");
                    black_box(driver.new_nodes().len());
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_topology_update);
criterion_main!(benches);
