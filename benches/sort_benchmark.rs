use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use fpsort::common::io::FileData;
use fpsort::sort::{FileMeta, LineIndex, PrefixSorter, TieBreak, build_pool, count_lines};

/// Log-like lines: a timestamp prefix followed by a varying payload.
fn generate_lines(lines: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(lines * 48);
    let mut state = 0x2545F4914F6CDD1Du64;
    for i in 0..lines {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        let secs = state % 86_400;
        data.extend_from_slice(
            format!(
                "2024-01-01 {:02}:{:02}:{:02} worker-{} request {}\n",
                secs / 3600,
                (secs / 60) % 60,
                secs % 60,
                state % 64,
                i
            )
            .as_bytes(),
        );
    }
    data
}

fn bench_count_lines(c: &mut Criterion) {
    let mut group = c.benchmark_group("count_lines");
    for size_mb in [1, 10] {
        let data = generate_lines(size_mb * 1024 * 1024 / 48);
        group.bench_with_input(
            BenchmarkId::new("memchr", format!("{}MB", size_mb)),
            &data,
            |b, data| b.iter(|| count_lines(black_box(data))),
        );
    }
    group.finish();
}

fn bench_build_index(c: &mut Criterion) {
    let files: Vec<FileMeta> = (0..8)
        .map(|i| FileMeta::new(format!("f{}", i), FileData::Owned(generate_lines(100_000)), false))
        .collect();
    let pool = build_pool(8).unwrap();
    c.bench_function("build_index_8x100k", |b| {
        b.iter(|| LineIndex::build(black_box(&files), &pool).len())
    });
}

fn bench_prefix_sort(c: &mut Criterion) {
    let data = generate_lines(500_000);
    let files = vec![FileMeta::new("bench", FileData::Owned(data), false)];
    let pool = build_pool(8).unwrap();
    let base = LineIndex::build(&files, &pool);

    let mut group = c.benchmark_group("prefix_sort_500k");
    for (name, k, tie_break) in [
        ("k8", 8, TieBreak::Unspecified),
        ("k19", 19, TieBreak::Unspecified),
        ("k19_stable", 19, TieBreak::InputOrder),
        ("k19_full_line", 19, TieBreak::FullLine),
    ] {
        let sorter = PrefixSorter::new(k, tie_break);
        group.bench_function(name, |b| {
            b.iter(|| {
                let mut index = LineIndex::from(base.lines().to_vec());
                pool.install(|| sorter.sort(&mut index));
                black_box(index.len())
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_count_lines, bench_build_index, bench_prefix_sort);
criterion_main!(benches);
