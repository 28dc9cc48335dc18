use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lossify::{Reducer, Sequitur, Strategy};

/// Generate repetitive text data
fn generate_repetitive_text(size: usize) -> String {
    let pattern = "the quick brown fox jumps over the lazy dog ";
    pattern.repeat(size / pattern.len())
}

/// Generate source code-like data
fn generate_source_code(size: usize) -> String {
    let patterns = [
        "fn main() {\n",
        "    let x = 42;\n",
        "    println!(\"Hello, world!\");\n",
        "    if x > 0 {\n",
        "        return x;\n",
        "    }\n",
        "}\n",
    ];

    let mut result = String::new();
    let mut i = 0;
    while result.len() < size {
        result.push_str(patterns[i % patterns.len()]);
        i += 1;
    }
    result.truncate(size);
    result
}

/// Generate low-repetition data (simulating base64)
fn generate_low_repetition(size: usize) -> String {
    let chars = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
    let mut result = String::new();
    let mut seed = 12345u64;

    for _ in 0..size {
        // Simple LCG random
        seed = seed.wrapping_mul(1103515245).wrapping_add(12345);
        let idx = (seed % chars.len() as u64) as usize;
        result.push(chars.as_bytes()[idx] as char);
    }
    result
}

fn bench_induction(c: &mut Criterion) {
    let mut group = c.benchmark_group("induction");
    let corpora = [
        ("repetitive_text", generate_repetitive_text as fn(usize) -> String),
        ("source_code", generate_source_code),
        ("low_repetition", generate_low_repetition),
    ];

    for (label, generate) in corpora.iter() {
        for size in [1_000, 10_000, 50_000].iter() {
            let data = generate(*size);

            group.bench_with_input(
                BenchmarkId::new(*label, size),
                &data,
                |b, data| {
                    b.iter(|| {
                        let mut seq = Sequitur::new();
                        seq.extend(black_box(data.chars()));
                        black_box(seq)
                    });
                },
            );
        }
    }

    group.finish();
}

fn bench_reduction(c: &mut Criterion) {
    let mut group = c.benchmark_group("reduction");

    for size in [1_000, 10_000].iter() {
        let data = generate_source_code(*size);

        let mut seq = Sequitur::new();
        seq.extend(data.chars());
        let cfg = seq.into_cfg().unwrap();

        group.bench_with_input(BenchmarkId::new("Reducer", size), &cfg, |b, cfg| {
            b.iter(|| {
                let reduced = Reducer::new(black_box(cfg.clone())).run();
                black_box(reduced)
            });
        });
    }

    group.finish();
}

fn bench_lossification(c: &mut Criterion) {
    let mut group = c.benchmark_group("lossification");

    for size in [1_000, 10_000].iter() {
        let data = generate_source_code(*size);

        let mut seq = Sequitur::new();
        seq.extend(data.chars());
        let cfg = seq.into_cfg().unwrap();

        group.bench_with_input(BenchmarkId::new("Similarity", size), &cfg, |b, cfg| {
            b.iter(|| {
                let out = Strategy::default().run(black_box(cfg.clone())).unwrap();
                black_box(out)
            });
        });

        group.bench_with_input(BenchmarkId::new("Cluster", size), &cfg, |b, cfg| {
            b.iter(|| {
                let out = Strategy::Cluster { epsilon: 0.4 }
                    .run(black_box(cfg.clone()))
                    .unwrap();
                black_box(out)
            });
        });
    }

    group.finish();
}

fn bench_iteration(c: &mut Criterion) {
    let mut group = c.benchmark_group("iteration");

    for size in [1_000, 10_000, 100_000].iter() {
        let data = generate_repetitive_text(*size);

        let mut seq = Sequitur::new();
        seq.extend(data.chars());

        group.bench_with_input(BenchmarkId::new("Sequitur", size), &seq, |b, seq| {
            b.iter(|| {
                let count: usize = black_box(seq.iter().count());
                black_box(count)
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_induction,
    bench_reduction,
    bench_lossification,
    bench_iteration
);
criterion_main!(benches);
