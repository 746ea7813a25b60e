//! Benchmarks for mdpress normalization performance.
//!
//! Run with: cargo bench
//!
//! These benchmarks test normalization throughput at various document sizes.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mdpress::NormalizeOptions;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const CJK_SENTENCES: &[&str] = &[
    "数据 分析 结果显示 性能 提升明显。",
    "本章 介绍 系统 架构与 实现细节。",
    "误差 < 1，温度 25 °，速率 1 rad。",
    "坐标为 (0.00, 1346.222) 与 (5, -3)。",
    "混排 English words 与 中文 内容。",
];

/// Creates a synthetic mixed-script Markdown document with the given
/// number of paragraphs, seeded for reproducible runs.
fn create_test_markdown(paragraph_count: usize) -> String {
    let mut rng = StdRng::seed_from_u64(42);
    let mut doc = String::from("---\ntitle: 基准 文档\n---\n\n");

    for i in 0..paragraph_count {
        match i % 7 {
            0 => {
                doc.push_str(&format!("## {}.1 第{}章 小节 标题\n\n", i / 7 + 1, i / 7 + 1));
            }
            3 => {
                doc.push_str("| 名称 | 值 |\n|---|---|\n| 数据 1 | 数据 2 |\n\n");
            }
            5 => {
                doc.push_str("```text\nraw  content   kept  verbatim\n```\n\n");
            }
            _ => {
                // Wrapped CJK paragraph: a soft line break lands between
                // two CJK characters roughly half the time.
                let sentence = CJK_SENTENCES[rng.gen_range(0..CJK_SENTENCES.len())];
                doc.push_str(sentence);
                if rng.gen_bool(0.5) {
                    doc.push('\n');
                    doc.push_str(CJK_SENTENCES[rng.gen_range(0..CJK_SENTENCES.len())]);
                }
                doc.push_str("\n\n");
            }
        }
    }

    doc
}

/// Benchmark full normalization at various sizes.
fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");

    for para_count in [10, 100, 500, 1000].iter() {
        let doc = create_test_markdown(*para_count);
        let size = doc.len() as u64;

        group.throughput(Throughput::Bytes(size));
        group.bench_with_input(
            BenchmarkId::new("paragraphs", para_count),
            &doc,
            |b, doc| {
                b.iter(|| {
                    let _ = mdpress::normalize(black_box(doc));
                });
            },
        );
    }

    group.finish();
}

/// Benchmark sequential vs parallel line processing.
fn bench_sequential_vs_parallel(c: &mut Criterion) {
    let doc = create_test_markdown(500);
    let parallel = NormalizeOptions::default();
    let sequential = NormalizeOptions::default().sequential();

    c.bench_function("normalize_parallel_500", |b| {
        b.iter(|| {
            let _ = mdpress::normalize_with_options(black_box(&doc), &parallel);
        });
    });

    c.bench_function("normalize_sequential_500", |b| {
        b.iter(|| {
            let _ = mdpress::normalize_with_options(black_box(&doc), &sequential);
        });
    });
}

/// Benchmark the collapse rules on a single dense line.
fn bench_rules(c: &mut Criterion) {
    let line = "数据 123 与 误差 < 1 以及 坐标 (0.00, 1346.222) 和 速率 1 rad 混排 English words 结尾。";

    c.bench_function("rules_dense_line", |b| {
        b.iter(|| {
            let _ = mdpress::rules::collapse_space_after_cjk(black_box(line));
        });
    });
}

criterion_group!(benches, bench_normalize, bench_sequential_vs_parallel, bench_rules);
criterion_main!(benches);
