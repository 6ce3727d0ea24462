//! Minimal edit benchmark: Measure prefix/suffix trimming cost.
//!
//! Target: < 50µs for a 100KB document with a single change

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use stream_editor::compute_minimal_edit;

/// Source-like text of `lines` lines.
fn create_document(lines: usize) -> String {
    (0..lines)
        .map(|i| format!("    let value_{i} = compute({i}, \"token\");\n"))
        .collect()
}

fn edit_identical(c: &mut Criterion) {
    let doc = create_document(2_000);
    let copy = doc.clone();

    c.bench_function("minimal_edit_identical_2000_lines", |b| {
        b.iter(|| compute_minimal_edit(black_box(&doc), black_box(&copy)));
    });
}

fn edit_middle_change(c: &mut Criterion) {
    let doc = create_document(2_000);
    let changed = doc.replacen("value_1000 ", "value_X ", 1);

    c.bench_function("minimal_edit_middle_change_2000_lines", |b| {
        b.iter(|| compute_minimal_edit(black_box(&doc), black_box(&changed)));
    });
}

fn edit_append(c: &mut Criterion) {
    let doc = create_document(2_000);
    let extended = format!("{doc}    let tail = 1;\n");

    c.bench_function("minimal_edit_append_2000_lines", |b| {
        b.iter(|| compute_minimal_edit(black_box(&doc), black_box(&extended)));
    });
}

fn edit_multibyte(c: &mut Criterion) {
    let doc: String = (0..2_000).map(|i| format!("// 注释 {i} 🚀\n")).collect();
    let changed = doc.replacen("🚀", "🛸", 1);

    c.bench_function("minimal_edit_multibyte_change", |b| {
        b.iter(|| compute_minimal_edit(black_box(&doc), black_box(&changed)));
    });
}

fn edit_various_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("minimal_edit_by_size");

    for lines in [100, 1_000, 10_000] {
        let doc = create_document(lines);
        let target = format!("value_{} ", lines / 2);
        let changed = doc.replacen(&target, "value_changed ", 1);

        group.bench_with_input(
            BenchmarkId::new("middle_change", lines),
            &(doc, changed),
            |b, (prev, next)| b.iter(|| compute_minimal_edit(black_box(prev), black_box(next))),
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    edit_identical,
    edit_middle_change,
    edit_append,
    edit_multibyte,
    edit_various_sizes,
);
criterion_main!(benches);
