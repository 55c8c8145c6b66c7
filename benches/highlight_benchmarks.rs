//! Benchmarks for highlighting, caret scanning and translation.
//!
//! Run with: cargo bench

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use std::collections::HashSet;

use cml_core::{SuggestionItem, SuggestionKind, SuggestionPools, TranslationTable};
use cml_syntax::{Scanner, highlight};

/// Generates a CML text of `lines` statements.
fn generate_cml(lines: usize) -> String {
    (0..lines)
        .map(|i| {
            format!(
                "constraint(width_{i} >= {i}.5 and REL_ProductComponentGroup_{i}[Laptop_{i}] != \"Min {i}\");\n"
            )
        })
        .collect()
}

fn attributes(n: usize) -> HashSet<String> {
    (0..n).map(|i| format!("width_{i}")).collect()
}

/// Benchmarks markup generation.
fn bench_highlight(c: &mut Criterion) {
    let mut group = c.benchmark_group("highlight");
    let symbols = attributes(500);

    for size in [10, 100, 1000, 10000].iter() {
        let text = generate_cml(*size);

        group.bench_with_input(BenchmarkId::new("markup", size), &text, |b, text| {
            b.iter(|| black_box(highlight(black_box(text), &symbols)))
        });
    }

    group.finish();
}

/// Benchmarks caret-context scanning at the end of a long text.
fn bench_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan");
    let scanner = Scanner::default();

    let mut pools = SuggestionPools::new();
    pools.set_products(
        (0..500)
            .map(|i| {
                SuggestionItem::new(
                    format!("REL_ProductComponentGroup_{i}"),
                    SuggestionKind::ProductComponentGroup,
                )
                .with_actual_name(format!("Group_{i}"))
            })
            .collect(),
    );

    for size in [100, 10000].iter() {
        let word = generate_cml(*size) + "wid";
        let bracket = generate_cml(*size) + "Group_250[lap";

        group.bench_with_input(BenchmarkId::new("word", size), &word, |b, text| {
            let caret = text.chars().count();
            b.iter(|| black_box(scanner.scan(text, caret, &pools)))
        });
        group.bench_with_input(BenchmarkId::new("label_bracket", size), &bracket, |b, text| {
            let caret = text.chars().count();
            b.iter(|| black_box(scanner.scan(text, caret, &pools)))
        });
    }

    group.finish();
}

/// Benchmarks whole-text translation in both directions.
fn bench_translation(c: &mut Criterion) {
    let mut group = c.benchmark_group("translation");

    let mut table = TranslationTable::new();
    for i in 0..1000 {
        table.register(&format!("Laptop_{i}"), &format!("01t{i:06}"));
    }

    let display = generate_cml(1000);
    let storage = table.to_storage_form(&display);

    group.bench_function("to_storage_form", |b| {
        b.iter(|| black_box(table.to_storage_form(black_box(&display))))
    });
    group.bench_function("to_display_form", |b| {
        b.iter(|| black_box(table.to_display_form(black_box(&storage))))
    });

    group.finish();
}

criterion_group!(benches, bench_highlight, bench_scan, bench_translation);
criterion_main!(benches);
