//! Benchmarks for depth book operations.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use market_depth::depth::{BookUpdateProcessor, DepthBook};
use market_depth::types::{BookEntry, Discipline, FeedMessage, InitPaintMsg, Side, TableRow, UpdateMsg};
use market_depth::Config;

fn filled_book(window_size: usize) -> DepthBook {
    let book = DepthBook::new(Discipline::ByLevel, Side::Bid, window_size);
    for pos in 0..window_size {
        let _ = book.add(pos, BookEntry::level(100.0 - pos as f64, 100, 1, ""));
    }
    book
}

fn bench_add_at_top(c: &mut Criterion) {
    let mut group = c.benchmark_group("depth_add_top");

    for window in [10, 20, 50].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(window), window, |b, &window| {
            let book = filled_book(window);
            let entry = BookEntry::level(101.0, 50, 1, "");

            b.iter(|| {
                // Full book: insert pushes the deepest row out
                let _ = book.add(black_box(0), black_box(entry.clone()));
            });
        });
    }

    group.finish();
}

fn bench_snapshot(c: &mut Criterion) {
    let mut group = c.benchmark_group("depth_snapshot");

    for window in [10, 20, 50].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(window), window, |b, &window| {
            let book = filled_book(window);
            b.iter(|| {
                black_box(book.snapshot());
            });
        });
    }

    group.finish();
}

fn bench_processor_update(c: &mut Criterion) {
    let mut processor = BookUpdateProcessor::new("BENCH", Config::new());
    let rows = (1..=10)
        .map(|pos| TableRow::new("ADD", pos).with_price(100.0 - f64::from(pos)).with_size(100))
        .collect();
    processor.process(&FeedMessage::InitPaint(
        InitPaintMsg::new(Discipline::ByLevel).with_window_size(10).with_bids(rows),
    ));

    let modify = FeedMessage::Update(UpdateMsg::new(
        Side::Bid,
        TableRow::new("MOD", 3).with_price(97.0).with_size(250).with_orders(4),
    ));

    c.bench_function("processor_modify", |b| {
        b.iter(|| {
            processor.process(black_box(&modify));
        });
    });
}

criterion_group!(benches, bench_add_at_top, bench_snapshot, bench_processor_update);
criterion_main!(benches);
