//! Benchmarks for session bookkeeping and selection geometry.
//!
//! Run with: cargo bench

use async_trait::async_trait;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pocketcode_buffer::{EditSession, Position, Selection};
use pocketcode_core::{
    Dialogs, EditorView, Lookup, MemoryMirrorStore, OfflineRemotes, OpenOptions, Origin,
    SessionConfig, SessionId, SessionManager, Services, TileStrip,
};
use pocketcode_touch::{MarkerLayer, MonospaceLayout, Size};
use std::path::PathBuf;
use std::sync::Arc;

/// Generates a large text string for benchmarking.
fn generate_large_text(lines: usize) -> String {
    (0..lines)
        .map(|i| format!("Line {}: This is a sample line of text for benchmarking purposes.\n", i))
        .collect()
}

struct NullView;

impl EditorView for NullView {
    fn show(&mut self, _id: &SessionId, _buffer: &EditSession) {}
    fn focus(&mut self) {}
    fn reveal(&mut self, _position: Position) {}
    fn set_title(&mut self, _title: &str) {}
    fn set_subtitle(&mut self, _subtitle: &str) {}
}

struct NullDialogs;

#[async_trait(?Send)]
impl Dialogs for NullDialogs {
    async fn confirm(&self, _title: &str, _message: &str) -> bool {
        true
    }

    async fn alert(&self, _title: &str, _message: &str) {}
}

/// Builds a ready manager holding `count` sessions opened from disk paths.
fn manager_with_sessions(rt: &tokio::runtime::Runtime, count: usize) -> SessionManager {
    let _guard = rt.enter();
    let services = Services {
        view: Box::new(NullView),
        dialogs: Box::new(NullDialogs),
        tiles: Box::new(TileStrip::new()),
        remotes: Box::new(OfflineRemotes),
    };
    let store = Arc::new(MemoryMirrorStore::ready());
    let mut manager = SessionManager::new(SessionConfig::default(), store, services);

    rt.block_on(async {
        while !manager.is_ready() {
            tokio::task::yield_now().await;
            manager.process_pending().await;
        }
    });

    for i in 0..count {
        let name = format!("file_{}.rs", i);
        let path = PathBuf::from(format!("/project/src/{}", name));
        manager.open(
            name,
            Origin::path(path),
            OpenOptions::default().with_text("fn main() {}\n").saved().background(),
        );
    }
    manager
}

/// Benchmarks session lookup as the file list grows.
fn bench_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookup");
    let rt = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(err) => panic!("could not build runtime: {}", err),
    };

    for size in [10, 100, 1000].iter() {
        let manager = manager_with_sessions(&rt, *size);
        let last = PathBuf::from(format!("/project/src/file_{}.rs", size - 1));

        group.bench_with_input(BenchmarkId::new("by_path", size), &last, |b, path| {
            b.iter(|| black_box(manager.find(&Lookup::Path(black_box(path.as_path())))))
        });

        group.bench_with_input(BenchmarkId::new("summaries", size), &manager, |b, manager| {
            b.iter(|| black_box(manager.summaries()))
        });
    }

    group.finish();
}

/// Benchmarks the full-text comparison a dirty check performs.
fn bench_dirty_compare(c: &mut Criterion) {
    let mut group = c.benchmark_group("dirty_compare");

    for size in [100, 1000, 10000].iter() {
        let text = generate_large_text(*size);
        let buffer = EditSession::new(&text);

        group.bench_with_input(BenchmarkId::new("unchanged", size), &text, |b, mirror| {
            b.iter(|| black_box(buffer.text() == mirror.as_str()))
        });
    }

    group.finish();
}

/// Benchmarks word selection and editing at the cursor.
fn bench_selection(c: &mut Criterion) {
    let mut group = c.benchmark_group("selection");
    let base_text = generate_large_text(10000);

    group.bench_function("select_word_middle", |b| {
        b.iter_with_setup(
            || {
                let mut buffer = EditSession::new(&base_text);
                buffer.move_cursor_to(Position::new(5000, 12));
                buffer
            },
            |mut buffer| {
                black_box(buffer.select_word());
                black_box(buffer)
            },
        )
    });

    group.bench_function("replace_selection", |b| {
        b.iter_with_setup(
            || {
                let mut buffer = EditSession::new(&base_text);
                buffer.set_selection(Selection::new(Position::new(5000, 0), Position::new(5010, 4)));
                buffer
            },
            |mut buffer| {
                let _ = buffer.replace_selection(black_box("replaced"));
                black_box(buffer)
            },
        )
    });

    group.finish();
}

/// Benchmarks marker rectangles for selections spanning many rows.
fn bench_selection_rects(c: &mut Criterion) {
    let mut group = c.benchmark_group("selection_rects");
    let text = generate_large_text(1000);
    let layout = MonospaceLayout::new(8.0, 16.0, Size::new(360.0, 640.0));

    for rows in [1, 10, 100].iter() {
        let mut buffer = EditSession::new(&text);
        buffer.set_selection(Selection::new(Position::new(0, 3), Position::new(*rows, 5)));

        group.bench_with_input(BenchmarkId::new("rows", rows), &buffer, |b, buffer| {
            b.iter(|| black_box(layout.selection_rects(black_box(buffer))))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_lookup,
    bench_dirty_compare,
    bench_selection,
    bench_selection_rects,
);

criterion_main!(benches);
