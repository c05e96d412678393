//! Performance benchmarks for dirmap
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dirmap::config::ScanSettings;
use dirmap::tree::TreeAssembler;
use dirmap::walk::{ScanStrategy, TraversalEngine};
use std::fs::File;
use std::io::Write;
use tempfile::TempDir;

/// Build a tree of `width` directories, each holding `files` small files
fn create_test_tree(width: usize, files: usize) -> TempDir {
    let root = TempDir::new().unwrap();
    for d in 0..width {
        let dir = root.path().join(format!("dir_{:03}", d));
        std::fs::create_dir_all(dir.join("nested")).unwrap();
        for f in 0..files {
            let mut file = File::create(dir.join(format!("file_{:03}.txt", f))).unwrap();
            file.write_all(b"benchmark payload").unwrap();
        }
        File::create(dir.join("nested/leaf.txt")).unwrap();
    }
    root
}

fn bench_scan_strategies(c: &mut Criterion) {
    let root = create_test_tree(32, 16);
    let engine = TraversalEngine::new(&ScanSettings::default()).unwrap();

    let mut group = c.benchmark_group("scan");
    for (label, strategy) in [
        ("sequential", ScanStrategy::Sequential),
        ("concurrent", ScanStrategy::Concurrent),
    ] {
        group.bench_with_input(
            BenchmarkId::from_parameter(label),
            &strategy,
            |b, &strategy| {
                b.iter(|| black_box(engine.scan(root.path(), strategy).unwrap()));
            },
        );
    }
    group.finish();
}

fn bench_assembly(c: &mut Criterion) {
    let root = create_test_tree(32, 16);
    let engine = TraversalEngine::new(&ScanSettings::default()).unwrap();
    let entries = engine
        .scan(root.path(), ScanStrategy::Sequential)
        .unwrap();

    c.bench_function("assemble_tree", |b| {
        b.iter(|| black_box(TreeAssembler::assemble(root.path(), entries.clone())));
    });
}

criterion_group!(benches, bench_scan_strategies, bench_assembly);
criterion_main!(benches);
