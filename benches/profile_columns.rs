use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use csv_profiler::config::{ListDetection, ProfilerConfig};
use csv_profiler::frame::load_table;
use csv_profiler::profile::ColumnProfiler;
use encoding_rs::UTF_8;
use tempfile::TempDir;

fn generate_visits(rows: usize) -> (TempDir, PathBuf) {
    let temp_dir = tempfile::tempdir().expect("temp dir");
    let csv_path = temp_dir.path().join("visits.csv");
    let mut file = File::create(&csv_path).expect("create csv");
    writeln!(file, "id,visited_on,status,weight,codes,notes").expect("header");
    for i in 0..rows {
        let status = match i % 3 {
            0 => "open",
            1 => "closed",
            _ => "pending",
        };
        let month = (i % 12) + 1;
        let day = (i % 28) + 1;
        let weight = 50.0 + (i % 400) as f64 / 8.0;
        writeln!(
            file,
            "{i},2024-{month:02}-{day:02},{status},{weight},\"[{},{}]\",note {i}",
            i % 7,
            i % 5
        )
        .expect("row");
    }
    (temp_dir, csv_path)
}

fn bench_profile(c: &mut Criterion) {
    let (temp_dir, csv_path) = generate_visits(20_000);
    let table = load_table(&csv_path, b',', UTF_8).expect("load table");
    let first_value = ProfilerConfig::default().with_seed(17);
    let full_scan = ProfilerConfig::default()
        .with_seed(17)
        .with_list_detection(ListDetection::FullScan);

    let mut group = c.benchmark_group("profile_columns");

    group.bench_function("load_table", |b| {
        b.iter_batched(
            || (),
            |_| load_table(&csv_path, b',', UTF_8).expect("load table"),
            BatchSize::SmallInput,
        );
    });

    group.bench_function("profile_first_value", |b| {
        let profiler = ColumnProfiler::new(&first_value);
        b.iter(|| profiler.profile(&table));
    });

    group.bench_function("profile_full_scan", |b| {
        let profiler = ColumnProfiler::new(&full_scan);
        b.iter(|| profiler.profile(&table));
    });

    group.finish();
    drop(temp_dir);
}

criterion_group!(benches, bench_profile);
criterion_main!(benches);
