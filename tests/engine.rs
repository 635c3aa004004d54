//! End-to-end extraction over packed container files on disk: synthetic
//! multi-file dataset in, ordered run report out.

use std::path::PathBuf;
use std::sync::Arc;

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use batchex::{
    ColumnMap, ColumnMapEntry, ColumnStore, ExtractConfig, PackedStore, PackedWriter,
    RecordLayout, Runner,
};

const NUM_FILES: usize = 2;
const NUM_GROUPS: u32 = 2;
const COLS_PER_GROUP: usize = 10;
const ROWS: usize = 2_500;

/// Synthetic dataset in the shape the engine targets: a handful of files,
/// each holding the same groups of columns, plus one shared column map
/// covering every (group, position) pair.
fn generate_dataset(dir: &tempfile::TempDir, seed: u64) -> (Vec<PathBuf>, ColumnMap) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut paths = Vec::new();

    for file_idx in 0..NUM_FILES {
        let groups: Vec<(u32, Array2<f64>)> = (1..=NUM_GROUPS)
            .map(|g| {
                (
                    g,
                    Array2::from_shape_fn((COLS_PER_GROUP, ROWS), |_| rng.random::<f64>()),
                )
            })
            .collect();
        let path = dir.path().join(format!("test_file_{file_idx}.bxpk"));
        PackedWriter::write(&path, &format!("test_file_{file_idx}"), &groups).unwrap();
        paths.push(path);
    }

    let entries = (1..=NUM_GROUPS)
        .flat_map(|g| {
            (1..=COLS_PER_GROUP as u32).map(move |p| ColumnMapEntry {
                name: format!("col_{g}_{p}"),
                group: g,
                position: p,
            })
        })
        .collect();
    (paths, ColumnMap::from_entries(entries).unwrap())
}

#[test]
fn extracts_a_multi_file_dataset_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let (paths, map) = generate_dataset(&dir, 7);

    let stores: Vec<PackedStore> = paths
        .iter()
        .map(|p| PackedStore::open_path(p).unwrap())
        .collect();
    let store_refs: Vec<&dyn ColumnStore> = stores.iter().map(|s| s as _).collect();

    let config = Arc::new(ExtractConfig {
        batch_size_rows: 1_000,
        chunk_width_cols: 7,
        ..ExtractConfig::default()
    });
    let runner = Runner::new(config).unwrap();
    let report = runner.run(&store_refs, &map).unwrap();

    assert!(report.failures.is_empty());
    assert!(report.release_failures.is_empty());
    assert!(!report.cancelled);

    // 2500 rows at 1000 per batch: [0,1000), [1000,2000), [2000,2500) per file.
    assert_eq!(report.batches.len(), NUM_FILES * 3);
    for (i, batch) in report.batches.iter().enumerate() {
        assert_eq!(batch.file_id, format!("test_file_{}", i / 3));
        assert_eq!(batch.batch_index, i % 3);
        assert_eq!(batch.bounds.start, (i % 3) as u64 * 1_000);
        assert_eq!(batch.column_names.len(), 10);
        assert_eq!(batch.sample.len(), 3);
        assert_eq!(batch.sample[0].column, "col_1_1");
    }
    assert_eq!(report.batches[2].bounds.end, 2_500);
}

#[test]
fn report_samples_match_the_stored_data() {
    let dir = tempfile::tempdir().unwrap();
    let (paths, map) = generate_dataset(&dir, 21);

    let store = PackedStore::open_path(&paths[0]).unwrap();
    let config = Arc::new(ExtractConfig {
        batch_size_rows: 1_000,
        ..ExtractConfig::default()
    });
    let runner = Runner::new(config).unwrap();
    let report = runner.run(&[&store], &map).unwrap();

    // The sampled first-row values must equal a direct read of the same
    // cells, batch by batch.
    let mut handle = store.open().unwrap();
    for batch in &report.batches {
        for (i, sample) in batch.sample.iter().enumerate() {
            let direct = handle
                .read_slice(
                    1,
                    i,
                    batchex::RowRange::new(batch.bounds.start, batch.bounds.start + 1),
                )
                .unwrap();
            assert_eq!(sample.first_value, direct[0], "column {}", sample.column);
        }
    }
    handle.close().unwrap();
}

#[test]
fn columnar_layout_runs_the_same_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let (paths, map) = generate_dataset(&dir, 3);

    let store = PackedStore::open_path(&paths[0]).unwrap();
    let config = Arc::new(ExtractConfig {
        batch_size_rows: 1_000,
        record_layout: RecordLayout::Columnar,
        ..ExtractConfig::default()
    });
    let runner = Runner::new(config).unwrap();
    let report = runner.run(&[&store], &map).unwrap();

    assert!(report.failures.is_empty());
    assert_eq!(report.batches.len(), 3);
    assert_eq!(report.batches[0].sample.len(), 3);
}

#[test]
fn identical_inputs_yield_identical_reports() {
    let dir = tempfile::tempdir().unwrap();
    let (paths, map) = generate_dataset(&dir, 99);
    let store = PackedStore::open_path(&paths[0]).unwrap();
    let config = Arc::new(ExtractConfig {
        batch_size_rows: 700,
        chunk_width_cols: 3,
        ..ExtractConfig::default()
    });

    let run = || {
        let runner = Runner::new(Arc::clone(&config)).unwrap();
        runner.run(&[&store], &map).unwrap()
    };
    let a = run();
    let b = run();

    // Timing differs between runs; everything else is deterministic.
    assert_eq!(a.batches.len(), b.batches.len());
    for (x, y) in a.batches.iter().zip(&b.batches) {
        assert_eq!(x.bounds, y.bounds);
        assert_eq!(x.column_names, y.column_names);
        assert_eq!(x.sample, y.sample);
    }
}

#[test]
fn run_report_lands_on_disk_as_json() {
    let dir = tempfile::tempdir().unwrap();
    let (paths, map) = generate_dataset(&dir, 5);
    let store = PackedStore::open_path(&paths[0]).unwrap();

    let runner = Runner::new(Arc::new(ExtractConfig {
        batch_size_rows: 1_000,
        ..ExtractConfig::default()
    }))
    .unwrap();
    let report = runner.run(&[&store], &map).unwrap();

    let out_path = dir.path().join("processing_results.json");
    report
        .write_json(std::fs::File::create(&out_path).unwrap())
        .unwrap();

    let parsed: serde_json::Value =
        serde_json::from_reader(std::fs::File::open(&out_path).unwrap()).unwrap();
    assert_eq!(parsed["batches"].as_array().unwrap().len(), 3);
    assert_eq!(parsed["failures"].as_array().unwrap().len(), 0);
}
