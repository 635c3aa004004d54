//! Minimal extraction runner.
//!
//! ```text
//! batchex-run <column_map.json> <packed_file> [<packed_file> ...]
//! ```
//!
//! Loads the column map, extracts every packed container named on the command
//! line with the default configuration (override via a `BATCHEX_CONFIG` JSON
//! file path), and writes the run report as JSON to stdout. Logging follows
//! the usual `RUST_LOG` convention.

use std::fs::File;
use std::process::ExitCode;
use std::sync::Arc;

use batchex::{ColumnMap, ColumnStore, ExtractConfig, PackedStore, Runner};

fn main() -> ExitCode {
    env_logger::init();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("batchex-run: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> batchex::Result<()> {
    let mut args = std::env::args().skip(1);
    let map_path = args.next().ok_or_else(usage)?;
    let file_paths: Vec<String> = args.collect();
    if file_paths.is_empty() {
        return Err(usage());
    }

    let column_map = ColumnMap::load_json(File::open(&map_path)?)?;

    let config = match std::env::var_os("BATCHEX_CONFIG") {
        Some(path) => serde_json::from_reader(File::open(path)?)?,
        None => ExtractConfig::default(),
    };
    let runner = Runner::new(Arc::new(config))?;

    let stores = file_paths
        .iter()
        .map(PackedStore::open_path)
        .collect::<batchex::Result<Vec<_>>>()?;
    let store_refs: Vec<&dyn ColumnStore> = stores.iter().map(|s| s as _).collect();

    let report = runner.run(&store_refs, &column_map)?;
    report.write_json(std::io::stdout().lock())?;
    Ok(())
}

fn usage() -> batchex::BatchexError {
    batchex::BatchexError::InvalidConfig(
        "usage: batchex-run <column_map.json> <packed_file>...".to_string(),
    )
}
