//! This file is the root of the `batchex` Rust crate.
//!
//! batchex is a bounded-memory batched columnar extraction engine: it
//! materializes arbitrary row ranges of a large, logically two-dimensional
//! dataset whose columns live at `(group, within-group index)` locations
//! across grouped physical containers, and reports per-batch timing plus a
//! small validation sample for each batch.
//!
//! Peak memory is governed by two tunables, not by dataset size: the row
//! batch size and the column chunk width. One batch's record is alive at a
//! time, and within a batch at most one chunk's worth of column slices is
//! staged concurrently.

//==================================================================================
// 0. Constants
//==================================================================================
/// The crate version, automatically set from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//==================================================================================
// 1. Module Declarations
//==================================================================================
#[macro_use]
mod observability; // Make macros available throughout the crate

pub mod batching;
pub mod column_map;
pub mod config;
pub mod extract;
pub mod runner;
pub mod store;

mod error;

//==================================================================================
// 2. Public API Re-exports
//==================================================================================
pub use batching::{row_batches, RowRange};
pub use column_map::{ColumnMap, ColumnMapEntry, ColumnMapping};
pub use config::{ExtractConfig, RecordLayout};
pub use error::{BatchexError, Result};
pub use extract::{extract_batch, observe, BatchRecord, BatchReport};
pub use runner::{CancelToken, FileFailure, ReleaseFailure, RunReport, Runner};
pub use store::{ColumnStore, MemoryStore, PackedStore, PackedWriter, StoreHandle};
