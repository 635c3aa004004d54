// In: src/store/mod.rs

// ====================================================================================
// ARCHITECTURAL OVERVIEW: The Store Layer
// ====================================================================================
//
// The `store` module is the engine's only view of physical storage. The core
// extraction logic never touches a file format directly; it speaks two traits:
//
//   1. [ColumnStore]  -> "a source file": identifies itself and opens handles.
//   2. [StoreHandle]  -> "an open source file": answers the row extent, the
//                        width of each group, and row-range slice reads.
//
// The contract mirrors how the extractor consumes storage:
//
//   Run Orchestrator -> open() once to ask row_extent(), close()
//                    -> per row batch: open(), many read_slice() calls, close()
//
// A handle is exclusively owned by the extraction that opened it and must be
// released via `close()` (success or failure) before the next batch begins.
// `close()` is explicit rather than Drop-only so that a failed release is an
// observable event the orchestrator can record.
//
// ====================================================================================

pub mod memory;
pub mod packed;

pub use memory::MemoryStore;
pub use packed::{PackedStore, PackedWriter};

use crate::batching::RowRange;
use crate::error::Result;

/// **CONTRACT:** One physical source file of grouped column containers.
pub trait ColumnStore {
    /// Stable identifier used in reports and error messages (e.g., the file
    /// name).
    fn file_id(&self) -> &str;

    /// Opens a handle for one scoped burst of reads.
    fn open(&self) -> Result<Box<dyn StoreHandle + '_>>;
}

/// **CONTRACT:** An open source file. All answers are for the file as it was
/// when the handle was opened; the engine assumes no concurrent mutation.
pub trait StoreHandle {
    /// Extent of the row axis, identical across every group in the file.
    fn row_extent(&self) -> Result<u64>;

    /// Number of columns stored in `group_id`, or an error if the group does
    /// not exist in this file.
    fn group_width(&self, group_id: u32) -> Result<usize>;

    /// Reads the row slice `[rows.start, rows.end)` of the column at
    /// 0-based `column_index` within `group_id`.
    ///
    /// Implementations must return exactly `rows.len()` values or an error;
    /// truncated or padded reads are forbidden (the extractor treats a length
    /// mismatch as data corruption, not a hint).
    fn read_slice(&mut self, group_id: u32, column_index: usize, rows: RowRange)
        -> Result<Vec<f64>>;

    /// Releases the handle. Consumes the box so a closed handle cannot be
    /// reused; an `Err` here is a `ResourceRelease` condition for the caller
    /// to record.
    fn close(self: Box<Self>) -> Result<()>;
}
