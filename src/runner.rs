// In: src/runner.rs

//! The run orchestrator: drives batched extraction across a sequence of
//! source files and accumulates the per-batch reports.
//!
//! Scheduling is single-threaded and strictly sequential: one row range is
//! fully extracted, reported, and released before the next begins, which is
//! the run-level expression of the memory-bounding invariant. Reports appear
//! in file order and, within a file, in ascending row-range order, so any
//! validation that compares `bounds` across reports can rely on the order.
//!
//! A bad file does not sink the run: its failure is recorded (with the last
//! batch that completed) and processing continues with the next file. A
//! cancelled run stops between batches and still returns every report
//! collected so far.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::batching::{row_batches, verify_coverage, RowRange};
use crate::column_map::ColumnMap;
use crate::config::ExtractConfig;
use crate::error::Result;
use crate::extract::{extract_batch, observe, BatchReport};
use crate::store::ColumnStore;

//==================================================================================
// I. Run-Level Result Types
//==================================================================================

/// Record of one file that could not be fully processed.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    pub file_id: String,
    /// Batch that failed, or `None` when the file failed before batching
    /// (open or row-extent query).
    pub failed_batch_index: Option<usize>,
    /// Last batch of this file whose report was collected, if any.
    pub last_completed_batch: Option<usize>,
    pub error: String,
}

/// Record of a handle that could not be released. Reported for visibility;
/// the reports already collected for the file remain valid.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ReleaseFailure {
    pub file_id: String,
    pub batch_index: Option<usize>,
    pub error: String,
}

/// Everything a run produced, in deterministic order, ready for an external
/// report sink.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct RunReport {
    pub batches: Vec<BatchReport>,
    pub failures: Vec<FileFailure>,
    pub release_failures: Vec<ReleaseFailure>,
    /// True when the run stopped early at a cancellation point.
    pub cancelled: bool,
}

impl RunReport {
    /// Serializes the report for the external sink. The engine guarantees the
    /// report's shape; the sink owns everything beyond that.
    pub fn write_json<W: std::io::Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }
}

//==================================================================================
// II. Cancellation
//==================================================================================

/// Cooperative cancellation flag, checked between batches (never mid-batch).
/// Clone freely; all clones share one flag.
#[derive(Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

//==================================================================================
// III. The Runner
//==================================================================================

pub struct Runner {
    config: Arc<ExtractConfig>,
    cancel: CancelToken,
}

impl Runner {
    /// Validates the configuration once, up front; an invalid tunable must
    /// fail before any extraction starts.
    pub fn new(config: Arc<ExtractConfig>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            cancel: CancelToken::new(),
        })
    }

    /// Token to cancel this run from another thread or a signal handler.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Processes every file in order, one row range at a time.
    pub fn run(&self, stores: &[&dyn ColumnStore], column_map: &ColumnMap) -> Result<RunReport> {
        let mut report = RunReport::default();

        'files: for store in stores {
            let file_id = store.file_id().to_string();
            info!("processing file {file_id}");

            let total_rows = match self.query_row_extent(*store, &mut report) {
                Ok(rows) => rows,
                Err(error) => {
                    warn!("skipping {file_id}: {error}");
                    report.failures.push(FileFailure {
                        file_id,
                        failed_batch_index: None,
                        last_completed_batch: None,
                        error: error.to_string(),
                    });
                    continue;
                }
            };

            let ranges: Vec<RowRange> =
                row_batches(total_rows, self.config.batch_size_rows).collect();
            // An overlap or gap here is an engine bug; fail the whole run
            // rather than emit reports with wrong bounds.
            verify_coverage(&ranges, total_rows)?;

            let mut last_completed: Option<usize> = None;
            for (batch_index, bounds) in ranges.iter().copied().enumerate() {
                if self.cancel.is_cancelled() {
                    info!("run cancelled before batch {batch_index} of {file_id}");
                    report.cancelled = true;
                    break 'files;
                }
                info!(
                    "processing batch {}/{} of {file_id}",
                    batch_index + 1,
                    ranges.len()
                );

                let outcome =
                    self.extract_one(*store, bounds, batch_index, column_map, &mut report);
                match outcome {
                    Ok(batch_report) => {
                        report.batches.push(batch_report);
                        last_completed = Some(batch_index);
                    }
                    Err(error) => {
                        warn!("file {file_id} failed at batch {batch_index}: {error}");
                        report.failures.push(FileFailure {
                            file_id,
                            failed_batch_index: Some(batch_index),
                            last_completed_batch: last_completed,
                            error: error.to_string(),
                        });
                        continue 'files;
                    }
                }
            }
        }

        Ok(report)
    }

    /// Asks the store for its row-axis extent through a short-lived handle.
    fn query_row_extent(
        &self,
        store: &dyn ColumnStore,
        report: &mut RunReport,
    ) -> Result<u64> {
        let handle = store.open()?;
        let extent = handle.row_extent();
        self.close_handle(store.file_id(), None, handle, report);
        extent
    }

    /// One scoped extraction: open, extract + observe, close. The handle is
    /// released on success and on failure; a failed release is recorded but
    /// does not invalidate the batch's outcome.
    fn extract_one(
        &self,
        store: &dyn ColumnStore,
        bounds: RowRange,
        batch_index: usize,
        column_map: &ColumnMap,
        report: &mut RunReport,
    ) -> Result<BatchReport> {
        let mut handle = store.open()?;
        let outcome = observe(store.file_id(), batch_index, bounds, &self.config, || {
            extract_batch(
                handle.as_mut(),
                store.file_id(),
                bounds,
                column_map,
                &self.config,
            )
        });
        self.close_handle(store.file_id(), Some(batch_index), handle, report);
        outcome
    }

    fn close_handle(
        &self,
        file_id: &str,
        batch_index: Option<usize>,
        handle: Box<dyn crate::store::StoreHandle + '_>,
        report: &mut RunReport,
    ) {
        if let Err(error) = handle.close() {
            warn!("failed to release handle for {file_id}: {error}");
            report.release_failures.push(ReleaseFailure {
                file_id: file_id.to_string(),
                batch_index,
                error: error.to_string(),
            });
        }
    }
}
