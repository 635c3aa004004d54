// In: src/extract/metrics.rs

//! Per-batch timing and validation sampling.
//!
//! `observe` wraps exactly one extraction call. The resulting `BatchReport`
//! is deliberately O(1) in size (a capped list of column names and a
//! first-row sample of at most a few columns), so a full-run report stays
//! small even when the extracted batches are gigabytes. The `BatchRecord`
//! itself is consumed and dropped here; a report never holds a reference into
//! batch storage, which is what lets the orchestrator keep reports while
//! batch memory is reclaimed.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::batching::RowRange;
use crate::config::ExtractConfig;
use crate::error::Result;
use crate::extract::record::BatchRecord;

/// One entry of the first-row validation sample.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SampleValue {
    pub column: String,
    pub first_value: f64,
}

/// The size-bounded summary of one extracted batch.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BatchReport {
    pub file_id: String,
    /// 0-based position of the batch within its file.
    pub batch_index: usize,
    pub bounds: RowRange,
    /// Wall-clock seconds spent inside the extraction call.
    pub processing_time_secs: f64,
    /// Extracted column names, truncated to `report_name_cap` for reporting;
    /// the batch itself always covers the full column map.
    pub column_names: Vec<String>,
    /// First-row values of at most `report_sample_cap` leading columns.
    pub sample: Vec<SampleValue>,
}

/// Times one extraction and distills its result into a `BatchReport`.
///
/// The closure is invoked exactly once. On success the returned record is
/// sampled and dropped before this function returns, which upholds the
/// one-live-BatchRecord memory contract; on failure the error propagates
/// untouched so the orchestrator can attribute it to this batch.
pub fn observe<F>(
    file_id: &str,
    batch_index: usize,
    bounds: RowRange,
    config: &ExtractConfig,
    extract_fn: F,
) -> Result<BatchReport>
where
    F: FnOnce() -> Result<BatchRecord>,
{
    let started = Instant::now();
    let record = extract_fn()?;
    let processing_time_secs = started.elapsed().as_secs_f64();

    let column_names = (0..record.num_columns().min(config.report_name_cap))
        .filter_map(|i| record.column_name(i).map(str::to_string))
        .collect();

    let sample = (0..record.num_columns().min(config.report_sample_cap))
        .filter_map(|i| {
            let column = record.column_name(i)?.to_string();
            let first_value = record.first_value(i)?;
            Some(SampleValue {
                column,
                first_value,
            })
        })
        .collect();

    // `record` is dropped here; the report owns only its own strings.
    Ok(BatchReport {
        file_id: file_id.to_string(),
        batch_index,
        bounds,
        processing_time_secs,
        column_names,
        sample,
    })
}
