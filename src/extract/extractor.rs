// In: src/extract/extractor.rs

//! The core extraction algorithm: materialize one row range across the full
//! column map, chunk by chunk, into a single `BatchRecord`.

use log::debug;

use crate::batching::RowRange;
use crate::column_map::{ColumnMap, ColumnMapping};
use crate::config::ExtractConfig;
use crate::error::{BatchexError, Result};
use crate::extract::record::{BatchRecord, RecordAssembler};
use crate::store::StoreHandle;

/// Extracts the rows `[rows.start, rows.end)` of every mapped column from an
/// open handle.
///
/// This function acts as a high-level coordinator over three concerns:
///
/// 1. The column map is walked in chunks of `config.chunk_width_cols`, so at
///    most one chunk's worth of freshly read slices is staged at any moment.
///    Peak working memory is therefore a small constant multiple of
///    `chunk_width x batch rows x 8 bytes`, independent of the total column
///    or row count. This is the entire reason chunking exists.
/// 2. Each mapping is resolved against the file before its read; a missing
///    group or out-of-range index is a `ColumnResolution` error naming the
///    logical column and the file. Nothing is skipped or padded.
/// 3. Every slice the store returns is validated against the requested range
///    length; a mismatch is a `ShapeMismatch` error, never a truncated batch.
///
/// The caller owns the handle's lifecycle; this function performs no opens or
/// closes, so it behaves identically under any acquisition policy.
pub fn extract_batch(
    handle: &mut dyn StoreHandle,
    file_id: &str,
    rows: RowRange,
    column_map: &ColumnMap,
    config: &ExtractConfig,
) -> Result<BatchRecord> {
    let mut assembler = RecordAssembler::new(config.record_layout, column_map.len());

    for (chunk_index, chunk) in column_map.chunks(config.chunk_width_cols).enumerate() {
        // Chunk-local staging. Freed at the end of each loop iteration, which
        // is the memory bound the chunk walk exists to enforce.
        let mut staging: Vec<(&ColumnMapping, Vec<f64>)> = Vec::with_capacity(chunk.len());

        for mapping in chunk {
            let slice = read_column_slice(handle, file_id, mapping, rows)?;
            #[cfg(test)]
            staging_gauge::add((slice.len() * std::mem::size_of::<f64>()) as u64);
            staging.push((mapping, slice));
        }

        log_metric!(
            "event" = "chunk_extracted",
            "file" = file_id,
            "chunk" = &chunk_index,
            "columns" = &chunk.len(),
            "rows" = &rows.len(),
        );

        for (mapping, slice) in staging {
            #[cfg(test)]
            staging_gauge::sub((slice.len() * std::mem::size_of::<f64>()) as u64);
            assembler.push(&mapping.logical_name, slice);
        }
    }

    debug!(
        "extracted {} columns x {} rows from {file_id} {rows}",
        column_map.len(),
        rows.len()
    );
    assembler.finish(rows.len() as usize)
}


/// Resolves one mapping and reads its row-range slice.
fn read_column_slice(
    handle: &mut dyn StoreHandle,
    file_id: &str,
    mapping: &ColumnMapping,
    rows: RowRange,
) -> Result<Vec<f64>> {
    let resolution_err = |reason: String| BatchexError::ColumnResolution {
        column: mapping.logical_name.clone(),
        file: file_id.to_string(),
        reason,
    };

    let width = handle
        .group_width(mapping.group_id)
        .map_err(|e| resolution_err(e.to_string()))?;
    if mapping.column_index >= width {
        return Err(resolution_err(format!(
            "within-group index {} out of range for group {} (width {width})",
            mapping.column_index, mapping.group_id
        )));
    }

    let slice = handle
        .read_slice(mapping.group_id, mapping.column_index, rows)
        .map_err(|e| resolution_err(e.to_string()))?;

    if slice.len() as u64 != rows.len() {
        return Err(BatchexError::ShapeMismatch {
            column: mapping.logical_name.clone(),
            expected: rows.len(),
            actual: slice.len() as u64,
        });
    }
    Ok(slice)
}
