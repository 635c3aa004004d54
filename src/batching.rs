// In: src/batching.rs

//! Row-axis batching: partitions `[0, total_rows)` into an ordered sequence of
//! half-open ranges of at most `batch_size` rows each.
//!
//! The sequence is a pure function of its inputs (no hidden iterator state to
//! resume or corrupt), covers the row axis exactly once with no gaps and no
//! overlaps, and is lazy so a multi-billion-row file costs nothing to plan.

use serde::{Deserialize, Serialize};

/// A half-open slice `[start, end)` of the row axis, processed as one unit.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowRange {
    pub start: u64,
    /// Exclusive. Always strictly greater than `start`; empty ranges are never
    /// produced.
    pub end: u64,
}

impl RowRange {
    pub fn new(start: u64, end: u64) -> Self {
        debug_assert!(end > start, "RowRange must be non-empty");
        Self { start, end }
    }

    /// Number of rows covered by this range.
    pub fn len(&self) -> u64 {
        self.end - self.start
    }
}

impl std::fmt::Display for RowRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Returns the ordered sequence of row ranges covering `[0, total_rows)`.
///
/// Each range holds `batch_size` rows except possibly the last. `total_rows`
/// of zero yields an empty sequence; `batch_size >= total_rows` yields exactly
/// one range covering everything.
///
/// Callers must validate `batch_size > 0` beforehand (`ExtractConfig::validate`
/// does); a zero step here is an unconditional bug.
pub fn row_batches(total_rows: u64, batch_size: u64) -> impl Iterator<Item = RowRange> {
    assert!(batch_size > 0, "batch_size must be positive");
    (0..total_rows)
        .step_by(batch_size as usize)
        .map(move |start| RowRange::new(start, (start + batch_size).min(total_rows)))
}

/// Asserts the partition invariant over an already-produced range sequence:
/// contiguous from 0, ascending, ending exactly at `total_rows`.
///
/// An overlap or gap here is an implementation bug, never a data condition,
/// so violation is an `Internal` error (assertion-level, not recoverable).
pub fn verify_coverage(
    ranges: &[RowRange],
    total_rows: u64,
) -> crate::error::Result<()> {
    let mut expected_start = 0u64;
    for range in ranges {
        if range.start != expected_start || range.end <= range.start {
            return Err(crate::error::BatchexError::Internal(format!(
                "row batching invariant broken at {range}: expected start {expected_start}"
            )));
        }
        expected_start = range.end;
    }
    if expected_start != total_rows {
        return Err(crate::error::BatchexError::Internal(format!(
            "row batching covered [0, {expected_start}) of [0, {total_rows})"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_multiple_yields_uniform_ranges() {
        let ranges: Vec<_> = row_batches(1_000_000, 100_000).collect();
        assert_eq!(ranges.len(), 10);
        assert_eq!(ranges[0], RowRange::new(0, 100_000));
        assert_eq!(ranges[9], RowRange::new(900_000, 1_000_000));
        verify_coverage(&ranges, 1_000_000).unwrap();
    }

    #[test]
    fn test_ragged_tail_is_shorter() {
        let ranges: Vec<_> = row_batches(950_000, 100_000).collect();
        assert_eq!(ranges.len(), 10);
        assert_eq!(ranges[9], RowRange::new(900_000, 950_000));
        assert_eq!(ranges[9].len(), 50_000);
        verify_coverage(&ranges, 950_000).unwrap();
    }

    #[test]
    fn test_zero_rows_yields_nothing() {
        assert_eq!(row_batches(0, 100_000).count(), 0);
        verify_coverage(&[], 0).unwrap();
    }

    #[test]
    fn test_oversized_batch_yields_single_range() {
        let ranges: Vec<_> = row_batches(42, 100_000).collect();
        assert_eq!(ranges, vec![RowRange::new(0, 42)]);
    }

    #[test]
    fn test_batch_size_one_is_degenerate_but_correct() {
        let ranges: Vec<_> = row_batches(5, 1).collect();
        assert_eq!(ranges.len(), 5);
        verify_coverage(&ranges, 5).unwrap();
    }

    #[test]
    fn test_restartable_same_inputs_same_sequence() {
        let a: Vec<_> = row_batches(1234, 100).collect();
        let b: Vec<_> = row_batches(1234, 100).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_verify_coverage_detects_gap_and_overlap() {
        let gap = vec![RowRange::new(0, 10), RowRange::new(20, 30)];
        assert!(verify_coverage(&gap, 30).is_err());

        let overlap = vec![RowRange::new(0, 10), RowRange::new(5, 15)];
        assert!(verify_coverage(&overlap, 15).is_err());

        let short = vec![RowRange::new(0, 10)];
        assert!(verify_coverage(&short, 30).is_err());
    }
}
