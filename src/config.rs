// In: src/config.rs

//! The single source of truth for all batchex run configuration.
//!
//! This module defines the unified `ExtractConfig` struct, which is designed
//! to be created once at the application boundary (e.g., from a user's JSON
//! file) and then passed down through the system via a shared, read-only
//! `Arc<ExtractConfig>`.

use serde::{Deserialize, Serialize};

use crate::error::{BatchexError, Result};

//==================================================================================
// I. Core Configuration Enums
//==================================================================================

/// Defines the in-memory representation of an extracted batch.
///
/// The reference workloads for this engine existed in two near-identical
/// flavors (a name-to-vector mapping and a single structured block); here that
/// is a policy choice on one extractor, not two pipelines.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RecordLayout {
    /// **Default:** an ordered mapping from logical column name to its values.
    #[default]
    Mapped,

    /// A single Arrow `RecordBatch` of Float64 columns, one field per logical
    /// column, in column-map order.
    Columnar,
}

//==================================================================================
// II. The Unified ExtractConfig
//==================================================================================

/// The single, unified configuration for an extraction run.
/// This struct is created once and shared throughout the system via an `Arc`.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "snake_case")]
pub struct ExtractConfig {
    /// **The target number of rows per batch.** The final batch of a file may
    /// be shorter. Larger values trade peak memory for fewer physical reads.
    #[serde(default = "default_batch_size_rows")]
    pub batch_size_rows: u64,

    /// **The number of columns materialized together within one batch.**
    /// Peak working memory during extraction is bounded by one chunk's worth
    /// of column slices, independent of the total column count. Setting this
    /// to the column count degenerates to "all columns at once" and is valid.
    #[serde(default = "default_chunk_width_cols")]
    pub chunk_width_cols: usize,

    /// The in-memory representation assembled for each batch.
    #[serde(default)]
    pub record_layout: RecordLayout,

    /// Cap on how many column names a `BatchReport` carries. Reporting only;
    /// the extracted batch always covers every mapped column.
    #[serde(default = "default_report_name_cap")]
    pub report_name_cap: usize,

    /// Cap on the first-row validation sample in a `BatchReport`.
    #[serde(default = "default_report_sample_cap")]
    pub report_sample_cap: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            batch_size_rows: default_batch_size_rows(),
            chunk_width_cols: default_chunk_width_cols(),
            record_layout: RecordLayout::default(),
            report_name_cap: default_report_name_cap(),
            report_sample_cap: default_report_sample_cap(),
        }
    }
}

impl ExtractConfig {
    /// Rejects configurations the engine cannot honor. Both tunables must be
    /// positive; any positive value is a valid memory/time trade-off.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size_rows == 0 {
            return Err(BatchexError::InvalidConfig(
                "batch_size_rows must be positive".to_string(),
            ));
        }
        if self.chunk_width_cols == 0 {
            return Err(BatchexError::InvalidConfig(
                "chunk_width_cols must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Helper for `serde` to provide a default for `batch_size_rows`.
fn default_batch_size_rows() -> u64 {
    100_000
}

/// Helper for `serde` to provide a default for `chunk_width_cols`.
fn default_chunk_width_cols() -> usize {
    50
}

fn default_report_name_cap() -> usize {
    10
}

fn default_report_sample_cap() -> usize {
    3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ExtractConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.batch_size_rows, 100_000);
        assert_eq!(config.chunk_width_cols, 50);
        assert_eq!(config.record_layout, RecordLayout::Mapped);
    }

    #[test]
    fn test_zero_tunables_are_rejected() {
        let config = ExtractConfig {
            batch_size_rows: 0,
            ..ExtractConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(BatchexError::InvalidConfig(_))
        ));

        let config = ExtractConfig {
            chunk_width_cols: 0,
            ..ExtractConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(BatchexError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_deserializes_with_field_defaults() {
        let config: ExtractConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.batch_size_rows, 100_000);
        assert_eq!(config.report_sample_cap, 3);

        let config: ExtractConfig =
            serde_json::from_str(r#"{"record_layout": "columnar", "chunk_width_cols": 7}"#)
                .unwrap();
        assert_eq!(config.record_layout, RecordLayout::Columnar);
        assert_eq!(config.chunk_width_cols, 7);
    }
}
