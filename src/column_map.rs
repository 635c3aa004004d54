// In: src/column_map.rs

//! Loading and chunking of the column map: the ordered table that ties each
//! logical column name to its physical `(group, within-group index)` location.
//!
//! The external table uses a 1-based convention for both the group id and the
//! within-group position; internally everything is 0-based along the column
//! axis. The map is loaded once per run and is read-only thereafter, so it is
//! safe to share by reference across any future fan-out without locking.

use serde::{Deserialize, Serialize};

use crate::error::{BatchexError, Result};

/// One row of the external column-mapping table, in its 1-based convention.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapEntry {
    /// Logical column name; must be unique across the table.
    pub name: String,
    /// 1-based physical group identifier (`GROUP1`, `GROUP2`, ...).
    pub group: u32,
    /// 1-based position of the column within its group.
    pub position: u32,
}

/// A resolved mapping: logical name plus 0-based physical coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    pub logical_name: String,
    pub group_id: u32,
    /// 0-based index of the column within its group.
    pub column_index: usize,
}

/// The immutable, ordered collection of column mappings for one run.
#[derive(Debug, Clone)]
pub struct ColumnMap {
    mappings: Vec<ColumnMapping>,
}

impl ColumnMap {
    /// Builds the map from the external table, converting to 0-based indices.
    ///
    /// A repeated logical name is a `DuplicateColumn` error: the reference
    /// workloads silently kept the last writer, which turns a bad mapping
    /// table into silently wrong data. The run must fail instead.
    pub fn from_entries(entries: Vec<ColumnMapEntry>) -> Result<Self> {
        let mut mappings = Vec::with_capacity(entries.len());
        let mut seen = std::collections::HashSet::with_capacity(entries.len());
        for entry in entries {
            if entry.group == 0 {
                return Err(BatchexError::InvalidMapping {
                    name: entry.name,
                    reason: "group id is 1-based and must be >= 1".to_string(),
                });
            }
            if entry.position == 0 {
                return Err(BatchexError::InvalidMapping {
                    name: entry.name,
                    reason: "position is 1-based and must be >= 1".to_string(),
                });
            }
            if !seen.insert(entry.name.clone()) {
                return Err(BatchexError::DuplicateColumn(entry.name));
            }
            mappings.push(ColumnMapping {
                logical_name: entry.name,
                group_id: entry.group,
                column_index: (entry.position - 1) as usize,
            });
        }
        Ok(Self { mappings })
    }

    /// Loads the map from a JSON array of `ColumnMapEntry` rows.
    pub fn load_json<R: std::io::Read>(reader: R) -> Result<Self> {
        let entries: Vec<ColumnMapEntry> = serde_json::from_reader(reader)?;
        Self::from_entries(entries)
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColumnMapping> {
        self.mappings.iter()
    }

    pub fn mappings(&self) -> &[ColumnMapping] {
        &self.mappings
    }

    /// Partitions the map, in order, into chunks of at most `chunk_width`
    /// mappings (the last may be shorter). Concatenating the chunks
    /// reconstructs the map exactly once.
    ///
    /// This bounds how many columns the extractor materializes concurrently
    /// within one row batch. It is a tunable, not a correctness knob:
    /// `chunk_width == self.len()` degenerates to one chunk of everything.
    pub fn chunks(&self, chunk_width: usize) -> impl Iterator<Item = &[ColumnMapping]> {
        assert!(chunk_width > 0, "chunk_width must be positive");
        self.mappings.chunks(chunk_width)
    }
}
