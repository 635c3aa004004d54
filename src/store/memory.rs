// In: src/store/memory.rs

//! An in-memory `ColumnStore` backed by one 2-D ndarray block per group.
//!
//! Each group block is laid out `(columns, rows)`, columns along axis 0,
//! matching the physical layout of the grouped container files this engine
//! targets, so a row-range read of one column is a contiguous slice of one
//! axis-0 lane. This backend is the collaborator of choice for tests and
//! benches; it exercises the full store contract without touching disk.

use std::collections::BTreeMap;

use ndarray::Array2;

use crate::batching::RowRange;
use crate::error::{BatchexError, Result};
use crate::store::{ColumnStore, StoreHandle};

pub struct MemoryStore {
    file_id: String,
    /// BTreeMap keeps group iteration deterministic for debugging output.
    groups: BTreeMap<u32, Array2<f64>>,
    rows: u64,
}

impl MemoryStore {
    /// Builds a store from `(group_id, block)` pairs. Every block must have
    /// the same row extent (axis 1), since the row axis is a property of the
    /// file, not of a group.
    pub fn new(
        file_id: impl Into<String>,
        groups: impl IntoIterator<Item = (u32, Array2<f64>)>,
    ) -> Result<Self> {
        let file_id = file_id.into();
        let groups: BTreeMap<u32, Array2<f64>> = groups.into_iter().collect();
        let mut rows: Option<u64> = None;
        for (group_id, block) in &groups {
            let block_rows = block.ncols() as u64;
            match rows {
                None => rows = Some(block_rows),
                Some(r) if r != block_rows => {
                    return Err(BatchexError::StoreFormat(format!(
                        "group {group_id} in {file_id:?} has {block_rows} rows, expected {r}"
                    )));
                }
                Some(_) => {}
            }
        }
        Ok(Self {
            file_id,
            groups,
            rows: rows.unwrap_or(0),
        })
    }
}

impl ColumnStore for MemoryStore {
    fn file_id(&self) -> &str {
        &self.file_id
    }

    fn open(&self) -> Result<Box<dyn StoreHandle + '_>> {
        Ok(Box::new(MemoryHandle { store: self }))
    }
}

struct MemoryHandle<'a> {
    store: &'a MemoryStore,
}

impl StoreHandle for MemoryHandle<'_> {
    fn row_extent(&self) -> Result<u64> {
        Ok(self.store.rows)
    }

    fn group_width(&self, group_id: u32) -> Result<usize> {
        self.store
            .groups
            .get(&group_id)
            .map(|block| block.nrows())
            .ok_or_else(|| {
                BatchexError::StoreFormat(format!(
                    "group {group_id} not present in {:?}",
                    self.store.file_id
                ))
            })
    }

    fn read_slice(
        &mut self,
        group_id: u32,
        column_index: usize,
        rows: RowRange,
    ) -> Result<Vec<f64>> {
        let block = self.store.groups.get(&group_id).ok_or_else(|| {
            BatchexError::StoreFormat(format!(
                "group {group_id} not present in {:?}",
                self.store.file_id
            ))
        })?;
        if column_index >= block.nrows() {
            return Err(BatchexError::StoreFormat(format!(
                "column index {column_index} out of range for group {group_id} (width {})",
                block.nrows()
            )));
        }
        if rows.end > block.ncols() as u64 {
            return Err(BatchexError::StoreFormat(format!(
                "row range {rows} exceeds extent {} of group {group_id}",
                block.ncols()
            )));
        }
        let lane = block.row(column_index);
        Ok(lane
            .slice(ndarray::s![rows.start as usize..rows.end as usize])
            .to_vec())
    }

    fn close(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}
