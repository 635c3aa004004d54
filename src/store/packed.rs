// In: src/store/packed.rs

//! The packed on-disk container format and its `ColumnStore` implementation.
//!
//! A packed file is self-describing:
//!
//! ```text
//! magic(4) | version(2, LE) | header_len(4, LE) | header JSON | payload
//! ```
//!
//! The header is a JSON `PackedHeader` naming the file, the row extent, and
//! the group directory in payload order. The payload stores each group as
//! `columns x rows` little-endian f64 values, column-major: every column is
//! one contiguous run of `rows` values, so a row-range read of one column is
//! a single seek plus one contiguous read.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::batching::RowRange;
use crate::error::{BatchexError, Result};
use crate::store::{ColumnStore, StoreHandle};

//==================================================================================
// Format Constants
//==================================================================================

/// The magic number identifying a packed container file.
pub const PACKED_MAGIC: &[u8; 4] = b"BXPK";
/// The current version of the packed container format.
pub const PACKED_FORMAT_VERSION: u16 = 1;
/// A reasonable limit to prevent OOM from a malformed header length. (16MB)
const MAX_HEADER_LEN: usize = 16 * 1024 * 1024;
/// magic(4) + version(2) + header_len(4)
const PREAMBLE_LEN: u64 = 10;

//==================================================================================
// Header Structs
//==================================================================================

/// Directory entry for one group, in payload order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PackedGroup {
    pub id: u32,
    pub columns: u64,
}

/// The self-describing header of a packed container file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PackedHeader {
    /// Logical identifier carried into reports and error messages.
    pub file_id: String,
    /// Extent of the row axis, shared by every group.
    pub rows: u64,
    pub groups: Vec<PackedGroup>,
}

//==================================================================================
// Writer
//==================================================================================

/// One-shot writer for a packed container file.
///
/// Fixture-grade tooling: callers hand over every group block at once, which
/// is exactly how synthetic test datasets are produced. Blocks are
/// `(columns, rows)` with columns along axis 0, as in `MemoryStore`.
pub struct PackedWriter;

impl PackedWriter {
    pub fn write(
        path: &Path,
        file_id: &str,
        groups: &[(u32, Array2<f64>)],
    ) -> Result<()> {
        let rows = groups.first().map(|(_, b)| b.ncols() as u64).unwrap_or(0);
        for (group_id, block) in groups {
            if block.ncols() as u64 != rows {
                return Err(BatchexError::StoreFormat(format!(
                    "group {group_id} has {} rows, expected {rows}",
                    block.ncols()
                )));
            }
        }

        let header = PackedHeader {
            file_id: file_id.to_string(),
            rows,
            groups: groups
                .iter()
                .map(|(id, block)| PackedGroup {
                    id: *id,
                    columns: block.nrows() as u64,
                })
                .collect(),
        };
        let header_json = serde_json::to_vec(&header)?;

        let mut out = std::io::BufWriter::new(File::create(path)?);
        out.write_all(PACKED_MAGIC)?;
        out.write_all(&PACKED_FORMAT_VERSION.to_le_bytes())?;
        out.write_all(&(header_json.len() as u32).to_le_bytes())?;
        out.write_all(&header_json)?;

        // Column-major payload: one contiguous run of `rows` values per column.
        for (_, block) in groups {
            for column in block.rows() {
                // `row()` of the (columns, rows) block is one logical column.
                let contiguous: Vec<f64> = column.to_vec();
                out.write_all(bytemuck::cast_slice(&contiguous))?;
            }
        }
        out.flush()?;
        Ok(())
    }
}

//==================================================================================
// Reader
//==================================================================================

/// A packed container file on disk. The header is parsed once at `open_path`;
/// handles opened from the store re-open the file for their scoped reads.
pub struct PackedStore {
    path: PathBuf,
    header: PackedHeader,
    /// Byte offset of each group's payload, parallel to `header.groups`.
    group_offsets: Vec<u64>,
}

impl PackedStore {
    pub fn open_path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut file = File::open(&path)?;

        let mut magic = [0u8; 4];
        file.read_exact(&mut magic)?;
        if &magic != PACKED_MAGIC {
            return Err(BatchexError::StoreFormat(format!(
                "{path:?} is not a packed container (bad magic)"
            )));
        }
        let mut version = [0u8; 2];
        file.read_exact(&mut version)?;
        let version = u16::from_le_bytes(version);
        if version != PACKED_FORMAT_VERSION {
            return Err(BatchexError::StoreFormat(format!(
                "unsupported packed format version {version}"
            )));
        }
        let mut header_len = [0u8; 4];
        file.read_exact(&mut header_len)?;
        let header_len = u32::from_le_bytes(header_len) as usize;
        if header_len > MAX_HEADER_LEN {
            return Err(BatchexError::StoreFormat(format!(
                "header length {header_len} exceeds sanity cap"
            )));
        }
        let mut header_json = vec![0u8; header_len];
        file.read_exact(&mut header_json)?;
        let header: PackedHeader = serde_json::from_slice(&header_json)?;

        let mut group_offsets = Vec::with_capacity(header.groups.len());
        let mut offset = PREAMBLE_LEN + header_len as u64;
        for group in &header.groups {
            group_offsets.push(offset);
            offset += group.columns * header.rows * std::mem::size_of::<f64>() as u64;
        }

        Ok(Self {
            path,
            header,
            group_offsets,
        })
    }

    pub fn header(&self) -> &PackedHeader {
        &self.header
    }

    fn locate_group(&self, group_id: u32) -> Result<(u64, u64)> {
        self.header
            .groups
            .iter()
            .position(|g| g.id == group_id)
            .map(|idx| (self.group_offsets[idx], self.header.groups[idx].columns))
            .ok_or_else(|| {
                BatchexError::StoreFormat(format!(
                    "group {group_id} not present in {:?}",
                    self.header.file_id
                ))
            })
    }
}

impl ColumnStore for PackedStore {
    fn file_id(&self) -> &str {
        &self.header.file_id
    }

    fn open(&self) -> Result<Box<dyn StoreHandle + '_>> {
        Ok(Box::new(PackedHandle {
            store: self,
            file: File::open(&self.path)?,
        }))
    }
}

struct PackedHandle<'a> {
    store: &'a PackedStore,
    file: File,
}

impl StoreHandle for PackedHandle<'_> {
    fn row_extent(&self) -> Result<u64> {
        Ok(self.store.header.rows)
    }

    fn group_width(&self, group_id: u32) -> Result<usize> {
        let (_, columns) = self.store.locate_group(group_id)?;
        Ok(columns as usize)
    }

    fn read_slice(
        &mut self,
        group_id: u32,
        column_index: usize,
        rows: RowRange,
    ) -> Result<Vec<f64>> {
        let (group_offset, columns) = self.store.locate_group(group_id)?;
        if column_index as u64 >= columns {
            return Err(BatchexError::StoreFormat(format!(
                "column index {column_index} out of range for group {group_id} (width {columns})"
            )));
        }
        let extent = self.store.header.rows;
        if rows.end > extent {
            return Err(BatchexError::StoreFormat(format!(
                "row range {rows} exceeds extent {extent} of {:?}",
                self.store.header.file_id
            )));
        }

        let element = std::mem::size_of::<f64>() as u64;
        let offset = group_offset + (column_index as u64 * extent + rows.start) * element;
        self.file.seek(SeekFrom::Start(offset))?;

        // Read straight into an f64 buffer; values are little-endian on disk.
        let mut values = vec![0f64; rows.len() as usize];
        self.file
            .read_exact(bytemuck::cast_slice_mut(&mut values))?;
        Ok(values)
    }

    fn close(self: Box<Self>) -> Result<()> {
        // Dropping a read-only descriptor cannot meaningfully fail; the
        // explicit close exists so callers see one release point per handle.
        drop(self.file);
        Ok(())
    }
}
