// In: src/extract/record.rs

//! The materialized result of one (row range x column map) extraction, in one
//! of two layouts selected by `RecordLayout`.
//!
//! `Mapped` is the ordered name-to-values mapping most downstream consumers
//! want; `Columnar` is a single Arrow `RecordBatch` of Float64 columns for
//! consumers that hand the batch straight to Arrow-native code. Both layouts
//! present the same accessor surface, so the metrics collector and tests do
//! not care which was assembled.

use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;

use crate::config::RecordLayout;
use crate::error::Result;

/// One fully assembled batch. Exclusively owned by the extraction call that
/// produced it; the caller must drop it before the next row range begins.
#[derive(Debug)]
pub enum BatchRecord {
    /// Ordered `(logical_name, values)` pairs in column-map order.
    Mapped(Vec<(String, Vec<f64>)>),
    /// A single structured block, one Float64 field per logical column.
    Columnar(RecordBatch),
}

impl BatchRecord {
    pub fn num_columns(&self) -> usize {
        match self {
            BatchRecord::Mapped(columns) => columns.len(),
            BatchRecord::Columnar(batch) => batch.num_columns(),
        }
    }

    pub fn num_rows(&self) -> usize {
        match self {
            BatchRecord::Mapped(columns) => {
                columns.first().map(|(_, v)| v.len()).unwrap_or(0)
            }
            BatchRecord::Columnar(batch) => batch.num_rows(),
        }
    }

    /// Logical column name at `index`, in column-map order.
    pub fn column_name(&self, index: usize) -> Option<&str> {
        match self {
            BatchRecord::Mapped(columns) => columns.get(index).map(|(n, _)| n.as_str()),
            BatchRecord::Columnar(batch) => (index < batch.num_columns())
                .then(|| batch.schema_ref().field(index).name().as_str()),
        }
    }

    /// Value of the first row of the column at `index`; the validation sample
    /// reads only this.
    pub fn first_value(&self, index: usize) -> Option<f64> {
        match self {
            BatchRecord::Mapped(columns) => {
                columns.get(index).and_then(|(_, v)| v.first().copied())
            }
            BatchRecord::Columnar(batch) => {
                if index >= batch.num_columns() || batch.num_rows() == 0 {
                    return None;
                }
                batch
                    .column(index)
                    .as_any()
                    .downcast_ref::<Float64Array>()
                    .map(|a| a.value(0))
            }
        }
    }
}

/// Incremental builder used by the extractor. Columns arrive one at a time in
/// column-map order; the builder commits each one to its final representation
/// immediately, so no second full-size copy of the batch ever exists.
pub(crate) struct RecordAssembler {
    layout: RecordLayout,
    mapped: Vec<(String, Vec<f64>)>,
    fields: Vec<Field>,
    arrays: Vec<ArrayRef>,
}

impl RecordAssembler {
    pub(crate) fn new(layout: RecordLayout, num_columns: usize) -> Self {
        match layout {
            RecordLayout::Mapped => Self {
                layout,
                mapped: Vec::with_capacity(num_columns),
                fields: Vec::new(),
                arrays: Vec::new(),
            },
            RecordLayout::Columnar => Self {
                layout,
                mapped: Vec::new(),
                fields: Vec::with_capacity(num_columns),
                arrays: Vec::with_capacity(num_columns),
            },
        }
    }

    pub(crate) fn push(&mut self, name: &str, values: Vec<f64>) {
        match self.layout {
            RecordLayout::Mapped => self.mapped.push((name.to_string(), values)),
            RecordLayout::Columnar => {
                self.fields
                    .push(Field::new(name, DataType::Float64, false));
                self.arrays
                    .push(Arc::new(Float64Array::from(values)) as ArrayRef);
            }
        }
    }

    pub(crate) fn finish(self, num_rows: usize) -> Result<BatchRecord> {
        match self.layout {
            RecordLayout::Mapped => Ok(BatchRecord::Mapped(self.mapped)),
            RecordLayout::Columnar => {
                let schema = Arc::new(Schema::new(self.fields));
                let options = arrow::record_batch::RecordBatchOptions::new()
                    .with_row_count(Some(num_rows));
                let batch = RecordBatch::try_new_with_options(schema, self.arrays, &options)?;
                Ok(BatchRecord::Columnar(batch))
            }
        }
    }
}
