// In: src/extract/mod.rs

//! The batch extraction pipeline: one row range in, one `BatchRecord` out,
//! wrapped by the metrics collector that turns it into a small `BatchReport`.
//!
//! Data flow for one batch:
//!
//!   [Run Orchestrator] -> opens a scoped StoreHandle
//!         |
//!         `-> [extractor::extract_batch] -> walks the column map chunk by
//!         |     chunk, reads row-range slices, assembles the BatchRecord
//!         |
//!         `-> [metrics::observe] -> times the call, samples the first row,
//!               drops the BatchRecord, returns the O(1) BatchReport

pub mod extractor;
pub mod metrics;
pub mod record;

pub use extractor::extract_batch;
pub use metrics::{observe, BatchReport, SampleValue};
pub use record::BatchRecord;
