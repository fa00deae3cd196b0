//! quizetl-core — answer recording and the raw → curated ETL.
//!
//! This crate owns the fixed answer schema, the two CSV stores, the
//! deduplicating transform, and the reporting statistics that the CLI and
//! the report renderer build on.

pub mod config;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod questions;
pub mod recorder;
pub mod report;
pub mod statistics;
pub mod store;
pub mod transform;

pub use error::SubmissionError;
pub use model::{AnswerRecord, CuratedTable, EtlMetrics, RawRow, REQUIRED_COLUMNS};
pub use pipeline::{append_raw_row, run_pipeline, EtlPaths};
