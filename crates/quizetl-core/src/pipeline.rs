//! ETL orchestration: extract the raw store, transform, load the curated store.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::model::{AnswerRecord, CuratedTable, EtlMetrics};
use crate::store;
use crate::transform::transform;

/// Locations of the two stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EtlPaths {
    pub raw_csv: PathBuf,
    pub curated_csv: PathBuf,
}

impl EtlPaths {
    pub fn new(raw_csv: impl Into<PathBuf>, curated_csv: impl Into<PathBuf>) -> Self {
        Self {
            raw_csv: raw_csv.into(),
            curated_csv: curated_csv.into(),
        }
    }

    /// The conventional layout below a base directory:
    /// `data/raw/respostas_raw.csv` and `data/curated/respostas_curadas.csv`.
    pub fn under(base: &Path) -> Self {
        Self::new(
            base.join("data").join("raw").join("respostas_raw.csv"),
            base.join("data").join("curated").join("respostas_curadas.csv"),
        )
    }
}

/// Run extract → transform → load and return the curated table with metrics.
///
/// I/O errors from either store propagate unchanged; there is no retry.
pub fn run_pipeline(paths: &EtlPaths) -> Result<(CuratedTable, EtlMetrics)> {
    let started = Instant::now();

    let raw = store::extract(&paths.raw_csv)?;
    let extracted = raw.len();
    let (curated, metrics) = transform(raw);
    store::load(&curated, &paths.curated_csv)?;

    tracing::info!(
        extracted,
        linhas_raw = metrics.linhas_raw,
        linhas_curated = metrics.linhas_curated,
        duplicados_removidos = metrics.duplicados_removidos,
        total_acertos = metrics.total_acertos,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "etl run complete"
    );

    Ok((curated, metrics))
}

/// Record one answer in the raw store.
pub fn append_raw_row(paths: &EtlPaths, record: &AnswerRecord) -> Result<()> {
    store::append_row(&paths.raw_csv, record)
}
