//! ETL run reports with JSON persistence.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{CuratedTable, EtlMetrics};
use crate::pipeline::{run_pipeline, EtlPaths};

/// Record of a single ETL run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EtlRunReport {
    /// Unique run identifier.
    pub id: Uuid,
    /// When the run started.
    pub created_at: DateTime<Utc>,
    pub raw_csv: PathBuf,
    pub curated_csv: PathBuf,
    pub metrics: EtlMetrics,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

impl EtlRunReport {
    /// Run the pipeline and describe the run.
    pub fn run(paths: &EtlPaths) -> Result<(CuratedTable, Self)> {
        let created_at = Utc::now();
        let started = Instant::now();
        let (table, metrics) = run_pipeline(paths)?;

        let report = Self {
            id: Uuid::new_v4(),
            created_at,
            raw_csv: paths.raw_csv.clone(),
            curated_csv: paths.curated_csv.clone(),
            metrics,
            duration_ms: started.elapsed().as_millis() as u64,
        };
        Ok((table, report))
    }

    /// File name used when saving into a reports directory.
    pub fn file_name(&self) -> String {
        format!("etl-{}.json", self.created_at.format("%Y-%m-%dT%H%M%S"))
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize run report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write run report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read run report from {}", path.display()))?;
        let report: EtlRunReport =
            serde_json::from_str(&content).context("failed to parse run report JSON")?;
        Ok(report)
    }
}
