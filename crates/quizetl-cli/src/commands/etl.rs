//! The `quizetl etl` command.

use std::path::PathBuf;

use anyhow::Result;

use quizetl_core::config::load_config_from;
use quizetl_core::report::EtlRunReport;

pub fn execute(config_path: Option<PathBuf>, save_report: bool, format: String) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let paths = config.etl_paths();

    let (_, report) = EtlRunReport::run(&paths)?;
    let metrics = report.metrics;

    match format.as_str() {
        "text" => {
            println!("ETL complete: {}", paths.curated_csv.display());
            println!("  linhas_raw:           {}", metrics.linhas_raw);
            println!("  linhas_curated:       {}", metrics.linhas_curated);
            println!("  duplicados_removidos: {}", metrics.duplicados_removidos);
            println!("  total_acertos:        {}", metrics.total_acertos);
        }
        "json" => {
            println!("{}", serde_json::to_string_pretty(&metrics)?);
        }
        other => anyhow::bail!("unknown format: {other} (expected json or text)"),
    }

    if save_report {
        let path = config.reports_dir.join(report.file_name());
        report.save_json(&path)?;
        eprintln!("Run report saved to: {}", path.display());
    }

    Ok(())
}
