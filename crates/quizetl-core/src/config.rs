//! quizetl configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::pipeline::EtlPaths;

/// Top-level quizetl configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizEtlConfig {
    /// Question bank JSON file.
    #[serde(default = "default_questions")]
    pub questions: PathBuf,
    /// Append-only raw answer log.
    #[serde(default = "default_raw_csv")]
    pub raw_csv: PathBuf,
    /// Curated table regenerated by each ETL run.
    #[serde(default = "default_curated_csv")]
    pub curated_csv: PathBuf,
    /// Class used when a submission does not name one.
    #[serde(default = "default_turma")]
    pub default_turma: String,
    /// Where `etl --save-report` writes run reports.
    #[serde(default = "default_reports_dir")]
    pub reports_dir: PathBuf,
}

fn default_questions() -> PathBuf {
    PathBuf::from("config/perguntas.json")
}
fn default_raw_csv() -> PathBuf {
    PathBuf::from("data/raw/respostas_raw.csv")
}
fn default_curated_csv() -> PathBuf {
    PathBuf::from("data/curated/respostas_curadas.csv")
}
fn default_turma() -> String {
    "Turma A".to_string()
}
fn default_reports_dir() -> PathBuf {
    PathBuf::from("data/reports")
}

impl Default for QuizEtlConfig {
    fn default() -> Self {
        Self {
            questions: default_questions(),
            raw_csv: default_raw_csv(),
            curated_csv: default_curated_csv(),
            default_turma: default_turma(),
            reports_dir: default_reports_dir(),
        }
    }
}

impl QuizEtlConfig {
    pub fn etl_paths(&self) -> EtlPaths {
        EtlPaths::new(self.raw_csv.clone(), self.curated_csv.clone())
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are copied verbatim and never expanded again.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        let var_name = &rest[start + 2..start + len];
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + len + 1..];
    }
    result.push_str(rest);
    result
}

fn resolve_path(path: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&path.to_string_lossy()))
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order without a path:
/// 1. `quizetl.toml` in the current directory
/// 2. `~/.config/quizetl/config.toml`
///
/// Environment variable overrides: `QUIZETL_QUESTIONS`, `QUIZETL_RAW_CSV`,
/// `QUIZETL_CURATED_CSV`.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizEtlConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("quizetl.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match &config_path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<QuizEtlConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => QuizEtlConfig::default(),
    };

    apply_env_overrides(&mut config);

    config.questions = resolve_path(&config.questions);
    config.raw_csv = resolve_path(&config.raw_csv);
    config.curated_csv = resolve_path(&config.curated_csv);
    config.reports_dir = resolve_path(&config.reports_dir);

    tracing::debug!(?config_path, ?config, "configuration loaded");
    Ok(config)
}

fn apply_env_overrides(config: &mut QuizEtlConfig) {
    if let Ok(questions) = std::env::var("QUIZETL_QUESTIONS") {
        config.questions = PathBuf::from(questions);
    }
    if let Ok(raw) = std::env::var("QUIZETL_RAW_CSV") {
        config.raw_csv = PathBuf::from(raw);
    }
    if let Ok(curated) = std::env::var("QUIZETL_CURATED_CSV") {
        config.curated_csv = PathBuf::from(curated);
    }
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("quizetl"))
}
