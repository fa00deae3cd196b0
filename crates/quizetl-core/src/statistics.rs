//! Reporting statistics over the curated table.
//!
//! Everything here derives from one grouping of (`aluno`, `acertou`).

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::model::CuratedTable;

/// Headline numbers of the results dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResultsSummary {
    /// Consolidated answers (curated rows).
    pub respostas: usize,
    /// Distinct students.
    pub alunos: usize,
    pub acertos: i64,
    /// Correct answers as a percentage of all rows, 0.0 for an empty table.
    pub percentual_acerto: f64,
}

impl ResultsSummary {
    pub fn from_table(table: &CuratedTable) -> Self {
        let respostas = table.len();
        let alunos = table
            .iter()
            .map(|r| r.aluno.as_str())
            .collect::<HashSet<_>>()
            .len();
        let acertos: i64 = table.iter().map(|r| r.acertou).sum();

        Self {
            respostas,
            alunos,
            acertos,
            percentual_acerto: acertos as f64 / respostas.max(1) as f64 * 100.0,
        }
    }
}

/// Aggregated result of a single student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentScore {
    pub aluno: String,
    pub acertos: i64,
    pub respondidas: usize,
}

impl StudentScore {
    pub fn percentual(&self) -> f64 {
        self.acertos as f64 / self.respondidas.max(1) as f64 * 100.0
    }
}

/// Students ranked by correct answers, descending; ties by name.
pub fn student_ranking(table: &CuratedTable) -> Vec<StudentScore> {
    let mut grouped: HashMap<&str, (i64, usize)> = HashMap::new();
    for row in table {
        let entry = grouped.entry(row.aluno.as_str()).or_default();
        entry.0 += row.acertou;
        entry.1 += 1;
    }

    let mut ranking: Vec<StudentScore> = grouped
        .into_iter()
        .map(|(aluno, (acertos, respondidas))| StudentScore {
            aluno: aluno.to_string(),
            acertos,
            respondidas,
        })
        .collect();

    ranking.sort_by(|a, b| b.acertos.cmp(&a.acertos).then_with(|| a.aluno.cmp(&b.aluno)));
    ranking
}

/// Per-block accuracy as `(answers, correct)`, keyed by block name.
pub fn block_totals(table: &CuratedTable) -> BTreeMap<String, (usize, i64)> {
    let mut totals: BTreeMap<String, (usize, i64)> = BTreeMap::new();
    for row in table {
        let entry = totals.entry(row.bloco.clone()).or_default();
        entry.0 += 1;
        entry.1 += row.acertou;
    }
    totals
}
