//! Core data model types for quizetl.
//!
//! Both stores share one ten-column schema. [`RawRow`] is what extraction
//! yields (every field still text); [`AnswerRecord`] is the normalized form
//! with `acertou` coerced to an integer.

use serde::{Deserialize, Serialize};

/// Column names of the raw and curated stores, in on-disk order.
pub const REQUIRED_COLUMNS: [&str; 10] = [
    "timestamp",
    "turma",
    "aluno",
    "bloco",
    "question_id",
    "pergunta",
    "tipo",
    "resposta_aluno",
    "gabarito",
    "acertou",
];

/// Question type used when the bank does not specify one.
pub const DEFAULT_TIPO: &str = "multipla";

/// One extracted row, exactly as text, in schema order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRow {
    pub timestamp: String,
    pub turma: String,
    pub aluno: String,
    pub bloco: String,
    pub question_id: String,
    pub pergunta: String,
    pub tipo: String,
    pub resposta_aluno: String,
    pub gabarito: String,
    pub acertou: String,
}

impl RawRow {
    /// Build a row from fields given in [`REQUIRED_COLUMNS`] order.
    pub fn from_fields(fields: [String; 10]) -> Self {
        let [
            timestamp,
            turma,
            aluno,
            bloco,
            question_id,
            pergunta,
            tipo,
            resposta_aluno,
            gabarito,
            acertou,
        ] = fields;
        Self {
            timestamp,
            turma,
            aluno,
            bloco,
            question_id,
            pergunta,
            tipo,
            resposta_aluno,
            gabarito,
            acertou,
        }
    }

    /// Fields in [`REQUIRED_COLUMNS`] order.
    pub fn fields(&self) -> [&str; 10] {
        [
            &self.timestamp,
            &self.turma,
            &self.aluno,
            &self.bloco,
            &self.question_id,
            &self.pergunta,
            &self.tipo,
            &self.resposta_aluno,
            &self.gabarito,
            &self.acertou,
        ]
    }
}

/// A student's answer to one question, with `acertou` as a number.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    /// Submission time, `YYYY-MM-DDTHH:MM:SSZ`.
    pub timestamp: String,
    pub turma: String,
    pub aluno: String,
    pub bloco: String,
    pub question_id: String,
    /// Question text copied at submission time.
    pub pergunta: String,
    pub tipo: String,
    /// Option key chosen by the student.
    pub resposta_aluno: String,
    /// Correct option key copied at submission time.
    pub gabarito: String,
    /// 1 when `resposta_aluno == gabarito`, else 0.
    pub acertou: i64,
}

impl AnswerRecord {
    /// Convert an extracted row without trimming; only `acertou` is coerced.
    pub fn from_raw(raw: RawRow) -> Self {
        Self {
            acertou: coerce_acertou(&raw.acertou),
            timestamp: raw.timestamp,
            turma: raw.turma,
            aluno: raw.aluno,
            bloco: raw.bloco,
            question_id: raw.question_id,
            pergunta: raw.pergunta,
            tipo: raw.tipo,
            resposta_aluno: raw.resposta_aluno,
            gabarito: raw.gabarito,
        }
    }

    pub fn to_raw(&self) -> RawRow {
        RawRow {
            timestamp: self.timestamp.clone(),
            turma: self.turma.clone(),
            aluno: self.aluno.clone(),
            bloco: self.bloco.clone(),
            question_id: self.question_id.clone(),
            pergunta: self.pergunta.clone(),
            tipo: self.tipo.clone(),
            resposta_aluno: self.resposta_aluno.clone(),
            gabarito: self.gabarito.clone(),
            acertou: self.acertou.to_string(),
        }
    }

    /// Deduplication key: one curated row per student and question.
    pub fn dedup_key(&self) -> (&str, &str) {
        (&self.aluno, &self.question_id)
    }

    /// Ordering key of the curated table.
    pub fn sort_key(&self) -> (&str, &str, &str, &str) {
        (&self.turma, &self.aluno, &self.bloco, &self.question_id)
    }

    pub fn is_correct(&self) -> bool {
        self.acertou > 0
    }
}

/// Numeric coercion of a stored `acertou` value.
///
/// Integers parse directly, finite decimals are truncated, anything else
/// (empty, text, NaN, infinity) becomes 0. The result is clamped to `0..=1`.
pub fn coerce_acertou(raw: &str) -> i64 {
    let trimmed = raw.trim();
    let value = match trimmed.parse::<i64>() {
        Ok(v) => v,
        Err(_) => match trimmed.parse::<f64>() {
            Ok(f) if f.is_finite() => f.trunc() as i64,
            _ => 0,
        },
    };
    value.clamp(0, 1)
}

/// The curated table: deduplicated, sorted answer records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CuratedTable {
    pub rows: Vec<AnswerRecord>,
}

impl CuratedTable {
    pub fn new(rows: Vec<AnswerRecord>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AnswerRecord> {
        self.rows.iter()
    }
}

impl<'a> IntoIterator for &'a CuratedTable {
    type Item = &'a AnswerRecord;
    type IntoIter = std::slice::Iter<'a, AnswerRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Summary metrics of one ETL run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EtlMetrics {
    /// Rows after dropping empty students, before deduplication.
    pub linhas_raw: usize,
    /// Rows after deduplication.
    pub linhas_curated: usize,
    pub duplicados_removidos: usize,
    /// Sum of `acertou` over the curated rows.
    pub total_acertos: i64,
}
