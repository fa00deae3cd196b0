//! Question bank loader.
//!
//! The bank is a JSON object mapping block names to arrays of questions.
//! Block order and option order follow the file. The loaded [`QuestionBank`]
//! is an ordinary immutable value; callers load it once and pass it around.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::model::DEFAULT_TIPO;

/// One selectable option of a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizOption {
    pub key: String,
    pub text: String,
}

/// A multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Identifier, unique within its block.
    pub id: String,
    pub pergunta: String,
    /// Options in file order.
    pub opcoes: Vec<QuizOption>,
    /// Key of the correct option.
    pub gabarito: String,
    pub tipo: String,
    /// Why the correct option is correct; may be empty.
    pub explicacao: String,
}

impl Question {
    pub fn option_text(&self, key: &str) -> Option<&str> {
        self.opcoes
            .iter()
            .find(|o| o.key == key)
            .map(|o| o.text.as_str())
    }

    pub fn has_option(&self, key: &str) -> bool {
        self.opcoes.iter().any(|o| o.key == key)
    }

    pub fn is_correct(&self, choice: &str) -> bool {
        choice == self.gabarito
    }
}

/// A named, ordered group of questions answered together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionBlock {
    pub name: String,
    pub questions: Vec<Question>,
}

impl QuestionBlock {
    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionBank {
    blocks: Vec<QuestionBlock>,
}

impl QuestionBank {
    pub fn new(blocks: Vec<QuestionBlock>) -> Self {
        Self { blocks }
    }

    pub fn blocks(&self) -> &[QuestionBlock] {
        &self.blocks
    }

    pub fn block(&self, name: &str) -> Option<&QuestionBlock> {
        self.blocks.iter().find(|b| b.name == name)
    }

    pub fn block_names(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().map(|b| b.name.as_str())
    }

    pub fn question_count(&self) -> usize {
        self.blocks.iter().map(|b| b.questions.len()).sum()
    }
}

/// Intermediate JSON structure of a single question.
#[derive(Debug, Deserialize)]
struct JsonQuestion {
    id: Value,
    pergunta: String,
    #[serde(default)]
    opcoes: Map<String, Value>,
    gabarito: Value,
    #[serde(default)]
    tipo: Option<String>,
    #[serde(default)]
    explicacao: Option<String>,
}

/// Text of a scalar JSON value; ids and keys are sometimes written as numbers.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Load the question bank from a JSON file.
pub fn load_question_bank(path: &Path) -> Result<QuestionBank> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read question bank: {}", path.display()))?;

    parse_question_bank_str(&content)
        .with_context(|| format!("failed to parse question bank: {}", path.display()))
}

/// Parse a question bank from a JSON string.
pub fn parse_question_bank_str(content: &str) -> Result<QuestionBank> {
    let parsed: Map<String, Value> =
        serde_json::from_str(content).context("question bank must be a JSON object")?;

    let blocks = parsed
        .into_iter()
        .map(|(name, questions)| {
            let questions: Vec<JsonQuestion> = serde_json::from_value(questions)
                .with_context(|| format!("invalid questions in block '{name}'"))?;

            let questions = questions
                .into_iter()
                .map(|q| Question {
                    id: value_text(&q.id),
                    pergunta: q.pergunta,
                    opcoes: q
                        .opcoes
                        .iter()
                        .map(|(key, text)| QuizOption {
                            key: key.clone(),
                            text: value_text(text),
                        })
                        .collect(),
                    gabarito: value_text(&q.gabarito),
                    tipo: q.tipo.unwrap_or_else(|| DEFAULT_TIPO.to_string()),
                    explicacao: q.explicacao.unwrap_or_default(),
                })
                .collect();

            Ok(QuestionBlock { name, questions })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(QuestionBank::new(blocks))
}

/// A warning from question bank validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub block: String,
    /// The question ID (if applicable).
    pub question_id: Option<String>,
    pub message: String,
}

/// Validate a question bank for common authoring mistakes.
pub fn validate_question_bank(bank: &QuestionBank) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    for block in bank.blocks() {
        let warn = |question_id: Option<&str>, message: String| ValidationWarning {
            block: block.name.clone(),
            question_id: question_id.map(str::to_string),
            message,
        };

        if block.questions.is_empty() {
            warnings.push(warn(None, "block has no questions".into()));
        }

        let mut seen_ids = HashSet::new();
        for q in &block.questions {
            if !seen_ids.insert(q.id.as_str()) {
                warnings.push(warn(Some(&q.id), format!("duplicate question ID: {}", q.id)));
            }
            if q.pergunta.trim().is_empty() {
                warnings.push(warn(Some(&q.id), "pergunta is empty".into()));
            }
            if q.opcoes.is_empty() {
                warnings.push(warn(Some(&q.id), "question has no options".into()));
            } else if !q.has_option(&q.gabarito) {
                warnings.push(warn(
                    Some(&q.id),
                    format!("gabarito '{}' is not one of the options", q.gabarito),
                ));
            }
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    const BANK_JSON: &str = r#"{
  "Bloco 1": [
    {
      "id": "b1q1",
      "pergunta": "O que significa o E de ETL?",
      "opcoes": {"A": "Extract", "B": "Export", "C": "Evaluate"},
      "gabarito": "A",
      "explicacao": "ETL = Extract, Transform, Load."
    },
    {
      "id": "b1q2",
      "pergunta": "Onde ficam as respostas antes do ETL?",
      "opcoes": {"B": "Base tratada", "A": "Base bruta"},
      "gabarito": "A",
      "tipo": "conceito"
    }
  ],
  "Alfa": [
    {
      "id": "a1",
      "pergunta": "Deduplicação mantém qual resposta?",
      "opcoes": {"A": "A primeira", "B": "A última"},
      "gabarito": "B"
    }
  ]
}"#;

    #[test]
    fn parse_preserves_file_order() {
        let bank = parse_question_bank_str(BANK_JSON).unwrap();
        let names: Vec<&str> = bank.block_names().collect();
        assert_eq!(names, vec!["Bloco 1", "Alfa"]);

        let q2 = &bank.block("Bloco 1").unwrap().questions[1];
        let keys: Vec<&str> = q2.opcoes.iter().map(|o| o.key.as_str()).collect();
        assert_eq!(keys, vec!["B", "A"]);
        assert_eq!(bank.question_count(), 3);
    }

    #[test]
    fn parse_applies_defaults() {
        let bank = parse_question_bank_str(BANK_JSON).unwrap();
        let block = bank.block("Bloco 1").unwrap();
        assert_eq!(block.questions[0].tipo, "multipla");
        assert_eq!(block.questions[1].tipo, "conceito");
        assert_eq!(block.questions[1].explicacao, "");
        assert_eq!(block.question("b1q1").unwrap().option_text("A"), Some("Extract"));
    }

    #[test]
    fn numeric_ids_become_text() {
        let bank = parse_question_bank_str(
            r#"{"B": [{"id": 7, "pergunta": "?", "opcoes": {"1": "x"}, "gabarito": 1}]}"#,
        )
        .unwrap();
        let q = &bank.blocks()[0].questions[0];
        assert_eq!(q.id, "7");
        assert_eq!(q.gabarito, "1");
        assert!(q.is_correct("1"));
    }

    #[test]
    fn parse_rejects_non_object() {
        assert!(parse_question_bank_str("[1, 2, 3]").is_err());
        assert!(parse_question_bank_str(r#"{"B": [{"id": "x"}]}"#).is_err());
    }

    #[test]
    fn validate_clean_bank() {
        let bank = parse_question_bank_str(BANK_JSON).unwrap();
        assert!(validate_question_bank(&bank).is_empty());
    }

    #[test]
    fn validate_flags_problems() {
        let bank = parse_question_bank_str(
            r#"{
  "Vazio": [],
  "B": [
    {"id": "q", "pergunta": " ", "opcoes": {"A": "a"}, "gabarito": "Z"},
    {"id": "q", "pergunta": "ok", "opcoes": {}, "gabarito": "A"}
  ]
}"#,
        )
        .unwrap();
        let warnings = validate_question_bank(&bank);
        let messages: Vec<&str> = warnings.iter().map(|w| w.message.as_str()).collect();
        assert!(messages.iter().any(|m| m.contains("no questions")));
        assert!(messages.iter().any(|m| m.contains("duplicate")));
        assert!(messages.iter().any(|m| m.contains("pergunta is empty")));
        assert!(messages.iter().any(|m| m.contains("not one of the options")));
        assert!(messages.iter().any(|m| m.contains("no options")));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("perguntas.json");
        std::fs::write(&path, BANK_JSON).unwrap();
        let bank = load_question_bank(&path).unwrap();
        assert_eq!(bank.blocks().len(), 2);

        let err = load_question_bank(&dir.path().join("missing.json")).unwrap_err();
        assert!(format!("{err:#}").contains("failed to read question bank"));
    }
}
