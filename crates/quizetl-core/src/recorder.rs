//! Response recorder: turns a block submission into raw-store rows.
//!
//! A submission is checked in full against the question bank before the
//! first row is written, so a rejected submission leaves the raw store
//! untouched.

use std::collections::HashMap;

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::SubmissionError;
use crate::model::AnswerRecord;
use crate::pipeline::{append_raw_row, EtlPaths};
use crate::questions::QuestionBank;

/// Current UTC time as `YYYY-MM-DDTHH:MM:SSZ`.
pub fn utc_now_iso() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// One student's answers to every question of a block.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Submission {
    pub turma: String,
    pub aluno: String,
    pub bloco: String,
    /// `(question_id, chosen option key)` pairs.
    pub answers: Vec<(String, String)>,
}

/// Feedback for one answered question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionFeedback {
    pub question_id: String,
    pub pergunta: String,
    pub escolha: String,
    pub texto_escolha: String,
    pub gabarito: String,
    pub texto_gabarito: String,
    pub acertou: bool,
    pub explicacao: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionFeedback {
    pub aluno: String,
    pub bloco: String,
    pub timestamp: String,
    pub items: Vec<QuestionFeedback>,
}

impl SubmissionFeedback {
    pub fn acertos(&self) -> usize {
        self.items.iter().filter(|i| i.acertou).count()
    }

    pub fn total(&self) -> usize {
        self.items.len()
    }
}

/// Validate a submission and build its rows and feedback, in bank order.
pub fn prepare_submission(
    bank: &QuestionBank,
    submission: &Submission,
    timestamp: &str,
) -> Result<(Vec<AnswerRecord>, SubmissionFeedback), SubmissionError> {
    let aluno = submission.aluno.trim();
    if aluno.is_empty() {
        return Err(SubmissionError::MissingStudent);
    }

    let bloco = submission.bloco.trim();
    let block = bank
        .block(bloco)
        .ok_or_else(|| SubmissionError::UnknownBlock(bloco.to_string()))?;

    let mut chosen: HashMap<&str, &str> = HashMap::new();
    for (question_id, choice) in &submission.answers {
        let question_id = question_id.trim();
        if block.question(question_id).is_none() {
            return Err(SubmissionError::UnknownQuestion {
                question_id: question_id.to_string(),
            });
        }
        chosen.insert(question_id, choice.trim());
    }

    let turma = submission.turma.trim();
    let mut records = Vec::with_capacity(block.questions.len());
    let mut items = Vec::with_capacity(block.questions.len());

    for question in &block.questions {
        let choice = match chosen.get(question.id.as_str()) {
            Some(c) if !c.is_empty() => *c,
            _ => {
                return Err(SubmissionError::Unanswered {
                    question_id: question.id.clone(),
                })
            }
        };
        let Some(texto_escolha) = question.option_text(choice) else {
            return Err(SubmissionError::UnknownOption {
                question_id: question.id.clone(),
                choice: choice.to_string(),
            });
        };

        let acertou = question.is_correct(choice);

        records.push(AnswerRecord {
            timestamp: timestamp.to_string(),
            turma: turma.to_string(),
            aluno: aluno.to_string(),
            bloco: bloco.to_string(),
            question_id: question.id.clone(),
            pergunta: question.pergunta.clone(),
            tipo: question.tipo.clone(),
            resposta_aluno: choice.to_string(),
            gabarito: question.gabarito.clone(),
            acertou: i64::from(acertou),
        });

        items.push(QuestionFeedback {
            question_id: question.id.clone(),
            pergunta: question.pergunta.clone(),
            escolha: choice.to_string(),
            texto_escolha: texto_escolha.to_string(),
            gabarito: question.gabarito.clone(),
            texto_gabarito: question
                .option_text(&question.gabarito)
                .unwrap_or_default()
                .to_string(),
            acertou,
            explicacao: question.explicacao.trim().to_string(),
        });
    }

    let feedback = SubmissionFeedback {
        aluno: aluno.to_string(),
        bloco: bloco.to_string(),
        timestamp: timestamp.to_string(),
        items,
    };

    Ok((records, feedback))
}

/// Validate a submission and append one raw row per question.
pub fn record_submission(
    paths: &EtlPaths,
    bank: &QuestionBank,
    submission: &Submission,
    timestamp: &str,
) -> Result<SubmissionFeedback> {
    let (records, feedback) = prepare_submission(bank, submission, timestamp)?;

    for record in &records {
        append_raw_row(paths, record)?;
    }

    tracing::info!(
        aluno = %feedback.aluno,
        bloco = %feedback.bloco,
        acertos = feedback.acertos(),
        total = feedback.total(),
        "submission recorded"
    );

    Ok(feedback)
}
