//! Submission error types.
//!
//! Raised before anything touches the raw store, so a rejected submission
//! never leaves partial rows behind. I/O failures are not classified here;
//! they travel as `anyhow::Error` with path context.

use thiserror::Error;

/// Reasons a quiz submission is rejected by the recorder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    /// The student name was empty after trimming.
    #[error("student name (aluno) is required")]
    MissingStudent,

    /// The block is not present in the question bank.
    #[error("unknown question block: {0}")]
    UnknownBlock(String),

    /// A question of the block has no chosen option.
    #[error("question {question_id} was not answered")]
    Unanswered { question_id: String },

    /// The chosen option key is not one of the question's options.
    #[error("option '{choice}' is not valid for question {question_id}")]
    UnknownOption { question_id: String, choice: String },

    /// An answer refers to a question that is not part of the block.
    #[error("question {question_id} does not belong to this block")]
    UnknownQuestion { question_id: String },
}

impl SubmissionError {
    /// The question this error refers to, if any.
    pub fn question_id(&self) -> Option<&str> {
        match self {
            SubmissionError::Unanswered { question_id }
            | SubmissionError::UnknownOption { question_id, .. }
            | SubmissionError::UnknownQuestion { question_id } => Some(question_id),
            SubmissionError::MissingStudent | SubmissionError::UnknownBlock(_) => None,
        }
    }
}
