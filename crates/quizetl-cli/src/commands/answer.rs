//! The `quizetl answer` command.

use std::path::PathBuf;

use anyhow::Result;

use quizetl_core::config::load_config_from;
use quizetl_core::questions::load_question_bank;
use quizetl_core::recorder::{record_submission, utc_now_iso, Submission, SubmissionFeedback};

/// Parse `"q1=A,q2=C"` into `(question_id, choice)` pairs.
fn parse_answers(s: &str) -> Result<Vec<(String, String)>> {
    s.split(',')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (question_id, choice) = pair
                .split_once('=')
                .ok_or_else(|| anyhow::anyhow!("invalid answer '{pair}', expected question_id=option"))?;
            Ok((question_id.trim().to_string(), choice.trim().to_string()))
        })
        .collect()
}

pub fn execute(
    config_path: Option<PathBuf>,
    aluno: String,
    turma: Option<String>,
    bloco: String,
    answers: String,
    no_feedback: bool,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let bank = load_question_bank(&config.questions)?;

    let submission = Submission {
        turma: turma.unwrap_or_else(|| config.default_turma.clone()),
        aluno,
        bloco,
        answers: parse_answers(&answers)?,
    };

    let feedback = record_submission(&config.etl_paths(), &bank, &submission, &utc_now_iso())?;

    println!(
        "Recorded {} answer(s) for {} in {}.",
        feedback.total(),
        feedback.aluno,
        config.raw_csv.display()
    );
    println!("Run `quizetl etl` to refresh the curated results.");

    if !no_feedback {
        print_feedback(&feedback);
    }

    Ok(())
}

fn print_feedback(feedback: &SubmissionFeedback) {
    println!(
        "\nResumo do bloco: {} acerto(s) de {} questão(ões).",
        feedback.acertos(),
        feedback.total()
    );

    for item in &feedback.items {
        println!();
        if item.acertou {
            println!("  OK    {}", item.pergunta);
            println!("        Você marcou: {} — {}", item.escolha, item.texto_escolha);
        } else {
            println!("  ERRO  {}", item.pergunta);
            println!("        Você marcou: {} — {}", item.escolha, item.texto_escolha);
            println!("        Correta: {} — {}", item.gabarito, item.texto_gabarito);
            if !item.explicacao.is_empty() {
                println!("        Por que é a correta? {}", item.explicacao);
            }
        }
    }
}
