//! Markdown summary, suited to pasting into an issue or a class wiki.

use quizetl_core::model::CuratedTable;
use quizetl_core::statistics::{block_totals, student_ranking, ResultsSummary};

/// Escape pipes and flatten line breaks so cell text cannot break the table.
fn cell(s: &str) -> String {
    s.replace('|', "\\|").replace(&['\r', '\n'][..], " ")
}

pub fn generate_markdown(table: &CuratedTable) -> String {
    let summary = ResultsSummary::from_table(table);
    let mut md = String::new();

    md.push_str(&format!(
        "**Resumo:** {} respostas, {} alunos, {} acertos ({:.1}%)\n\n",
        summary.respostas, summary.alunos, summary.acertos, summary.percentual_acerto
    ));

    if table.is_empty() {
        return md;
    }

    md.push_str("### Ranking de alunos\n\n");
    md.push_str("| # | Aluno | Acertos | Respondidas | % Acerto |\n");
    md.push_str("|---|-------|---------|-------------|----------|\n");
    for (i, s) in student_ranking(table).iter().enumerate() {
        md.push_str(&format!(
            "| {} | {} | {} | {} | {:.1}% |\n",
            i + 1,
            cell(&s.aluno),
            s.acertos,
            s.respondidas,
            s.percentual()
        ));
    }
    md.push('\n');

    md.push_str("### Por bloco\n\n");
    md.push_str("| Bloco | Respostas | Acertos |\n");
    md.push_str("|-------|-----------|---------|\n");
    for (bloco, (respostas, acertos)) in block_totals(table) {
        md.push_str(&format!("| {} | {} | {} |\n", cell(&bloco), respostas, acertos));
    }

    md
}
