//! Raw → curated transform.
//!
//! Trims text fields, coerces `acertou`, drops rows without a student,
//! keeps the last answer per (`aluno`, `question_id`), and sorts by
//! (`turma`, `aluno`, `bloco`, `question_id`).

use std::collections::HashMap;

use crate::model::{coerce_acertou, AnswerRecord, CuratedTable, EtlMetrics, RawRow};

/// Normalize one extracted row. `timestamp` is left as stored.
pub fn normalize_row(raw: RawRow) -> AnswerRecord {
    fn clean(s: String) -> String {
        let trimmed = s.trim();
        if trimmed.len() == s.len() {
            s
        } else {
            trimmed.to_string()
        }
    }

    AnswerRecord {
        acertou: coerce_acertou(&raw.acertou),
        timestamp: raw.timestamp,
        turma: clean(raw.turma),
        aluno: clean(raw.aluno),
        bloco: clean(raw.bloco),
        question_id: clean(raw.question_id),
        pergunta: clean(raw.pergunta),
        tipo: clean(raw.tipo),
        resposta_aluno: clean(raw.resposta_aluno),
        gabarito: clean(raw.gabarito),
    }
}

/// Keep only the last occurrence of each (`aluno`, `question_id`) key,
/// preserving the relative order of the survivors.
pub fn keep_last_per_key(rows: Vec<AnswerRecord>) -> Vec<AnswerRecord> {
    let keep = {
        let mut last: HashMap<(&str, &str), usize> = HashMap::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            last.insert(row.dedup_key(), i);
        }
        let mut keep = vec![false; rows.len()];
        for &i in last.values() {
            keep[i] = true;
        }
        keep
    };

    rows.into_iter()
        .zip(keep)
        .filter_map(|(row, kept)| kept.then_some(row))
        .collect()
}

/// Produce the curated table and run metrics from extracted rows.
pub fn transform(raw: Vec<RawRow>) -> (CuratedTable, EtlMetrics) {
    let extracted = raw.len();
    let rows: Vec<AnswerRecord> = raw
        .into_iter()
        .map(normalize_row)
        .filter(|r| !r.aluno.is_empty())
        .collect();

    let linhas_raw = rows.len();
    if linhas_raw < extracted {
        tracing::debug!(dropped = extracted - linhas_raw, "dropped rows without aluno");
    }

    let mut rows = keep_last_per_key(rows);
    let linhas_curated = rows.len();

    let metrics = EtlMetrics {
        linhas_raw,
        linhas_curated,
        duplicados_removidos: linhas_raw - linhas_curated,
        total_acertos: rows.iter().map(|r| r.acertou).sum(),
    };

    rows.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

    (CuratedTable::new(rows), metrics)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(turma: &str, aluno: &str, bloco: &str, qid: &str, acertou: &str, ts: &str) -> RawRow {
        RawRow {
            timestamp: ts.into(),
            turma: turma.into(),
            aluno: aluno.into(),
            bloco: bloco.into(),
            question_id: qid.into(),
            pergunta: "Pergunta".into(),
            tipo: "multipla".into(),
            resposta_aluno: "A".into(),
            gabarito: "A".into(),
            acertou: acertou.into(),
        }
    }

    #[test]
    fn last_answer_wins() {
        let rows = vec![
            raw("T", "A", "B1", "Q1", "1", "t1"),
            raw("T", "A", "B1", "Q1", "0", "t2"),
        ];
        let (table, metrics) = transform(rows);
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows[0].acertou, 0);
        assert_eq!(table.rows[0].timestamp, "t2");
        assert_eq!(metrics.duplicados_removidos, 1);
        assert_eq!(metrics.total_acertos, 0);
    }

    #[test]
    fn empty_students_are_dropped_before_counting() {
        let rows = vec![
            raw("T", "Ana", "B1", "Q1", "1", "t1"),
            raw("T", "", "B1", "Q1", "1", "t2"),
            raw("T", "   ", "B1", "Q2", "1", "t3"),
            raw("T", "Bruno", "B1", "Q1", "0", "t4"),
            raw("T", "Ana", "B1", "Q2", "1", "t5"),
        ];
        let (table, metrics) = transform(rows);
        assert_eq!(metrics.linhas_raw, 3);
        assert_eq!(metrics.linhas_curated, 3);
        assert_eq!(metrics.duplicados_removidos, 0);
        assert_eq!(metrics.total_acertos, 2);
        assert!(table.iter().all(|r| !r.aluno.is_empty()));
    }

    #[test]
    fn trims_everything_but_timestamp() {
        let mut row = raw(" T ", " Ana ", " B1 ", " Q1 ", " 1 ", " t1 ");
        row.resposta_aluno = " A ".into();
        let record = normalize_row(row);
        assert_eq!(record.turma, "T");
        assert_eq!(record.aluno, "Ana");
        assert_eq!(record.question_id, "Q1");
        assert_eq!(record.resposta_aluno, "A");
        assert_eq!(record.timestamp, " t1 ");
        assert_eq!(record.acertou, 1);
    }

    #[test]
    fn trimmed_keys_collapse_duplicates() {
        let rows = vec![
            raw("T", "Ana", "B1", "Q1", "1", "t1"),
            raw("T", " Ana", "B1", "Q1 ", "0", "t2"),
        ];
        let (table, metrics) = transform(rows);
        assert_eq!(table.len(), 1);
        assert_eq!(metrics.duplicados_removidos, 1);
        assert_eq!(table.rows[0].timestamp, "t2");
    }

    #[test]
    fn dedup_ignores_block_and_class() {
        let rows = vec![
            raw("T1", "Ana", "B1", "Q1", "1", "t1"),
            raw("T2", "Ana", "B2", "Q1", "0", "t2"),
        ];
        let (table, _) = transform(rows);
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows[0].turma, "T2");
    }

    #[test]
    fn sorted_by_turma_aluno_bloco_question() {
        let rows = vec![
            raw("B", "Zé", "B1", "Q1", "1", "t1"),
            raw("A", "Zé", "B1", "Q2", "1", "t2"),
            raw("A", "Ana", "B2", "Q1", "0", "t3"),
            raw("A", "Ana", "B1", "Q3", "1", "t4"),
            raw("A", "Zé", "B1", "Q10", "0", "t5"),
        ];
        let (table, _) = transform(rows);
        let keys: Vec<(&str, &str, &str, &str)> = table.iter().map(|r| r.sort_key()).collect();
        assert_eq!(
            keys,
            vec![
                ("A", "Ana", "B1", "Q3"),
                ("A", "Ana", "B2", "Q1"),
                ("A", "Zé", "B1", "Q10"),
                ("A", "Zé", "B1", "Q2"),
                ("B", "Zé", "B1", "Q1"),
            ]
        );
    }

    #[test]
    fn malformed_acertou_counts_as_wrong() {
        let rows = vec![
            raw("T", "Ana", "B1", "Q1", "", "t1"),
            raw("T", "Ana", "B1", "Q2", "x", "t2"),
            raw("T", "Ana", "B1", "Q3", "1.0", "t3"),
        ];
        let (_, metrics) = transform(rows);
        assert_eq!(metrics.total_acertos, 1);
    }

    #[test]
    fn empty_input_gives_zero_metrics() {
        let (table, metrics) = transform(Vec::new());
        assert!(table.is_empty());
        assert_eq!(metrics, EtlMetrics::default());
    }

    #[test]
    fn keep_last_preserves_survivor_order() {
        let rows: Vec<AnswerRecord> = [("b", "Q1"), ("a", "Q1"), ("b", "Q1"), ("c", "Q1")]
            .iter()
            .map(|(aluno, qid)| AnswerRecord {
                aluno: (*aluno).into(),
                question_id: (*qid).into(),
                ..Default::default()
            })
            .collect();
        let kept = keep_last_per_key(rows);
        let alunos: Vec<&str> = kept.iter().map(|r| r.aluno.as_str()).collect();
        assert_eq!(alunos, vec!["a", "b", "c"]);
    }
}
