//! CSV access to the raw and curated stores.
//!
//! Reading is permissive: a missing file is an empty table, missing columns
//! become empty strings, extra columns are dropped, and no row is rejected.
//! Writing always emits the fixed header followed by rows in schema order.
//!
//! There is no locking. Two concurrent appends, or an append racing an ETL
//! run, can interleave; the curated store relies on append order as a proxy
//! for submission order.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::model::{AnswerRecord, CuratedTable, RawRow, REQUIRED_COLUMNS};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Create the parent directory of `path` if needed.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory: {}", parent.display()))?;
    }
    Ok(())
}

/// Read a store file into rows of the fixed schema.
///
/// Returns an empty table when the file does not exist.
pub fn extract(path: &Path) -> Result<Vec<RawRow>> {
    if !path.exists() {
        tracing::debug!("{} does not exist, extracting empty table", path.display());
        return Ok(Vec::new());
    }

    let file =
        File::open(path).with_context(|| format!("failed to open store: {}", path.display()))?;
    let rows =
        read_rows(file).with_context(|| format!("failed to read store: {}", path.display()))?;

    tracing::debug!(rows = rows.len(), "extracted {}", path.display());
    Ok(rows)
}

/// Parse CSV text with a header row into schema rows.
pub fn read_rows<R: Read>(reader: R) -> Result<Vec<RawRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.byte_headers()?.clone();
    let positions: Vec<Option<usize>> = REQUIRED_COLUMNS
        .iter()
        .map(|column| {
            headers
                .iter()
                .position(|h| strip_bom(h) == column.as_bytes())
        })
        .collect();

    for (column, position) in REQUIRED_COLUMNS.iter().zip(&positions) {
        if position.is_none() {
            tracing::debug!("column {column} missing on disk, filling with empty values");
        }
    }

    let mut rows = Vec::new();
    for record in rdr.byte_records() {
        let record = record?;
        let fields: [String; 10] = std::array::from_fn(|i| {
            positions[i]
                .and_then(|p| record.get(p))
                .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
                .unwrap_or_default()
        });
        rows.push(RawRow::from_fields(fields));
    }

    Ok(rows)
}

fn strip_bom(header: &[u8]) -> &[u8] {
    header.strip_prefix(UTF8_BOM).unwrap_or(header)
}

/// Write the fixed header and the given rows as CSV.
pub fn write_rows<W: Write, T: Serialize>(writer: W, rows: &[T]) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(REQUIRED_COLUMNS)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Replace `path` with freshly written content via a sibling temp file.
fn write_replacing<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create temp file in {}", dir.display()))?;
    write_rows(tmp.as_file_mut(), rows)
        .with_context(|| format!("failed to write {}", path.display()))?;
    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("failed to replace {}", path.display()))?;
    Ok(())
}

/// Write the curated table, overwriting whatever was there.
pub fn load(table: &CuratedTable, path: &Path) -> Result<()> {
    ensure_parent_dir(path)?;
    write_replacing(path, &table.rows)?;
    tracing::info!(rows = table.len(), "curated store written to {}", path.display());
    Ok(())
}

/// Read the curated store for reporting; `acertou` is re-coerced.
pub fn read_curated(path: &Path) -> Result<CuratedTable> {
    let rows = extract(path)?;
    Ok(CuratedTable::new(
        rows.into_iter().map(AnswerRecord::from_raw).collect(),
    ))
}

/// What the first line of an existing raw store looks like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderState {
    /// No file, or a zero-length one.
    Missing,
    /// Header is exactly [`REQUIRED_COLUMNS`].
    Canonical,
    /// Anything else: older schema, reordered or extra columns.
    Foreign,
}

pub fn header_state(path: &Path) -> Result<HeaderState> {
    let metadata = match fs::metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HeaderState::Missing),
        Err(e) => {
            return Err(e).with_context(|| format!("failed to stat {}", path.display()));
        }
    };
    if metadata.len() == 0 {
        return Ok(HeaderState::Missing);
    }

    let file =
        File::open(path).with_context(|| format!("failed to open store: {}", path.display()))?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file);
    let headers = rdr
        .byte_headers()
        .with_context(|| format!("failed to read header of {}", path.display()))?;

    let canonical = headers.len() == REQUIRED_COLUMNS.len()
        && headers
            .iter()
            .zip(REQUIRED_COLUMNS)
            .all(|(h, c)| strip_bom(h) == c.as_bytes());

    Ok(if canonical {
        HeaderState::Canonical
    } else {
        HeaderState::Foreign
    })
}

/// Durably add one record to the end of the raw store.
///
/// A canonical file gets a true append of one line. A missing file is
/// created with the header. A file with any other header is compacted into
/// the fixed schema with the new record at the end.
pub fn append_row(path: &Path, record: &AnswerRecord) -> Result<()> {
    ensure_parent_dir(path)?;

    match header_state(path)? {
        HeaderState::Missing => {
            write_replacing(path, std::slice::from_ref(record))?;
            tracing::debug!("created raw store {}", path.display());
        }
        HeaderState::Canonical => {
            let mut file = OpenOptions::new()
                .read(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open {} for append", path.display()))?;
            if !ends_with_newline(&mut file)? {
                file.write_all(b"\n")?;
            }
            let mut wtr = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(&mut file);
            wtr.serialize(record)
                .with_context(|| format!("failed to append to {}", path.display()))?;
            wtr.flush()?;
            tracing::debug!("appended one row to {}", path.display());
        }
        HeaderState::Foreign => {
            let mut rows = extract(path)?;
            rows.push(record.to_raw());
            write_replacing(path, &rows)?;
            tracing::info!(
                rows = rows.len(),
                "raw store {} compacted into the fixed schema",
                path.display()
            );
        }
    }

    Ok(())
}

fn ends_with_newline(file: &mut File) -> Result<bool> {
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(true);
    }
    file.seek(SeekFrom::Start(len - 1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

/// Rewrite the raw store in the fixed schema, keeping row order and values.
///
/// Returns the number of data rows written. A missing store is left alone.
pub fn compact_raw(path: &Path) -> Result<usize> {
    if !path.exists() {
        return Ok(0);
    }
    let rows = extract(path)?;
    write_replacing(path, &rows)?;
    tracing::info!(rows = rows.len(), "compacted {}", path.display());
    Ok(rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "timestamp,turma,aluno,bloco,question_id,pergunta,tipo,resposta_aluno,gabarito,acertou\n";

    fn record(aluno: &str, question_id: &str, acertou: i64) -> AnswerRecord {
        AnswerRecord {
            timestamp: "2026-02-12T13:00:00Z".into(),
            turma: "Turma A".into(),
            aluno: aluno.into(),
            bloco: "Bloco 1".into(),
            question_id: question_id.into(),
            pergunta: "O que é ETL?".into(),
            tipo: "multipla".into(),
            resposta_aluno: "A".into(),
            gabarito: "A".into(),
            acertou,
        }
    }

    #[test]
    fn extract_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let rows = extract(&dir.path().join("nope.csv")).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn extract_empty_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw.csv");
        fs::write(&path, "").unwrap();
        assert!(extract(&path).unwrap().is_empty());
    }

    #[test]
    fn read_rows_fills_missing_and_drops_extra_columns() {
        let csv = "aluno,extra,question_id,acertou\nAna,x,Q1,1\nBruno,y,Q2,0\n";
        let rows = read_rows(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].aluno, "Ana");
        assert_eq!(rows[0].question_id, "Q1");
        assert_eq!(rows[0].tipo, "");
        assert_eq!(rows[1].acertou, "0");
        assert!(rows.iter().all(|r| r.turma.is_empty() && r.pergunta.is_empty()));
    }

    #[test]
    fn read_rows_keeps_values_verbatim() {
        let csv = format!("{HEADER}2026-01-01T00:00:00Z, Turma A ,  Ana ,B1,Q1,\"Texto, com vírgula\",multipla,A,A,abc\n");
        let rows = read_rows(csv.as_bytes()).unwrap();
        assert_eq!(rows[0].turma, " Turma A ");
        assert_eq!(rows[0].aluno, "  Ana ");
        assert_eq!(rows[0].pergunta, "Texto, com vírgula");
        assert_eq!(rows[0].acertou, "abc");
    }

    #[test]
    fn read_rows_tolerates_short_rows_and_bom() {
        let csv = "\u{feff}timestamp,turma,aluno\nt1,T,Ana\nt2\n";
        let rows = read_rows(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].timestamp, "t1");
        assert_eq!(rows[0].aluno, "Ana");
        assert_eq!(rows[1].timestamp, "t2");
        assert_eq!(rows[1].aluno, "");
    }

    #[test]
    fn append_creates_file_with_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("raw").join("raw.csv");

        append_row(&path, &record("Ana", "Q1", 1)).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(format!("{}\n", lines[0]), HEADER);
        assert!(lines[1].ends_with(",Ana,Bloco 1,Q1,O que é ETL?,multipla,A,A,1"));
    }

    #[test]
    fn append_to_canonical_file_appends_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw.csv");

        append_row(&path, &record("Ana", "Q1", 1)).unwrap();
        append_row(&path, &record("Bruno", "Q1", 0)).unwrap();
        append_row(&path, &record("Ana", "Q1", 0)).unwrap();

        let rows = extract(&path).unwrap();
        let alunos: Vec<&str> = rows.iter().map(|r| r.aluno.as_str()).collect();
        assert_eq!(alunos, vec!["Ana", "Bruno", "Ana"]);
        assert_eq!(rows[2].acertou, "0");
    }

    #[test]
    fn append_repairs_missing_trailing_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw.csv");
        fs::write(&path, format!("{HEADER}t0,T,Ana,B,Q1,P,multipla,A,A,1")).unwrap();

        append_row(&path, &record("Bruno", "Q2", 0)).unwrap();

        let rows = extract(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].acertou, "1");
        assert_eq!(rows[1].aluno, "Bruno");
    }

    #[test]
    fn append_to_foreign_header_compacts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw.csv");
        fs::write(&path, "aluno,question_id,acertou\nAna,Q1,1\n").unwrap();
        assert_eq!(header_state(&path).unwrap(), HeaderState::Foreign);

        append_row(&path, &record("Bruno", "Q2", 0)).unwrap();

        assert_eq!(header_state(&path).unwrap(), HeaderState::Canonical);
        let rows = extract(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].aluno, "Ana");
        assert_eq!(rows[0].turma, "");
        assert_eq!(rows[1].aluno, "Bruno");
    }

    #[test]
    fn compact_missing_store_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw.csv");
        assert_eq!(compact_raw(&path).unwrap(), 0);
        assert!(!path.exists());
    }

    #[test]
    fn load_overwrites_and_read_curated_coerces() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("curated").join("curated.csv");

        load(&CuratedTable::new(vec![record("Ana", "Q1", 1), record("Bruno", "Q1", 0)]), &path)
            .unwrap();
        load(&CuratedTable::new(vec![record("Carla", "Q1", 1)]), &path).unwrap();

        let table = read_curated(&path).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows[0].aluno, "Carla");
        assert_eq!(table.rows[0].acertou, 1);
    }

    #[test]
    fn load_empty_table_writes_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("curated.csv");
        load(&CuratedTable::default(), &path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), HEADER);
    }
}
