// Delimited field-observation import

use std::collections::HashMap;
use std::path::Path;

use fieldrisk_core::{normalize_header, CanonicalField, FieldRecord};

use crate::error::ParseError;

/// Knobs for a single ingestion call.
#[derive(Debug, Clone, Copy, Default)]
pub struct IngestOptions {
    /// Field delimiter. `None` = sniff from the first lines.
    pub delimiter: Option<u8>,
}

/// Read a file from disk and parse it.
pub fn read_fields(path: &Path, opts: &IngestOptions) -> Result<Vec<FieldRecord>, ParseError> {
    let bytes = std::fs::read(path).map_err(|e| ParseError::Read(format!("{}: {e}", path.display())))?;
    parse_bytes(&bytes, opts)
}

/// Parse raw bytes. Input must be UTF-8; a leading BOM is ignored.
pub fn parse_bytes(bytes: &[u8], opts: &IngestOptions) -> Result<Vec<FieldRecord>, ParseError> {
    let content = std::str::from_utf8(bytes).map_err(|e| ParseError::Encoding(e.to_string()))?;
    parse_fields_with(content, opts)
}

/// Parse text with a sniffed delimiter.
pub fn parse_fields(content: &str) -> Result<Vec<FieldRecord>, ParseError> {
    parse_fields_with(content, &IngestOptions::default())
}

/// Parse delimited text into canonical records, preserving row order.
///
/// Rows whose cells are all blank are skipped and do not consume a position.
/// A missing or blank `field_id` (empty or whitespace only) becomes the row's
/// 1-based position among the kept rows.
pub fn parse_fields_with(content: &str, opts: &IngestOptions) -> Result<Vec<FieldRecord>, ParseError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let delimiter = opts.delimiter.unwrap_or_else(|| sniff_delimiter(content));

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = reader.headers().map_err(syntax_error)?.clone();

    // Later duplicates of the same normalized header overwrite earlier ones
    let mut columns: HashMap<String, usize> = HashMap::new();
    for (idx, header) in headers.iter().enumerate() {
        columns.insert(normalize_header(header), idx);
    }

    let resolved: Vec<(CanonicalField, usize)> = CanonicalField::ALL
        .into_iter()
        .filter_map(|field| field.resolve_column(&columns).map(|idx| (field, idx)))
        .collect();

    log::debug!(
        "csv header: delimiter={:?}, {} column(s), resolved {:?}",
        delimiter as char,
        headers.len(),
        resolved.iter().map(|(f, i)| (f.key(), *i)).collect::<Vec<_>>(),
    );

    let mut rows: Vec<FieldRecord> = Vec::new();
    let mut skipped = 0usize;

    for result in reader.records() {
        let record = result.map_err(syntax_error)?;

        if record.iter().all(|cell| cell.trim().is_empty()) {
            skipped += 1;
            continue;
        }

        // Length is checked after the blank test so whitespace-only lines skip
        if record.len() != headers.len() {
            return Err(ParseError::Syntax {
                line: record.position().map(|p| p.line()),
                message: format!("expected {} field(s), found {}", headers.len(), record.len()),
            });
        }

        let mut row = FieldRecord::default();
        for (field, idx) in &resolved {
            row.set(*field, record.get(*idx).unwrap_or("").to_string());
        }

        if row.field_id.trim().is_empty() {
            row.field_id = (rows.len() + 1).to_string();
        }

        rows.push(row);
    }

    log::info!("parsed {} field record(s), skipped {} blank row(s)", rows.len(), skipped);

    Ok(rows)
}

/// `field_id`s occurring more than once, in first-seen order.
///
/// Ingestion does not reject these; selection by id resolves to the first
/// occurrence.
pub fn duplicate_field_ids(records: &[FieldRecord]) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();
    for record in records {
        let count = counts.entry(record.field_id.as_str()).or_insert(0);
        if *count == 0 {
            order.push(record.field_id.as_str());
        }
        *count += 1;
    }
    order
        .into_iter()
        .filter(|id| counts[id] > 1)
        .map(String::from)
        .collect()
}

/// Detect the most likely field delimiter by checking consistency across the first few lines.
///
/// For each candidate (tab, semicolon, comma, pipe), count fields per line. The delimiter
/// that produces the most consistent field count (>1 field) wins. Comma when nothing fits.
fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .take(10)
        .collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        if counts[0] <= 1 {
            continue;
        }

        // More consistent lines first, then more columns
        let target = counts[0];
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

fn syntax_error(err: csv::Error) -> ParseError {
    let line = err.position().map(|p| p.line());
    match err.kind() {
        csv::ErrorKind::Utf8 { .. } => ParseError::Encoding(err.to_string()),
        _ => ParseError::Syntax { line, message: err.to_string() },
    }
}
