// CSV/TSV import
//
// First record is the header row. Field values are typed by inference so
// numeric comparisons work once the table is registered with the engine.

use std::io::Read;
use std::path::Path;

use sheetql_engine::{Table, Value};

/// Read a delimited text file into a table. The delimiter is sniffed from
/// the first lines (tab, semicolon, comma, pipe).
pub fn read(path: &Path) -> Result<Table, String> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);
    read_from_string(&content, delimiter)
}

/// Detect the most likely field delimiter by checking consistency across the
/// first few lines.
///
/// For each candidate (tab, semicolon, comma, pipe), count fields per line.
/// The delimiter that produces the most consistent field count (>1 field)
/// wins.
fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().take(10).collect();

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

        // Must produce >1 field on the first line to be viable
        if counts.first().copied().unwrap_or(0) <= 1 {
            continue;
        }

        // Score: (number of lines with same field count as line 1) * field_count
        // Higher field count breaks ties — more columns = more likely real delimiter
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

/// Read file and convert to UTF-8 if needed (handles Windows-1252, Latin-1, etc.)
fn read_file_as_utf8(path: &Path) -> Result<String, String> {
    let mut file = std::fs::File::open(path).map_err(|e| e.to_string())?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|e| e.to_string())?;

    // Try UTF-8 first; on failure, recover the buffer from the error
    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            let bytes = e.into_bytes();
            // Fall back to Windows-1252 (common for Excel-exported CSVs)
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

fn read_from_string(content: &str, delimiter: u8) -> Result<Table, String> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut records = reader.records();
    let header = match records.next() {
        Some(r) => r.map_err(|e| e.to_string())?,
        None => return Err("empty file".to_string()),
    };
    let columns: Vec<String> = header.iter().map(|f| f.trim().to_string()).collect();
    let ncols = columns.len();

    let mut rows = Vec::new();
    for result in records {
        let record = result.map_err(|e| e.to_string())?;
        let mut row: Vec<Value> = record.iter().take(ncols).map(parse_field).collect();
        // Short records pad with nulls so every row matches the header width
        row.resize(ncols, Value::Null);
        rows.push(row);
    }

    Ok(Table { columns, rows })
}

/// Type a raw text field: integer, then float, else text. Digit strings with
/// a leading zero ("007", zip codes) stay text.
pub fn parse_field(field: &str) -> Value {
    let s = field.trim();
    if s.is_empty() {
        return Value::Null;
    }
    if has_leading_zero(s) {
        return Value::Text(s.to_string());
    }
    if let Ok(v) = s.parse::<i64>() {
        return Value::Integer(v);
    }
    if looks_numeric(s) {
        if let Ok(v) = s.parse::<f64>() {
            if v.is_finite() {
                return Value::Float(v);
            }
        }
    }
    Value::Text(s.to_string())
}

fn has_leading_zero(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    digits.len() > 1 && digits.starts_with('0') && !digits.starts_with("0.")
}

/// Guard against `f64::parse` accepting words like "inf" and "NaN".
fn looks_numeric(s: &str) -> bool {
    s.chars()
        .next()
        .map(|c| c.is_ascii_digit() || c == '-' || c == '+' || c == '.')
        .unwrap_or(false)
        && s.chars().all(|c| {
            c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E')
        })
}
