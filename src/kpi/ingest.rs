//! CSV ingest: raw tabular rows to canonical [`KpiEntry`] values.
//!
//! Column contract: one `date` column formatted `DD-MM-YY`; every other
//! column is a metric. Metric cells without a leading finite number become
//! [`MetricValue::Missing`] (the key is kept). Rows without a date are
//! skipped; rows with a malformed date fail the whole batch.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use thiserror::Error;

use super::record::{KpiEntry, MetricMap, MetricValue};

/// Name of the column carrying the observation date.
pub const DATE_COLUMN: &str = "date";

/// One parsed CSV row: `(header, cell)` in column order. A cell is `None`
/// when the row is shorter than the header.
pub type RawRow = Vec<(String, Option<String>)>;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Invalid date format '{value}': expected DD-MM-YY")]
    InvalidDateFormat { value: String },

    #[error("CSV row {row}: {source}")]
    Row {
        row: usize,
        #[source]
        source: Box<IngestError>,
    },

    #[error("Failed to read CSV '{path}': {message}")]
    Read { path: PathBuf, message: String },

    #[error("Malformed CSV: {0}")]
    Malformed(String),

    #[error("CSV ingest task failed: {0}")]
    Task(String),
}

impl IngestError {
    fn at_row(self, row: usize) -> Self {
        IngestError::Row {
            row,
            source: Box::new(self),
        }
    }
}

/// Parse `DD-MM-YY` into a calendar date in the 2000s.
pub fn parse_kpi_date(raw: &str) -> Result<NaiveDate, IngestError> {
    let invalid = || IngestError::InvalidDateFormat {
        value: raw.to_string(),
    };

    let parts: Vec<&str> = raw.trim().split('-').collect();
    let [dd, mm, yy] = parts.as_slice() else {
        return Err(invalid());
    };

    let day: u32 = dd.parse().map_err(|_| invalid())?;
    let month: u32 = mm.parse().map_err(|_| invalid())?;
    if yy.len() != 2 {
        return Err(invalid());
    }
    let year: i32 = yy.parse().map_err(|_| invalid())?;

    if !(1..=31).contains(&day) || !(1..=12).contains(&month) {
        return Err(invalid());
    }

    NaiveDate::from_ymd_opt(2000 + year, month, day).ok_or_else(invalid)
}

/// Parse a metric cell the way spreadsheet exports need it: the leading
/// number is read and any suffix (`12.5%`, `1000 units`) is ignored. Cells
/// without a numeric prefix, or whose value is not finite, are `Missing`.
pub fn parse_metric(cell: Option<&str>) -> MetricValue {
    cell.and_then(|c| numeric_prefix(c.trim()))
        .and_then(|n| n.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .into()
}

/// Longest leading decimal literal: sign, digits, fraction, exponent.
fn numeric_prefix(s: &str) -> Option<&str> {
    let bytes = s.as_bytes();
    let digits = |from: usize| bytes[from..].iter().take_while(|b| b.is_ascii_digit()).count();

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_digits = digits(end);
    end += int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = digits(end + 1);
        if int_digits + frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits + frac_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_digits = digits(exp);
        if exp_digits > 0 {
            end = exp + exp_digits;
        }
    }

    Some(&s[..end])
}

/// Normalize one row.
///
/// `Ok(None)` means "skip": the row has no `date` cell, or it is empty.
pub fn normalize_row(row: &[(String, Option<String>)]) -> Result<Option<KpiEntry>, IngestError> {
    let date_cell = row
        .iter()
        .find(|(header, _)| header == DATE_COLUMN)
        .and_then(|(_, cell)| cell.as_deref())
        .filter(|cell| !cell.is_empty());

    let Some(raw_date) = date_cell else {
        return Ok(None);
    };
    let date = parse_kpi_date(raw_date)?;

    let metrics: MetricMap = row
        .iter()
        .filter(|(header, _)| header != DATE_COLUMN)
        .map(|(header, cell)| (header.clone(), parse_metric(cell.as_deref())))
        .collect();

    Ok(Some(KpiEntry { date, metrics }))
}

/// Parse CSV text held in memory (e.g. a `fileData` request field).
///
/// First line is the header. Quotes are plain text here, unlike in files.
/// Blank lines are ignored.
pub fn parse_inline_csv(text: &str) -> Result<Vec<KpiEntry>, IngestError> {
    read_entries(text.as_bytes(), false)
}

/// Parse a CSV file from disk.
///
/// The file is read and parsed on the blocking pool; the future resolves
/// once every row has been normalised. Quoted fields are supported.
pub async fn parse_csv_file(path: impl AsRef<Path>) -> Result<Vec<KpiEntry>, IngestError> {
    let path = path.as_ref().to_path_buf();
    tokio::task::spawn_blocking(move || read_csv_file(&path))
        .await
        .map_err(|e| IngestError::Task(e.to_string()))?
}

fn read_csv_file(path: &Path) -> Result<Vec<KpiEntry>, IngestError> {
    let bytes = std::fs::read(path).map_err(|e| IngestError::Read {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let entries = read_entries(&bytes, true)?;
    tracing::debug!("Parsed {} KPI rows from {}", entries.len(), path.display());
    Ok(entries)
}

fn read_entries(input: &[u8], quoting: bool) -> Result<Vec<KpiEntry>, IngestError> {
    let malformed = |e: csv::Error| IngestError::Malformed(e.to_string());

    let mut reader = csv::ReaderBuilder::new()
        .quoting(quoting)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers: Vec<String> = reader.headers().map_err(malformed)?.iter().map(str::to_string).collect();

    let mut entries = Vec::new();
    for record in reader.records() {
        let record = record.map_err(malformed)?;
        let row: RawRow = headers
            .iter()
            .enumerate()
            .map(|(i, header)| (header.clone(), record.get(i).map(str::to_string)))
            .collect();

        let line = record.position().map_or(0, |pos| record_line(input, pos));
        if let Some(entry) = normalize_row(&row).map_err(|e| e.at_row(line))? {
            entries.push(entry);
        }
    }
    Ok(entries)
}

/// 1-based line a record starts on. The reader records its position before
/// skipping blank lines, so those are counted here.
fn record_line(input: &[u8], position: &csv::Position) -> usize {
    let start = usize::try_from(position.byte()).unwrap_or(usize::MAX);
    let skipped = input
        .get(start..)
        .unwrap_or_default()
        .iter()
        .take_while(|b| matches!(b, b'\n' | b'\r'))
        .filter(|b| **b == b'\n')
        .count();
    usize::try_from(position.line()).unwrap_or(usize::MAX).saturating_add(skipped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn row(cells: &[(&str, &str)]) -> RawRow {
        cells
            .iter()
            .map(|(h, c)| (h.to_string(), Some(c.to_string())))
            .collect()
    }

    #[test]
    fn missing_date_skips_row() {
        assert_eq!(normalize_row(&row(&[("revenue", "100")])).unwrap(), None);
        assert_eq!(normalize_row(&row(&[("date", ""), ("revenue", "100")])).unwrap(), None);
    }

    #[test]
    fn date_is_day_month_two_digit_year() {
        let entry = normalize_row(&row(&[("date", "01-03-24"), ("revenue", "100")]))
            .unwrap()
            .unwrap();
        assert_eq!(entry.date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(entry.metrics.get("revenue"), Some(&MetricValue::Number(100.0)));
        assert!(entry.metrics.get("date").is_none());
    }

    #[test]
    fn non_numeric_metric_is_kept_as_missing() {
        let entry = normalize_row(&row(&[("date", "15-07-23"), ("churn", "N/A"), ("nrr", "1e2")]))
            .unwrap()
            .unwrap();
        assert_eq!(entry.metrics.get("churn"), Some(&MetricValue::Missing));
        assert_eq!(entry.metrics.get("nrr"), Some(&MetricValue::Number(100.0)));
        assert_eq!(entry.metrics.len(), 2);
    }

    #[test]
    fn nan_and_infinity_are_missing() {
        assert_eq!(parse_metric(Some("NaN")), MetricValue::Missing);
        assert_eq!(parse_metric(Some("inf")), MetricValue::Missing);
        assert_eq!(parse_metric(None), MetricValue::Missing);
        assert_eq!(parse_metric(Some(" 2.5 ")), MetricValue::Number(2.5));
    }

    #[test]
    fn metric_reads_leading_number() {
        assert_eq!(parse_metric(Some("12.5%")), MetricValue::Number(12.5));
        assert_eq!(parse_metric(Some("1000abc")), MetricValue::Number(1000.0));
        assert_eq!(parse_metric(Some("-3.5e2 units")), MetricValue::Number(-350.0));
        assert_eq!(parse_metric(Some(".5")), MetricValue::Number(0.5));
        assert_eq!(parse_metric(Some("7.")), MetricValue::Number(7.0));
        assert_eq!(parse_metric(Some("4e")), MetricValue::Number(4.0));
        assert_eq!(parse_metric(Some("N/A")), MetricValue::Missing);
        assert_eq!(parse_metric(Some("$100")), MetricValue::Missing);
        assert_eq!(parse_metric(Some("-")), MetricValue::Missing);
        assert_eq!(parse_metric(Some(".")), MetricValue::Missing);
        assert_eq!(parse_metric(Some("1e400")), MetricValue::Missing);
        assert_eq!(parse_metric(Some("")), MetricValue::Missing);
    }

    #[test]
    fn inline_csv_keeps_suffixed_numbers() {
        let entries = parse_inline_csv("date,churnRate,revenue\n01-01-24,12.5%,1000abc\n").unwrap();
        assert_eq!(entries[0].metrics.get("churnRate"), Some(&MetricValue::Number(12.5)));
        assert_eq!(entries[0].metrics.get("revenue"), Some(&MetricValue::Number(1000.0)));
    }

    #[test]
    fn out_of_range_components_are_rejected() {
        for bad in ["32-01-24", "00-01-24", "10-13-24", "31-02-24", "2024-03-01", "1-3", "aa-bb-cc", "01-03-2024"] {
            let err = parse_kpi_date(bad).unwrap_err();
            assert!(
                matches!(err, IngestError::InvalidDateFormat { ref value } if value == bad),
                "{bad}: {err}"
            );
        }
        assert!(parse_kpi_date("29-02-24").is_ok());
    }

    #[test]
    fn inline_csv_parses_header_and_rows() {
        let text = "date,revenue,churn\n01-01-24,100,2\n01-02-24,110,N/A\n,5,5\n01-03-24,120\n";
        let entries = parse_inline_csv(text).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[1].metrics.get("churn"), Some(&MetricValue::Missing));
        // short row: missing trailing cell becomes null, key still present
        assert_eq!(entries[2].metrics.get("churn"), Some(&MetricValue::Missing));
        let keys: Vec<&str> = entries[0].metrics.keys().collect();
        assert_eq!(keys, vec!["revenue", "churn"]);
    }

    #[test]
    fn inline_csv_reports_row_of_bad_date() {
        let err = parse_inline_csv("date,revenue\n01-01-24,1\n45-01-24,2\n").unwrap_err();
        match err {
            IngestError::Row { row, source } => {
                assert_eq!(row, 3);
                assert!(matches!(*source, IngestError::InvalidDateFormat { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn row_numbers_count_blank_lines() {
        let cases = [
            ("\n\ndate,revenue\n01-01-24,1\n45-01-24,2\n", 5),
            ("date,revenue\n01-01-24,1\n\n\n45-01-24,2", 5),
            ("date,revenue\r\n01-01-24,1\r\n\r\n45-01-24,2\r\n", 4),
        ];
        for (text, expected) in cases {
            match parse_inline_csv(text).unwrap_err() {
                IngestError::Row { row, .. } => assert_eq!(row, expected, "{text:?}"),
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn inline_csv_does_not_interpret_quotes() {
        let entries = parse_inline_csv("date,revenue\n01-01-24,\"5\"\n").unwrap();
        assert_eq!(entries[0].metrics.get("revenue"), Some(&MetricValue::Missing));
    }

    #[test]
    fn empty_inline_csv_yields_nothing() {
        assert!(parse_inline_csv("").unwrap().is_empty());
        assert!(parse_inline_csv("date,revenue\n").unwrap().is_empty());
    }

    #[tokio::test]
    async fn file_csv_handles_quoted_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "date,revenue,note").unwrap();
        writeln!(file, "01-01-24,\"1000\",\"a, b\"").unwrap();
        writeln!(file, "01-02-24,1100").unwrap();
        writeln!(file, ",1,1").unwrap();

        let entries = parse_csv_file(file.path()).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].metrics.get("revenue"), Some(&MetricValue::Number(1000.0)));
        assert_eq!(entries[0].metrics.get("note"), Some(&MetricValue::Missing));
        assert_eq!(entries[1].metrics.get("note"), Some(&MetricValue::Missing));
    }

    #[tokio::test]
    async fn missing_file_is_a_read_error() {
        let err = parse_csv_file("/definitely/not/here.csv").await.unwrap_err();
        assert!(matches!(err, IngestError::Read { .. }));
    }
}
