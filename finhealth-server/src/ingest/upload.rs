//! Upload parsing: CSV, Excel, and PDF files into a [`RecordTable`].
//!
//! These are thin wrappers over existing parsers; the interesting work
//! (normalization, metrics) happens after the bytes become a table.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use finhealth_common::error::{Error, Result};

use super::RecordTable;

/// Parse an uploaded file into a record table, dispatching on the filename
/// extension. Unknown extensions are rejected.
pub fn parse_upload(filename: &str, bytes: &[u8]) -> Result<RecordTable> {
    let name = filename.to_lowercase();

    if name.ends_with(".csv") {
        return parse_csv(bytes);
    }
    if name.ends_with(".xlsx") || name.ends_with(".xls") {
        return parse_excel(bytes);
    }
    if name.ends_with(".pdf") {
        return parse_pdf(bytes);
    }

    Err(Error::InvalidInput("Unsupported file type".into()))
}

/// Parse CSV bytes. Rows that fail to parse (bad quoting, stray bytes) are
/// skipped rather than failing the upload.
fn parse_csv(bytes: &[u8]) -> Result<RecordTable> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| Error::UnreadableUpload(format!("CSV header: {}", e)))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let Ok(record) = record else {
            continue;
        };
        rows.push(record.iter().map(super::parse_cell).collect());
    }

    Ok(RecordTable::from_rows(&headers, &rows))
}

/// Parse an Excel workbook: first worksheet, first row as the header.
fn parse_excel(bytes: &[u8]) -> Result<RecordTable> {
    let cursor = Cursor::new(bytes.to_vec());
    let mut workbook = open_workbook_auto_from_rs(cursor)
        .map_err(|e| Error::UnreadableUpload(format!("Excel workbook: {}", e)))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| Error::UnreadableUpload("Excel workbook has no sheets".into()))?
        .map_err(|e| Error::UnreadableUpload(format!("Excel sheet: {}", e)))?;

    let mut row_iter = range.rows();
    let headers: Vec<String> = match row_iter.next() {
        Some(header_row) => header_row.iter().map(excel_header).collect(),
        None => Vec::new(),
    };

    let rows: Vec<Vec<Option<f64>>> = row_iter
        .map(|row| row.iter().map(excel_cell).collect())
        .collect();

    Ok(RecordTable::from_rows(&headers, &rows))
}

/// Parse a PDF by extracting its text and keeping comma-bearing lines,
/// which are then treated as CSV.
fn parse_pdf(bytes: &[u8]) -> Result<RecordTable> {
    let text = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| Error::UnreadableUpload(format!("PDF text extraction: {}", e)))?;

    let lines: Vec<&str> = text.lines().filter(|line| line.contains(',')).collect();
    if lines.is_empty() {
        return Err(Error::InvalidInput(
            "PDF does not contain CSV-like data".into(),
        ));
    }

    parse_csv(lines.join("\n").as_bytes())
}

fn excel_header(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn excel_cell(cell: &Data) -> Option<f64> {
    match cell {
        Data::Float(f) if f.is_finite() => Some(*f),
        Data::Int(i) => Some(*i as f64),
        Data::String(s) => super::parse_cell(s),
        Data::Bool(b) => Some(f64::from(u8::from(*b))),
        _ => None,
    }
}
