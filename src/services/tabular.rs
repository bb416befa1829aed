//! Streaming CSV transforms for the manual (export-based) path
//!
//! Rows are read one at a time and written straight back out. Files are read
//! without header interpretation so the header row can be edited like any
//! other row; short rows are padded with empty cells to the header width.

use crate::error::{Error, Result};
use crate::services::encoding;
use crate::services::media::{derive_filename, parse_sound_reference, sound_reference};

use csv::{ReaderBuilder, StringRecord, Writer, WriterBuilder};
use serde::Serialize;
use tracing::{debug, info, warn};

use std::fs::File;
use std::path::Path;

const SHOWN_CONVERSIONS: usize = 5;

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct AttachReport {
    pub data_rows: usize,
    pub links: usize,
}

impl AttachReport {
    pub fn is_mismatched(&self) -> bool {
        self.data_rows != self.links
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ReferenceReport {
    pub rows: usize,
    pub converted: usize,
    pub empty: usize,
}

/// A cell pulled from one column, tagged with its 1-based file row number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnCell {
    pub row_number: usize,
    pub value: String,
}

pub(crate) fn open_reader(path: &Path) -> Result<csv::Reader<File>> {
    if !path.exists() {
        return Err(Error::missing_input(path));
    }

    Ok(ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?)
}

pub(crate) fn open_writer(path: &Path) -> Result<Writer<File>> {
    Ok(WriterBuilder::new().flexible(true).from_path(path)?)
}

pub fn pad_row(row: &mut Vec<String>, width: usize) {
    if row.len() < width {
        row.resize(width, String::new());
    }
}

fn cells(record: &StringRecord) -> Vec<String> {
    record.iter().map(str::to_string).collect()
}

// Spreadsheet exports often start with a UTF-8 byte order mark.
fn strip_bom(header: &mut [String]) {
    if let Some(first) = header.first_mut() {
        let stripped = first.trim_start_matches('\u{feff}').to_string();
        *first = stripped;
    }
}

/// Read the header row and locate `column` in it.
fn header_with_column(
    reader: &mut csv::Reader<File>,
    column: &str,
    path: &Path,
) -> Result<(Vec<String>, usize)> {
    let mut record = StringRecord::new();
    if !reader.read_record(&mut record)? {
        return Err(Error::missing_column(column, path));
    }

    let mut header = cells(&record);
    strip_bom(&mut header);
    let index = header
        .iter()
        .position(|h| h.trim() == column)
        .ok_or_else(|| Error::missing_column(column, path))?;

    Ok((header, index))
}

/// Non-blank lines of a link list, trimmed, in file order.
pub fn read_links(path: &Path) -> Result<Vec<String>> {
    let text = encoding::read_text(path)?;
    let links: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect();

    info!("Loaded {} audio links", links.len());
    Ok(links)
}

/// Append `column` to the header and `links[i - 1]` to data row `i`.
///
/// Data rows without a matching link get an empty cell. A count mismatch is
/// logged, not fatal.
pub fn attach_links(
    input: &Path,
    links: &[String],
    output: &Path,
    column: &str,
) -> Result<AttachReport> {
    let mut reader = open_reader(input)?;
    let mut writer = open_writer(output)?;

    let mut record = StringRecord::new();
    let mut width = 0usize;
    let mut data_rows = 0usize;
    let mut row_index = 0usize;

    while reader.read_record(&mut record)? {
        let mut row = cells(&record);

        if row_index == 0 {
            strip_bom(&mut row);
            width = row.len();
            row.push(column.to_string());
        } else {
            pad_row(&mut row, width);
            row.push(links.get(row_index - 1).cloned().unwrap_or_default());
            data_rows += 1;
        }

        writer.write_record(&row)?;
        row_index += 1;
    }

    writer.flush()?;

    let report = AttachReport {
        data_rows,
        links: links.len(),
    };

    info!("Processed {} data rows into {}", data_rows, output.display());
    if report.is_mismatched() {
        warn!(
            "CSV has {} data rows but there are {} audio links",
            report.data_rows, report.links
        );
    }

    Ok(report)
}

/// Rewrite the URL cells of `column` into `[sound:<file>]` references.
///
/// Fails with [`Error::MissingColumn`] before `output` is created when the
/// header lacks the column.
pub fn add_references(input: &Path, output: &Path, column: &str) -> Result<ReferenceReport> {
    let mut reader = open_reader(input)?;
    let (header, index) = header_with_column(&mut reader, column, input)?;
    info!("Found '{}' column at index {}", column, index);

    let mut writer = open_writer(output)?;
    writer.write_record(&header)?;

    let width = header.len().max(index + 1);
    let mut report = ReferenceReport {
        rows: 0,
        converted: 0,
        empty: 0,
    };

    let mut record = StringRecord::new();
    while reader.read_record(&mut record)? {
        let mut row = cells(&record);
        pad_row(&mut row, width);
        report.rows += 1;

        let url = row[index].trim().to_string();
        if url.is_empty() {
            row[index] = String::new();
            report.empty += 1;
        } else if parse_sound_reference(&url).is_some() {
            debug!("Row {}: already a sound reference", report.rows);
            row[index] = url;
            report.converted += 1;
        } else {
            let reference = sound_reference(&derive_filename(&url));
            if report.converted < SHOWN_CONVERSIONS {
                info!("Row {}: {} -> {}", report.rows, url, reference);
            }
            row[index] = reference;
            report.converted += 1;
        }

        writer.write_record(&row)?;
    }

    writer.flush()?;

    info!(
        rows = report.rows,
        converted = report.converted,
        empty = report.empty,
        "Wrote {}",
        output.display()
    );

    Ok(report)
}

/// Every data row's value in `column` (trimmed; "" when the row is short).
pub fn column_cells(input: &Path, column: &str) -> Result<Vec<ColumnCell>> {
    let mut reader = open_reader(input)?;
    let (_, index) = header_with_column(&mut reader, column, input)?;

    let mut out = Vec::new();
    let mut record = StringRecord::new();
    let mut row_number = 1usize;

    while reader.read_record(&mut record)? {
        row_number += 1;
        out.push(ColumnCell {
            row_number,
            value: record.get(index).unwrap_or("").trim().to_string(),
        });
    }

    Ok(out)
}
