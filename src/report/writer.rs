//! Report Writing Module
//!
//! This module persists shaped report tables. The executor hands each report to a
//! [`ReportWriter`] once per requested format and owns no file-format knowledge
//! itself.
//!
//! # Formats
//!
//! [`TabularReportWriter`] writes reports to `{base}/{rel}.{ext}`:
//!
//! - `csv`: one row per data set, the label first and the flattened values after it,
//!   without a header
//! - `json`: a list of `{id, label, shape, values}` objects
//! - `xlsx`: a single worksheet with a header row and one row per data set
//!
//! CSV and XLSX require the `tabular` feature.

use std::fs::File;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::report::data_model::{ReportFormat, ReportResult};

#[cfg(feature = "tabular")]
use polars::prelude::{CsvWriter, DataFrame, NamedFrom, SerWriter, Series};
#[cfg(feature = "tabular")]
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook};

/// Maximum length of a worksheet name
#[cfg(feature = "tabular")]
const MAX_SHEET_NAME_LENGTH: usize = 31;

/// Default column width
#[cfg(feature = "tabular")]
const DEFAULT_COLUMN_WIDTH: f64 = 20.0;

/// Border color for cells
#[cfg(feature = "tabular")]
const BORDER_COLOR: u32 = 0xB0B0B0;

/// Header background color
#[cfg(feature = "tabular")]
const HEADER_BG_COLOR: u32 = 0xD9EAD3;

/// Persists report tables.
pub trait ReportWriter {
    /// Writes a report.
    ///
    /// # Arguments
    ///
    /// * `report` - The shaped report table
    /// * `base_path` - Base output directory
    /// * `rel_path` - Path of the report relative to `base_path`, without extension
    /// * `format` - The format to write
    fn write(
        &self,
        report: &ReportResult,
        base_path: &Path,
        rel_path: &str,
        format: &ReportFormat,
    ) -> Result<(), ReportError>;
}

/// Writes reports as CSV, JSON or XLSX files.
#[derive(Debug, Clone, Copy, Default)]
pub struct TabularReportWriter;

impl TabularReportWriter {
    /// Returns the file a report is written to.
    pub fn output_path(base_path: &Path, rel_path: &str, format: &ReportFormat) -> PathBuf {
        base_path.join(format!("{}.{}", rel_path, format.extension()))
    }
}

impl ReportWriter for TabularReportWriter {
    fn write(
        &self,
        report: &ReportResult,
        base_path: &Path,
        rel_path: &str,
        format: &ReportFormat,
    ) -> Result<(), ReportError> {
        let path = Self::output_path(base_path, rel_path, format);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ReportError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        log::debug!("Writing report to {}", path.display());

        match format {
            ReportFormat::Json => write_json(report, &path),
            #[cfg(feature = "tabular")]
            ReportFormat::Csv => write_csv(report, &path),
            #[cfg(feature = "tabular")]
            ReportFormat::Xlsx => write_xlsx(report, &path, rel_path),
            other => Err(ReportError::UnsupportedFormat(other.clone())),
        }
    }
}

#[derive(Serialize)]
struct JsonDataSet<'a> {
    id: &'a str,
    label: &'a str,
    shape: &'a [usize],
    values: Vec<f64>,
}

fn write_json(report: &ReportResult, path: &Path) -> Result<(), ReportError> {
    let rows = report.rows();
    let data_sets: Vec<JsonDataSet> = report
        .data_set_ids
        .iter()
        .zip(&report.labels)
        .zip(rows)
        .map(|((id, label), values)| JsonDataSet {
            id,
            label,
            shape: report.row_shape(),
            values,
        })
        .collect();

    let file = File::create(path).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::to_writer_pretty(file, &data_sets).map_err(ReportError::Json)
}

/// Builds a frame with a `label` column followed by one column per value.
#[cfg(feature = "tabular")]
fn to_dataframe(report: &ReportResult) -> Result<DataFrame, ReportError> {
    let rows = report.rows();
    let width = rows.first().map_or(0, Vec::len);

    let mut columns = Vec::with_capacity(width + 1);
    columns.push(Series::new("label", report.labels.clone()));
    for col in 0..width {
        let values: Vec<f64> = rows.iter().map(|row| row[col]).collect();
        columns.push(Series::new(&col.to_string(), values));
    }

    DataFrame::new(columns).map_err(|e| ReportError::Tabular(e.to_string()))
}

#[cfg(feature = "tabular")]
fn write_csv(report: &ReportResult, path: &Path) -> Result<(), ReportError> {
    let mut df = to_dataframe(report)?;
    let mut file = File::create(path).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    CsvWriter::new(&mut file)
        .include_header(false)
        .finish(&mut df)
        .map_err(|e| ReportError::Tabular(e.to_string()))
}

#[cfg(feature = "tabular")]
fn write_xlsx(report: &ReportResult, path: &Path, rel_path: &str) -> Result<(), ReportError> {
    let xlsx_err = |e: rust_xlsxwriter::XlsxError| ReportError::Tabular(e.to_string());

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(sheet_name(rel_path)).map_err(xlsx_err)?;

    let rows = report.rows();
    let width = rows.first().map_or(0, Vec::len);

    let header_format = get_header_format();
    sheet
        .write_string_with_format(0, 0, "Label", &header_format)
        .map_err(xlsx_err)?;
    for col in 0..width {
        sheet
            .write_number_with_format(0, col as u16 + 1, col as f64, &header_format)
            .map_err(xlsx_err)?;
    }

    for (row_idx, (label, values)) in report.labels.iter().zip(&rows).enumerate() {
        let row = row_idx as u32 + 1;
        sheet.write_string(row, 0, label).map_err(xlsx_err)?;
        for (col_idx, value) in values.iter().enumerate() {
            sheet
                .write_number(row, col_idx as u16 + 1, *value)
                .map_err(xlsx_err)?;
        }
    }

    for col in 0..=width {
        sheet
            .set_column_width(col as u16, DEFAULT_COLUMN_WIDTH)
            .map_err(xlsx_err)?;
    }

    workbook.save(path).map_err(xlsx_err)
}

/// Worksheet names are limited in length and may not contain path separators.
#[cfg(feature = "tabular")]
fn sheet_name(rel_path: &str) -> String {
    let name = rel_path.rsplit(['/', '\\']).next().unwrap_or(rel_path);
    let name: String = name
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | ':' | '*' | '?'))
        .take(MAX_SHEET_NAME_LENGTH)
        .collect();

    if name.is_empty() {
        "report".to_string()
    } else {
        name
    }
}

/// Returns a format for header cells
#[cfg(feature = "tabular")]
fn get_header_format() -> Format {
    Format::new()
        .set_background_color(HEADER_BG_COLOR)
        .set_bold()
        .set_border_bottom(FormatBorder::Double)
        .set_border_bottom_color(BORDER_COLOR)
        .set_align(FormatAlign::Center)
}

/// Represents errors that can occur while writing reports.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Report format '{0}' is not supported")]
    UnsupportedFormat(ReportFormat),

    #[error("Failed to serialize report: {0}")]
    Json(#[source] serde_json::Error),

    #[error("Failed to write table: {0}")]
    Tabular(String),
}
