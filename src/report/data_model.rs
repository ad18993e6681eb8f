//! Report Data Model
//!
//! This module contains the result values produced by executing a SED document and
//! the identifiers of the formats they can be written in.
//!
//! # Key Components
//!
//! - [`ReportResult`]: A shaped report table, one row per data set
//! - [`VariableResults`], [`DataGeneratorResults`], [`OutputResults`]: Result maps keyed by id
//! - [`ReportFormat`], [`PlotFormat`]: Open enumerations of output format identifiers

use std::collections::BTreeMap;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use ndarray::{ArrayD, Axis};
use serde::{Deserialize, Serialize};

/// Raw result arrays of task variables, keyed by variable id.
pub type VariableResults = BTreeMap<String, ArrayD<f64>>;

/// Result arrays of data generators, keyed by data generator id.
pub type DataGeneratorResults = BTreeMap<String, ArrayD<f64>>;

/// Shaped report tables, keyed by output id.
pub type OutputResults = BTreeMap<String, ReportResult>;

/// A report table.
///
/// Row `i` of `values` (along axis 0) is the result of the data set with id
/// `data_set_ids[i]` and label `labels[i]`. All rows share one shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportResult {
    pub data_set_ids: Vec<String>,
    pub labels: Vec<String>,
    pub values: ArrayD<f64>,
}

impl ReportResult {
    /// Number of data sets in the report.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Shape of a single row.
    pub fn row_shape(&self) -> &[usize] {
        self.values.shape().get(1..).unwrap_or(&[])
    }

    /// Returns the row of a data set by label. The first matching row wins when
    /// labels are repeated.
    pub fn get(&self, label: &str) -> Option<ArrayD<f64>> {
        let idx = self.labels.iter().position(|l| l == label)?;
        Some(self.values.index_axis(Axis(0), idx).to_owned())
    }

    /// Flattens every row into a vector, in row-major order.
    pub fn rows(&self) -> Vec<Vec<f64>> {
        self.values
            .axis_iter(Axis(0))
            .map(|row| row.iter().copied().collect())
            .collect()
    }
}

/// Format of a written report.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum ReportFormat {
    Csv,
    Json,
    Xlsx,
    Other(String),
}

impl ReportFormat {
    /// File extension of the format.
    pub fn extension(&self) -> &str {
        match self {
            ReportFormat::Csv => "csv",
            ReportFormat::Json => "json",
            ReportFormat::Xlsx => "xlsx",
            ReportFormat::Other(other) => other,
        }
    }
}

impl FromStr for ReportFormat {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        Ok(match s.as_str() {
            "csv" => ReportFormat::Csv,
            "json" => ReportFormat::Json,
            "xlsx" => ReportFormat::Xlsx,
            _ => ReportFormat::Other(s),
        })
    }
}

impl From<String> for ReportFormat {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(format) => format,
            Err(never) => match never {},
        }
    }
}

impl From<ReportFormat> for String {
    fn from(value: ReportFormat) -> Self {
        value.extension().to_string()
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Format of a rendered plot. Plots are not rendered by this crate; the identifier
/// is carried through configuration and options.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum PlotFormat {
    Pdf,
    Svg,
    Png,
    Other(String),
}

impl PlotFormat {
    pub fn extension(&self) -> &str {
        match self {
            PlotFormat::Pdf => "pdf",
            PlotFormat::Svg => "svg",
            PlotFormat::Png => "png",
            PlotFormat::Other(other) => other,
        }
    }
}

impl FromStr for PlotFormat {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        Ok(match s.as_str() {
            "pdf" => PlotFormat::Pdf,
            "svg" => PlotFormat::Svg,
            "png" => PlotFormat::Png,
            _ => PlotFormat::Other(s),
        })
    }
}

impl From<String> for PlotFormat {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(format) => format,
            Err(never) => match never {},
        }
    }
}

impl From<PlotFormat> for String {
    fn from(value: PlotFormat) -> Self {
        value.extension().to_string()
    }
}

impl fmt::Display for PlotFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}
