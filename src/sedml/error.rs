//! SED-ML Error Module
//!
//! Error types raised while evaluating and executing SED documents.
//!
//! # Key Error Types
//!
//! - [`MathError`]: failures while compiling or evaluating a data generator's math
//! - [`ExecError`]: failures of the execution pipeline, each naming the offending
//!   task, variable, data generator or report
//! - [`ModelChangeError`]: failures while writing a modified model file
//! - [`SedmlError`]: structural problems of a document, such as dangling references
//!
//! All of these are fatal for an execution run; recoverable situations are
//! reported as [`ExecWarning`](crate::sedml::exec::ExecWarning) values instead.

use std::path::PathBuf;

use thiserror::Error;

use crate::report::writer::ReportError;
use crate::sedml::io::IOError;

#[derive(Error, Debug)]
pub enum SedmlError {
    #[error("Invalid SED document: {message}")]
    Structural { message: String },
    #[error("Unknown {kind} reference '{id}'")]
    UnknownReference { kind: &'static str, id: String },
}

/// Error returned by a task executor callback.
pub type TaskError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum MathError {
    #[error("Failed to parse expression '{math}': {message}")]
    Parse { math: String, message: String },
    #[error("Unresolved reference '{0}'")]
    UnresolvedReference(String),
    #[error("Unsupported function '{0}'")]
    UnsupportedFunction(String),
    #[error("Variables for data generator '{data_generator}' must have consistent shapes, got {shapes:?}")]
    ShapeMismatch {
        data_generator: String,
        shapes: Vec<Vec<usize>>,
    },
    #[error("Failed to evaluate expression: {0}")]
    Evaluation(String),
}

#[derive(Error, Debug)]
pub enum ExecError {
    #[error("Failed to read SED document: {0}")]
    Read(#[from] IOError),
    #[error("{0} are not supported")]
    UnsupportedFeature(String),
    #[error("Several different models share the id '{model}'")]
    ConflictingModel { model: String },
    #[error("Variable '{variable}' must be generated for task '{task}'")]
    MissingResult { task: String, variable: String },
    #[error("Variable '{variable}' received conflicting results from tasks '{first_task}' and '{second_task}'")]
    ConflictingResult {
        variable: String,
        first_task: String,
        second_task: String,
    },
    #[error("Data generators for report '{report}' must have consistent shapes, got {shapes:?}")]
    ShapeMismatch {
        report: String,
        shapes: Vec<Vec<usize>>,
    },
    #[error("Failed to calculate data generator '{id}': {source}")]
    DataGenerator {
        id: String,
        #[source]
        source: MathError,
    },
    #[error("Task '{task}' failed: {source}")]
    Task {
        task: String,
        #[source]
        source: TaskError,
    },
    #[error("Failed to apply changes to model '{model}': {source}")]
    ModelChange {
        model: String,
        #[source]
        source: ModelChangeError,
    },
    #[error("Failed to create temporary model file: {0}")]
    TempFile(std::io::Error),
    #[error("Failed to write report: {0}")]
    Report(#[from] ReportError),
}

#[derive(Error, Debug)]
pub enum ModelChangeError {
    #[error("Failed to access model file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid XML in model file: {0}")]
    Xml(String),
    #[error("Target '{0}' is not a supported XPath to an attribute")]
    InvalidTarget(String),
    #[error("Target '{0}' does not match any element")]
    TargetNotFound(String),
    #[error("Target '{target}' must match a single element, matched {count}")]
    AmbiguousTarget { target: String, count: usize },
    #[error("Model changes are not supported for this model: {0}")]
    Unsupported(String),
}
