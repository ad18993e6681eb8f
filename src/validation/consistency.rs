//! Consistency module for checking consistency of SED documents.
//!
//! This module provides functionality to validate SED documents by checking:
//! - Uniqueness of ids within each collection
//! - Simulation time courses
//! - Data generator variables and math
//! - Outputs
//!
//! The main entry point is the `check_consistency` function which runs all validation
//! checks and returns a `Report` with the results.

use std::collections::BTreeSet;
use std::fmt;

use colored::Colorize;

use crate::sedml::data_model::SedDocument;
use crate::validation::data_generators::check_data_generators;
use crate::validation::outputs::check_outputs;
use crate::validation::simulations::check_simulations;

/// The `check_consistency` function is used to check the consistency of a `SedDocument`.
/// It returns a `Report` containing the results of the checks.
///
/// # Arguments
///
/// * `doc` - A reference to the `SedDocument` to be checked.
///
/// # Returns
///
/// Returns a `Report` containing the results of the consistency checks.
pub fn check_consistency(doc: &SedDocument) -> Report {
    let mut report = Report::new();

    check_unique_ids(doc, &mut report);
    check_simulations(doc, &mut report);
    check_data_generators(doc, &mut report);
    check_outputs(doc, &mut report);

    report
}

/// Checks that ids are unique within each collection of the document.
fn check_unique_ids(doc: &SedDocument, report: &mut Report) {
    let collections: [(&str, Vec<&str>); 5] = [
        ("models", doc.models.iter().map(|m| m.id.as_str()).collect()),
        (
            "simulations",
            doc.simulations.iter().map(|s| s.id()).collect(),
        ),
        ("tasks", doc.tasks.iter().map(|t| t.id()).collect()),
        (
            "data_generators",
            doc.data_generators.iter().map(|d| d.id.as_str()).collect(),
        ),
        ("outputs", doc.outputs.iter().map(|o| o.id()).collect()),
    ];

    for (collection, ids) in collections {
        let mut seen = BTreeSet::new();
        for (idx, id) in ids.into_iter().enumerate() {
            if !seen.insert(id) {
                report.add_result(ValidationResult::new(
                    format!("/{collection}/{idx}"),
                    format!("Id '{id}' is used more than once in {collection}."),
                    Severity::Error,
                    Some(id.to_string()),
                ));
            }
        }
    }
}

/// The `Report` struct is used to store the results of the validation checks.
///
/// Contains a boolean indicating overall validity and a vector of individual validation results.
/// The document is considered invalid if any validation results have Error severity.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, Default)]
pub struct Report {
    /// Whether the document is valid overall. False if any errors were found.
    pub is_valid: bool,
    /// Vector of individual validation results found during checks.
    pub errors: Vec<ValidationResult>,
}

impl Report {
    /// Creates a new, valid `Report` without results.
    pub fn new() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
        }
    }

    /// Adds a validation result to the report.
    ///
    /// If the result has Error severity, marks the overall report as invalid.
    pub fn add_result(&mut self, result: ValidationResult) {
        if result.severity == Severity::Error {
            self.is_valid = false;
        }
        self.errors.push(result);
    }

    /// Filters the results by the identifier.
    ///
    /// # Arguments
    ///
    /// * `identifier` - The identifier of the object.
    ///
    /// # Returns
    ///
    /// Returns a vector of `ValidationResult`s with the given identifier.
    pub fn filter_results(&self, identifier: &str) -> Vec<ValidationResult> {
        self.errors
            .iter()
            .filter(|result| result.identifier.as_deref() == Some(identifier))
            .cloned()
            .collect()
    }

    /// Returns the results of a severity.
    pub fn with_severity(&self, severity: Severity) -> Vec<&ValidationResult> {
        self.errors
            .iter()
            .filter(|result| result.severity == severity)
            .collect()
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid {
            writeln!(f, "{}", "Document is consistent".bold().green())?;
        } else {
            writeln!(f, "{}", "Document is inconsistent".bold().red())?;
        }

        for result in &self.errors {
            writeln!(f, "{result}")?;
        }

        Ok(())
    }
}

/// The `ValidationResult` struct represents a single validation issue found during checking.
///
/// Contains the location where the issue was found, a descriptive message, and the severity level.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ValidationResult {
    /// JSON pointer path to the location of the validation issue
    location: String,
    /// Human readable description of the validation issue
    message: String,
    /// Severity level of the validation issue
    severity: Severity,
    /// The identifier of the object, if any
    identifier: Option<String>,
}

impl ValidationResult {
    /// Creates a new `ValidationResult`.
    ///
    /// # Arguments
    ///
    /// * `location` - The location of the validation issue as a JSON pointer path.
    /// * `message` - A message describing the validation issue.
    /// * `severity` - The severity of the validation issue.
    /// * `identifier` - The id of the offending object, if any.
    pub fn new(
        location: String,
        message: String,
        severity: Severity,
        identifier: Option<String>,
    ) -> Self {
        Self {
            location,
            message,
            severity,
            identifier,
        }
    }

    /// JSON pointer path to the validation issue.
    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn severity(&self) -> &Severity {
        &self.severity
    }

    /// Id of the object the issue relates to.
    pub fn identifier(&self) -> &Option<String> {
        &self.identifier
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self.severity {
            Severity::Error => self.message.bold().red(),
            Severity::Warning => self.message.bold().yellow(),
            Severity::Info => self.message.bold().green(),
        };

        let severity = match self.severity {
            Severity::Error => "Error".bold().red(),
            Severity::Warning => "Warning".bold().yellow(),
            Severity::Info => "Info".bold().green(),
        };

        write!(
            f,
            "[{}] {}:\n\t└── {}",
            self.location.bold(),
            severity,
            message
        )
    }
}

/// Severity levels for validation issues.
///
/// - Error: The document is invalid and should not be executed
/// - Warning: The document may have issues but is still valid
/// - Info: Informational message
#[derive(Debug, Clone, PartialEq, Eq, Copy, serde::Serialize, serde::Deserialize)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "Error"),
            Severity::Warning => write!(f, "Warning"),
            Severity::Info => write!(f, "Info"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::sedml::io::load_sed_document;

    #[test]
    fn test_valid_document() {
        let path = PathBuf::from("tests/data/sedml_doc.json");
        let doc = load_sed_document(&path).expect("Failed to load document");
        let report = check_consistency(&doc);
        assert!(report.is_valid, "{report}");
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_inconsistent_document() {
        let path = PathBuf::from("tests/data/sedml_doc_inconsistent.json");
        let doc = load_sed_document(&path).expect("Failed to load document");
        let report = check_consistency(&doc);

        assert!(!report.is_valid);
        assert_eq!(report.with_severity(Severity::Error).len(), 4);
        assert_eq!(report.with_severity(Severity::Warning).len(), 2);
        assert_eq!(report.filter_results("sim").len(), 2);
    }
}
