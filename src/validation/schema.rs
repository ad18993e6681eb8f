//! Schema module for validating serialized SED documents.
//!
//! This module validates JSON documents against the schema of the document records
//! read by [`crate::sedml::io`], reporting every violation with its location.

use std::{error::Error, fmt};

use colored::Colorize;
use jsonschema::validator_for;
use schemars::schema_for;
use serde_json::Value;

use crate::sedml::io::SedDocumentRecord;

/// Report containing validation results
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ValidationReport {
    /// Whether the document is valid
    pub valid: bool,
    /// List of validation errors if any
    pub errors: Vec<ValidationError>,
}

/// Individual validation error details
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ValidationError {
    /// JSON path where the error occurred
    pub location: String,
    /// Description of the validation error
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\n\t└── {}",
            self.location.bold(),
            self.message.bold().red()
        )
    }
}

/// Returns the JSON schema of serialized SED documents.
pub fn sed_document_schema() -> Result<Value, serde_json::Error> {
    serde_json::to_value(schema_for!(SedDocumentRecord))
}

/// Validates a serialized SED document against its JSON schema
///
/// # Arguments
/// * `content` - JSON string containing the SED document
///
/// # Returns
/// * `Result<ValidationReport, Box<dyn Error>>` - Validation report or error if the
///   content is not JSON
pub fn validate_json(content: &str) -> Result<ValidationReport, Box<dyn Error>> {
    let json: Value = serde_json::from_str(content)?;
    let schema = sed_document_schema()?;
    let validator = validator_for(&schema).map_err(|e| e.to_string())?;

    let errors: Vec<ValidationError> = validator
        .iter_errors(&json)
        .map(|error| ValidationError {
            location: error.instance_path.to_string(),
            message: error.to_string().replace('"', "'"),
        })
        .collect();

    Ok(ValidationReport {
        valid: errors.is_empty(),
        errors,
    })
}
