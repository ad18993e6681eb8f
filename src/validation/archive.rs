//! Consistency checks for COMBINE archives.

use std::collections::BTreeSet;

use crate::combine::data_model::CombineArchive;
use crate::validation::consistency::{Report, Severity, ValidationResult};

/// Checks the consistency of a `CombineArchive`.
///
/// # Details
/// Every content item needs a location and a format, locations must be unique,
/// and at most one item may be the master. An archive without a master is valid
/// but noted as information.
pub fn check_archive(archive: &CombineArchive) -> Report {
    let mut report = Report::new();
    let mut locations = BTreeSet::new();

    for (idx, content) in archive.contents.iter().enumerate() {
        let location = format!("/contents/{idx}");

        if content.location.trim().is_empty() {
            report.add_result(ValidationResult::new(
                location.clone(),
                "Content item must have a location.".to_string(),
                Severity::Error,
                None,
            ));
        } else if !locations.insert(content.location.as_str()) {
            report.add_result(ValidationResult::new(
                location.clone(),
                format!("Location '{}' is used more than once.", content.location),
                Severity::Error,
                Some(content.location.clone()),
            ));
        }

        if content.format.trim().is_empty() {
            report.add_result(ValidationResult::new(
                location,
                format!("Content item '{}' must have a format.", content.location),
                Severity::Error,
                Some(content.location.clone()),
            ));
        }
    }

    match archive.get_master_content() {
        Ok(Some(_)) => {}
        Ok(None) => report.add_result(ValidationResult::new(
            "/contents".to_string(),
            "Archive has no master content.".to_string(),
            Severity::Info,
            None,
        )),
        Err(err) => report.add_result(ValidationResult::new(
            "/contents".to_string(),
            err.to_string(),
            Severity::Error,
            None,
        )),
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combine::data_model::{
        CombineArchiveBuilder, CombineArchiveContent, CombineArchiveContentBuilder, SEDML_FORMAT,
    };

    fn content(location: &str, format: &str, master: bool) -> CombineArchiveContent {
        CombineArchiveContentBuilder::default()
            .location(location)
            .format(format)
            .master(master)
            .build()
            .expect("Failed to build content")
    }

    #[test]
    fn test_valid_archive() {
        let archive = CombineArchiveBuilder::default()
            .contents(vec![
                content("simulation.sedml", SEDML_FORMAT, true),
                content("model.xml", "http://identifiers.org/combine.specifications/sbml", false),
            ])
            .build()
            .expect("Failed to build archive");

        let report = check_archive(&archive);
        assert!(report.is_valid);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_no_master_is_info() {
        let archive = CombineArchiveBuilder::default()
            .contents(vec![content("simulation.sedml", SEDML_FORMAT, false)])
            .build()
            .expect("Failed to build archive");

        let report = check_archive(&archive);
        assert!(report.is_valid);
        assert_eq!(report.with_severity(Severity::Info).len(), 1);
    }

    #[test]
    fn test_invalid_archive() {
        let archive = CombineArchiveBuilder::default()
            .contents(vec![
                content("a.sedml", SEDML_FORMAT, true),
                content("a.sedml", SEDML_FORMAT, true),
                content("", "", false),
            ])
            .build()
            .expect("Failed to build archive");

        let report = check_archive(&archive);
        assert!(!report.is_valid);
        // duplicate location, missing location, missing format, multiple masters
        assert_eq!(report.with_severity(Severity::Error).len(), 4);
    }
}
