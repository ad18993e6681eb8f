use itertools::Itertools;

use crate::sedml::data_model::{Output, Report as SedReport, SedDocument};
use crate::validation::consistency::{Report, Severity, ValidationResult};

/// Validates the outputs of a SED document
///
/// # Arguments
/// * `doc` - The SED document containing the outputs to validate
/// * `report` - Validation report to add any validation warnings to
///
/// # Details
/// Repeated data set labels within a report and plots without curves or surfaces
/// are reported as warnings.
pub fn check_outputs(doc: &SedDocument, report: &mut Report) {
    for (output_idx, output) in doc.outputs.iter().enumerate() {
        match output {
            Output::Report(sed_report) => check_labels(report, sed_report, output_idx),
            Output::Plot2D(plot) if plot.curves.is_empty() => {
                add_empty_plot(report, output, output_idx, "curves")
            }
            Output::Plot3D(plot) if plot.surfaces.is_empty() => {
                add_empty_plot(report, output, output_idx, "surfaces")
            }
            Output::Plot2D(_) | Output::Plot3D(_) => {}
        }
    }
}

fn check_labels(report: &mut Report, sed_report: &SedReport, output_idx: usize) {
    let duplicates: Vec<&String> = sed_report
        .data_sets
        .iter()
        .map(|ds| &ds.label)
        .duplicates()
        .collect();

    if !duplicates.is_empty() {
        report.add_result(ValidationResult::new(
            format!("/outputs/{output_idx}/data_sets"),
            format!(
                "To facilitate machine interpretation, data sets should have unique labels. \
                 Report '{}' repeats: {}",
                sed_report.id,
                duplicates.iter().join(", ")
            ),
            Severity::Warning,
            Some(sed_report.id.clone()),
        ));
    }
}

fn add_empty_plot(report: &mut Report, output: &Output, output_idx: usize, children: &str) {
    report.add_result(ValidationResult::new(
        format!("/outputs/{output_idx}"),
        format!("{} '{}' has no {}.", output.kind(), output.id(), children),
        Severity::Warning,
        Some(output.id().to_string()),
    ));
}
