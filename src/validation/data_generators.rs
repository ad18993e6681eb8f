use crate::sedml::data_model::{DataGenerator, SedDocument, Variable};
use crate::sedml::math::{check_symbols, parse_math, MathFunctions};
use crate::validation::consistency::{Report, Severity, ValidationResult};

/// Validates the data generators of a SED document
///
/// # Arguments
/// * `doc` - The SED document containing the data generators to validate
/// * `report` - Validation report to add any validation errors to
///
/// # Details
/// Every variable must be bound to a task and must have exactly one of a target or
/// a symbol. The math of every data generator must parse and may only reference its
/// own variables and parameters, the constants `pi` and `exponentiale`, and the
/// supported functions.
pub fn check_data_generators(doc: &SedDocument, report: &mut Report) {
    let functions = MathFunctions::default();

    for (dg_idx, data_gen) in doc.data_generators.iter().enumerate() {
        for (var_idx, var) in data_gen.variables.iter().enumerate() {
            check_variable(report, var, dg_idx, var_idx);
        }

        check_math(report, data_gen, dg_idx, &functions);
    }
}

fn check_variable(report: &mut Report, var: &Variable, dg_idx: usize, var_idx: usize) {
    let location = format!("/data_generators/{dg_idx}/variables/{var_idx}");

    if var.target.is_some() == var.symbol.is_some() {
        report.add_result(ValidationResult::new(
            location.clone(),
            format!(
                "Variable '{}' must define exactly one of a target or a symbol.",
                var.id
            ),
            Severity::Error,
            Some(var.id.clone()),
        ));
    }

    if var.task.is_none() {
        report.add_result(ValidationResult::new(
            location,
            format!("Variable '{}' must reference a task.", var.id),
            Severity::Error,
            Some(var.id.clone()),
        ));
    }
}

fn check_math(report: &mut Report, data_gen: &DataGenerator, dg_idx: usize, functions: &MathFunctions) {
    let bound = data_gen
        .variables
        .iter()
        .map(|var| var.id.as_str())
        .chain(data_gen.parameters.iter().map(|p| p.id.as_str()));

    let result = parse_math(&data_gen.math).and_then(|expr| check_symbols(&expr, bound, functions));

    if let Err(err) = result {
        report.add_result(ValidationResult::new(
            format!("/data_generators/{dg_idx}/math"),
            format!("Math of data generator '{}' is invalid: {}", data_gen.id, err),
            Severity::Error,
            Some(data_gen.id.clone()),
        ));
    }
}
