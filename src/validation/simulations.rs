use crate::sedml::data_model::{SedDocument, Simulation, UniformTimeCourseSimulation};
use crate::validation::consistency::{Report, Severity, ValidationResult};

/// Validates the simulations of a SED document
///
/// # Arguments
/// * `doc` - The SED document containing the simulations to validate
/// * `report` - Validation report to add any validation errors to
///
/// # Details
/// Uniform time courses must satisfy
/// `initial_time <= output_start_time <= output_end_time` and must not request a
/// negative number of points.
pub fn check_simulations(doc: &SedDocument, report: &mut Report) {
    for (sim_idx, sim) in doc.simulations.iter().enumerate() {
        if let Simulation::UniformTimeCourse(sim) = sim.as_ref() {
            check_time_course(report, sim, sim_idx);
        }
    }
}

fn check_time_course(report: &mut Report, sim: &UniformTimeCourseSimulation, sim_idx: usize) {
    let location = format!("/simulations/{sim_idx}");
    let mut add_error = |message: String| {
        report.add_result(ValidationResult::new(
            location.clone(),
            message,
            Severity::Error,
            Some(sim.id.clone()),
        ));
    };

    if sim.output_start_time < sim.initial_time {
        add_error(format!(
            "Output start time {} of simulation '{}' must be at least the initial time {}.",
            sim.output_start_time, sim.id, sim.initial_time
        ));
    }

    if sim.output_end_time < sim.output_start_time {
        add_error(format!(
            "Output end time {} of simulation '{}' must be at least the output start time {}.",
            sim.output_end_time, sim.id, sim.output_start_time
        ));
    }

    if sim.number_of_points < 0 {
        add_error(format!(
            "Number of points of simulation '{}' must be non-negative, got {}.",
            sim.id, sim.number_of_points
        ));
    }
}
