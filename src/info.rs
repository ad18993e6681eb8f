//! Information display module for SED documents and COMBINE archives
//!
//! This module implements `Display` for `SedDocument` and `CombineArchive`, rendering
//! each collection of the document as a table.

use std::fmt::{self, Display};
use std::sync::Arc;

use itertools::Itertools;
use tabled::{builder::Builder, settings::Style};

use crate::combine::data_model::{CombineArchive, CombineArchiveContent};
use crate::sedml::data_model::{
    AbstractTask, DataGenerator, Model, Output, SedDocument, Simulation,
};

/// Trait for converting entities to table records
///
/// Implementors provide column headers and the string value of each column.
trait TableRecord {
    fn columns() -> Vec<String>;

    fn to_record(&self) -> Vec<String>;
}

impl Display for SedDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut builder = Builder::default();
        builder.push_record(vec![format!(
            "SED-ML Document (L{}V{})",
            self.level, self.version
        )]);

        if !self.models.is_empty() {
            builder.push_record(vec!["Models"]);
            builder.push_record(vec![to_table(&self.models)]);
        }

        if !self.simulations.is_empty() {
            builder.push_record(vec!["Simulations"]);
            builder.push_record(vec![to_table(&self.simulations)]);
        }

        if !self.tasks.is_empty() {
            builder.push_record(vec!["Tasks"]);
            builder.push_record(vec![to_table(&self.tasks)]);
        }

        if !self.data_generators.is_empty() {
            builder.push_record(vec!["Data Generators"]);
            builder.push_record(vec![to_table(&self.data_generators)]);
        }

        if !self.outputs.is_empty() {
            builder.push_record(vec!["Outputs"]);
            builder.push_record(vec![to_table(&self.outputs)]);
        }

        let mut table = builder.build();
        table.with(Style::sharp());
        write!(f, "{table}")
    }
}

impl Display for CombineArchive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut builder = Builder::default();
        builder.push_record(vec!["COMBINE Archive"]);

        if let Some(description) = &self.description {
            builder.push_record(vec![description.clone()]);
        }

        if !self.contents.is_empty() {
            builder.push_record(vec!["Contents"]);
            builder.push_record(vec![to_table(&self.contents)]);
        }

        let mut table = builder.build();
        table.with(Style::sharp());
        write!(f, "{table}")
    }
}

/// Converts a collection of TableRecord implementors to a formatted table string
fn to_table<T: TableRecord>(records: &[T]) -> String {
    let mut builder = Builder::default();
    builder.push_record(T::columns());

    for record in records {
        builder.push_record(record.to_record());
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}

fn optional(value: Option<&str>) -> String {
    value.unwrap_or("-").to_string()
}

impl<T: TableRecord> TableRecord for Arc<T> {
    fn columns() -> Vec<String> {
        T::columns()
    }

    fn to_record(&self) -> Vec<String> {
        self.as_ref().to_record()
    }
}

impl TableRecord for Model {
    fn columns() -> Vec<String> {
        vec![
            "ID".to_string(),
            "Name".to_string(),
            "Source".to_string(),
            "Language".to_string(),
            "Changes".to_string(),
        ]
    }

    fn to_record(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            optional(self.name.as_deref()),
            self.source.clone(),
            optional(self.language.as_deref()),
            self.changes.len().to_string(),
        ]
    }
}

impl TableRecord for Simulation {
    fn columns() -> Vec<String> {
        vec![
            "ID".to_string(),
            "Type".to_string(),
            "Algorithm".to_string(),
            "Time Course".to_string(),
        ]
    }

    fn to_record(&self) -> Vec<String> {
        let time_course = match self {
            Simulation::UniformTimeCourse(sim) => format!(
                "{} → [{}, {}] ({} points)",
                sim.initial_time, sim.output_start_time, sim.output_end_time, sim.number_of_points
            ),
            Simulation::OneStep(sim) => sim
                .step
                .map(|step| format!("step {step}"))
                .unwrap_or_else(|| "-".to_string()),
            Simulation::SteadyState(_) => "-".to_string(),
        };

        vec![
            self.id().to_string(),
            self.kind().to_string(),
            optional(self.algorithm().and_then(|alg| alg.kisao_id.as_deref())),
            time_course,
        ]
    }
}

impl TableRecord for AbstractTask {
    fn columns() -> Vec<String> {
        vec![
            "ID".to_string(),
            "Type".to_string(),
            "Model".to_string(),
            "Simulation".to_string(),
        ]
    }

    fn to_record(&self) -> Vec<String> {
        match self {
            AbstractTask::Task(task) => vec![
                task.id.clone(),
                self.kind().to_string(),
                task.model.id.clone(),
                task.simulation.id().to_string(),
            ],
            AbstractTask::Repeated(task) => vec![
                task.id.clone(),
                self.kind().to_string(),
                "-".to_string(),
                task.sub_tasks.iter().map(|sub| sub.task.id()).join(", "),
            ],
        }
    }
}

impl TableRecord for DataGenerator {
    fn columns() -> Vec<String> {
        vec![
            "ID".to_string(),
            "Variables".to_string(),
            "Parameters".to_string(),
            "Math".to_string(),
        ]
    }

    fn to_record(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.variables.iter().map(|var| var.id.as_str()).join(", "),
            self.parameters
                .iter()
                .map(|p| format!("{} = {}", p.id, p.value))
                .join(", "),
            self.math.clone(),
        ]
    }
}

impl TableRecord for Output {
    fn columns() -> Vec<String> {
        vec!["ID".to_string(), "Type".to_string(), "Contents".to_string()]
    }

    fn to_record(&self) -> Vec<String> {
        let contents = match self {
            Output::Report(report) => report
                .data_sets
                .iter()
                .map(|ds| format!("{} ({})", ds.label, ds.data_generator.id))
                .join(", "),
            Output::Plot2D(plot) => plot
                .curves
                .iter()
                .map(|c| format!("{} vs {}", c.y_data_generator.id, c.x_data_generator.id))
                .join(", "),
            Output::Plot3D(plot) => plot
                .surfaces
                .iter()
                .map(|s| {
                    format!(
                        "{} over {}, {}",
                        s.z_data_generator.id, s.x_data_generator.id, s.y_data_generator.id
                    )
                })
                .join(", "),
        };

        vec![self.id().to_string(), self.kind().to_string(), contents]
    }
}

impl TableRecord for CombineArchiveContent {
    fn columns() -> Vec<String> {
        vec![
            "Location".to_string(),
            "Format".to_string(),
            "Master".to_string(),
        ]
    }

    fn to_record(&self) -> Vec<String> {
        vec![
            self.location.clone(),
            self.format.clone(),
            if self.master { "✓" } else { "" }.to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crate::sedml::io::load_sed_document;

    #[test]
    fn test_display_document() {
        let path = PathBuf::from("tests/data/sedml_doc.json");
        let doc = load_sed_document(&path).expect("Failed to load document");
        let rendered = doc.to_string();

        assert!(rendered.contains("SED-ML Document (L1V3)"));
        assert!(rendered.contains("Data Generators"));
        assert!(rendered.contains("UniformTimeCourse"));
    }
}
