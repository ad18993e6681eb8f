//! SED Document I/O
//!
//! This module reads and writes SED documents serialized as JSON.
//!
//! In the serialized form every cross reference (a task's model and simulation, a
//! variable's task and model, a data set's data generator) is the id of the
//! referenced entity. [`JsonSedDocumentReader`] resolves these ids into shared
//! handles and rejects documents with dangling references, naming the offending
//! file.
//!
//! The record types double as the JSON schema of serialized documents, see
//! [`crate::validation::schema`].

use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sedml::data_model::{
    AbstractTask, Algorithm, AlgorithmParameterChange, AxisScale, Curve, DataGenerator,
    DataSet, Model, ModelAttributeChange, ModelChange, OneStepSimulation, Output, Parameter,
    Plot2D, Plot3D, RepeatedTask, Report, SedDocument, Simulation, SteadyStateSimulation,
    SubTask, Surface, Task, UniformTimeCourseSimulation, Variable,
};
use crate::sedml::error::SedmlError;

/// Reads SED documents from files.
pub trait SedDocumentReader {
    /// Reads the document stored at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error naming `path` if the file cannot be read or does not hold a
    /// valid document.
    fn read(&self, path: &Path) -> Result<SedDocument, IOError>;
}

/// Reads SED documents serialized as JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSedDocumentReader;

impl SedDocumentReader for JsonSedDocumentReader {
    fn read(&self, path: &Path) -> Result<SedDocument, IOError> {
        load_sed_document(path)
    }
}

/// Loads and parses a SED document from a JSON file.
///
/// # Arguments
///
/// * `path` - Path to the JSON file containing the document
///
/// # Returns
///
/// Returns a `Result` containing either:
/// * `Ok(SedDocument)` - The document with all references resolved
/// * `Err(IOError)` - An error that occurred during reading, parsing or resolution
pub fn load_sed_document(path: impl Into<PathBuf>) -> Result<SedDocument, IOError> {
    let path = path.into();
    let file = File::open(&path).map_err(|source| IOError::FileNotFound {
        path: path.clone(),
        source,
    })?;
    let record: SedDocumentRecord =
        serde_json::from_reader(file).map_err(|source| IOError::JsonParseError {
            path: path.clone(),
            source,
        })?;

    record
        .resolve()
        .map_err(|source| IOError::Structural { path, source })
}

/// Saves a SED document to a JSON file.
///
/// # Arguments
///
/// * `path` - Path to the JSON file to write
/// * `doc` - The document to save
pub fn save_sed_document(path: impl Into<PathBuf>, doc: &SedDocument) -> Result<(), IOError> {
    let path = path.into();
    let file = File::create(&path).map_err(|source| IOError::FileNotFound {
        path: path.clone(),
        source,
    })?;
    serde_json::to_writer_pretty(file, &SedDocumentRecord::from(doc))
        .map_err(|source| IOError::JsonParseError { path, source })
}

/// Represents errors that can occur during SED document I/O operations.
#[derive(Error, Debug)]
pub enum IOError {
    /// Indicates that the specified file could not be found or opened.
    #[error("File not found: {path}: {source}")]
    FileNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Indicates that the file contents could not be parsed as valid JSON.
    #[error("Failed to parse JSON in {path}: {source}")]
    JsonParseError {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Indicates that the file parsed but does not describe a valid document.
    #[error("Invalid SED document {path}: {source}")]
    Structural {
        path: PathBuf,
        #[source]
        source: SedmlError,
    },
}

//
// Serialized records
//

/// Serialized form of a [`SedDocument`].
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SedDocumentRecord {
    #[serde(default = "default_level")]
    pub level: u32,
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub models: Vec<ModelRecord>,
    #[serde(default)]
    pub simulations: Vec<SimulationRecord>,
    #[serde(default)]
    pub tasks: Vec<TaskRecord>,
    #[serde(default)]
    pub data_generators: Vec<DataGeneratorRecord>,
    #[serde(default)]
    pub outputs: Vec<OutputRecord>,
}

fn default_level() -> u32 {
    1
}

fn default_version() -> u32 {
    3
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ModelRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default)]
    pub changes: Vec<ModelChangeRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type")]
pub enum ModelChangeRecord {
    #[serde(rename = "ModelAttributeChange")]
    Attribute {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        target: String,
        new_value: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AlgorithmRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kisao_id: Option<String>,
    #[serde(default)]
    pub changes: Vec<AlgorithmParameterChangeRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AlgorithmParameterChangeRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kisao_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_value: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type")]
pub enum SimulationRecord {
    SteadyState {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        algorithm: Option<AlgorithmRecord>,
    },
    OneStep {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        algorithm: Option<AlgorithmRecord>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        step: Option<f64>,
    },
    UniformTimeCourse {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        algorithm: Option<AlgorithmRecord>,
        initial_time: f64,
        output_start_time: f64,
        output_end_time: f64,
        number_of_points: i64,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type")]
pub enum TaskRecord {
    Task {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        model: String,
        simulation: String,
    },
    RepeatedTask {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(default)]
        reset_model: bool,
        #[serde(default)]
        sub_tasks: Vec<SubTaskRecord>,
    },
}

impl TaskRecord {
    fn id(&self) -> &str {
        match self {
            TaskRecord::Task { id, .. } | TaskRecord::RepeatedTask { id, .. } => id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SubTaskRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    pub task: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DataGeneratorRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub variables: Vec<VariableRecord>,
    #[serde(default)]
    pub parameters: Vec<ParameterRecord>,
    pub math: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct VariableRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ParameterRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type")]
pub enum OutputRecord {
    Report {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(default)]
        data_sets: Vec<DataSetRecord>,
    },
    Plot2D {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(default)]
        curves: Vec<CurveRecord>,
    },
    Plot3D {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(default)]
        surfaces: Vec<SurfaceRecord>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DataSetRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub label: String,
    pub data_generator: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CurveRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub x_scale: AxisScale,
    #[serde(default)]
    pub y_scale: AxisScale,
    pub x_data_generator: String,
    pub y_data_generator: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SurfaceRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub x_scale: AxisScale,
    #[serde(default)]
    pub y_scale: AxisScale,
    #[serde(default)]
    pub z_scale: AxisScale,
    pub x_data_generator: String,
    pub y_data_generator: String,
    pub z_data_generator: String,
}

//
// Reference resolution
//

/// Entities indexed by id. The first entity wins when ids repeat.
struct Index<T> {
    kind: &'static str,
    entries: BTreeMap<String, Arc<T>>,
}

impl<T> Index<T> {
    fn new(kind: &'static str) -> Self {
        Self {
            kind,
            entries: BTreeMap::new(),
        }
    }

    fn insert(&mut self, id: &str, entity: Arc<T>) {
        self.entries.entry(id.to_string()).or_insert(entity);
    }

    fn get(&self, id: &str) -> Result<Arc<T>, SedmlError> {
        self.entries
            .get(id)
            .cloned()
            .ok_or_else(|| SedmlError::UnknownReference {
                kind: self.kind,
                id: id.to_string(),
            })
    }
}

impl SedDocumentRecord {
    /// Builds the document, resolving every id reference.
    pub fn resolve(self) -> Result<SedDocument, SedmlError> {
        let mut models = Index::new("model");
        let mut model_list = Vec::with_capacity(self.models.len());
        for record in self.models {
            let id = record.id.clone();
            let model = Arc::new(Model::from(record));
            models.insert(&id, model.clone());
            model_list.push(model);
        }

        let mut simulations = Index::new("simulation");
        let mut simulation_list = Vec::with_capacity(self.simulations.len());
        for record in self.simulations {
            let sim = Arc::new(Simulation::from(record));
            simulations.insert(sim.id(), sim.clone());
            simulation_list.push(sim);
        }

        let (tasks, task_list) = resolve_tasks(self.tasks, &models, &simulations)?;

        let mut data_generators = Index::new("data generator");
        let mut data_generator_list = Vec::with_capacity(self.data_generators.len());
        for record in self.data_generators {
            let variables = record
                .variables
                .into_iter()
                .map(|var| {
                    Ok(Variable {
                        id: var.id,
                        name: var.name,
                        target: var.target,
                        symbol: var.symbol,
                        task: var.task.map(|id| tasks.get(&id)).transpose()?,
                        model: var.model.map(|id| models.get(&id)).transpose()?,
                    })
                })
                .collect::<Result<Vec<_>, SedmlError>>()?;

            let data_gen = Arc::new(DataGenerator {
                id: record.id,
                name: record.name,
                variables,
                parameters: record
                    .parameters
                    .into_iter()
                    .map(|p| Parameter {
                        id: p.id,
                        name: p.name,
                        value: p.value,
                    })
                    .collect(),
                math: record.math,
            });
            data_generators.insert(&data_gen.id, data_gen.clone());
            data_generator_list.push(data_gen);
        }

        let outputs = self
            .outputs
            .into_iter()
            .map(|record| resolve_output(record, &data_generators))
            .collect::<Result<Vec<_>, SedmlError>>()?;

        Ok(SedDocument {
            level: self.level,
            version: self.version,
            models: model_list,
            simulations: simulation_list,
            tasks: task_list,
            data_generators: data_generator_list,
            outputs,
        })
    }
}

/// Resolves tasks in dependency order, since repeated tasks reference other tasks.
fn resolve_tasks(
    records: Vec<TaskRecord>,
    models: &Index<Model>,
    simulations: &Index<Simulation>,
) -> Result<(Index<AbstractTask>, Vec<Arc<AbstractTask>>), SedmlError> {
    let mut index = Index::new("task");
    let mut resolved: Vec<Option<Arc<AbstractTask>>> = vec![None; records.len()];

    loop {
        let mut progress = false;

        for (idx, record) in records.iter().enumerate() {
            if resolved[idx].is_some() {
                continue;
            }

            let task = match record {
                TaskRecord::Task {
                    id,
                    name,
                    model,
                    simulation,
                } => AbstractTask::Task(Task {
                    id: id.clone(),
                    name: name.clone(),
                    model: models.get(model)?,
                    simulation: simulations.get(simulation)?,
                }),
                TaskRecord::RepeatedTask {
                    id,
                    name,
                    reset_model,
                    sub_tasks,
                } => {
                    let ready = sub_tasks
                        .iter()
                        .all(|sub| index.entries.contains_key(&sub.task));
                    if !ready {
                        continue;
                    }

                    AbstractTask::Repeated(RepeatedTask {
                        id: id.clone(),
                        name: name.clone(),
                        reset_model: *reset_model,
                        sub_tasks: sub_tasks
                            .iter()
                            .map(|sub| {
                                Ok(SubTask {
                                    order: sub.order,
                                    task: index.get(&sub.task)?,
                                })
                            })
                            .collect::<Result<Vec<_>, SedmlError>>()?,
                    })
                }
            };

            let task = Arc::new(task);
            index.insert(record.id(), task.clone());
            resolved[idx] = Some(task);
            progress = true;
        }

        if !progress {
            break;
        }
    }

    let mut tasks = Vec::with_capacity(records.len());
    for (record, task) in records.iter().zip(resolved) {
        match task {
            Some(task) => tasks.push(task),
            None => return Err(unresolved_sub_task(record, &records, &index)),
        }
    }

    Ok((index, tasks))
}

/// Explains why a repeated task could not be resolved: either a sub-task does not
/// exist or the sub-tasks reference each other in a cycle.
fn unresolved_sub_task(
    record: &TaskRecord,
    records: &[TaskRecord],
    index: &Index<AbstractTask>,
) -> SedmlError {
    if let TaskRecord::RepeatedTask { sub_tasks, .. } = record {
        for sub in sub_tasks {
            let declared = records.iter().any(|r| r.id() == sub.task);
            if !declared && !index.entries.contains_key(&sub.task) {
                return SedmlError::UnknownReference {
                    kind: "task",
                    id: sub.task.clone(),
                };
            }
        }
    }

    SedmlError::Structural {
        message: format!("Repeated task '{}' is part of a reference cycle", record.id()),
    }
}

fn resolve_output(
    record: OutputRecord,
    data_generators: &Index<DataGenerator>,
) -> Result<Output, SedmlError> {
    let output = match record {
        OutputRecord::Report {
            id,
            name,
            data_sets,
        } => Output::Report(Report {
            id,
            name,
            data_sets: data_sets
                .into_iter()
                .map(|ds| {
                    Ok(DataSet {
                        id: ds.id,
                        name: ds.name,
                        label: ds.label,
                        data_generator: data_generators.get(&ds.data_generator)?,
                    })
                })
                .collect::<Result<Vec<_>, SedmlError>>()?,
        }),
        OutputRecord::Plot2D { id, name, curves } => Output::Plot2D(Plot2D {
            id,
            name,
            curves: curves
                .into_iter()
                .map(|curve| {
                    Ok(Curve {
                        id: curve.id,
                        name: curve.name,
                        x_scale: curve.x_scale,
                        y_scale: curve.y_scale,
                        x_data_generator: data_generators.get(&curve.x_data_generator)?,
                        y_data_generator: data_generators.get(&curve.y_data_generator)?,
                    })
                })
                .collect::<Result<Vec<_>, SedmlError>>()?,
        }),
        OutputRecord::Plot3D { id, name, surfaces } => Output::Plot3D(Plot3D {
            id,
            name,
            surfaces: surfaces
                .into_iter()
                .map(|surface| {
                    Ok(Surface {
                        id: surface.id,
                        name: surface.name,
                        x_scale: surface.x_scale,
                        y_scale: surface.y_scale,
                        z_scale: surface.z_scale,
                        x_data_generator: data_generators.get(&surface.x_data_generator)?,
                        y_data_generator: data_generators.get(&surface.y_data_generator)?,
                        z_data_generator: data_generators.get(&surface.z_data_generator)?,
                    })
                })
                .collect::<Result<Vec<_>, SedmlError>>()?,
        }),
    };

    Ok(output)
}

//
// Conversions between entities and records
//

impl From<ModelRecord> for Model {
    fn from(record: ModelRecord) -> Self {
        Model {
            id: record.id,
            name: record.name,
            source: record.source,
            language: record.language,
            changes: record
                .changes
                .into_iter()
                .map(|change| match change {
                    ModelChangeRecord::Attribute {
                        id,
                        name,
                        target,
                        new_value,
                    } => ModelChange::Attribute(ModelAttributeChange {
                        id,
                        name,
                        target,
                        new_value,
                    }),
                })
                .collect(),
        }
    }
}

impl From<&Model> for ModelRecord {
    fn from(model: &Model) -> Self {
        ModelRecord {
            id: model.id.clone(),
            name: model.name.clone(),
            source: model.source.clone(),
            language: model.language.clone(),
            changes: model
                .changes
                .iter()
                .map(|change| match change {
                    ModelChange::Attribute(change) => ModelChangeRecord::Attribute {
                        id: change.id.clone(),
                        name: change.name.clone(),
                        target: change.target.clone(),
                        new_value: change.new_value.clone(),
                    },
                })
                .collect(),
        }
    }
}

impl From<AlgorithmRecord> for Algorithm {
    fn from(record: AlgorithmRecord) -> Self {
        Algorithm {
            kisao_id: record.kisao_id,
            changes: record
                .changes
                .into_iter()
                .map(|change| AlgorithmParameterChange {
                    kisao_id: change.kisao_id,
                    new_value: change.new_value,
                })
                .collect(),
        }
    }
}

impl From<&Algorithm> for AlgorithmRecord {
    fn from(algorithm: &Algorithm) -> Self {
        AlgorithmRecord {
            kisao_id: algorithm.kisao_id.clone(),
            changes: algorithm
                .changes
                .iter()
                .map(|change| AlgorithmParameterChangeRecord {
                    kisao_id: change.kisao_id.clone(),
                    new_value: change.new_value.clone(),
                })
                .collect(),
        }
    }
}

impl From<SimulationRecord> for Simulation {
    fn from(record: SimulationRecord) -> Self {
        match record {
            SimulationRecord::SteadyState {
                id,
                name,
                algorithm,
            } => Simulation::SteadyState(SteadyStateSimulation {
                id,
                name,
                algorithm: algorithm.map(Algorithm::from),
            }),
            SimulationRecord::OneStep {
                id,
                name,
                algorithm,
                step,
            } => Simulation::OneStep(OneStepSimulation {
                id,
                name,
                algorithm: algorithm.map(Algorithm::from),
                step,
            }),
            SimulationRecord::UniformTimeCourse {
                id,
                name,
                algorithm,
                initial_time,
                output_start_time,
                output_end_time,
                number_of_points,
            } => Simulation::UniformTimeCourse(UniformTimeCourseSimulation {
                id,
                name,
                algorithm: algorithm.map(Algorithm::from),
                initial_time,
                output_start_time,
                output_end_time,
                number_of_points,
            }),
        }
    }
}

impl From<&Simulation> for SimulationRecord {
    fn from(sim: &Simulation) -> Self {
        match sim {
            Simulation::SteadyState(sim) => SimulationRecord::SteadyState {
                id: sim.id.clone(),
                name: sim.name.clone(),
                algorithm: sim.algorithm.as_ref().map(AlgorithmRecord::from),
            },
            Simulation::OneStep(sim) => SimulationRecord::OneStep {
                id: sim.id.clone(),
                name: sim.name.clone(),
                algorithm: sim.algorithm.as_ref().map(AlgorithmRecord::from),
                step: sim.step,
            },
            Simulation::UniformTimeCourse(sim) => SimulationRecord::UniformTimeCourse {
                id: sim.id.clone(),
                name: sim.name.clone(),
                algorithm: sim.algorithm.as_ref().map(AlgorithmRecord::from),
                initial_time: sim.initial_time,
                output_start_time: sim.output_start_time,
                output_end_time: sim.output_end_time,
                number_of_points: sim.number_of_points,
            },
        }
    }
}

impl From<&AbstractTask> for TaskRecord {
    fn from(task: &AbstractTask) -> Self {
        match task {
            AbstractTask::Task(task) => TaskRecord::Task {
                id: task.id.clone(),
                name: task.name.clone(),
                model: task.model.id.clone(),
                simulation: task.simulation.id().to_string(),
            },
            AbstractTask::Repeated(task) => TaskRecord::RepeatedTask {
                id: task.id.clone(),
                name: task.name.clone(),
                reset_model: task.reset_model,
                sub_tasks: task
                    .sub_tasks
                    .iter()
                    .map(|sub| SubTaskRecord {
                        order: sub.order,
                        task: sub.task.id().to_string(),
                    })
                    .collect(),
            },
        }
    }
}

impl From<&DataGenerator> for DataGeneratorRecord {
    fn from(data_gen: &DataGenerator) -> Self {
        DataGeneratorRecord {
            id: data_gen.id.clone(),
            name: data_gen.name.clone(),
            variables: data_gen
                .variables
                .iter()
                .map(|var| VariableRecord {
                    id: var.id.clone(),
                    name: var.name.clone(),
                    target: var.target.clone(),
                    symbol: var.symbol.clone(),
                    task: var.task.as_ref().map(|task| task.id().to_string()),
                    model: var.model.as_ref().map(|model| model.id.clone()),
                })
                .collect(),
            parameters: data_gen
                .parameters
                .iter()
                .map(|p| ParameterRecord {
                    id: p.id.clone(),
                    name: p.name.clone(),
                    value: p.value,
                })
                .collect(),
            math: data_gen.math.clone(),
        }
    }
}

impl From<&Output> for OutputRecord {
    fn from(output: &Output) -> Self {
        match output {
            Output::Report(report) => OutputRecord::Report {
                id: report.id.clone(),
                name: report.name.clone(),
                data_sets: report
                    .data_sets
                    .iter()
                    .map(|ds| DataSetRecord {
                        id: ds.id.clone(),
                        name: ds.name.clone(),
                        label: ds.label.clone(),
                        data_generator: ds.data_generator.id.clone(),
                    })
                    .collect(),
            },
            Output::Plot2D(plot) => OutputRecord::Plot2D {
                id: plot.id.clone(),
                name: plot.name.clone(),
                curves: plot
                    .curves
                    .iter()
                    .map(|curve| CurveRecord {
                        id: curve.id.clone(),
                        name: curve.name.clone(),
                        x_scale: curve.x_scale,
                        y_scale: curve.y_scale,
                        x_data_generator: curve.x_data_generator.id.clone(),
                        y_data_generator: curve.y_data_generator.id.clone(),
                    })
                    .collect(),
            },
            Output::Plot3D(plot) => OutputRecord::Plot3D {
                id: plot.id.clone(),
                name: plot.name.clone(),
                surfaces: plot
                    .surfaces
                    .iter()
                    .map(|surface| SurfaceRecord {
                        id: surface.id.clone(),
                        name: surface.name.clone(),
                        x_scale: surface.x_scale,
                        y_scale: surface.y_scale,
                        z_scale: surface.z_scale,
                        x_data_generator: surface.x_data_generator.id.clone(),
                        y_data_generator: surface.y_data_generator.id.clone(),
                        z_data_generator: surface.z_data_generator.id.clone(),
                    })
                    .collect(),
            },
        }
    }
}

impl From<&SedDocument> for SedDocumentRecord {
    fn from(doc: &SedDocument) -> Self {
        SedDocumentRecord {
            level: doc.level,
            version: doc.version,
            models: doc.models.iter().map(|m| ModelRecord::from(m.as_ref())).collect(),
            simulations: doc
                .simulations
                .iter()
                .map(|s| SimulationRecord::from(s.as_ref()))
                .collect(),
            tasks: doc.tasks.iter().map(|t| TaskRecord::from(t.as_ref())).collect(),
            data_generators: doc
                .data_generators
                .iter()
                .map(|d| DataGeneratorRecord::from(d.as_ref()))
                .collect(),
            outputs: doc.outputs.iter().map(OutputRecord::from).collect(),
        }
    }
}
