//! SED-ML Data Model
//!
//! This module contains the entities of a SED-ML document: models, simulations,
//! tasks, data generators and outputs. Entities are plain values built either by a
//! document reader or programmatically through their builders.
//!
//! Cross references (a task's model and simulation, a variable's task, a data set's
//! data generator) are shared [`Arc`] handles, so structural comparison follows them
//! recursively just like any other child.
//!
//! Every entity implements [`Canonical`], whose comparison ignores the order of
//! child lists because list order carries no meaning in SED-ML.

use std::fmt;
use std::sync::Arc;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::canonical::{
    are_floats_equal, are_lists_equal, are_optional_floats_equal, are_options_equal,
    optional_tuple, sorted_tuples, Canonical, Tuple,
};

/// Model languages known to SED-ML, identified by URN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ModelLanguage {
    BNGL,
    CellML,
    NeuroML,
    RBA,
    SBML,
    VCML,
    XPP,
}

impl ModelLanguage {
    /// All supported languages.
    pub const ALL: [ModelLanguage; 7] = [
        ModelLanguage::BNGL,
        ModelLanguage::CellML,
        ModelLanguage::NeuroML,
        ModelLanguage::RBA,
        ModelLanguage::SBML,
        ModelLanguage::VCML,
        ModelLanguage::XPP,
    ];

    /// Returns the URN of the language.
    pub fn urn(&self) -> &'static str {
        match self {
            ModelLanguage::BNGL => "urn:sedml:language:bngl",
            ModelLanguage::CellML => "urn:sedml:language:cellml",
            ModelLanguage::NeuroML => "urn:sedml:language:neuroml",
            ModelLanguage::RBA => "urn:sedml:language:rba",
            ModelLanguage::SBML => "urn:sedml:language:sbml",
            ModelLanguage::VCML => "urn:sedml:language:vcml",
            ModelLanguage::XPP => "urn:sedml:language:xpp",
        }
    }

    /// Looks up a language by URN. Versioned URNs such as
    /// `urn:sedml:language:sbml.level-3.version-2` map to their base language.
    pub fn from_urn(urn: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|language| {
            let base = language.urn();
            urn == base
                || urn
                    .strip_prefix(base)
                    .is_some_and(|rest| rest.starts_with('.'))
        })
    }
}

impl fmt::Display for ModelLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.urn())
    }
}

/// Implicit symbols a variable can refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    Time,
}

impl Symbol {
    pub fn urn(&self) -> &'static str {
        match self {
            Symbol::Time => "urn:sedml:symbol:time",
        }
    }
}

/// A SED-ML document
#[derive(Debug, Clone, Builder)]
pub struct SedDocument {
    #[builder(default = "1")]
    pub level: u32,

    #[builder(default = "3")]
    pub version: u32,

    /// Models referenced by tasks
    #[builder(default, setter(into, each(name = "to_models", into)))]
    pub models: Vec<Arc<Model>>,

    /// Simulations referenced by tasks
    #[builder(default, setter(into, each(name = "to_simulations", into)))]
    pub simulations: Vec<Arc<Simulation>>,

    /// Executable tasks
    #[builder(default, setter(into, each(name = "to_tasks", into)))]
    pub tasks: Vec<Arc<AbstractTask>>,

    /// Data generators computing output series from task variables
    #[builder(default, setter(into, each(name = "to_data_generators", into)))]
    pub data_generators: Vec<Arc<DataGenerator>>,

    /// Reports and plots
    #[builder(default, setter(into, each(name = "to_outputs")))]
    pub outputs: Vec<Output>,
}

impl Default for SedDocument {
    fn default() -> Self {
        Self {
            level: 1,
            version: 3,
            models: Vec::new(),
            simulations: Vec::new(),
            tasks: Vec::new(),
            data_generators: Vec::new(),
            outputs: Vec::new(),
        }
    }
}

impl SedDocument {
    /// Collects the variables that data generators of this document require from a task.
    ///
    /// Variables are deduplicated by id and returned in ascending id order.
    ///
    /// # Arguments
    ///
    /// * `task_id` - The id of the task
    ///
    /// # Returns
    ///
    /// The variables bound to the task.
    pub fn get_variables_for_task(&self, task_id: &str) -> Vec<Variable> {
        let mut variables: Vec<Variable> = self
            .data_generators
            .iter()
            .flat_map(|data_gen| data_gen.variables.iter())
            .filter(|var| var.task.as_ref().is_some_and(|task| task.id() == task_id))
            .cloned()
            .collect();

        variables.sort_by(|a, b| a.id.cmp(&b.id));
        variables.dedup_by(|a, b| a.id == b.id);
        variables
    }

    pub fn find_model(&self, id: &str) -> Option<&Arc<Model>> {
        self.models.iter().find(|model| model.id == id)
    }

    pub fn find_simulation(&self, id: &str) -> Option<&Arc<Simulation>> {
        self.simulations.iter().find(|sim| sim.id() == id)
    }

    pub fn find_task(&self, id: &str) -> Option<&Arc<AbstractTask>> {
        self.tasks.iter().find(|task| task.id() == id)
    }

    pub fn find_data_generator(&self, id: &str) -> Option<&Arc<DataGenerator>> {
        self.data_generators.iter().find(|data_gen| data_gen.id == id)
    }
}

impl Canonical for SedDocument {
    fn to_tuple(&self) -> Tuple {
        Tuple::seq([
            Tuple::from(self.level),
            Tuple::from(self.version),
            sorted_tuples(&self.models),
            sorted_tuples(&self.simulations),
            sorted_tuples(&self.tasks),
            sorted_tuples(&self.data_generators),
            sorted_tuples(&self.outputs),
        ])
    }

    fn is_equal(&self, other: &Self) -> bool {
        self.level == other.level
            && self.version == other.version
            && are_lists_equal(&self.models, &other.models)
            && are_lists_equal(&self.simulations, &other.simulations)
            && are_lists_equal(&self.tasks, &other.tasks)
            && are_lists_equal(&self.data_generators, &other.data_generators)
            && are_lists_equal(&self.outputs, &other.outputs)
    }
}

//
// Simulations
//

/// A simulation, one of the kinds SED-ML defines.
#[derive(Debug, Clone)]
pub enum Simulation {
    SteadyState(SteadyStateSimulation),
    OneStep(OneStepSimulation),
    UniformTimeCourse(UniformTimeCourseSimulation),
}

impl Simulation {
    pub fn id(&self) -> &str {
        match self {
            Simulation::SteadyState(sim) => &sim.id,
            Simulation::OneStep(sim) => &sim.id,
            Simulation::UniformTimeCourse(sim) => &sim.id,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Simulation::SteadyState(sim) => sim.name.as_deref(),
            Simulation::OneStep(sim) => sim.name.as_deref(),
            Simulation::UniformTimeCourse(sim) => sim.name.as_deref(),
        }
    }

    pub fn algorithm(&self) -> Option<&Algorithm> {
        match self {
            Simulation::SteadyState(sim) => sim.algorithm.as_ref(),
            Simulation::OneStep(sim) => sim.algorithm.as_ref(),
            Simulation::UniformTimeCourse(sim) => sim.algorithm.as_ref(),
        }
    }

    /// Name of the simulation kind, as used in SED-ML.
    pub fn kind(&self) -> SimulationKind {
        match self {
            Simulation::SteadyState(_) => SimulationKind::SteadyState,
            Simulation::OneStep(_) => SimulationKind::OneStep,
            Simulation::UniformTimeCourse(_) => SimulationKind::UniformTimeCourse,
        }
    }
}

/// Discriminant of [`Simulation`], used where a kind is requested without an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SimulationKind {
    SteadyState,
    OneStep,
    UniformTimeCourse,
}

impl fmt::Display for SimulationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationKind::SteadyState => write!(f, "SteadyState"),
            SimulationKind::OneStep => write!(f, "OneStep"),
            SimulationKind::UniformTimeCourse => write!(f, "UniformTimeCourse"),
        }
    }
}

impl From<SteadyStateSimulation> for Simulation {
    fn from(sim: SteadyStateSimulation) -> Self {
        Simulation::SteadyState(sim)
    }
}

impl From<OneStepSimulation> for Simulation {
    fn from(sim: OneStepSimulation) -> Self {
        Simulation::OneStep(sim)
    }
}

impl From<UniformTimeCourseSimulation> for Simulation {
    fn from(sim: UniformTimeCourseSimulation) -> Self {
        Simulation::UniformTimeCourse(sim)
    }
}

impl Canonical for Simulation {
    fn to_tuple(&self) -> Tuple {
        match self {
            Simulation::SteadyState(sim) => sim.to_tuple(),
            Simulation::OneStep(sim) => sim.to_tuple(),
            Simulation::UniformTimeCourse(sim) => sim.to_tuple(),
        }
    }

    fn is_equal(&self, other: &Self) -> bool {
        match (self, other) {
            (Simulation::SteadyState(a), Simulation::SteadyState(b)) => a.is_equal(b),
            (Simulation::OneStep(a), Simulation::OneStep(b)) => a.is_equal(b),
            (Simulation::UniformTimeCourse(a), Simulation::UniformTimeCourse(b)) => a.is_equal(b),
            _ => false,
        }
    }
}

/// A steady-state simulation
#[derive(Debug, Clone, Builder)]
pub struct SteadyStateSimulation {
    #[builder(setter(into))]
    pub id: String,

    #[builder(default, setter(into, strip_option))]
    pub name: Option<String>,

    #[builder(default, setter(into, strip_option))]
    pub algorithm: Option<Algorithm>,
}

impl Canonical for SteadyStateSimulation {
    fn to_tuple(&self) -> Tuple {
        Tuple::seq([
            Tuple::from("SteadyState"),
            Tuple::from(&self.id),
            Tuple::from(self.name.as_deref()),
            optional_tuple(&self.algorithm),
        ])
    }

    fn is_equal(&self, other: &Self) -> bool {
        self.id == other.id
            && self.name == other.name
            && are_options_equal(&self.algorithm, &other.algorithm)
    }
}

/// A single simulation step
#[derive(Debug, Clone, Builder)]
pub struct OneStepSimulation {
    #[builder(setter(into))]
    pub id: String,

    #[builder(default, setter(into, strip_option))]
    pub name: Option<String>,

    #[builder(default, setter(into, strip_option))]
    pub algorithm: Option<Algorithm>,

    /// Size of the step
    #[builder(default, setter(into, strip_option))]
    pub step: Option<f64>,
}

impl Canonical for OneStepSimulation {
    fn to_tuple(&self) -> Tuple {
        Tuple::seq([
            Tuple::from("OneStep"),
            Tuple::from(&self.id),
            Tuple::from(self.name.as_deref()),
            optional_tuple(&self.algorithm),
            Tuple::from(self.step),
        ])
    }

    fn is_equal(&self, other: &Self) -> bool {
        self.id == other.id
            && self.name == other.name
            && are_options_equal(&self.algorithm, &other.algorithm)
            && are_optional_floats_equal(self.step, other.step)
    }
}

/// A uniform time course simulation.
///
/// The time bounds are expected to satisfy
/// `initial_time <= output_start_time <= output_end_time` with a non-negative
/// number of points. They are not enforced here; see
/// [`check_consistency`](crate::validation::consistency::check_consistency).
#[derive(Debug, Clone, Builder)]
pub struct UniformTimeCourseSimulation {
    #[builder(setter(into))]
    pub id: String,

    #[builder(default, setter(into, strip_option))]
    pub name: Option<String>,

    #[builder(default, setter(into, strip_option))]
    pub algorithm: Option<Algorithm>,

    /// Time at which the simulation starts
    #[builder(default)]
    pub initial_time: f64,

    /// Time at which recording of outputs starts
    #[builder(default)]
    pub output_start_time: f64,

    /// Time at which the simulation and the recording end
    #[builder(default)]
    pub output_end_time: f64,

    /// Number of steps between the output start and end times
    #[builder(default)]
    pub number_of_points: i64,
}

impl Canonical for UniformTimeCourseSimulation {
    fn to_tuple(&self) -> Tuple {
        Tuple::seq([
            Tuple::from("UniformTimeCourse"),
            Tuple::from(&self.id),
            Tuple::from(self.name.as_deref()),
            optional_tuple(&self.algorithm),
            Tuple::from(self.initial_time),
            Tuple::from(self.output_start_time),
            Tuple::from(self.output_end_time),
            Tuple::from(self.number_of_points),
        ])
    }

    fn is_equal(&self, other: &Self) -> bool {
        self.id == other.id
            && self.name == other.name
            && are_options_equal(&self.algorithm, &other.algorithm)
            && are_floats_equal(self.initial_time, other.initial_time)
            && are_floats_equal(self.output_start_time, other.output_start_time)
            && are_floats_equal(self.output_end_time, other.output_end_time)
            && self.number_of_points == other.number_of_points
    }
}

/// A simulation algorithm, identified by its KiSAO term
#[derive(Debug, Clone, Builder, Default)]
pub struct Algorithm {
    /// KiSAO id of the algorithm (e.g. `KISAO_0000019`)
    #[builder(default, setter(into, strip_option))]
    pub kisao_id: Option<String>,

    /// Overrides of algorithm parameters
    #[builder(default, setter(into, each(name = "to_changes")))]
    pub changes: Vec<AlgorithmParameterChange>,
}

impl Canonical for Algorithm {
    fn to_tuple(&self) -> Tuple {
        Tuple::seq([
            Tuple::from(self.kisao_id.as_deref()),
            sorted_tuples(&self.changes),
        ])
    }

    fn is_equal(&self, other: &Self) -> bool {
        self.kisao_id == other.kisao_id && are_lists_equal(&self.changes, &other.changes)
    }
}

/// A changed parameter of an algorithm
#[derive(Debug, Clone, Builder, Default)]
pub struct AlgorithmParameterChange {
    #[builder(default, setter(into, strip_option))]
    pub kisao_id: Option<String>,

    #[builder(default, setter(into, strip_option))]
    pub new_value: Option<String>,
}

impl Canonical for AlgorithmParameterChange {
    fn to_tuple(&self) -> Tuple {
        Tuple::seq([
            Tuple::from(self.kisao_id.as_deref()),
            Tuple::from(self.new_value.as_deref()),
        ])
    }

    fn is_equal(&self, other: &Self) -> bool {
        self.kisao_id == other.kisao_id && self.new_value == other.new_value
    }
}

//
// Models
//

/// A model
#[derive(Debug, Clone, Builder)]
pub struct Model {
    #[builder(setter(into))]
    pub id: String,

    #[builder(default, setter(into, strip_option))]
    pub name: Option<String>,

    /// Path or URI of the model file. Relative paths are resolved against the
    /// working directory at execution time.
    #[builder(setter(into))]
    pub source: String,

    /// URN of the model language (e.g. `urn:sedml:language:sbml`)
    #[builder(default, setter(into, strip_option))]
    pub language: Option<String>,

    /// Changes to apply to the model before simulating it
    #[builder(default, setter(into, each(name = "to_changes", into)))]
    pub changes: Vec<ModelChange>,
}

impl Model {
    /// Returns the known language of the model, if any.
    pub fn model_language(&self) -> Option<ModelLanguage> {
        self.language.as_deref().and_then(ModelLanguage::from_urn)
    }
}

impl Canonical for Model {
    fn to_tuple(&self) -> Tuple {
        Tuple::seq([
            Tuple::from(&self.id),
            Tuple::from(self.name.as_deref()),
            Tuple::from(&self.source),
            Tuple::from(self.language.as_deref()),
            sorted_tuples(&self.changes),
        ])
    }

    fn is_equal(&self, other: &Self) -> bool {
        self.id == other.id
            && self.name == other.name
            && self.source == other.source
            && self.language == other.language
            && are_lists_equal(&self.changes, &other.changes)
    }
}

/// A change to a model
#[derive(Debug, Clone)]
pub enum ModelChange {
    Attribute(ModelAttributeChange),
}

impl ModelChange {
    pub fn target(&self) -> &str {
        match self {
            ModelChange::Attribute(change) => &change.target,
        }
    }
}

impl From<ModelAttributeChange> for ModelChange {
    fn from(change: ModelAttributeChange) -> Self {
        ModelChange::Attribute(change)
    }
}

impl Canonical for ModelChange {
    fn to_tuple(&self) -> Tuple {
        match self {
            ModelChange::Attribute(change) => change.to_tuple(),
        }
    }

    fn is_equal(&self, other: &Self) -> bool {
        match (self, other) {
            (ModelChange::Attribute(a), ModelChange::Attribute(b)) => a.is_equal(b),
        }
    }
}

/// A change of an attribute of a model, addressed by an XPath target
#[derive(Debug, Clone, Builder)]
pub struct ModelAttributeChange {
    #[builder(default, setter(into, strip_option))]
    pub id: Option<String>,

    #[builder(default, setter(into, strip_option))]
    pub name: Option<String>,

    /// XPath of the attribute (e.g. `/sbml:sbml/sbml:model/@id`)
    #[builder(setter(into))]
    pub target: String,

    #[builder(setter(into))]
    pub new_value: String,
}

impl Canonical for ModelAttributeChange {
    fn to_tuple(&self) -> Tuple {
        Tuple::seq([
            Tuple::from(self.id.as_deref()),
            Tuple::from(self.name.as_deref()),
            Tuple::from(&self.target),
            Tuple::from(&self.new_value),
        ])
    }

    fn is_equal(&self, other: &Self) -> bool {
        self.id == other.id
            && self.name == other.name
            && self.target == other.target
            && self.new_value == other.new_value
    }
}

//
// Tasks
//

/// A task of a SED document.
///
/// Only [`AbstractTask::Task`] can be executed; repeated tasks are modeled so they
/// can be read and compared, and are rejected at execution time.
#[derive(Debug, Clone)]
pub enum AbstractTask {
    Task(Task),
    Repeated(RepeatedTask),
}

impl AbstractTask {
    pub fn id(&self) -> &str {
        match self {
            AbstractTask::Task(task) => &task.id,
            AbstractTask::Repeated(task) => &task.id,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            AbstractTask::Task(task) => task.name.as_deref(),
            AbstractTask::Repeated(task) => task.name.as_deref(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AbstractTask::Task(_) => "Task",
            AbstractTask::Repeated(_) => "RepeatedTask",
        }
    }
}

impl From<Task> for AbstractTask {
    fn from(task: Task) -> Self {
        AbstractTask::Task(task)
    }
}

impl From<RepeatedTask> for AbstractTask {
    fn from(task: RepeatedTask) -> Self {
        AbstractTask::Repeated(task)
    }
}

impl Canonical for AbstractTask {
    fn to_tuple(&self) -> Tuple {
        match self {
            AbstractTask::Task(task) => task.to_tuple(),
            AbstractTask::Repeated(task) => task.to_tuple(),
        }
    }

    fn is_equal(&self, other: &Self) -> bool {
        match (self, other) {
            (AbstractTask::Task(a), AbstractTask::Task(b)) => a.is_equal(b),
            (AbstractTask::Repeated(a), AbstractTask::Repeated(b)) => a.is_equal(b),
            _ => false,
        }
    }
}

/// A task binding one model to one simulation
#[derive(Debug, Clone, Builder)]
pub struct Task {
    #[builder(setter(into))]
    pub id: String,

    #[builder(default, setter(into, strip_option))]
    pub name: Option<String>,

    #[builder(setter(into))]
    pub model: Arc<Model>,

    #[builder(setter(into))]
    pub simulation: Arc<Simulation>,
}

impl Canonical for Task {
    fn to_tuple(&self) -> Tuple {
        Tuple::seq([
            Tuple::from("Task"),
            Tuple::from(&self.id),
            Tuple::from(self.name.as_deref()),
            self.model.to_tuple(),
            self.simulation.to_tuple(),
        ])
    }

    fn is_equal(&self, other: &Self) -> bool {
        self.id == other.id
            && self.name == other.name
            && self.model.is_equal(&other.model)
            && self.simulation.is_equal(&other.simulation)
    }
}

/// A task which repeatedly executes sub-tasks
#[derive(Debug, Clone, Builder)]
pub struct RepeatedTask {
    #[builder(setter(into))]
    pub id: String,

    #[builder(default, setter(into, strip_option))]
    pub name: Option<String>,

    /// Whether the model is reset between iterations
    #[builder(default)]
    pub reset_model: bool,

    #[builder(default, setter(into, each(name = "to_sub_tasks")))]
    pub sub_tasks: Vec<SubTask>,
}

impl Canonical for RepeatedTask {
    fn to_tuple(&self) -> Tuple {
        Tuple::seq([
            Tuple::from("RepeatedTask"),
            Tuple::from(&self.id),
            Tuple::from(self.name.as_deref()),
            Tuple::from(self.reset_model),
            sorted_tuples(&self.sub_tasks),
        ])
    }

    fn is_equal(&self, other: &Self) -> bool {
        self.id == other.id
            && self.name == other.name
            && self.reset_model == other.reset_model
            && are_lists_equal(&self.sub_tasks, &other.sub_tasks)
    }
}

/// A sub-task of a repeated task
#[derive(Debug, Clone)]
pub struct SubTask {
    pub order: Option<i64>,
    pub task: Arc<AbstractTask>,
}

impl Canonical for SubTask {
    fn to_tuple(&self) -> Tuple {
        Tuple::seq([Tuple::from(self.order), self.task.to_tuple()])
    }

    fn is_equal(&self, other: &Self) -> bool {
        self.order == other.order && self.task.is_equal(&other.task)
    }
}

//
// Data generators
//

/// A data generator
///
/// Computes one result array from the results of its variables by evaluating
/// `math`, which may reference the ids of its variables and parameters.
#[derive(Debug, Clone, Builder)]
pub struct DataGenerator {
    #[builder(setter(into))]
    pub id: String,

    #[builder(default, setter(into, strip_option))]
    pub name: Option<String>,

    #[builder(default, setter(into, each(name = "to_variables")))]
    pub variables: Vec<Variable>,

    #[builder(default, setter(into, each(name = "to_parameters")))]
    pub parameters: Vec<Parameter>,

    /// Mathematical expression (e.g. `root(x, 2) * k`)
    #[builder(setter(into))]
    pub math: String,
}

impl Canonical for DataGenerator {
    fn to_tuple(&self) -> Tuple {
        Tuple::seq([
            Tuple::from(&self.id),
            Tuple::from(self.name.as_deref()),
            sorted_tuples(&self.variables),
            sorted_tuples(&self.parameters),
            Tuple::from(&self.math),
        ])
    }

    fn is_equal(&self, other: &Self) -> bool {
        self.id == other.id
            && self.name == other.name
            && are_lists_equal(&self.variables, &other.variables)
            && are_lists_equal(&self.parameters, &other.parameters)
            && self.math == other.math
    }
}

/// A model variable involved in a data generator
#[derive(Debug, Clone, Builder)]
pub struct Variable {
    #[builder(setter(into))]
    pub id: String,

    #[builder(default, setter(into, strip_option))]
    pub name: Option<String>,

    /// Target path of the variable within the model
    #[builder(default, setter(into, strip_option))]
    pub target: Option<String>,

    /// Implicit symbol, such as [`Symbol::Time`]
    #[builder(default, setter(into, strip_option))]
    pub symbol: Option<String>,

    #[builder(default, setter(into, strip_option))]
    pub task: Option<Arc<AbstractTask>>,

    #[builder(default, setter(into, strip_option))]
    pub model: Option<Arc<Model>>,
}

impl Canonical for Variable {
    fn to_tuple(&self) -> Tuple {
        Tuple::seq([
            Tuple::from(&self.id),
            Tuple::from(self.name.as_deref()),
            Tuple::from(self.target.as_deref()),
            Tuple::from(self.symbol.as_deref()),
            optional_tuple(&self.task),
            optional_tuple(&self.model),
        ])
    }

    fn is_equal(&self, other: &Self) -> bool {
        self.id == other.id
            && self.name == other.name
            && self.target == other.target
            && self.symbol == other.symbol
            && are_options_equal(&self.task, &other.task)
            && are_options_equal(&self.model, &other.model)
    }
}

/// A constant involved in a data generator
#[derive(Debug, Clone, Builder)]
pub struct Parameter {
    #[builder(setter(into))]
    pub id: String,

    #[builder(default, setter(into, strip_option))]
    pub name: Option<String>,

    pub value: f64,
}

impl Canonical for Parameter {
    fn to_tuple(&self) -> Tuple {
        Tuple::seq([
            Tuple::from(&self.id),
            Tuple::from(self.name.as_deref()),
            Tuple::from(self.value),
        ])
    }

    fn is_equal(&self, other: &Self) -> bool {
        self.id == other.id
            && self.name == other.name
            && are_floats_equal(self.value, other.value)
    }
}

//
// Outputs
//

/// An output of a SED document
#[derive(Debug, Clone)]
pub enum Output {
    Report(Report),
    Plot2D(Plot2D),
    Plot3D(Plot3D),
}

impl Output {
    pub fn id(&self) -> &str {
        match self {
            Output::Report(output) => &output.id,
            Output::Plot2D(output) => &output.id,
            Output::Plot3D(output) => &output.id,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Output::Report(output) => output.name.as_deref(),
            Output::Plot2D(output) => output.name.as_deref(),
            Output::Plot3D(output) => output.name.as_deref(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Output::Report(_) => "Report",
            Output::Plot2D(_) => "Plot2D",
            Output::Plot3D(_) => "Plot3D",
        }
    }
}

impl From<Report> for Output {
    fn from(report: Report) -> Self {
        Output::Report(report)
    }
}

impl From<Plot2D> for Output {
    fn from(plot: Plot2D) -> Self {
        Output::Plot2D(plot)
    }
}

impl From<Plot3D> for Output {
    fn from(plot: Plot3D) -> Self {
        Output::Plot3D(plot)
    }
}

impl Canonical for Output {
    fn to_tuple(&self) -> Tuple {
        match self {
            Output::Report(output) => output.to_tuple(),
            Output::Plot2D(output) => output.to_tuple(),
            Output::Plot3D(output) => output.to_tuple(),
        }
    }

    fn is_equal(&self, other: &Self) -> bool {
        match (self, other) {
            (Output::Report(a), Output::Report(b)) => a.is_equal(b),
            (Output::Plot2D(a), Output::Plot2D(b)) => a.is_equal(b),
            (Output::Plot3D(a), Output::Plot3D(b)) => a.is_equal(b),
            _ => false,
        }
    }
}

/// A report: a table of labeled data sets
#[derive(Debug, Clone, Builder)]
pub struct Report {
    #[builder(setter(into))]
    pub id: String,

    #[builder(default, setter(into, strip_option))]
    pub name: Option<String>,

    #[builder(default, setter(into, each(name = "to_data_sets")))]
    pub data_sets: Vec<DataSet>,
}

impl Canonical for Report {
    fn to_tuple(&self) -> Tuple {
        Tuple::seq([
            Tuple::from("Report"),
            Tuple::from(&self.id),
            Tuple::from(self.name.as_deref()),
            sorted_tuples(&self.data_sets),
        ])
    }

    fn is_equal(&self, other: &Self) -> bool {
        self.id == other.id
            && self.name == other.name
            && are_lists_equal(&self.data_sets, &other.data_sets)
    }
}

/// A data set in a report
#[derive(Debug, Clone, Builder)]
pub struct DataSet {
    #[builder(setter(into))]
    pub id: String,

    #[builder(default, setter(into, strip_option))]
    pub name: Option<String>,

    /// Row label of the data set in the report table
    #[builder(setter(into))]
    pub label: String,

    #[builder(setter(into))]
    pub data_generator: Arc<DataGenerator>,
}

impl Canonical for DataSet {
    fn to_tuple(&self) -> Tuple {
        Tuple::seq([
            Tuple::from(&self.id),
            Tuple::from(self.name.as_deref()),
            Tuple::from(&self.label),
            self.data_generator.to_tuple(),
        ])
    }

    fn is_equal(&self, other: &Self) -> bool {
        self.id == other.id
            && self.name == other.name
            && self.label == other.label
            && self.data_generator.is_equal(&other.data_generator)
    }
}

/// A 2D plot
#[derive(Debug, Clone, Builder)]
pub struct Plot2D {
    #[builder(setter(into))]
    pub id: String,

    #[builder(default, setter(into, strip_option))]
    pub name: Option<String>,

    #[builder(default, setter(into, each(name = "to_curves")))]
    pub curves: Vec<Curve>,
}

impl Canonical for Plot2D {
    fn to_tuple(&self) -> Tuple {
        Tuple::seq([
            Tuple::from("Plot2D"),
            Tuple::from(&self.id),
            Tuple::from(self.name.as_deref()),
            sorted_tuples(&self.curves),
        ])
    }

    fn is_equal(&self, other: &Self) -> bool {
        self.id == other.id
            && self.name == other.name
            && are_lists_equal(&self.curves, &other.curves)
    }
}

/// A 3D plot
#[derive(Debug, Clone, Builder)]
pub struct Plot3D {
    #[builder(setter(into))]
    pub id: String,

    #[builder(default, setter(into, strip_option))]
    pub name: Option<String>,

    #[builder(default, setter(into, each(name = "to_surfaces")))]
    pub surfaces: Vec<Surface>,
}

impl Canonical for Plot3D {
    fn to_tuple(&self) -> Tuple {
        Tuple::seq([
            Tuple::from("Plot3D"),
            Tuple::from(&self.id),
            Tuple::from(self.name.as_deref()),
            sorted_tuples(&self.surfaces),
        ])
    }

    fn is_equal(&self, other: &Self) -> bool {
        self.id == other.id
            && self.name == other.name
            && are_lists_equal(&self.surfaces, &other.surfaces)
    }
}

/// Scale of a plot axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum AxisScale {
    #[default]
    Linear,
    Log,
}

impl AxisScale {
    pub fn as_str(&self) -> &'static str {
        match self {
            AxisScale::Linear => "linear",
            AxisScale::Log => "log",
        }
    }
}

impl From<AxisScale> for Tuple {
    fn from(scale: AxisScale) -> Self {
        Tuple::from(scale.as_str())
    }
}

/// A curve in a 2D plot
#[derive(Debug, Clone, Builder)]
pub struct Curve {
    #[builder(setter(into))]
    pub id: String,

    #[builder(default, setter(into, strip_option))]
    pub name: Option<String>,

    #[builder(default)]
    pub x_scale: AxisScale,

    #[builder(default)]
    pub y_scale: AxisScale,

    #[builder(setter(into))]
    pub x_data_generator: Arc<DataGenerator>,

    #[builder(setter(into))]
    pub y_data_generator: Arc<DataGenerator>,
}

impl Canonical for Curve {
    fn to_tuple(&self) -> Tuple {
        Tuple::seq([
            Tuple::from(&self.id),
            Tuple::from(self.name.as_deref()),
            Tuple::from(self.x_scale),
            Tuple::from(self.y_scale),
            self.x_data_generator.to_tuple(),
            self.y_data_generator.to_tuple(),
        ])
    }

    fn is_equal(&self, other: &Self) -> bool {
        self.id == other.id
            && self.name == other.name
            && self.x_scale == other.x_scale
            && self.y_scale == other.y_scale
            && self.x_data_generator.is_equal(&other.x_data_generator)
            && self.y_data_generator.is_equal(&other.y_data_generator)
    }
}

/// A surface in a 3D plot
#[derive(Debug, Clone, Builder)]
pub struct Surface {
    #[builder(setter(into))]
    pub id: String,

    #[builder(default, setter(into, strip_option))]
    pub name: Option<String>,

    #[builder(default)]
    pub x_scale: AxisScale,

    #[builder(default)]
    pub y_scale: AxisScale,

    #[builder(default)]
    pub z_scale: AxisScale,

    #[builder(setter(into))]
    pub x_data_generator: Arc<DataGenerator>,

    #[builder(setter(into))]
    pub y_data_generator: Arc<DataGenerator>,

    #[builder(setter(into))]
    pub z_data_generator: Arc<DataGenerator>,
}

impl Canonical for Surface {
    fn to_tuple(&self) -> Tuple {
        Tuple::seq([
            Tuple::from(&self.id),
            Tuple::from(self.name.as_deref()),
            Tuple::from(self.x_scale),
            Tuple::from(self.y_scale),
            Tuple::from(self.z_scale),
            self.x_data_generator.to_tuple(),
            self.y_data_generator.to_tuple(),
            self.z_data_generator.to_tuple(),
        ])
    }

    fn is_equal(&self, other: &Self) -> bool {
        self.id == other.id
            && self.name == other.name
            && self.x_scale == other.x_scale
            && self.y_scale == other.y_scale
            && self.z_scale == other.z_scale
            && self.x_data_generator.is_equal(&other.x_data_generator)
            && self.y_data_generator.is_equal(&other.y_data_generator)
            && self.z_data_generator.is_equal(&other.z_data_generator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn algorithm() -> Algorithm {
        AlgorithmBuilder::default()
            .kisao_id("KISAO_0000019")
            .to_changes(
                AlgorithmParameterChangeBuilder::default()
                    .kisao_id("KISAO_0000211")
                    .new_value("1e-6")
                    .build()
                    .unwrap(),
            )
            .to_changes(
                AlgorithmParameterChangeBuilder::default()
                    .kisao_id("KISAO_0000209")
                    .new_value("1e-8")
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap()
    }

    fn time_course(id: &str) -> Simulation {
        UniformTimeCourseSimulationBuilder::default()
            .id(id)
            .algorithm(algorithm())
            .initial_time(0.0)
            .output_start_time(0.0)
            .output_end_time(10.0)
            .number_of_points(10)
            .build()
            .unwrap()
            .into()
    }

    fn model(id: &str) -> Model {
        ModelBuilder::default()
            .id(id)
            .source("model.xml")
            .language(ModelLanguage::SBML.urn())
            .to_changes(
                ModelAttributeChangeBuilder::default()
                    .target("/sbml:sbml/sbml:model/@name")
                    .new_value("a")
                    .build()
                    .unwrap(),
            )
            .to_changes(
                ModelAttributeChangeBuilder::default()
                    .target("/sbml:sbml/sbml:model/@id")
                    .new_value("b")
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap()
    }

    fn document(reverse: bool) -> SedDocument {
        let model = Arc::new(model("model"));
        let sim = Arc::new(time_course("sim"));
        let mut tasks: Vec<Arc<AbstractTask>> = ["task_a", "task_b"]
            .iter()
            .map(|id| {
                Arc::new(AbstractTask::from(
                    TaskBuilder::default()
                        .id(*id)
                        .model(model.clone())
                        .simulation(sim.clone())
                        .build()
                        .unwrap(),
                ))
            })
            .collect();

        let var = VariableBuilder::default()
            .id("x")
            .target("/sbml:sbml/sbml:model/sbml:listOfSpecies/sbml:species[@id='x']")
            .task(tasks[0].clone())
            .model(model.clone())
            .build()
            .unwrap();
        let time = VariableBuilder::default()
            .id("t")
            .symbol(Symbol::Time.urn())
            .task(tasks[0].clone())
            .build()
            .unwrap();

        let mut variables = vec![var, time];
        if reverse {
            tasks.reverse();
            variables.reverse();
        }

        let data_gen = Arc::new(
            DataGeneratorBuilder::default()
                .id("dg")
                .variables(variables)
                .math("x * t")
                .build()
                .unwrap(),
        );

        SedDocumentBuilder::default()
            .to_models(model)
            .to_simulations(sim)
            .tasks(tasks)
            .to_data_generators(data_gen.clone())
            .to_outputs(Output::from(
                ReportBuilder::default()
                    .id("report")
                    .to_data_sets(
                        DataSetBuilder::default()
                            .id("ds")
                            .label("x*t")
                            .data_generator(data_gen)
                            .build()
                            .unwrap(),
                    )
                    .build()
                    .unwrap(),
            ))
            .build()
            .unwrap()
    }

    #[test]
    fn test_document_equal_to_itself() {
        let doc = document(false);
        assert!(doc.is_equal(&doc));
        assert_eq!(doc.to_tuple(), doc.to_tuple());
    }

    #[test]
    fn test_document_equality_ignores_order() {
        let a = document(false);
        let b = document(true);
        assert!(a.is_equal(&b));
        assert_eq!(a.to_tuple(), b.to_tuple());
    }

    #[test]
    fn test_simulation_kind_mismatch() {
        let steady: Simulation = SteadyStateSimulationBuilder::default()
            .id("sim")
            .algorithm(algorithm())
            .build()
            .unwrap()
            .into();
        let one_step: Simulation = OneStepSimulationBuilder::default()
            .id("sim")
            .algorithm(algorithm())
            .build()
            .unwrap()
            .into();

        assert!(!steady.is_equal(&one_step));
        assert_ne!(steady.to_tuple(), one_step.to_tuple());
    }

    #[test]
    fn test_single_field_difference() {
        let a = time_course("sim");
        let Simulation::UniformTimeCourse(mut inner) = time_course("sim") else {
            unreachable!()
        };
        inner.number_of_points = 11;
        let b = Simulation::from(inner);

        assert!(!a.is_equal(&b));
        assert_ne!(a.to_tuple(), b.to_tuple());

        let mut other = model("model");
        other.source = "other.xml".to_string();
        assert!(!model("model").is_equal(&other));
        assert_ne!(model("model").to_tuple(), other.to_tuple());
    }

    fn task(id: &str) -> Arc<AbstractTask> {
        Arc::new(AbstractTask::from(
            TaskBuilder::default()
                .id(id)
                .model(Arc::new(model("model")))
                .simulation(Arc::new(time_course("sim")))
                .build()
                .unwrap(),
        ))
    }

    fn data_generator(id: &str) -> DataGenerator {
        DataGeneratorBuilder::default()
            .id(id)
            .to_variables(
                VariableBuilder::default()
                    .id("x")
                    .target("/sbml:sbml/sbml:model/sbml:listOfSpecies/sbml:species[@id='x']")
                    .task(task("task"))
                    .build()
                    .unwrap(),
            )
            .to_variables(
                VariableBuilder::default()
                    .id("t")
                    .symbol(Symbol::Time.urn())
                    .task(task("task"))
                    .build()
                    .unwrap(),
            )
            .to_parameters(ParameterBuilder::default().id("k").value(2.0).build().unwrap())
            .to_parameters(ParameterBuilder::default().id("c").value(0.5).build().unwrap())
            .math("k * x + c")
            .build()
            .unwrap()
    }

    fn data_set(id: &str, data_gen: &str) -> DataSet {
        DataSetBuilder::default()
            .id(id)
            .label(id)
            .data_generator(Arc::new(data_generator(data_gen)))
            .build()
            .unwrap()
    }

    fn curve(id: &str) -> Curve {
        CurveBuilder::default()
            .id(id)
            .x_data_generator(Arc::new(data_generator("time")))
            .y_data_generator(Arc::new(data_generator(id)))
            .build()
            .unwrap()
    }

    fn surface(id: &str) -> Surface {
        SurfaceBuilder::default()
            .id(id)
            .x_data_generator(Arc::new(data_generator("x")))
            .y_data_generator(Arc::new(data_generator("y")))
            .z_data_generator(Arc::new(data_generator(id)))
            .build()
            .unwrap()
    }

    fn repeated_task() -> RepeatedTask {
        RepeatedTaskBuilder::default()
            .id("repeat")
            .to_sub_tasks(SubTask {
                order: Some(1),
                task: task("task_a"),
            })
            .to_sub_tasks(SubTask {
                order: Some(2),
                task: task("task_b"),
            })
            .build()
            .unwrap()
    }

    /// Applies each mutation to a copy of `base` and checks that both
    /// `is_equal` and the projection notice the change.
    fn assert_mutations_differ<T: Canonical + Clone>(
        base: &T,
        mutations: &[(&str, fn(&mut T))],
    ) {
        assert!(base.is_equal(&base.clone()));
        for (field, mutate) in mutations {
            let mut changed = base.clone();
            mutate(&mut changed);
            assert!(
                !base.is_equal(&changed),
                "changing {field} should break equality"
            );
            assert_ne!(
                base.to_tuple(),
                changed.to_tuple(),
                "changing {field} should change the projection"
            );
        }
    }

    fn assert_same<T: Canonical>(a: &T, b: &T) {
        assert!(a.is_equal(b));
        assert!(b.is_equal(a));
        assert_eq!(a.to_tuple(), b.to_tuple());
    }

    #[test]
    fn test_report_field_differences() {
        let report = ReportBuilder::default()
            .id("report")
            .to_data_sets(data_set("a", "dg_a"))
            .to_data_sets(data_set("b", "dg_b"))
            .build()
            .unwrap();

        let mutations: &[(&str, fn(&mut Report))] = &[
            ("id", |r: &mut Report| r.id = "other".into()),
            ("name", |r: &mut Report| r.name = Some("Report".into())),
            ("data set label", |r: &mut Report| {
                r.data_sets[0].label = "other".into()
            }),
            ("data set count", |r: &mut Report| {
                r.data_sets.pop();
            }),
            ("data set generator", |r: &mut Report| {
                r.data_sets[1].data_generator = Arc::new(data_generator("dg_a"))
            }),
        ];
        assert_mutations_differ(&report, mutations);

        let mutations: &[(&str, fn(&mut DataSet))] = &[
            ("id", |d: &mut DataSet| d.id = "other".into()),
            ("name", |d: &mut DataSet| d.name = Some("Data set".into())),
            ("label", |d: &mut DataSet| d.label = "other".into()),
            ("data generator", |d: &mut DataSet| {
                d.data_generator = Arc::new(data_generator("other"))
            }),
        ];
        assert_mutations_differ(&data_set("a", "dg_a"), mutations);
    }

    #[test]
    fn test_plot_field_differences() {
        let plot = Plot2DBuilder::default()
            .id("plot")
            .to_curves(curve("a"))
            .to_curves(curve("b"))
            .build()
            .unwrap();

        let mutations: &[(&str, fn(&mut Plot2D))] = &[
            ("id", |p: &mut Plot2D| p.id = "other".into()),
            ("name", |p: &mut Plot2D| p.name = Some("Plot".into())),
            ("curve scale", |p: &mut Plot2D| {
                p.curves[0].y_scale = AxisScale::Log
            }),
            ("curve count", |p: &mut Plot2D| {
                p.curves.pop();
            }),
        ];
        assert_mutations_differ(&plot, mutations);

        let mutations: &[(&str, fn(&mut Curve))] = &[
            ("id", |c: &mut Curve| c.id = "other".into()),
            ("name", |c: &mut Curve| c.name = Some("Curve".into())),
            ("x scale", |c: &mut Curve| c.x_scale = AxisScale::Log),
            ("y scale", |c: &mut Curve| c.y_scale = AxisScale::Log),
            ("x data generator", |c: &mut Curve| {
                c.x_data_generator = Arc::new(data_generator("other"))
            }),
            ("y data generator", |c: &mut Curve| {
                c.y_data_generator = Arc::new(data_generator("other"))
            }),
        ];
        assert_mutations_differ(&curve("a"), mutations);

        let plot = Plot3DBuilder::default()
            .id("plot")
            .to_surfaces(surface("a"))
            .to_surfaces(surface("b"))
            .build()
            .unwrap();

        let mutations: &[(&str, fn(&mut Plot3D))] = &[
            ("id", |p: &mut Plot3D| p.id = "other".into()),
            ("name", |p: &mut Plot3D| p.name = Some("Plot".into())),
            ("surface scale", |p: &mut Plot3D| {
                p.surfaces[1].z_scale = AxisScale::Log
            }),
            ("surface count", |p: &mut Plot3D| {
                p.surfaces.pop();
            }),
        ];
        assert_mutations_differ(&plot, mutations);

        let mutations: &[(&str, fn(&mut Surface))] = &[
            ("id", |s: &mut Surface| s.id = "other".into()),
            ("name", |s: &mut Surface| s.name = Some("Surface".into())),
            ("x scale", |s: &mut Surface| s.x_scale = AxisScale::Log),
            ("y scale", |s: &mut Surface| s.y_scale = AxisScale::Log),
            ("z scale", |s: &mut Surface| s.z_scale = AxisScale::Log),
            ("x data generator", |s: &mut Surface| {
                s.x_data_generator = Arc::new(data_generator("other"))
            }),
            ("y data generator", |s: &mut Surface| {
                s.y_data_generator = Arc::new(data_generator("other"))
            }),
            ("z data generator", |s: &mut Surface| {
                s.z_data_generator = Arc::new(data_generator("other"))
            }),
        ];
        assert_mutations_differ(&surface("a"), mutations);
    }

    #[test]
    fn test_data_generator_field_differences() {
        let mutations: &[(&str, fn(&mut DataGenerator))] = &[
            ("id", |d: &mut DataGenerator| d.id = "other".into()),
            ("name", |d: &mut DataGenerator| d.name = Some("DG".into())),
            ("math", |d: &mut DataGenerator| d.math = "k * x".into()),
            ("variable count", |d: &mut DataGenerator| {
                d.variables.pop();
            }),
            ("parameter value", |d: &mut DataGenerator| {
                d.parameters[0].value = 3.0
            }),
        ];
        assert_mutations_differ(&data_generator("dg"), mutations);

        let variable = data_generator("dg").variables[0].clone();
        let mutations: &[(&str, fn(&mut Variable))] = &[
            ("id", |v: &mut Variable| v.id = "other".into()),
            ("name", |v: &mut Variable| v.name = Some("X".into())),
            ("target", |v: &mut Variable| v.target = None),
            ("symbol", |v: &mut Variable| {
                v.symbol = Some(Symbol::Time.urn().into())
            }),
            ("task", |v: &mut Variable| v.task = Some(task("other"))),
            ("model", |v: &mut Variable| {
                v.model = Some(Arc::new(model("model")))
            }),
        ];
        assert_mutations_differ(&variable, mutations);

        let parameter = ParameterBuilder::default().id("k").value(2.0).build().unwrap();
        let mutations: &[(&str, fn(&mut Parameter))] = &[
            ("id", |p: &mut Parameter| p.id = "other".into()),
            ("name", |p: &mut Parameter| p.name = Some("K".into())),
            ("value", |p: &mut Parameter| p.value = 2.5),
            ("value to NaN", |p: &mut Parameter| p.value = f64::NAN),
        ];
        assert_mutations_differ(&parameter, mutations);
    }

    #[test]
    fn test_task_field_differences() {
        let Some(AbstractTask::Task(base)) = Arc::into_inner(task("task")) else {
            unreachable!()
        };
        let mutations: &[(&str, fn(&mut Task))] = &[
            ("id", |t: &mut Task| t.id = "other".into()),
            ("name", |t: &mut Task| t.name = Some("Task".into())),
            ("model", |t: &mut Task| t.model = Arc::new(model("other"))),
            ("simulation", |t: &mut Task| {
                t.simulation = Arc::new(time_course("other"))
            }),
        ];
        assert_mutations_differ(&base, mutations);

        let mutations: &[(&str, fn(&mut RepeatedTask))] = &[
            ("id", |t: &mut RepeatedTask| t.id = "other".into()),
            ("name", |t: &mut RepeatedTask| t.name = Some("Repeat".into())),
            ("reset model", |t: &mut RepeatedTask| t.reset_model = true),
            ("sub-task order", |t: &mut RepeatedTask| {
                t.sub_tasks[0].order = None
            }),
            ("sub-task task", |t: &mut RepeatedTask| {
                t.sub_tasks[1].task = task("task_c")
            }),
            ("sub-task count", |t: &mut RepeatedTask| {
                t.sub_tasks.pop();
            }),
        ];
        assert_mutations_differ(&repeated_task(), mutations);

        let plain: AbstractTask = base.into();
        let repeated: AbstractTask = repeated_task().into();
        assert!(!plain.is_equal(&repeated));
        assert_ne!(plain.to_tuple(), repeated.to_tuple());
    }

    #[test]
    fn test_child_order_is_ignored() {
        let mut generator = data_generator("dg");
        let mut reversed = generator.clone();
        reversed.variables.reverse();
        reversed.parameters.reverse();
        assert_same(&generator, &reversed);

        // Order and multiplicity are independent: a duplicate is not a reordering.
        generator.parameters.push(generator.parameters[0].clone());
        reversed.parameters.push(reversed.parameters[0].clone());
        assert!(!generator.is_equal(&reversed));

        let report = ReportBuilder::default()
            .id("report")
            .data_sets(vec![data_set("a", "dg_a"), data_set("b", "dg_b")])
            .build()
            .unwrap();
        let mut reversed = report.clone();
        reversed.data_sets.reverse();
        assert_same(&report, &reversed);

        let plot = Plot2DBuilder::default()
            .id("plot")
            .curves(vec![curve("a"), curve("b"), curve("c")])
            .build()
            .unwrap();
        let mut reversed = plot.clone();
        reversed.curves.reverse();
        assert_same(&plot, &reversed);

        let plot = Plot3DBuilder::default()
            .id("plot")
            .surfaces(vec![surface("a"), surface("b")])
            .build()
            .unwrap();
        let mut reversed = plot.clone();
        reversed.surfaces.reverse();
        assert_same(&plot, &reversed);

        let repeated = repeated_task();
        let mut reversed = repeated.clone();
        reversed.sub_tasks.reverse();
        assert_same(&repeated, &reversed);
    }

    #[test]
    fn test_output_kind_mismatch() {
        let report: Output = ReportBuilder::default().id("out").build().unwrap().into();
        let plot_2d: Output = Plot2DBuilder::default().id("out").build().unwrap().into();
        let plot_3d: Output = Plot3DBuilder::default().id("out").build().unwrap().into();

        for (a, b) in [(&report, &plot_2d), (&report, &plot_3d), (&plot_2d, &plot_3d)] {
            assert!(!a.is_equal(b), "{} should differ from {}", a.kind(), b.kind());
            assert_ne!(a.to_tuple(), b.to_tuple());
        }
        assert_same(&report, &report.clone());
    }

    #[test]
    fn test_nan_values_are_equal() {
        let parameter = ParameterBuilder::default()
            .id("k")
            .value(f64::NAN)
            .build()
            .unwrap();
        assert_same(&parameter, &parameter.clone());

        let Simulation::UniformTimeCourse(mut inner) = time_course("sim") else {
            unreachable!()
        };
        inner.output_end_time = f64::NAN;
        let sim = Simulation::from(inner);
        assert_same(&sim, &sim.clone());
        assert!(!sim.is_equal(&time_course("sim")));

        let one_step: Simulation = OneStepSimulationBuilder::default()
            .id("sim")
            .step(f64::NAN)
            .build()
            .unwrap()
            .into();
        assert_same(&one_step, &one_step.clone());
    }

    #[test]
    fn test_variables_for_task() {
        let doc = document(true);
        let vars = doc.get_variables_for_task("task_a");
        let ids: Vec<&str> = vars.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["t", "x"]);
        assert!(doc.get_variables_for_task("task_b").is_empty());
    }

    #[test]
    fn test_model_language_from_urn() {
        assert_eq!(
            ModelLanguage::from_urn("urn:sedml:language:sbml.level-3.version-2"),
            Some(ModelLanguage::SBML)
        );
        assert_eq!(
            ModelLanguage::from_urn("urn:sedml:language:cellml"),
            Some(ModelLanguage::CellML)
        );
        assert_eq!(ModelLanguage::from_urn("urn:sedml:language:sbmlx"), None);
    }
}
