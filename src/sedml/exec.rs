//! SED Document Execution
//!
//! This module executes a SED document against a pluggable [`TaskExecutor`] and
//! writes the resulting reports.
//!
//! # Pipeline
//!
//! An execution run passes through these stages in order, aborting on the first
//! error:
//!
//! 1. Load the document, either given in memory or read from a path
//! 2. Resolve model sources against the working directory and, if requested,
//!    write changed copies of the models to temporary files
//! 3. Execute every task once, in ascending order of task id, collecting the
//!    results of the variables data generators require
//! 4. Evaluate every data generator
//! 5. Shape reports into labeled tables
//! 6. Write every report once per requested format
//! 7. Remove the temporary model files
//!
//! Temporary model files are removed when the run ends, whether it succeeded or not.
//! The input document is never modified; resolved model sources are passed to the
//! task executor as [`ResolvedModel`] values.

use std::borrow::Cow;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use derive_builder::Builder;
use itertools::Itertools;
use ndarray::{ArrayD, Axis, IxDyn};
use tempfile::NamedTempFile;

use crate::canonical::Canonical;
use crate::config::Config;
use crate::report::data_model::{
    DataGeneratorResults, OutputResults, PlotFormat, ReportFormat, ReportResult, VariableResults,
};
use crate::report::writer::{ReportWriter, TabularReportWriter};
use crate::sedml::data_model::{
    AbstractTask, DataGenerator, Model, Output, Report, SedDocument, Task, Variable,
};
use crate::sedml::error::{ExecError, TaskError};
use crate::sedml::io::{JsonSedDocumentReader, SedDocumentReader};
use crate::sedml::math::{calc_data_generator_results, MathFunctions};
use crate::sedml::model_changes::{ModelChangeApplier, XmlModelChangeApplier};

/// Executes a single task.
///
/// Implementations run the simulation of `task` on `model` and return a result
/// array for every requested variable, keyed by variable id. The executor calls
/// this exactly once per task.
pub trait TaskExecutor {
    fn execute(
        &mut self,
        task: &Task,
        model: &ResolvedModel,
        variables: &[Variable],
    ) -> Result<VariableResults, TaskError>;
}

impl<F> TaskExecutor for F
where
    F: FnMut(&Task, &ResolvedModel, &[Variable]) -> Result<VariableResults, TaskError>,
{
    fn execute(
        &mut self,
        task: &Task,
        model: &ResolvedModel,
        variables: &[Variable],
    ) -> Result<VariableResults, TaskError> {
        self(task, model, variables)
    }
}

/// A model with its source resolved for execution.
#[derive(Debug, Clone)]
pub struct ResolvedModel {
    /// The model as declared in the document
    pub model: Arc<Model>,
    /// Path of the model file, or the URI it is retrieved from
    pub source: String,
    /// Whether the model's changes are already applied to `source`
    pub changes_applied: bool,
}

impl ResolvedModel {
    /// Returns whether the source is a URI rather than a file path.
    pub fn is_uri(&self) -> bool {
        is_uri(&self.source)
    }

    /// Returns the path of the model file, or `None` for URI sources.
    pub fn path(&self) -> Option<&Path> {
        (!self.is_uri()).then(|| Path::new(&self.source))
    }
}

fn is_uri(source: &str) -> bool {
    source.contains("://") || source.starts_with("urn:")
}

/// The document to execute.
#[derive(Debug, Clone)]
pub enum DocumentSource<'a> {
    Document(&'a SedDocument),
    Path(PathBuf),
}

impl<'a> From<&'a SedDocument> for DocumentSource<'a> {
    fn from(doc: &'a SedDocument) -> Self {
        DocumentSource::Document(doc)
    }
}

impl From<PathBuf> for DocumentSource<'_> {
    fn from(path: PathBuf) -> Self {
        DocumentSource::Path(path)
    }
}

impl From<&Path> for DocumentSource<'_> {
    fn from(path: &Path) -> Self {
        DocumentSource::Path(path.to_path_buf())
    }
}

/// Options of an execution run
#[derive(Debug, Clone, Builder)]
pub struct ExecOptions {
    /// Directory relative model sources are resolved against
    #[builder(default = "PathBuf::from(\".\")", setter(into))]
    pub working_dir: PathBuf,

    /// Directory reports are written to
    #[builder(default = "PathBuf::from(\".\")", setter(into))]
    pub base_out_path: PathBuf,

    /// Path of the document's reports relative to `base_out_path`
    #[builder(default, setter(into, strip_option))]
    pub rel_out_path: Option<String>,

    /// Whether model changes are written to temporary model files before tasks run
    #[builder(default)]
    pub apply_model_changes: bool,

    /// Report formats; taken from the environment configuration if unset
    #[builder(default, setter(into, strip_option))]
    pub report_formats: Option<Vec<ReportFormat>>,

    /// Plot formats; taken from the environment configuration if unset
    #[builder(default, setter(into, strip_option))]
    pub plot_formats: Option<Vec<PlotFormat>>,

    /// Whether warnings are returned with the results. Warnings are logged either way.
    #[builder(default = "true")]
    pub collect_warnings: bool,
}

impl Default for ExecOptions {
    fn default() -> Self {
        Self {
            working_dir: PathBuf::from("."),
            base_out_path: PathBuf::from("."),
            rel_out_path: None,
            apply_model_changes: false,
            report_formats: None,
            plot_formats: None,
            collect_warnings: true,
        }
    }
}

impl ExecOptions {
    /// Options with the formats, reports path and warning handling of a configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            rel_out_path: Some(config.reports_path.clone()),
            report_formats: Some(config.report_formats.clone()),
            plot_formats: Some(config.plot_formats.clone()),
            collect_warnings: config.collect_warnings,
            ..Self::default()
        }
    }
}

/// A recoverable problem found during execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecWarning {
    /// A report uses the same label for several data sets
    DuplicateDataSetLabels { report: String, labels: Vec<String> },
    /// An output kind that cannot be produced yet was skipped
    OutputNotSupported { output: String, kind: &'static str },
}

impl fmt::Display for ExecWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecWarning::DuplicateDataSetLabels { report, labels } => write!(
                f,
                "To facilitate machine interpretation, data sets should have unique labels. \
                 The following labels are repeated in report '{}': {}",
                report,
                labels.join(", ")
            ),
            ExecWarning::OutputNotSupported { output, kind } => {
                write!(f, "Output '{output}' skipped: {kind} outputs are not yet supported")
            }
        }
    }
}

/// Results of an execution run
#[derive(Debug, Clone, Default)]
pub struct ExecResults {
    /// Shaped report tables, keyed by output id
    pub outputs: OutputResults,
    /// Raw results of every requested variable, keyed by variable id
    pub variables: VariableResults,
    /// Results of every data generator, keyed by data generator id
    pub data_generators: DataGeneratorResults,
    pub warnings: Vec<ExecWarning>,
}

/// Executes SED documents with a set of collaborators.
///
/// The default collaborators read JSON documents, apply changes to XML models and
/// write CSV, JSON and XLSX reports.
pub struct SedDocumentExecutor {
    reader: Box<dyn SedDocumentReader>,
    applier: Box<dyn ModelChangeApplier>,
    writer: Box<dyn ReportWriter>,
    functions: MathFunctions,
}

impl Default for SedDocumentExecutor {
    fn default() -> Self {
        Self {
            reader: Box::new(JsonSedDocumentReader),
            applier: Box::new(XmlModelChangeApplier),
            writer: Box::new(TabularReportWriter),
            functions: MathFunctions::default(),
        }
    }
}

impl SedDocumentExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reader(mut self, reader: impl SedDocumentReader + 'static) -> Self {
        self.reader = Box::new(reader);
        self
    }

    pub fn with_applier(mut self, applier: impl ModelChangeApplier + 'static) -> Self {
        self.applier = Box::new(applier);
        self
    }

    pub fn with_writer(mut self, writer: impl ReportWriter + 'static) -> Self {
        self.writer = Box::new(writer);
        self
    }

    /// Executes a document.
    ///
    /// # Arguments
    ///
    /// * `task_executor` - Runs each task and returns its variable results
    /// * `source` - The document, in memory or as a path for the reader
    /// * `options` - Paths, formats and change handling of the run
    ///
    /// # Returns
    ///
    /// Returns the shaped reports, the raw variable results, the data generator
    /// results and any warnings, or the first error encountered.
    pub fn exec<'a>(
        &self,
        task_executor: &mut impl TaskExecutor,
        source: impl Into<DocumentSource<'a>>,
        options: &ExecOptions,
    ) -> Result<ExecResults, ExecError> {
        let doc: Cow<SedDocument> = match source.into() {
            DocumentSource::Document(doc) => Cow::Borrowed(doc),
            DocumentSource::Path(path) => {
                log::info!("Reading SED document {}", path.display());
                Cow::Owned(self.reader.read(&path)?)
            }
        };

        let (report_formats, plot_formats) =
            resolve_formats(options, |key| std::env::var(key).ok());

        // Temporary model files live until the end of this scope, on every exit path.
        let mut temp_models = TempModels::default();
        let models = self.resolve_models(&doc, options, &mut temp_models)?;

        let variables = execute_tasks(task_executor, &doc, &models)?;

        let mut data_generators = DataGeneratorResults::new();
        for data_gen in &doc.data_generators {
            evaluate_data_generator(data_gen, &variables, &self.functions, &mut data_generators)?;
        }

        let mut warnings = Vec::new();
        let mut outputs = OutputResults::new();
        for output in &doc.outputs {
            match output {
                Output::Report(report) => {
                    let (result, warning) = shape_report(
                        report,
                        &variables,
                        &self.functions,
                        &mut data_generators,
                    )?;
                    warnings.extend(warning);
                    outputs.insert(report.id.clone(), result);
                }
                Output::Plot2D(_) | Output::Plot3D(_) => {
                    log::debug!(
                        "Plot formats {} are not rendered",
                        plot_formats.iter().join(", ")
                    );
                    warnings.push(ExecWarning::OutputNotSupported {
                        output: output.id().to_string(),
                        kind: output.kind(),
                    });
                }
            }
        }

        for warning in &warnings {
            log::warn!("{}", warning);
        }

        for (id, report) in &outputs {
            let rel_path = match &options.rel_out_path {
                Some(rel) => format!("{}/{}", rel.trim_end_matches('/'), id),
                None => id.clone(),
            };

            for format in &report_formats {
                self.writer
                    .write(report, &options.base_out_path, &rel_path, format)?;
            }
        }

        drop(temp_models);

        Ok(ExecResults {
            outputs,
            variables,
            data_generators,
            warnings: if options.collect_warnings {
                warnings
            } else {
                Vec::new()
            },
        })
    }

    /// Resolves the sources of the document's models and of the models its tasks
    /// reference, keyed by model id.
    ///
    /// Tasks are later matched to their resolved model by id, so every model
    /// sharing an id must be the same model.
    fn resolve_models(
        &self,
        doc: &SedDocument,
        options: &ExecOptions,
        temp_models: &mut TempModels,
    ) -> Result<BTreeMap<String, ResolvedModel>, ExecError> {
        let task_models = doc.tasks.iter().filter_map(|task| match task.as_ref() {
            AbstractTask::Task(task) => Some(&task.model),
            AbstractTask::Repeated(_) => None,
        });

        let mut resolved: BTreeMap<String, ResolvedModel> = BTreeMap::new();
        for model in doc.models.iter().chain(task_models) {
            if let Some(existing) = resolved.get(&model.id) {
                if !Arc::ptr_eq(&existing.model, model) && !existing.model.is_equal(model) {
                    return Err(ExecError::ConflictingModel {
                        model: model.id.clone(),
                    });
                }
                continue;
            }

            let model_resolved = self.resolve_model(model, options, temp_models)?;
            resolved.insert(model.id.clone(), model_resolved);
        }

        Ok(resolved)
    }

    fn resolve_model(
        &self,
        model: &Arc<Model>,
        options: &ExecOptions,
        temp_models: &mut TempModels,
    ) -> Result<ResolvedModel, ExecError> {
        let source = if is_uri(&model.source) || Path::new(&model.source).is_absolute() {
            model.source.clone()
        } else {
            options
                .working_dir
                .join(&model.source)
                .to_string_lossy()
                .into_owned()
        };

        if !options.apply_model_changes || model.changes.is_empty() {
            return Ok(ResolvedModel {
                model: model.clone(),
                source,
                changes_applied: false,
            });
        }

        if is_uri(&source) {
            return Err(ExecError::UnsupportedFeature(format!(
                "Changes to models retrieved from URIs ('{}')",
                model.id
            )));
        }

        let suffix = Path::new(&source)
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();
        let temp_file = tempfile::Builder::new()
            .prefix(&format!("{}-", model.id))
            .suffix(&suffix)
            .tempfile()
            .map_err(ExecError::TempFile)?;

        log::debug!(
            "Applying {} change(s) to model '{}' in {}",
            model.changes.len(),
            model.id,
            temp_file.path().display()
        );

        let temp_path = temp_file.path().to_path_buf();
        temp_models.files.push(temp_file);
        self.applier
            .apply(&model.changes, Path::new(&source), &temp_path)
            .map_err(|source| ExecError::ModelChange {
                model: model.id.clone(),
                source,
            })?;

        Ok(ResolvedModel {
            model: model.clone(),
            source: temp_path.to_string_lossy().into_owned(),
            changes_applied: true,
        })
    }
}

/// Executes a document with the default collaborators.
///
/// See [`SedDocumentExecutor::exec`].
pub fn exec_sed_doc<'a>(
    task_executor: &mut impl TaskExecutor,
    source: impl Into<DocumentSource<'a>>,
    options: &ExecOptions,
) -> Result<ExecResults, ExecError> {
    SedDocumentExecutor::default().exec(task_executor, source, options)
}

/// Temporary model files of a run, removed when dropped.
#[derive(Default)]
struct TempModels {
    files: Vec<NamedTempFile>,
}

impl Drop for TempModels {
    fn drop(&mut self) {
        for file in &self.files {
            log::debug!("Removing temporary model file {}", file.path().display());
        }
    }
}

fn resolve_formats(
    options: &ExecOptions,
    lookup: impl Fn(&str) -> Option<String>,
) -> (Vec<ReportFormat>, Vec<PlotFormat>) {
    match (&options.report_formats, &options.plot_formats) {
        (Some(report), Some(plot)) => (report.clone(), plot.clone()),
        (report, plot) => {
            let (env_report, env_plot) = Config::formats_from_vars(lookup);
            (
                report.clone().unwrap_or(env_report),
                plot.clone().unwrap_or(env_plot),
            )
        }
    }
}

/// Runs every task in ascending id order and collects the variable results.
fn execute_tasks(
    task_executor: &mut impl TaskExecutor,
    doc: &SedDocument,
    models: &BTreeMap<String, ResolvedModel>,
) -> Result<VariableResults, ExecError> {
    let tasks: Vec<&Arc<AbstractTask>> = doc
        .tasks
        .iter()
        .sorted_by(|a, b| a.id().cmp(b.id()))
        .collect();

    log::info!(
        "Found {} task(s): {}",
        tasks.len(),
        tasks.iter().map(|task| task.id()).join(", ")
    );

    let mut store = VariableResults::new();
    let mut origins: BTreeMap<String, String> = BTreeMap::new();

    for (idx, task) in tasks.iter().enumerate() {
        let task = match task.as_ref() {
            AbstractTask::Task(task) => task,
            other => {
                return Err(ExecError::UnsupportedFeature(format!(
                    "Tasks of type {} ('{}')",
                    other.kind(),
                    other.id()
                )))
            }
        };

        log::info!("Executing task {}/{}: '{}'", idx + 1, tasks.len(), task.id);

        let model = models.get(&task.model.id).ok_or_else(|| {
            ExecError::UnsupportedFeature(format!("Tasks without a resolvable model ('{}')", task.id))
        })?;

        let variables = doc.get_variables_for_task(&task.id);
        let mut results = task_executor
            .execute(task, model, &variables)
            .map_err(|source| ExecError::Task {
                task: task.id.clone(),
                source,
            })?;

        for var in &variables {
            let result = results
                .remove(&var.id)
                .ok_or_else(|| ExecError::MissingResult {
                    task: task.id.clone(),
                    variable: var.id.clone(),
                })?;

            match store.get(&var.id) {
                Some(existing) if existing != &result => {
                    return Err(ExecError::ConflictingResult {
                        variable: var.id.clone(),
                        first_task: origins.get(&var.id).cloned().unwrap_or_default(),
                        second_task: task.id.clone(),
                    });
                }
                Some(_) => {}
                None => {
                    origins.insert(var.id.clone(), task.id.clone());
                    store.insert(var.id.clone(), result);
                }
            }
        }
    }

    Ok(store)
}

/// Evaluates a data generator unless it already has a result.
fn evaluate_data_generator<'r>(
    data_gen: &DataGenerator,
    variables: &VariableResults,
    functions: &MathFunctions,
    results: &'r mut DataGeneratorResults,
) -> Result<&'r ArrayD<f64>, ExecError> {
    match results.entry(data_gen.id.clone()) {
        Entry::Occupied(entry) => Ok(entry.into_mut()),
        Entry::Vacant(entry) => {
            log::debug!("Evaluating data generator '{}'", data_gen.id);
            let result = calc_data_generator_results(data_gen, variables, functions).map_err(
                |source| ExecError::DataGenerator {
                    id: data_gen.id.clone(),
                    source,
                },
            )?;
            Ok(entry.insert(result))
        }
    }
}

/// Stacks the results of a report's data sets into one table.
fn shape_report(
    report: &Report,
    variables: &VariableResults,
    functions: &MathFunctions,
    data_generators: &mut DataGeneratorResults,
) -> Result<(ReportResult, Option<ExecWarning>), ExecError> {
    let mut rows: Vec<ArrayD<f64>> = Vec::with_capacity(report.data_sets.len());
    for data_set in &report.data_sets {
        let result =
            evaluate_data_generator(&data_set.data_generator, variables, functions, data_generators)?;
        rows.push(result.clone());
    }

    let shapes: Vec<Vec<usize>> = rows
        .iter()
        .map(|row| row.shape().to_vec())
        .unique()
        .collect();
    if shapes.len() > 1 {
        return Err(ExecError::ShapeMismatch {
            report: report.id.clone(),
            shapes,
        });
    }

    let values = if rows.is_empty() {
        ArrayD::zeros(IxDyn(&[0]))
    } else {
        let views: Vec<_> = rows.iter().map(|row| row.view()).collect();
        ndarray::stack(Axis(0), &views).map_err(|_| ExecError::ShapeMismatch {
            report: report.id.clone(),
            shapes: shapes.clone(),
        })?
    };

    let labels: Vec<String> = report.data_sets.iter().map(|ds| ds.label.clone()).collect();
    let duplicates: Vec<String> = labels.iter().duplicates().cloned().collect();
    let warning = (!duplicates.is_empty()).then(|| ExecWarning::DuplicateDataSetLabels {
        report: report.id.clone(),
        labels: duplicates,
    });

    Ok((
        ReportResult {
            data_set_ids: report.data_sets.iter().map(|ds| ds.id.clone()).collect(),
            labels,
            values,
        },
        warning,
    ))
}
