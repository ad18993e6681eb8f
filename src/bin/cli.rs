//! Command-line interface for the SED-ML utilities
//!
//! This binary provides a CLI to work with SED documents and COMBINE archive
//! descriptions, including:
//! - Executing a document against recorded task results
//! - Validating documents against their schema and for consistency
//! - Displaying the contents of documents and archives
//!
//! # Usage
//!
//! ```bash
//! # Execute a document, replaying task results from a JSON file
//! sedml exec --doc simulation.json --results results.json --out out/
//!
//! # Validate a document
//! sedml validate --doc simulation.json
//!
//! # Show the master file of an archive
//! sedml master --archive manifest.json
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;
use ndarray::{Array1, ArrayD};
use sedml_utils::prelude::*;
use sedml_utils::validation::consistency::check_consistency;
use sedml_utils::validation::{archive::check_archive, validate_json};

/// Main CLI configuration struct
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
enum Commands {
    /// Execute a SED document with recorded task results
    Exec {
        /// Path to the SED document
        #[arg(short, long)]
        doc: PathBuf,

        /// JSON file of results per task and variable: {"task": {"variable": [..]}}
        #[arg(short, long)]
        results: PathBuf,

        /// Directory the reports are written to
        #[arg(short, long, default_value = ".")]
        out: PathBuf,

        /// Path of the reports relative to the output directory, defaults to the
        /// REPORTS_PATH environment variable
        #[arg(long)]
        rel: Option<String>,

        /// Directory relative model sources are resolved against
        #[arg(short, long, default_value = ".")]
        working_dir: PathBuf,

        /// Apply model changes before running tasks
        #[arg(long, default_value_t = false)]
        apply_changes: bool,

        /// Report formats, defaults to the REPORT_FORMATS environment variable
        #[arg(short, long)]
        format: Vec<String>,
    },
    /// Validate a SED document
    Validate {
        /// Path to the SED document
        #[arg(short, long)]
        doc: PathBuf,
    },
    /// Display the contents of a SED document
    Info {
        /// Path to the SED document
        #[arg(short, long)]
        doc: PathBuf,
    },
    /// Display an archive description and its master file
    Master {
        /// Path to the archive description
        #[arg(short, long)]
        archive: PathBuf,
    },
}

/// Task results read from a file, keyed by task id and variable id
type RecordedResults = BTreeMap<String, BTreeMap<String, Vec<f64>>>;

/// Task executor returning previously recorded results
struct ReplayExecutor {
    results: RecordedResults,
}

impl TaskExecutor for ReplayExecutor {
    fn execute(
        &mut self,
        task: &Task,
        _model: &ResolvedModel,
        variables: &[Variable],
    ) -> Result<VariableResults, TaskError> {
        let recorded = self
            .results
            .get(&task.id)
            .ok_or_else(|| format!("No results recorded for task '{}'", task.id))?;

        Ok(variables
            .iter()
            .filter_map(|var| {
                recorded.get(&var.id).map(|values| {
                    let values: ArrayD<f64> = Array1::from(values.clone()).into_dyn();
                    (var.id.clone(), values)
                })
            })
            .collect())
    }
}

/// Main entry point for the CLI application
pub fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(cli.command) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("{} {}", "Error:".bold().red(), err);
            ExitCode::FAILURE
        }
    }
}

/// Runs a command, returning whether it succeeded.
fn run(command: Commands) -> Result<bool, Box<dyn std::error::Error>> {
    match command {
        Commands::Exec {
            doc,
            results,
            out,
            rel,
            working_dir,
            apply_changes,
            format,
        } => {
            let results: RecordedResults = serde_json::from_str(&fs::read_to_string(&results)?)?;
            let mut executor = ReplayExecutor { results };

            let config = Config::from_env()?;
            log::info!(
                "Algorithm substitution policy: {}",
                config.algorithm_substitution_policy
            );

            let mut options = ExecOptions::from_config(&config);
            options.base_out_path = out;
            options.working_dir = working_dir;
            options.apply_model_changes = apply_changes;
            if let Some(rel) = rel {
                options.rel_out_path = Some(rel);
            }
            if !format.is_empty() {
                options.report_formats = Some(
                    format
                        .iter()
                        .map(|f| f.parse::<ReportFormat>())
                        .collect::<Result<Vec<_>, _>>()?,
                );
            }

            let exec_results = exec_sed_doc(&mut executor, doc, &options)?;
            for (id, report) in &exec_results.outputs {
                println!(
                    "{} {} ({} data sets, rows of shape {:?})",
                    "Report".bold().green(),
                    id,
                    report.len(),
                    report.row_shape()
                );
            }

            Ok(true)
        }
        Commands::Validate { doc } => {
            let content = fs::read_to_string(&doc)?;
            let schema_report = validate_json(&content)?;
            if !schema_report.valid {
                println!("{}", "Document does not match its schema".bold().red());
                for error in &schema_report.errors {
                    println!("{error}");
                }
                return Ok(false);
            }

            let report = check_consistency(&load_sed_document(doc)?);
            print!("{report}");
            Ok(report.is_valid)
        }
        Commands::Info { doc } => {
            println!("{}", load_sed_document(doc)?);
            Ok(true)
        }
        Commands::Master { archive } => {
            let archive = load_combine_archive(archive)?;
            println!("{archive}");

            let report = check_archive(&archive);
            if !report.errors.is_empty() {
                print!("{report}");
            }

            match archive.get_master_content()? {
                Some(master) => println!("{} {}", "Master:".bold().green(), master.location),
                None => println!("{}", "Archive has no master file".bold().yellow()),
            }

            Ok(report.is_valid)
        }
    }
}
