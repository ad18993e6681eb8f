//! Configuration
//!
//! Settings shared by execution runs, loadable from environment variables:
//!
//! | Variable                        | Default             |
//! |---------------------------------|---------------------|
//! | `REPORT_FORMATS`                | `csv`               |
//! | `PLOT_FORMATS`                  | `pdf`               |
//! | `ALGORITHM_SUBSTITUTION_POLICY` | `SIMILAR_VARIABLES` |
//! | `REPORTS_PATH`                  | `reports`           |
//!
//! Format lists are comma separated; entries are trimmed and lowercased.

use std::fmt;
use std::str::FromStr;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::report::data_model::{PlotFormat, ReportFormat};

/// Configuration of execution runs
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
pub struct Config {
    /// Formats reports are written in
    #[builder(default = "vec![ReportFormat::Csv]", setter(into, each(name = "to_report_formats")))]
    pub report_formats: Vec<ReportFormat>,

    /// Formats plots are rendered in
    #[builder(default = "vec![PlotFormat::Pdf]", setter(into, each(name = "to_plot_formats")))]
    pub plot_formats: Vec<PlotFormat>,

    /// How far a simulator may deviate from the requested algorithm
    #[builder(default)]
    pub algorithm_substitution_policy: AlgorithmSubstitutionPolicy,

    /// Directory of written reports, relative to the output directory
    #[builder(default = "String::from(\"reports\")", setter(into))]
    pub reports_path: String,

    /// Whether execution warnings are returned with the results
    #[builder(default = "true")]
    pub collect_warnings: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            report_formats: vec![ReportFormat::Csv],
            plot_formats: vec![PlotFormat::Pdf],
            algorithm_substitution_policy: AlgorithmSubstitutionPolicy::default(),
            reports_path: String::from("reports"),
            collect_warnings: true,
        }
    }
}

impl Config {
    /// Loads the configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Loads the configuration from a variable lookup, falling back to defaults for
    /// unset variables.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let (report_formats, plot_formats) = Self::formats_from_vars(&lookup);
        let mut config = Config {
            report_formats,
            plot_formats,
            ..Config::default()
        };

        if let Some(value) = lookup("ALGORITHM_SUBSTITUTION_POLICY") {
            config.algorithm_substitution_policy =
                value.parse().map_err(|_| ConfigError::InvalidValue {
                    key: "ALGORITHM_SUBSTITUTION_POLICY".to_string(),
                    value: value.clone(),
                })?;
        }

        if let Some(value) = lookup("REPORTS_PATH") {
            config.reports_path = value;
        }

        Ok(config)
    }

    /// Reads only the report and plot formats from a variable lookup.
    ///
    /// Format lists cannot be invalid, so unlike [`Config::from_vars`] this never
    /// fails, whatever the other variables hold.
    pub fn formats_from_vars(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> (Vec<ReportFormat>, Vec<PlotFormat>) {
        let defaults = Config::default();
        (
            lookup("REPORT_FORMATS")
                .map(|value| parse_list(&value))
                .unwrap_or(defaults.report_formats),
            lookup("PLOT_FORMATS")
                .map(|value| parse_list(&value))
                .unwrap_or(defaults.plot_formats),
        )
    }
}

fn parse_list<T: From<String>>(value: &str) -> Vec<T> {
    value
        .split(',')
        .map(|item| item.trim().to_lowercase())
        .filter(|item| !item.is_empty())
        .map(T::from)
        .collect()
}

/// Levels of algorithm substitution, from strictest to most permissive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlgorithmSubstitutionPolicy {
    None,
    SameMethod,
    SameMath,
    SimilarApproximations,
    DistinctApproximations,
    DistinctScales,
    SameVariables,
    #[default]
    SimilarVariables,
    SameFramework,
    Any,
}

impl AlgorithmSubstitutionPolicy {
    pub const ALL: [AlgorithmSubstitutionPolicy; 10] = [
        AlgorithmSubstitutionPolicy::None,
        AlgorithmSubstitutionPolicy::SameMethod,
        AlgorithmSubstitutionPolicy::SameMath,
        AlgorithmSubstitutionPolicy::SimilarApproximations,
        AlgorithmSubstitutionPolicy::DistinctApproximations,
        AlgorithmSubstitutionPolicy::DistinctScales,
        AlgorithmSubstitutionPolicy::SameVariables,
        AlgorithmSubstitutionPolicy::SimilarVariables,
        AlgorithmSubstitutionPolicy::SameFramework,
        AlgorithmSubstitutionPolicy::Any,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AlgorithmSubstitutionPolicy::None => "NONE",
            AlgorithmSubstitutionPolicy::SameMethod => "SAME_METHOD",
            AlgorithmSubstitutionPolicy::SameMath => "SAME_MATH",
            AlgorithmSubstitutionPolicy::SimilarApproximations => "SIMILAR_APPROXIMATIONS",
            AlgorithmSubstitutionPolicy::DistinctApproximations => "DISTINCT_APPROXIMATIONS",
            AlgorithmSubstitutionPolicy::DistinctScales => "DISTINCT_SCALES",
            AlgorithmSubstitutionPolicy::SameVariables => "SAME_VARIABLES",
            AlgorithmSubstitutionPolicy::SimilarVariables => "SIMILAR_VARIABLES",
            AlgorithmSubstitutionPolicy::SameFramework => "SAME_FRAMEWORK",
            AlgorithmSubstitutionPolicy::Any => "ANY",
        }
    }
}

impl FromStr for AlgorithmSubstitutionPolicy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|policy| policy.as_str().eq_ignore_ascii_case(s))
            .ok_or(())
    }
}

impl fmt::Display for AlgorithmSubstitutionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value '{value}' for {key}")]
    InvalidValue { key: String, value: String },
}
