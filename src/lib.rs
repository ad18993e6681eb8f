//! SED-ML Utilities
//!
//! This library provides functionality for working with SED-ML simulation experiment
//! descriptions and COMBINE/OMEX archives, including:
//! - Describing documents, models, simulations, tasks, data generators and outputs
//! - Comparing documents independent of the order of their collections
//! - Executing documents against a pluggable task executor
//! - Evaluating data generator math over task results
//! - Applying model changes to XML model files
//! - Writing reports as CSV, JSON or XLSX
//! - Validating documents and archives

#![warn(unused_imports)]

/// Commonly used types and functionality re-exported for convenience
pub mod prelude {
    pub use crate::canonical::{Canonical, Tuple};
    pub use crate::combine::data_model::*;
    pub use crate::config::*;
    pub use crate::report::data_model::*;
    pub use crate::report::writer::{ReportError, ReportWriter, TabularReportWriter};
    pub use crate::sedml::data_model::*;
    pub use crate::sedml::error::*;
    pub use crate::sedml::exec::*;
    pub use crate::sedml::io::*;
    pub use crate::sedml::math::MathFunctions;
    pub use crate::sedml::model_changes::{ModelChangeApplier, XmlModelChangeApplier};
    pub use crate::sedml::model_utils::*;
}

/// Order-insensitive comparison of data model objects
pub mod canonical;

/// SED-ML documents and their execution
pub mod sedml {
    /// Document data model
    pub mod data_model;
    /// Error types of the SED-ML modules
    pub mod error;
    /// Execution of documents
    pub mod exec;
    /// Reading and writing documents
    pub mod io;
    /// Data generator math
    pub mod math;
    /// Applying model changes to model files
    pub mod model_changes;
    /// Model introspection interface
    pub mod model_utils;
}

/// COMBINE/OMEX archives
pub mod combine {
    pub mod data_model;
}

/// Report results and their serialization
pub mod report {
    pub mod data_model;
    /// Writing reports to files
    pub mod writer;
}

/// Validation of SED documents and archives
pub mod validation {
    pub use crate::validation::schema::*;

    /// Validation of archive contents
    pub mod archive;
    /// Main consistency interface
    pub mod consistency;
    /// Validation of data generators and their variables
    mod data_generators;
    /// Validation of outputs
    mod outputs;
    /// Main schema validation interface
    pub mod schema;
    /// Validation of simulations
    mod simulations;
}

/// Execution configuration
pub mod config;

/// Table rendering of documents and archives
pub mod info;
