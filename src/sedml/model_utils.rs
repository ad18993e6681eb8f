//! Model Introspection
//!
//! Tools that generate SED documents for a model need to know which parameters a
//! model exposes and which variables a simulation of it can record. Reading those
//! from a model file is language specific, so each language registers a
//! [`ModelIntrospector`] in a [`ModelIntrospectors`] registry.

use std::collections::BTreeMap;
use std::path::Path;

use thiserror::Error;

use crate::sedml::data_model::{ModelChange, ModelLanguage, Simulation, SimulationKind, Variable};

/// Candidate changes, simulations and variables of a model.
#[derive(Debug, Clone, Default)]
pub struct ModelParametersVariables {
    /// Changes that set the model's parameters to their current values
    pub changes: Vec<ModelChange>,
    /// Simulations the model can run
    pub simulations: Vec<Simulation>,
    /// Variables a simulation of the model can record
    pub variables: Vec<Variable>,
}

/// Reads the parameters and observables of models in one language.
pub trait ModelIntrospector {
    fn get_parameters_variables_for_simulation(
        &self,
        model_path: &Path,
        simulation_kind: SimulationKind,
        algorithm_kisao_id: Option<&str>,
    ) -> Result<ModelParametersVariables, IntrospectionError>;
}

/// Registry of introspectors by model language.
#[derive(Default)]
pub struct ModelIntrospectors {
    introspectors: BTreeMap<ModelLanguage, Box<dyn ModelIntrospector>>,
}

impl ModelIntrospectors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an introspector, replacing any previous one for the language.
    pub fn register(
        &mut self,
        language: ModelLanguage,
        introspector: impl ModelIntrospector + 'static,
    ) -> &mut Self {
        self.introspectors.insert(language, Box::new(introspector));
        self
    }

    /// Languages with a registered introspector.
    pub fn languages(&self) -> Vec<ModelLanguage> {
        self.introspectors.keys().copied().collect()
    }

    /// Dispatches to the introspector registered for `language`.
    ///
    /// # Errors
    ///
    /// Returns [`IntrospectionError::UnsupportedModelLanguage`] if no introspector
    /// is registered for the language.
    pub fn get_parameters_variables_for_simulation(
        &self,
        language: ModelLanguage,
        model_path: &Path,
        simulation_kind: SimulationKind,
        algorithm_kisao_id: Option<&str>,
    ) -> Result<ModelParametersVariables, IntrospectionError> {
        let introspector = self
            .introspectors
            .get(&language)
            .ok_or(IntrospectionError::UnsupportedModelLanguage(language))?;

        log::debug!(
            "Reading {} parameters and variables of {}",
            simulation_kind,
            model_path.display()
        );

        introspector.get_parameters_variables_for_simulation(
            model_path,
            simulation_kind,
            algorithm_kisao_id,
        )
    }
}

#[derive(Error, Debug)]
pub enum IntrospectionError {
    #[error("Model language '{0}' is not supported")]
    UnsupportedModelLanguage(ModelLanguage),
    #[error("Failed to read model {path}: {message}")]
    InvalidModel { path: String, message: String },
    #[error("{kind} simulations are not supported for this model")]
    UnsupportedSimulation { kind: SimulationKind },
}
