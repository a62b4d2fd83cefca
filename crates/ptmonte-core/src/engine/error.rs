use thiserror::Error;

use super::config::ConfigError;
use crate::core::forcefield::params::ForceFieldError;
use crate::core::forcefield::resolution::TypeResolutionError;
use crate::core::models::cell::GeometryError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Force-field type resolution failed: {source}")]
    TypeResolution {
        #[from]
        source: TypeResolutionError,
    },

    #[error("Force field error: {source}")]
    ForceField {
        #[from]
        source: ForceFieldError,
    },

    #[error("Cell geometry error: {source}")]
    Geometry {
        #[from]
        source: GeometryError,
    },

    #[error("The '{kind}' move requires a gas phase, but the system has none")]
    MissingGasPhase { kind: &'static str },

    #[error("Framework atoms must be resolved against the force field before a simulation starts")]
    UnresolvedFramework,
}
