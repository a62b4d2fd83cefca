use crate::core::constants::PhysicalConstants;
use nalgebra::DMatrix;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

/// Raw Lennard-Jones parameters of a single type: σ in Å, ε in K.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct LennardJonesParam {
    pub sigma: f64,
    pub epsilon: f64,
}

#[derive(Debug, Error, PartialEq)]
pub enum ForceFieldError {
    #[error("Force-field table contains no parameterized types")]
    EmptyTable,
    #[error("Force-field type '{0}' is defined more than once")]
    DuplicateType(String),
    #[error("Invalid Lennard-Jones parameters for type '{name}': sigma = {sigma}, epsilon = {epsilon}")]
    InvalidParameter { name: String, sigma: f64, epsilon: f64 },
}

#[derive(Debug, Error)]
pub enum ParamLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlTypeEntry {
    name: String,
    sigma: f64,
    epsilon: f64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlForceField {
    #[serde(default)]
    types: Vec<TomlTypeEntry>,
    #[serde(default)]
    missing: Vec<String>,
}

/// Collects the raw per-type parameter table before the combined matrices are built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForceFieldBuilder {
    types: Vec<String>,
    params: Vec<LennardJonesParam>,
    missing: Vec<String>,
}

impl ForceFieldBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_type(mut self, name: &str, sigma: f64, epsilon: f64) -> Self {
        self.types.push(name.to_string());
        self.params.push(LennardJonesParam { sigma, epsilon });
        self
    }

    /// Records a type that appeared in the source table without usable parameters.
    pub fn add_missing(mut self, name: &str) -> Self {
        self.missing.push(name.to_string());
        self
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Loads a table written as TOML:
    ///
    /// ```toml
    /// missing = ["H_"]
    ///
    /// [[types]]
    /// name = "CH4_sp3"
    /// sigma = 3.73
    /// epsilon = 148.0
    /// ```
    pub fn load_toml(path: &Path) -> Result<Self, ParamLoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| ParamLoadError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let table: TomlForceField = toml::from_str(&content).map_err(|e| ParamLoadError::Toml {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;

        let builder = table
            .types
            .iter()
            .fold(Self::new(), |b, t| b.add_type(&t.name, t.sigma, t.epsilon));
        Ok(table.missing.iter().fold(builder, |b, m| b.add_missing(m)))
    }

    /// Combines every type pair into the symmetric `sigma2` / `epsilon4` matrices.
    ///
    /// Off-diagonal entries use the Lorentz-Berthelot rule, `((σi+σj)/2)²` and
    /// `4·sqrt(εi·εj)`; the diagonal holds `σi²` and `4·εi`.
    ///
    /// # Errors
    ///
    /// Returns a [`ForceFieldError`] for an empty table, a duplicated type name, or a
    /// negative or non-finite parameter.
    pub fn build(self, constants: &PhysicalConstants) -> Result<ForceField, ForceFieldError> {
        if self.types.is_empty() {
            return Err(ForceFieldError::EmptyTable);
        }
        let mut seen = HashSet::new();
        for (name, p) in self.types.iter().zip(&self.params) {
            if !seen.insert(name.as_str()) {
                return Err(ForceFieldError::DuplicateType(name.clone()));
            }
            let valid = |v: f64| v.is_finite() && v >= 0.0;
            if !valid(p.sigma) || !valid(p.epsilon) {
                return Err(ForceFieldError::InvalidParameter {
                    name: name.clone(),
                    sigma: p.sigma,
                    epsilon: p.epsilon,
                });
            }
        }
        for name in &self.missing {
            warn!(
                "Force-field type '{}' has no Lennard-Jones parameters; particles of this type cannot be resolved.",
                name
            );
        }

        let n = self.types.len();
        let p = &self.params;
        let sigma2 = DMatrix::from_fn(n, n, |i, j| {
            if i == j {
                p[i].sigma.powi(2)
            } else {
                ((p[i].sigma + p[j].sigma) / 2.0).powi(2)
            }
        });
        let epsilon4 = DMatrix::from_fn(n, n, |i, j| {
            if i == j {
                4.0 * p[i].epsilon
            } else {
                4.0 * (p[i].epsilon * p[j].epsilon).sqrt()
            }
        });
        debug!("Built force-field matrices for {} types ({} missing).", n, self.missing.len());

        Ok(ForceField {
            types: self.types,
            params: self.params,
            missing: self.missing,
            sigma2,
            epsilon4,
            electric: constants.electric,
        })
    }
}

/// The pairwise energy model: Lennard-Jones 12-6 plus bare Coulomb.
///
/// The combined parameter matrices are computed once by [`ForceFieldBuilder::build`] and are
/// immutable afterwards, so one force field can be shared by reference across independent
/// simulations.
#[derive(Debug, Clone)]
pub struct ForceField {
    pub(crate) types: Vec<String>,
    params: Vec<LennardJonesParam>,
    pub(crate) missing: Vec<String>,
    pub(crate) sigma2: DMatrix<f64>,
    pub(crate) epsilon4: DMatrix<f64>,
    pub(crate) electric: f64,
}

impl ForceField {
    pub fn types(&self) -> &[String] {
        &self.types
    }

    pub fn params(&self) -> &[LennardJonesParam] {
        &self.params
    }

    /// Types listed by the source table without parameters (diagnostics only).
    pub fn missing_types(&self) -> &[String] {
        &self.missing
    }

    pub fn sigma2(&self) -> &DMatrix<f64> {
        &self.sigma2
    }

    pub fn epsilon4(&self) -> &DMatrix<f64> {
        &self.epsilon4
    }
}
