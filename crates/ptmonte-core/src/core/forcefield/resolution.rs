use super::params::ForceField;
use crate::core::models::particle::Particle;
use thiserror::Error;

/// Registered type names ending in this character match particle types by prefix.
pub const TYPE_SEPARATOR: char = '_';

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeResolutionError {
    #[error(
        "Particle type '{particle_type}' matches no force-field type, neither exactly nor by prefix"
    )]
    Unknown { particle_type: String },
    #[error("Particle type '{particle_type}' is listed in the force field without parameters")]
    Unparameterized { particle_type: String },
}

impl ForceField {
    /// Looks up the table row for a particle type.
    ///
    /// An exact name match wins. Otherwise the legacy prefix convention applies: a registered
    /// type ending in [`TYPE_SEPARATOR`] (e.g. `"Zn_"`) matches any particle type that starts
    /// with the part before the separator (`"Zn1"`, `"Zn_oct"`). The first such entry in table
    /// order is used.
    pub fn type_index_of(&self, particle_type: &str) -> Option<usize> {
        if let Some(index) = self.types.iter().position(|t| t == particle_type) {
            return Some(index);
        }
        self.types.iter().position(|t| match t.strip_suffix(TYPE_SEPARATOR) {
            Some(stem) if !stem.is_empty() => particle_type.get(..stem.len()) == Some(stem),
            _ => false,
        })
    }

    /// Resolves `particle.type_index` in place and returns it.
    ///
    /// # Errors
    ///
    /// Returns a [`TypeResolutionError`] if the type cannot be found. This is a fatal setup
    /// error: a simulation must not start with unresolved particles.
    pub fn resolve_type(&self, particle: &mut Particle) -> Result<usize, TypeResolutionError> {
        match self.type_index_of(&particle.particle_type) {
            Some(index) => {
                particle.type_index = index;
                Ok(index)
            }
            None if self.missing.iter().any(|m| *m == particle.particle_type) => {
                Err(TypeResolutionError::Unparameterized {
                    particle_type: particle.particle_type.clone(),
                })
            }
            None => Err(TypeResolutionError::Unknown {
                particle_type: particle.particle_type.clone(),
            }),
        }
    }

    pub fn resolve_all(&self, particles: &mut [Particle]) -> Result<(), TypeResolutionError> {
        for particle in particles {
            self.resolve_type(particle)?;
        }
        Ok(())
    }

    /// Distinct particle types in `particles` that would fail to resolve, in first-seen order.
    pub fn unresolved_types<'p>(&self, particles: &'p [Particle]) -> Vec<&'p str> {
        let mut unresolved: Vec<&str> = Vec::new();
        for p in particles {
            let name = p.particle_type.as_str();
            if self.type_index_of(name).is_none() && !unresolved.contains(&name) {
                unresolved.push(name);
            }
        }
        unresolved
    }
}
