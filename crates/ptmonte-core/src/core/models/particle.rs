use nalgebra::Point3;

/// A point particle: either a framework atom of the host lattice or a guest molecule.
///
/// Particles are plain values. A move that perturbs a particle works on a clone and keeps the
/// original until the accept/reject decision is made, so no intermediate state is ever
/// observable from outside the move.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// Cartesian position in Angstroms.
    pub position: Point3<f64>,
    /// Force-field type label (e.g. "Zn1", "CH4_sp3").
    pub particle_type: String,
    /// Row of the force-field tables for `particle_type`.
    ///
    /// Only meaningful after the particle has been passed through
    /// [`ForceField::resolve_type`](crate::core::forcefield::params::ForceField::resolve_type).
    pub type_index: usize,
    /// Partial charge in elementary charge units.
    pub charge: f64,
}

impl Particle {
    /// Creates an uncharged particle of the given type at `position`.
    ///
    /// # Arguments
    ///
    /// * `particle_type` - The force-field type label.
    /// * `position` - The cartesian position in Angstroms.
    pub fn new(particle_type: &str, position: Point3<f64>) -> Self {
        Self {
            position,
            particle_type: particle_type.to_string(),
            type_index: 0,
            charge: 0.0,
        }
    }

    /// Returns the particle with its partial charge set to `charge`.
    pub fn with_charge(mut self, charge: f64) -> Self {
        self.charge = charge;
        self
    }

    /// Returns a copy of this particle placed at `position`.
    ///
    /// Type, resolved index and charge are carried over unchanged.
    pub fn moved_to(&self, position: Point3<f64>) -> Self {
        Self {
            position,
            ..self.clone()
        }
    }
}
