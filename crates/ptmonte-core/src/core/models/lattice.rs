use super::cell::{CellParameters, CellTransform, GeometryError, wrap_unit};
use super::container::{Container, PeriodicCell};
use super::particle::Particle;
use super::symmetry::SymmetryOperator;
use crate::core::forcefield::params::ForceField;
use crate::core::forcefield::resolution::TypeResolutionError;
use nalgebra::{Point3, Vector3};
use rand::Rng;
use tracing::debug;

/// Squared fractional separation below which two expanded framework atoms are the same site.
const DUPLICATE_THRESHOLD_SQ: f64 = 1e-4;

/// The rigid host framework: a triclinic cell and its fixed atoms.
///
/// Framework atoms are populated once, when the lattice is built, and never move afterwards.
/// A built lattice can therefore be shared by reference between independent simulations.
#[derive(Debug, Clone)]
pub struct Lattice {
    cell: CellParameters,
    transform: CellTransform,
    atoms: Vec<Particle>,
    resolved: bool,
}

impl Lattice {
    /// Builds a lattice by expanding an asymmetric unit with the given symmetry operators.
    ///
    /// Every operator is applied to every asymmetric-unit atom, the resulting fractional
    /// coordinates are wrapped into `[0, 1)`, and images that coincide with an already kept
    /// site (periodic squared fractional distance below a small threshold) are dropped.
    /// An empty operator list is treated as the identity alone.
    ///
    /// # Arguments
    ///
    /// * `cell` - The cell parameters.
    /// * `asymmetric_unit` - Atoms whose `position` holds **fractional** coordinates.
    /// * `operators` - The symmetry operators of the space group.
    ///
    /// # Errors
    ///
    /// Returns a [`GeometryError`] if the cell parameters are invalid.
    pub fn build(
        cell: CellParameters,
        asymmetric_unit: &[Particle],
        operators: &[SymmetryOperator],
    ) -> Result<Self, GeometryError> {
        let transform = CellTransform::new(&cell)?;
        let identity = [SymmetryOperator::identity()];
        let operators = if operators.is_empty() {
            &identity[..]
        } else {
            operators
        };

        let mut sites: Vec<Particle> = Vec::with_capacity(asymmetric_unit.len() * operators.len());
        for atom in asymmetric_unit {
            for op in operators {
                let image = op.apply(&atom.position).map(wrap_unit);
                let duplicate = sites
                    .iter()
                    .any(|kept| periodic_fractional_distance_sq(&kept.position, &image) < DUPLICATE_THRESHOLD_SQ);
                if !duplicate {
                    sites.push(atom.moved_to(image));
                }
            }
        }

        let atoms: Vec<Particle> = sites
            .into_iter()
            .map(|site| {
                let cartesian = transform.to_cartesian(&site.position);
                site.moved_to(cartesian)
            })
            .collect();

        debug!(
            "Expanded {} asymmetric-unit atoms with {} operators into {} framework atoms (cell volume {:.3} Å³).",
            asymmetric_unit.len(),
            operators.len(),
            atoms.len(),
            transform.volume()
        );

        Ok(Self {
            cell,
            transform,
            atoms,
            resolved: false,
        })
    }

    /// Builds a lattice from an already expanded framework given in cartesian coordinates.
    pub fn from_framework(cell: CellParameters, atoms: Vec<Particle>) -> Result<Self, GeometryError> {
        let transform = CellTransform::new(&cell)?;
        Ok(Self {
            cell,
            transform,
            atoms,
            resolved: false,
        })
    }

    /// A lattice without framework atoms, e.g. an empty box for ideal-gas checks.
    pub fn empty(cell: CellParameters) -> Result<Self, GeometryError> {
        let mut lattice = Self::from_framework(cell, Vec::new())?;
        lattice.resolved = true;
        Ok(lattice)
    }

    /// Resolves the force-field type index of every framework atom.
    ///
    /// # Errors
    ///
    /// Returns the first [`TypeResolutionError`] encountered; the lattice is left unresolved.
    pub fn resolve_types(&mut self, forcefield: &ForceField) -> Result<(), TypeResolutionError> {
        forcefield.resolve_all(&mut self.atoms)?;
        self.resolved = true;
        Ok(())
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    pub fn cell(&self) -> &CellParameters {
        &self.cell
    }

    pub fn transform(&self) -> &CellTransform {
        &self.transform
    }

    pub fn atoms(&self) -> &[Particle] {
        &self.atoms
    }

    pub fn minimum_distance_sq(&self, p: &Point3<f64>, q: &Point3<f64>) -> f64 {
        self.transform.minimum_distance_sq(p, q)
    }
}

impl PeriodicCell for Lattice {
    fn volume(&self) -> f64 {
        self.transform.volume()
    }

    fn wrap(&self, position: &Point3<f64>) -> Point3<f64> {
        self.transform.wrap(position)
    }

    fn distance_sq(&self, a: &Point3<f64>, b: &Point3<f64>) -> f64 {
        self.transform.minimum_distance_sq(a, b)
    }

    fn random_position<R: Rng + ?Sized>(&self, rng: &mut R) -> Point3<f64> {
        self.transform.random_position(rng)
    }
}

impl Container for Lattice {
    fn particles(&self) -> &[Particle] {
        &self.atoms
    }
}

fn periodic_fractional_distance_sq(a: &Point3<f64>, b: &Point3<f64>) -> f64 {
    let d: Vector3<f64> = (a - b).map(|x| x - x.round());
    d.norm_squared()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site(t: &str, x: f64, y: f64, z: f64) -> Particle {
        Particle::new(t, Point3::new(x, y, z))
    }

    fn ops(texts: &[&str]) -> Vec<SymmetryOperator> {
        texts.iter().map(|t| t.parse().unwrap()).collect()
    }

    #[test]
    fn build_without_operators_keeps_asymmetric_unit() {
        let cell = CellParameters::cubic(10.0);
        let lattice = Lattice::build(cell, &[site("O", 0.1, 0.2, 0.3)], &[]).unwrap();
        assert_eq!(lattice.atoms().len(), 1);
        assert!((lattice.atoms()[0].position - Point3::new(1.0, 2.0, 3.0)).norm() < 1e-9);
        assert!(!lattice.is_resolved());
    }

    #[test]
    fn build_expands_and_wraps_images() {
        let cell = CellParameters::cubic(10.0);
        let lattice = Lattice::build(
            cell,
            &[site("O", 0.1, 0.2, 0.3)],
            &ops(&["x,y,z", "-x,-y,-z"]),
        )
        .unwrap();
        assert_eq!(lattice.atoms().len(), 2);
        let inverted = &lattice.atoms()[1].position;
        assert!((inverted - Point3::new(9.0, 8.0, 7.0)).norm() < 1e-9);
    }

    #[test]
    fn build_removes_duplicates_on_special_positions() {
        let cell = CellParameters::cubic(10.0);
        let lattice = Lattice::build(
            cell,
            &[site("Zn", 0.0, 0.0, 0.0), site("O", 0.5, 0.5, 0.5)],
            &ops(&["x,y,z", "-x,-y,-z", "x+1/2,y+1/2,z+1/2"]),
        )
        .unwrap();
        // Origin maps onto itself under inversion and onto the body centre under the
        // translation, which coincides with the O site's own images.
        assert_eq!(lattice.atoms().len(), 2);
        assert_eq!(lattice.atoms()[0].particle_type, "Zn");
        assert_eq!(lattice.atoms()[1].particle_type, "Zn");
    }

    #[test]
    fn duplicates_across_the_cell_boundary_are_detected() {
        let cell = CellParameters::cubic(10.0);
        let lattice = Lattice::build(
            cell,
            &[site("C", 0.999999, 0.5, 0.5)],
            &ops(&["x,y,z", "-x,y,z"]),
        )
        .unwrap();
        assert_eq!(lattice.atoms().len(), 1);
    }

    #[test]
    fn empty_lattice_is_resolved_and_has_no_atoms() {
        let lattice = Lattice::empty(CellParameters::cubic(5.0)).unwrap();
        assert!(lattice.is_resolved());
        assert!(lattice.is_empty());
        assert!((lattice.volume() - 125.0).abs() < 1e-9);
    }

    #[test]
    fn invalid_cell_is_rejected() {
        let cell = CellParameters::new(-1.0, 1.0, 1.0, 90.0, 90.0, 90.0);
        assert!(Lattice::build(cell, &[], &[]).is_err());
    }
}
