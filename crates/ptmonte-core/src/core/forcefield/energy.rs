use super::params::ForceField;
use super::potentials::{self, SINGULARITY_THRESHOLD_SQ};
use super::term::EnergyTerm;
use crate::core::models::container::Container;
use crate::core::models::particle::Particle;

impl ForceField {
    /// Dispersion and electrostatic parts of the interaction between two resolved particles
    /// at squared separation `r2`.
    #[inline]
    pub fn pair_terms(&self, a: &Particle, b: &Particle, r2: f64) -> EnergyTerm {
        if r2 <= SINGULARITY_THRESHOLD_SQ {
            return EnergyTerm::default();
        }
        let (i, j) = (a.type_index, b.type_index);
        EnergyTerm::new(
            potentials::lennard_jones_12_6(r2, self.sigma2[(i, j)], self.epsilon4[(i, j)]),
            potentials::coulomb(r2, a.charge, b.charge, self.electric),
        )
    }

    /// Pair energy in Kelvin. Returns exactly zero at or below the singularity threshold.
    #[inline]
    pub fn pair_energy(&self, a: &Particle, b: &Particle, r2: f64) -> f64 {
        self.pair_terms(a, b, r2).total()
    }

    /// Energy of `particle` with every particle in `container`, using the container's
    /// minimum-image distance.
    pub fn interaction_energy<C: Container + ?Sized>(&self, particle: &Particle, container: &C) -> f64 {
        self.interaction_terms(particle, container).total()
    }

    pub fn interaction_terms<C: Container + ?Sized>(
        &self,
        particle: &Particle,
        container: &C,
    ) -> EnergyTerm {
        container
            .particles()
            .iter()
            .map(|other| {
                let r2 = container.distance_sq(&particle.position, &other.position);
                self.pair_terms(particle, other, r2)
            })
            .sum()
    }

    /// Sum of pair energies over all unordered pairs within one container.
    pub fn total_energy<C: Container + ?Sized>(&self, container: &C) -> f64 {
        self.total_terms(container).total()
    }

    pub fn total_terms<C: Container + ?Sized>(&self, container: &C) -> EnergyTerm {
        let particles = container.particles();
        let mut total = EnergyTerm::default();
        for (i, a) in particles.iter().enumerate() {
            for b in &particles[i + 1..] {
                total += self.pair_terms(a, b, container.distance_sq(&a.position, &b.position));
            }
        }
        total
    }

    /// Energy of every particle in `guests` with every particle in `hosts`.
    ///
    /// Distances use the minimum-image rule of `hosts`.
    pub fn cross_energy<G, H>(&self, guests: &G, hosts: &H) -> EnergyTerm
    where
        G: Container + ?Sized,
        H: Container + ?Sized,
    {
        guests
            .particles()
            .iter()
            .map(|p| self.interaction_terms(p, hosts))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use crate::core::constants::PhysicalConstants;
    use crate::core::forcefield::params::{ForceField, ForceFieldBuilder};
    use crate::core::forcefield::potentials::SINGULARITY_THRESHOLD_SQ;
    use crate::core::models::cell::CellParameters;
    use crate::core::models::container::Container;
    use crate::core::models::cubic_box::CubicBox;
    use crate::core::models::lattice::Lattice;
    use crate::core::models::particle::Particle;
    use nalgebra::Point3;

    const TOLERANCE: f64 = 1e-9;

    fn forcefield() -> ForceField {
        ForceFieldBuilder::new()
            .add_type("A", 3.0, 100.0)
            .add_type("B", 4.0, 50.0)
            .build(&PhysicalConstants::default())
            .unwrap()
    }

    fn resolved(ff: &ForceField, t: &str, pos: [f64; 3], charge: f64) -> Particle {
        let mut p = Particle::new(t, Point3::new(pos[0], pos[1], pos[2])).with_charge(charge);
        ff.resolve_type(&mut p).unwrap();
        p
    }

    #[test]
    fn pair_energy_is_symmetric() {
        let ff = forcefield();
        let a = resolved(&ff, "A", [0.0; 3], 0.4);
        let b = resolved(&ff, "B", [1.0, 2.0, 0.0], -0.7);
        for r2 in [0.5, 4.0, 12.25, 100.0] {
            assert_eq!(ff.pair_energy(&a, &b, r2), ff.pair_energy(&b, &a, r2));
        }
    }

    #[test]
    fn pair_energy_is_zero_at_or_below_singularity_threshold() {
        let ff = forcefield();
        let a = resolved(&ff, "A", [0.0; 3], 1.0);
        let b = resolved(&ff, "B", [0.0; 3], 1.0);
        assert_eq!(ff.pair_energy(&a, &b, 0.0), 0.0);
        assert_eq!(ff.pair_energy(&a, &b, SINGULARITY_THRESHOLD_SQ), 0.0);
        assert_ne!(ff.pair_energy(&a, &b, 2.0 * SINGULARITY_THRESHOLD_SQ), 0.0);
    }

    #[test]
    fn pair_energy_combines_lennard_jones_and_coulomb() {
        let ff = forcefield();
        let a = resolved(&ff, "A", [0.0; 3], 1.0);
        let b = resolved(&ff, "A", [0.0; 3], -1.0);
        let r2: f64 = 9.0;
        let terms = ff.pair_terms(&a, &b, r2);
        assert!(terms.vdw.abs() < TOLERANCE);
        assert!((terms.coulomb + PhysicalConstants::default().electric / 3.0).abs() < 1e-6);
        assert_eq!(ff.pair_energy(&a, &b, r2), terms.total());
    }

    #[test]
    fn interaction_energy_uses_minimum_image() {
        let ff = forcefield();
        let host = resolved(&ff, "A", [9.5, 0.0, 0.0], 0.0);
        let lattice = Lattice::from_framework(CellParameters::cubic(10.0), vec![host]).unwrap();
        let guest = resolved(&ff, "A", [2.5, 0.0, 0.0], 0.0);

        let expected = ff.pair_energy(&guest, &lattice.atoms()[0], 9.0);
        assert!((ff.interaction_energy(&guest, &lattice) - expected).abs() < TOLERANCE);
    }

    #[test]
    fn interaction_energy_with_empty_container_is_zero() {
        let ff = forcefield();
        let empty = CubicBox::new(10.0).unwrap();
        let p = resolved(&ff, "A", [1.0, 1.0, 1.0], 1.0);
        assert_eq!(ff.interaction_energy(&p, &empty), 0.0);
    }

    #[test]
    fn total_energy_counts_each_pair_once() {
        let ff = forcefield();
        let particles = vec![
            resolved(&ff, "A", [1.0, 1.0, 1.0], 0.0),
            resolved(&ff, "B", [5.0, 1.0, 1.0], 0.0),
            resolved(&ff, "A", [1.0, 5.0, 1.0], 0.0),
        ];
        let cubic_box = CubicBox::with_particles(20.0, particles.clone()).unwrap();
        let expected = ff.pair_energy(&particles[0], &particles[1], 16.0)
            + ff.pair_energy(&particles[0], &particles[2], 16.0)
            + ff.pair_energy(&particles[1], &particles[2], 32.0);
        assert!((ff.total_energy(&cubic_box) - expected).abs() < TOLERANCE);
    }

    #[test]
    fn cross_energy_sums_interaction_energies() {
        let ff = forcefield();
        let hosts = CubicBox::with_particles(
            20.0,
            vec![resolved(&ff, "B", [0.0, 0.0, 0.0], 0.5)],
        )
        .unwrap();
        let guests = CubicBox::with_particles(
            20.0,
            vec![
                resolved(&ff, "A", [4.0, 0.0, 0.0], -0.5),
                resolved(&ff, "A", [0.0, 5.0, 0.0], 0.0),
            ],
        )
        .unwrap();
        let expected: f64 = guests
            .particles()
            .iter()
            .map(|g| ff.interaction_energy(g, &hosts))
            .sum();
        assert!((ff.cross_energy(&guests, &hosts).total() - expected).abs() < TOLERANCE);
    }
}
