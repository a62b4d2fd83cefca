use super::{MoveOutcome, MoveStats, metropolis};
use crate::core::forcefield::params::ForceField;
use crate::core::models::container::MutableContainer;
use crate::core::models::lattice::Lattice;
use crate::core::models::particle::Particle;
use crate::engine::state::SystemState;
use nalgebra::Vector3;
use rand::Rng;

/// The phase a translation move acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Guests inside the lattice; energies include the framework.
    Adsorbent,
    /// The bulk gas box of a two-phase system.
    Gas,
}

/// Random displacement of one particle.
#[derive(Debug, Clone)]
pub struct Translation {
    phase: Phase,
    max_displacement: f64,
    temperature: f64,
    stats: MoveStats,
}

impl Translation {
    /// Each coordinate is displaced by a uniform offset in
    /// `[-max_displacement/2, max_displacement/2)`.
    pub fn new(phase: Phase, max_displacement: f64, temperature: f64) -> Self {
        Self {
            phase,
            max_displacement,
            temperature,
            stats: MoveStats::default(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn stats(&self) -> &MoveStats {
        &self.stats
    }

    pub fn reset(&mut self) {
        self.stats.reset();
    }

    pub fn attempt<R: Rng + ?Sized>(
        &mut self,
        state: &mut SystemState<'_>,
        forcefield: &ForceField,
        rng: &mut R,
    ) -> MoveOutcome {
        match self.phase {
            Phase::Adsorbent => {
                let lattice = state.lattice;
                self.displace(&mut state.adsorbent, Some(lattice), forcefield, rng)
            }
            Phase::Gas => match state.gas.as_mut() {
                Some(gas) => self.displace(gas, None, forcefield, rng),
                None => MoveOutcome::NoOp,
            },
        }
    }

    fn displace<C, R>(
        &mut self,
        container: &mut C,
        lattice: Option<&Lattice>,
        forcefield: &ForceField,
        rng: &mut R,
    ) -> MoveOutcome
    where
        C: MutableContainer,
        R: Rng + ?Sized,
    {
        if container.is_empty() {
            return MoveOutcome::NoOp;
        }
        let index = rng.gen_range(0..container.len());
        let original = container.take(index);

        let energy = |particle: &Particle, container: &C| {
            forcefield.interaction_energy(particle, container)
                + lattice.map_or(0.0, |l| forcefield.interaction_energy(particle, l))
        };
        let old_energy = energy(&original, &*container);

        let offset = Vector3::new(
            rng.r#gen::<f64>() - 0.5,
            rng.r#gen::<f64>() - 0.5,
            rng.r#gen::<f64>() - 0.5,
        ) * self.max_displacement;
        let candidate = original.moved_to(container.wrap(&(original.position + offset)));
        let new_energy = energy(&candidate, &*container);

        let accepted = metropolis(rng, ((old_energy - new_energy) / self.temperature).exp());
        container.restore(index, if accepted { candidate } else { original });
        self.stats.record(accepted)
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures;
    use super::*;
    use crate::core::models::adsorbent::Adsorbent;
    use crate::core::models::container::{Container, PeriodicCell};
    use crate::core::models::cubic_box::CubicBox;
    use nalgebra::Point3;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn empty_container_is_an_uncounted_no_op() {
        let ff = fixtures::forcefield();
        let lattice = fixtures::empty_lattice(10.0);
        let mut state = SystemState::new(&lattice);
        let mut rng = StdRng::seed_from_u64(1);
        let mut mv = Translation::new(Phase::Adsorbent, 1.0, 300.0);
        assert_eq!(mv.attempt(&mut state, &ff, &mut rng), MoveOutcome::NoOp);
        assert_eq!(*mv.stats(), MoveStats::default());

        let mut gas_mv = Translation::new(Phase::Gas, 1.0, 300.0);
        assert_eq!(gas_mv.attempt(&mut state, &ff, &mut rng), MoveOutcome::NoOp);
        let mut state = state.with_gas(CubicBox::new(10.0).unwrap());
        assert_eq!(gas_mv.attempt(&mut state, &ff, &mut rng), MoveOutcome::NoOp);
        assert_eq!(gas_mv.stats().attempts, 0);
    }

    #[test]
    fn counters_track_every_attempt() {
        let ff = fixtures::forcefield();
        let lattice = fixtures::zinc_lattice(12.0, &ff);
        let guests = (0..4)
            .map(|i| fixtures::resolved(&ff, "Ar", Point3::new(3.0 * i as f64 + 1.5, 6.0, 6.0)))
            .collect();
        let mut state = SystemState::new(&lattice);
        state.adsorbent = Adsorbent::with_particles(&lattice, guests);
        let mut rng = StdRng::seed_from_u64(42);
        let mut mv = Translation::new(Phase::Adsorbent, 2.0, 300.0);

        let n = 500;
        let accepted = (0..n)
            .filter(|_| mv.attempt(&mut state, &ff, &mut rng) == MoveOutcome::Accepted)
            .count() as u64;
        assert_eq!(mv.stats().attempts, n);
        assert_eq!(mv.stats().acceptances, accepted);
        assert_eq!(
            mv.stats().accept_rate(),
            Some(accepted as f64 / n as f64)
        );
        assert_eq!(state.adsorbed_count(), 4);
    }

    #[test]
    fn displaced_particles_stay_in_the_cell() {
        let ff = fixtures::forcefield();
        let lattice = fixtures::empty_lattice(5.0);
        let mut state = SystemState::new(&lattice);
        state.adsorbent = Adsorbent::with_particles(
            &lattice,
            vec![fixtures::resolved(&ff, "Ghost", Point3::new(0.1, 4.9, 2.5))],
        );
        let mut rng = StdRng::seed_from_u64(5);
        let mut mv = Translation::new(Phase::Adsorbent, 20.0, 300.0);
        for _ in 0..200 {
            mv.attempt(&mut state, &ff, &mut rng);
            let p = state.adsorbent.particles()[0].position;
            assert!(p.iter().all(|x| (0.0..5.0).contains(x)));
        }
        // A non-interacting particle is always accepted.
        assert_eq!(mv.stats().accept_rate(), Some(1.0));
    }

    #[test]
    fn acceptance_approaches_one_at_high_temperature() {
        let ff = fixtures::forcefield();
        let lattice = fixtures::zinc_lattice(20.0, &ff);
        let mut state = SystemState::new(&lattice);
        state.adsorbent = Adsorbent::with_particles(
            &lattice,
            vec![fixtures::resolved(&ff, "Ar", Point3::new(10.0, 10.0, 10.0))],
        );
        let mut rng = StdRng::seed_from_u64(9);
        let mut mv = Translation::new(Phase::Adsorbent, 0.5, 1.0e9);
        for _ in 0..1000 {
            mv.attempt(&mut state, &ff, &mut rng);
        }
        assert!(mv.stats().accept_rate().unwrap() > 0.99);
    }

    #[test]
    fn uphill_moves_are_rejected_at_low_temperature() {
        let ff = fixtures::forcefield();
        let lattice = fixtures::zinc_lattice(20.0, &ff);
        let mut state = SystemState::new(&lattice);
        // Sitting near the Lennard-Jones minimum next to the zinc atom, every displacement
        // of a couple of Å costs far more than T.
        let start = Point3::new(2.9 * 2f64.powf(1.0 / 6.0), 0.0, 0.0);
        state.adsorbent =
            Adsorbent::with_particles(&lattice, vec![fixtures::resolved(&ff, "Ar", start)]);
        let mut rng = StdRng::seed_from_u64(13);
        let mut mv = Translation::new(Phase::Adsorbent, 4.0, 1.0e-3);
        for _ in 0..500 {
            mv.attempt(&mut state, &ff, &mut rng);
        }
        assert!(mv.stats().accept_rate().unwrap() < 0.05);
    }

    #[test]
    fn gas_translation_moves_gas_particles_only() {
        let ff = fixtures::forcefield();
        let lattice = fixtures::empty_lattice(10.0);
        let mut gas = CubicBox::new(10.0).unwrap();
        gas.push(fixtures::resolved(&ff, "Ghost", Point3::new(5.0, 5.0, 5.0)));
        let mut state = SystemState::new(&lattice).with_gas(gas);
        let mut rng = StdRng::seed_from_u64(3);
        let mut mv = Translation::new(Phase::Gas, 1.0, 300.0);
        assert_eq!(mv.attempt(&mut state, &ff, &mut rng), MoveOutcome::Accepted);
        let gas = state.gas.as_ref().unwrap();
        assert_ne!(gas.particles()[0].position, Point3::new(5.0, 5.0, 5.0));
        assert_eq!(gas.volume(), 1000.0);
        assert_eq!(state.adsorbed_count(), 0);
    }

    #[test]
    fn attempts_keep_particle_order() {
        let ff = fixtures::forcefield();
        let lattice = fixtures::zinc_lattice(20.0, &ff);
        let mut state = SystemState::new(&lattice);
        let labels = [0.0, 0.01, 0.02, 0.03];
        let guests: Vec<_> = labels
            .iter()
            .enumerate()
            .map(|(i, &q)| {
                let x = 3.0 + 4.0 * i as f64;
                fixtures::resolved(&ff, "Ar", Point3::new(x, 10.0, 10.0)).with_charge(q)
            })
            .collect();
        state.adsorbent = Adsorbent::with_particles(&lattice, guests);
        let mut rng = StdRng::seed_from_u64(21);
        let mut mv = Translation::new(Phase::Adsorbent, 3.0, 50.0);
        for _ in 0..300 {
            mv.attempt(&mut state, &ff, &mut rng);
        }
        let stats = mv.stats();
        assert!(stats.acceptances > 0 && stats.acceptances < stats.attempts);
        let charges: Vec<f64> = state.adsorbent.particles().iter().map(|p| p.charge).collect();
        assert_eq!(charges, labels.to_vec());
    }
}
