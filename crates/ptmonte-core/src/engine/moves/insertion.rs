use super::{MoveOutcome, MoveStats, metropolis};
use crate::core::forcefield::params::ForceField;
use crate::core::models::container::{Container, MutableContainer, PeriodicCell};
use crate::core::models::particle::Particle;
use crate::engine::reservoir::Reservoir;
use crate::engine::state::SystemState;
use rand::Rng;

/// Grand-canonical insertion of a guest at a uniformly random point of the lattice.
#[derive(Debug, Clone)]
pub struct Insertion {
    template: Particle,
    reservoir: Reservoir,
    stats: MoveStats,
}

impl Insertion {
    /// The template's type is resolved by `Simulation::new` against the driver's force field.
    pub fn new(template: Particle, reservoir: Reservoir) -> Self {
        Self {
            template,
            reservoir,
            stats: MoveStats::default(),
        }
    }

    pub fn template(&self) -> &Particle {
        &self.template
    }

    pub(crate) fn template_mut(&mut self) -> &mut Particle {
        &mut self.template
    }

    pub fn stats(&self) -> &MoveStats {
        &self.stats
    }

    pub fn reset(&mut self) {
        self.stats.reset();
    }

    /// Accepts with probability `V/(Λ³·(N+1)) · exp((μ − ΔE)/T)`.
    pub fn attempt<R: Rng + ?Sized>(
        &mut self,
        state: &mut SystemState<'_>,
        forcefield: &ForceField,
        rng: &mut R,
    ) -> MoveOutcome {
        let candidate = self
            .template
            .moved_to(state.adsorbent.random_position(rng));
        let energy = forcefield.interaction_energy(&candidate, &state.adsorbent)
            + forcefield.interaction_energy(&candidate, state.lattice);

        let Reservoir {
            temperature,
            lambda3,
            mu,
        } = self.reservoir;
        let n = state.adsorbent.len() as f64;
        let probability =
            state.lattice.volume() / (lambda3 * (n + 1.0)) * ((mu - energy) / temperature).exp();

        let accepted = metropolis(rng, probability);
        if accepted {
            state.adsorbent.push(candidate);
        }
        self.stats.record(accepted)
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures;
    use super::*;
    use crate::core::constants::PhysicalConstants;
    use nalgebra::Point3;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn accepted_insertions_land_inside_the_cell() {
        let ff = fixtures::forcefield();
        let lattice = fixtures::empty_lattice(10.0);
        let mut state = SystemState::new(&lattice);
        // A dense reservoir makes almost every insertion into an empty box succeed.
        let reservoir = Reservoir::new(&PhysicalConstants::default(), 39.95, 300.0, 1.0e9);
        let mut mv = Insertion::new(fixtures::resolved(&ff, "Ghost", Point3::origin()), reservoir);
        let mut rng = StdRng::seed_from_u64(17);

        for _ in 0..50 {
            mv.attempt(&mut state, &ff, &mut rng);
        }
        assert_eq!(mv.stats().attempts, 50);
        assert_eq!(mv.stats().acceptances as usize, state.adsorbed_count());
        assert!(state.adsorbed_count() > 40);
        for p in state.adsorbent.particles() {
            assert_eq!(p.particle_type, "Ghost");
            assert!(p.position.iter().all(|x| (0.0..10.0).contains(x)));
        }
    }

    #[test]
    fn insertion_on_top_of_the_framework_is_rejected() {
        let ff = fixtures::forcefield();
        // A cell barely larger than the zinc atom leaves no room for argon.
        let lattice = fixtures::zinc_lattice(1.5, &ff);
        let mut state = SystemState::new(&lattice);
        let reservoir = Reservoir::new(&PhysicalConstants::default(), 39.95, 300.0, 1.0e5);
        let mut mv = Insertion::new(fixtures::resolved(&ff, "Ar", Point3::origin()), reservoir);
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..100 {
            assert_eq!(mv.attempt(&mut state, &ff, &mut rng), MoveOutcome::Rejected);
        }
        assert_eq!(state.adsorbed_count(), 0);
        assert_eq!(mv.stats().attempts, 100);
    }
}
