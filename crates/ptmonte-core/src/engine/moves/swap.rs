use super::{MoveOutcome, MoveStats, metropolis};
use crate::core::forcefield::params::ForceField;
use crate::core::models::container::{Container, MutableContainer, PeriodicCell};
use crate::engine::state::SystemState;
use rand::Rng;

/// Direction of a particle transfer between the two phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapDirection {
    ToAdsorbent,
    ToGas,
}

/// Gibbs transfer of one particle between the gas box and the adsorbent.
///
/// Keeps per-direction counters alongside the totals.
#[derive(Debug, Clone)]
pub struct Swap {
    temperature: f64,
    stats: MoveStats,
    to_adsorbent: MoveStats,
    to_gas: MoveStats,
}

impl Swap {
    pub fn new(temperature: f64) -> Self {
        Self {
            temperature,
            stats: MoveStats::default(),
            to_adsorbent: MoveStats::default(),
            to_gas: MoveStats::default(),
        }
    }

    pub fn stats(&self) -> &MoveStats {
        &self.stats
    }

    pub fn direction_stats(&self, direction: SwapDirection) -> &MoveStats {
        match direction {
            SwapDirection::ToAdsorbent => &self.to_adsorbent,
            SwapDirection::ToGas => &self.to_gas,
        }
    }

    pub fn reset(&mut self) {
        self.stats.reset();
        self.to_adsorbent.reset();
        self.to_gas.reset();
    }

    /// Picks a direction with equal probability, then transfers a random particle of the
    /// source phase to a uniformly random point of the destination phase.
    pub fn attempt<R: Rng + ?Sized>(
        &mut self,
        state: &mut SystemState<'_>,
        forcefield: &ForceField,
        rng: &mut R,
    ) -> MoveOutcome {
        let direction = if rng.r#gen::<f64>() < 0.5 {
            SwapDirection::ToAdsorbent
        } else {
            SwapDirection::ToGas
        };
        self.attempt_direction(direction, state, forcefield, rng)
    }

    pub fn attempt_direction<R: Rng + ?Sized>(
        &mut self,
        direction: SwapDirection,
        state: &mut SystemState<'_>,
        forcefield: &ForceField,
        rng: &mut R,
    ) -> MoveOutcome {
        let Some(gas) = state.gas.as_mut() else {
            return MoveOutcome::NoOp;
        };
        let adsorbent = &mut state.adsorbent;
        let lattice = state.lattice;

        let accepted = match direction {
            SwapDirection::ToAdsorbent => {
                if gas.is_empty() {
                    return MoveOutcome::NoOp;
                }
                let n_source = gas.len();
                let index = rng.gen_range(0..n_source);
                let particle = gas.take(index);
                let old_energy = forcefield.interaction_energy(&particle, gas);
                let candidate = particle.moved_to(adsorbent.random_position(rng));
                let new_energy = forcefield.interaction_energy(&candidate, adsorbent)
                    + forcefield.interaction_energy(&candidate, lattice);

                let probability = adsorbent.volume() / (adsorbent.len() + 1) as f64
                    * n_source as f64
                    / gas.volume()
                    * ((old_energy - new_energy) / self.temperature).exp();
                let accepted = metropolis(rng, probability);
                if accepted {
                    adsorbent.push(candidate);
                } else {
                    gas.restore(index, particle);
                }
                accepted
            }
            SwapDirection::ToGas => {
                if adsorbent.is_empty() {
                    return MoveOutcome::NoOp;
                }
                let n_source = adsorbent.len();
                let index = rng.gen_range(0..n_source);
                let particle = adsorbent.take(index);
                let old_energy = forcefield.interaction_energy(&particle, adsorbent)
                    + forcefield.interaction_energy(&particle, lattice);
                let candidate = particle.moved_to(gas.random_position(rng));
                let new_energy = forcefield.interaction_energy(&candidate, gas);

                let probability = gas.volume() / (gas.len() + 1) as f64 * n_source as f64
                    / adsorbent.volume()
                    * ((old_energy - new_energy) / self.temperature).exp();
                let accepted = metropolis(rng, probability);
                if accepted {
                    gas.push(candidate);
                } else {
                    adsorbent.restore(index, particle);
                }
                accepted
            }
        };

        match direction {
            SwapDirection::ToAdsorbent => self.to_adsorbent.record(accepted),
            SwapDirection::ToGas => self.to_gas.record(accepted),
        };
        self.stats.record(accepted)
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures;
    use super::*;
    use crate::core::models::adsorbent::Adsorbent;
    use crate::core::models::cubic_box::CubicBox;
    use nalgebra::Point3;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn empty_source_is_an_uncounted_no_op() {
        let ff = fixtures::forcefield();
        let lattice = fixtures::empty_lattice(10.0);
        let mut state = SystemState::new(&lattice).with_gas(CubicBox::new(10.0).unwrap());
        let mut mv = Swap::new(300.0);
        let mut rng = StdRng::seed_from_u64(1);
        for direction in [SwapDirection::ToAdsorbent, SwapDirection::ToGas] {
            assert_eq!(
                mv.attempt_direction(direction, &mut state, &ff, &mut rng),
                MoveOutcome::NoOp
            );
        }
        assert_eq!(*mv.stats(), MoveStats::default());
    }

    #[test]
    fn transfers_conserve_particles_and_split_counters() {
        let ff = fixtures::forcefield();
        let lattice = fixtures::zinc_lattice(12.0, &ff);
        let mut rng = StdRng::seed_from_u64(33);
        let mut gas = CubicBox::new(15.0).unwrap();
        gas.fill_random(&fixtures::resolved(&ff, "Ar", Point3::origin()), 8, &mut rng);
        let mut state = SystemState::new(&lattice).with_gas(gas);
        let mut mv = Swap::new(300.0);

        for _ in 0..400 {
            mv.attempt(&mut state, &ff, &mut rng);
            assert_eq!(state.adsorbed_count() + state.gas_count(), 8);
        }
        let to_ads = mv.direction_stats(SwapDirection::ToAdsorbent);
        let to_gas = mv.direction_stats(SwapDirection::ToGas);
        assert_eq!(mv.stats().attempts, to_ads.attempts + to_gas.attempts);
        assert_eq!(mv.stats().acceptances, to_ads.acceptances + to_gas.acceptances);
        assert!(to_ads.attempts > 0 && to_gas.attempts > 0);

        mv.reset();
        assert_eq!(*mv.direction_stats(SwapDirection::ToGas), MoveStats::default());
        assert_eq!(*mv.stats(), MoveStats::default());
    }

    #[test]
    fn ideal_particles_split_by_volume() {
        let ff = fixtures::forcefield();
        // 1000 Å³ adsorbent vs 3000 Å³ gas: a quarter of the particles should be adsorbed.
        let lattice = fixtures::empty_lattice(10.0);
        let mut rng = StdRng::seed_from_u64(77);
        let mut gas = CubicBox::new(3000f64.cbrt()).unwrap();
        gas.fill_random(&fixtures::resolved(&ff, "Ghost", Point3::origin()), 40, &mut rng);
        let mut state = SystemState::new(&lattice).with_gas(gas);
        let mut mv = Swap::new(300.0);

        let mut adsorbed = 0usize;
        let steps = 40_000;
        for _ in 0..steps {
            mv.attempt(&mut state, &ff, &mut rng);
            adsorbed += state.adsorbed_count();
        }
        let mean = adsorbed as f64 / steps as f64;
        assert!((mean - 10.0).abs() < 1.0, "mean adsorbed {mean}");
    }

    #[test]
    fn rejected_transfer_restores_source() {
        let ff = fixtures::forcefield();
        // The adsorbent cell is filled by the zinc atom, so argon can never enter.
        let lattice = fixtures::zinc_lattice(1.5, &ff);
        let mut gas = CubicBox::new(10.0).unwrap();
        gas.push(fixtures::resolved(&ff, "Ar", Point3::new(5.0, 5.0, 5.0)));
        let mut state = SystemState::new(&lattice).with_gas(gas);
        state.adsorbent = Adsorbent::new(&lattice);
        let mut mv = Swap::new(300.0);
        let mut rng = StdRng::seed_from_u64(6);
        assert_eq!(
            mv.attempt_direction(SwapDirection::ToAdsorbent, &mut state, &ff, &mut rng),
            MoveOutcome::Rejected
        );
        let gas = state.gas.as_ref().unwrap();
        assert_eq!(gas.particles()[0].position, Point3::new(5.0, 5.0, 5.0));
        assert_eq!(state.adsorbed_count(), 0);
    }
}
