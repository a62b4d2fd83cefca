use super::{MoveOutcome, MoveStats, metropolis};
use crate::core::forcefield::params::ForceField;
use crate::core::models::container::{Container, MutableContainer, PeriodicCell};
use crate::engine::reservoir::Reservoir;
use crate::engine::state::SystemState;
use rand::Rng;

/// Grand-canonical removal of a uniformly chosen guest.
#[derive(Debug, Clone)]
pub struct Deletion {
    reservoir: Reservoir,
    stats: MoveStats,
}

impl Deletion {
    pub fn new(reservoir: Reservoir) -> Self {
        Self {
            reservoir,
            stats: MoveStats::default(),
        }
    }

    pub fn stats(&self) -> &MoveStats {
        &self.stats
    }

    pub fn reset(&mut self) {
        self.stats.reset();
    }

    /// Accepts with probability `Λ³·N/V · exp((ΔE − μ)/T)`, `N` counted before removal.
    pub fn attempt<R: Rng + ?Sized>(
        &mut self,
        state: &mut SystemState<'_>,
        forcefield: &ForceField,
        rng: &mut R,
    ) -> MoveOutcome {
        if state.adsorbent.is_empty() {
            return MoveOutcome::NoOp;
        }
        let n = state.adsorbent.len();
        let index = rng.gen_range(0..n);
        let removed = state.adsorbent.take(index);
        let energy = forcefield.interaction_energy(&removed, &state.adsorbent)
            + forcefield.interaction_energy(&removed, state.lattice);

        let Reservoir {
            temperature,
            lambda3,
            mu,
        } = self.reservoir;
        let probability =
            lambda3 * n as f64 / state.lattice.volume() * ((energy - mu) / temperature).exp();

        let accepted = metropolis(rng, probability);
        if !accepted {
            state.adsorbent.restore(index, removed);
        }
        self.stats.record(accepted)
    }
}
