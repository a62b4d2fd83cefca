use super::{MoveOutcome, MoveStats, metropolis};
use crate::core::forcefield::params::ForceField;
use crate::core::models::container::{Container, PeriodicCell};
use crate::engine::state::SystemState;
use rand::Rng;

/// Isobaric volume change of the gas box, sampled uniformly in `ln V`.
#[derive(Debug, Clone)]
pub struct VolumeChange {
    max_log_step: f64,
    temperature: f64,
    pressure: f64,
    boltzmann: f64,
    stats: MoveStats,
}

impl VolumeChange {
    /// `boltzmann` converts `P·ΔV` (Pa·Å³) to Kelvin.
    pub fn new(max_log_step: f64, temperature: f64, pressure: f64, boltzmann: f64) -> Self {
        Self {
            max_log_step,
            temperature,
            pressure,
            boltzmann,
            stats: MoveStats::default(),
        }
    }

    pub fn stats(&self) -> &MoveStats {
        &self.stats
    }

    pub fn reset(&mut self) {
        self.stats.reset();
    }

    /// Accepts with probability `k^(3N+3) · exp((E_old − E_new + P·(V_old − V_new)/k_B)/T)`,
    /// where `k` is the linear scale factor.
    pub fn attempt<R: Rng + ?Sized>(
        &mut self,
        state: &mut SystemState<'_>,
        forcefield: &ForceField,
        rng: &mut R,
    ) -> MoveOutcome {
        let Some(gas) = state.gas.as_mut() else {
            return MoveOutcome::NoOp;
        };

        let old_energy = forcefield.total_energy(gas);
        let old_side = gas.side();
        let old_volume = gas.volume();
        let log_volume = old_volume.ln() + self.max_log_step * (rng.r#gen::<f64>() - 0.5);
        let k = (log_volume / 3.0).exp() / old_side;

        if gas.rescale(k).is_err() {
            return self.stats.record(false);
        }
        let new_energy = forcefield.total_energy(gas);
        let new_volume = gas.volume();

        let exponent = (old_energy - new_energy
            + self.pressure * (old_volume - new_volume) / self.boltzmann)
            / self.temperature;
        let probability = k.powi(3 * gas.len() as i32 + 3) * exponent.exp();

        let accepted = metropolis(rng, probability);
        if !accepted {
            gas.revert_rescale(old_side, k);
        }
        self.stats.record(accepted)
    }
}
