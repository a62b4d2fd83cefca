//! Monte Carlo move kinds.
//!
//! Every move follows the same contract: it proposes a perturbation on a copy of the affected
//! particle(s), evaluates the energy change, and either commits or restores the original
//! state before returning. Attempt and acceptance counters persist until
//! [`MonteCarloMove::reset`] is called. Translation, deletion and swap moves on an empty
//! source are no-ops and leave the counters untouched.

pub mod deletion;
pub mod insertion;
pub mod swap;
pub mod translation;
pub mod volume;

use crate::core::forcefield::params::ForceField;
use crate::engine::state::SystemState;
use rand::Rng;

pub use deletion::Deletion;
pub use insertion::Insertion;
pub use swap::Swap;
pub use translation::{Phase, Translation};
pub use volume::VolumeChange;

/// Attempt and acceptance counters of one move kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveStats {
    pub attempts: u64,
    pub acceptances: u64,
}

impl MoveStats {
    /// Fraction of attempts that were accepted, or `None` before the first attempt.
    pub fn accept_rate(&self) -> Option<f64> {
        if self.attempts == 0 {
            None
        } else {
            Some(self.acceptances as f64 / self.attempts as f64)
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub(crate) fn record(&mut self, accepted: bool) -> MoveOutcome {
        self.attempts += 1;
        if accepted {
            self.acceptances += 1;
            MoveOutcome::Accepted
        } else {
            MoveOutcome::Rejected
        }
    }
}

/// What a single call to [`MonteCarloMove::attempt`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The move had nothing to act on and was not counted.
    NoOp,
    Accepted,
    Rejected,
}

/// The closed set of moves a simulation can draw from.
#[derive(Debug, Clone)]
pub enum MonteCarloMove {
    Translation(Translation),
    Insertion(Insertion),
    Deletion(Deletion),
    Volume(VolumeChange),
    Swap(Swap),
}

impl MonteCarloMove {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Translation(m) => match m.phase() {
                Phase::Adsorbent => "translation",
                Phase::Gas => "gas_translation",
            },
            Self::Insertion(_) => "insertion",
            Self::Deletion(_) => "deletion",
            Self::Volume(_) => "volume",
            Self::Swap(_) => "swap",
        }
    }

    pub fn stats(&self) -> &MoveStats {
        match self {
            Self::Translation(m) => m.stats(),
            Self::Insertion(m) => m.stats(),
            Self::Deletion(m) => m.stats(),
            Self::Volume(m) => m.stats(),
            Self::Swap(m) => m.stats(),
        }
    }

    pub fn accept_rate(&self) -> Option<f64> {
        self.stats().accept_rate()
    }

    pub fn reset(&mut self) {
        match self {
            Self::Translation(m) => m.reset(),
            Self::Insertion(m) => m.reset(),
            Self::Deletion(m) => m.reset(),
            Self::Volume(m) => m.reset(),
            Self::Swap(m) => m.reset(),
        }
    }

    /// Whether the move acts on the gas box of a two-phase system.
    pub fn requires_gas(&self) -> bool {
        match self {
            Self::Translation(m) => m.phase() == Phase::Gas,
            Self::Volume(_) | Self::Swap(_) => true,
            Self::Insertion(_) | Self::Deletion(_) => false,
        }
    }

    /// Runs one proposal/accept-or-reject cycle against `state`.
    pub fn attempt<R: Rng + ?Sized>(
        &mut self,
        state: &mut SystemState<'_>,
        forcefield: &ForceField,
        rng: &mut R,
    ) -> MoveOutcome {
        match self {
            Self::Translation(m) => m.attempt(state, forcefield, rng),
            Self::Insertion(m) => m.attempt(state, forcefield, rng),
            Self::Deletion(m) => m.attempt(state, forcefield, rng),
            Self::Volume(m) => m.attempt(state, forcefield, rng),
            Self::Swap(m) => m.attempt(state, forcefield, rng),
        }
    }
}

/// Metropolis test: accepts with probability `min(1, probability)`.
#[inline]
pub(crate) fn metropolis<R: Rng + ?Sized>(rng: &mut R, probability: f64) -> bool {
    rng.r#gen::<f64>() < probability
}
