use super::config::{ConfigError, GibbsConfig, GrandCanonicalConfig, validate_probabilities};
use super::error::EngineError;
use super::moves::swap::SwapDirection;
use super::moves::{
    Deletion, Insertion, MonteCarloMove, MoveOutcome, MoveStats, Phase, Swap, Translation,
    VolumeChange,
};
use super::progress::{Progress, ProgressReporter};
use super::reservoir::Reservoir;
use super::state::SystemState;
use crate::core::forcefield::params::ForceField;
use crate::core::forcefield::term::EnergyTerm;
use crate::core::io::series::MoveRecord;
use crate::core::models::container::MutableContainer;
use crate::core::models::lattice::Lattice;
use rand::SeedableRng;
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use tracing::{debug, info};

/// Number of steps between two progress increments.
const PROGRESS_STRIDE: u64 = 1000;

/// A sequential Monte Carlo driver over one system state.
///
/// The force field and the lattice are borrowed immutably, so any number of simulations can
/// share them; each simulation owns its guests, gas box and random number generator.
pub struct Simulation<'a> {
    forcefield: &'a ForceField,
    state: SystemState<'a>,
    moves: Vec<MonteCarloMove>,
    selector: WeightedIndex<f64>,
    rng: StdRng,
    adsorption_record: Vec<usize>,
}

impl<'a> Simulation<'a> {
    /// Assembles a driver from an explicit move list.
    ///
    /// Every particle already present in `state` and every insertion template is resolved
    /// against `forcefield`.
    ///
    /// # Errors
    ///
    /// Fails if the probabilities are not a categorical distribution, if a move needs a gas
    /// box the state lacks, if the framework is unresolved, or if a guest type is unknown.
    pub fn new(
        forcefield: &'a ForceField,
        mut state: SystemState<'a>,
        moves: Vec<(MonteCarloMove, f64)>,
        seed: Option<u64>,
    ) -> Result<Self, EngineError> {
        if !state.lattice.is_resolved() {
            return Err(EngineError::UnresolvedFramework);
        }
        let (mut moves, weights): (Vec<MonteCarloMove>, Vec<f64>) = moves.into_iter().unzip();
        validate_probabilities(&weights)?;
        if state.gas.is_none() {
            if let Some(m) = moves.iter().find(|m| m.requires_gas()) {
                return Err(EngineError::MissingGasPhase { kind: m.name() });
            }
        }
        let selector = WeightedIndex::new(&weights).map_err(|e| ConfigError::Invalid {
            name: "move_probabilities",
            reason: e.to_string(),
        })?;

        for m in &mut moves {
            if let MonteCarloMove::Insertion(insertion) = m {
                forcefield.resolve_type(insertion.template_mut())?;
            }
        }
        forcefield.resolve_all(state.adsorbent.particles_mut())?;
        if let Some(gas) = state.gas.as_mut() {
            forcefield.resolve_all(gas.particles_mut())?;
        }

        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        debug!(
            "Simulation assembled with moves [{}] and weights {:?}.",
            moves.iter().map(|m| m.name()).collect::<Vec<_>>().join(", "),
            weights
        );

        Ok(Self {
            forcefield,
            state,
            moves,
            selector,
            rng,
            adsorption_record: Vec::new(),
        })
    }

    /// A grand-canonical driver: translation, insertion and deletion of guests in `lattice`.
    pub fn grand_canonical(
        forcefield: &'a ForceField,
        lattice: &'a Lattice,
        config: &GrandCanonicalConfig,
    ) -> Result<Self, EngineError> {
        let mut guest = config.guest.clone();
        forcefield.resolve_type(&mut guest)?;
        let reservoir = Reservoir::new(
            &config.constants,
            config.mass,
            config.temperature,
            config.pressure,
        );
        let [p_translation, p_insertion, p_deletion] = config.move_probabilities;
        let moves = vec![
            (
                MonteCarloMove::Translation(Translation::new(
                    Phase::Adsorbent,
                    config.max_displacement,
                    config.temperature,
                )),
                p_translation,
            ),
            (
                MonteCarloMove::Insertion(Insertion::new(guest, reservoir)),
                p_insertion,
            ),
            (
                MonteCarloMove::Deletion(Deletion::new(reservoir)),
                p_deletion,
            ),
        ];
        Self::new(forcefield, SystemState::new(lattice), moves, config.seed)
    }

    /// A two-phase driver: the adsorbent exchanges particles with a variable-volume gas box.
    pub fn gibbs(
        forcefield: &'a ForceField,
        lattice: &'a Lattice,
        config: &GibbsConfig,
    ) -> Result<Self, EngineError> {
        let [p_adsorbent, p_gas, p_volume, p_swap] = config.move_probabilities;
        let moves = vec![
            (
                MonteCarloMove::Translation(Translation::new(
                    Phase::Adsorbent,
                    config.max_displacement,
                    config.temperature,
                )),
                p_adsorbent,
            ),
            (
                MonteCarloMove::Translation(Translation::new(
                    Phase::Gas,
                    config.max_displacement,
                    config.temperature,
                )),
                p_gas,
            ),
            (
                MonteCarloMove::Volume(VolumeChange::new(
                    config.max_log_volume_step,
                    config.temperature,
                    config.pressure,
                    config.constants.boltzmann,
                )),
                p_volume,
            ),
            (MonteCarloMove::Swap(Swap::new(config.temperature)), p_swap),
        ];
        let state = SystemState::new(lattice).with_gas(config.gas.clone());
        Self::new(forcefield, state, moves, config.seed)
    }

    /// Draws one move from the categorical distribution, attempts it, and records the
    /// adsorbed particle count.
    pub fn single_step(&mut self) -> MoveOutcome {
        let index = self.selector.sample(&mut self.rng);
        let outcome = self.moves[index].attempt(&mut self.state, self.forcefield, &mut self.rng);
        self.adsorption_record.push(self.state.adsorbed_count());
        outcome
    }

    pub fn run(&mut self, steps: u64) {
        for _ in 0..steps {
            self.single_step();
        }
    }

    /// Like [`run`](Self::run), reporting a task with periodic increments.
    pub fn run_with_progress(&mut self, steps: u64, reporter: &ProgressReporter) {
        reporter.report(Progress::TaskStart { total_steps: steps });
        let mut done = 0;
        while done < steps {
            let chunk = PROGRESS_STRIDE.min(steps - done);
            self.run(chunk);
            done += chunk;
            reporter.report(Progress::TaskIncrement { steps: chunk });
        }
        reporter.report(Progress::TaskFinish);
    }

    /// Zeroes every move counter and the recorded series; particles are left in place.
    pub fn reset(&mut self) {
        for m in &mut self.moves {
            m.reset();
        }
        self.adsorption_record.clear();
        info!(
            "Counters reset with {} adsorbed particles.",
            self.state.adsorbed_count()
        );
    }

    pub fn moves(&self) -> &[MonteCarloMove] {
        &self.moves
    }

    pub fn state(&self) -> &SystemState<'a> {
        &self.state
    }

    /// Interaction energy of the current guests with the framework.
    pub fn framework_energy(&self) -> EnergyTerm {
        self.forcefield
            .cross_energy(&self.state.adsorbent, self.state.lattice)
    }

    /// Adsorbed particle count after each step since the last reset.
    pub fn adsorption_record(&self) -> &[usize] {
        &self.adsorption_record
    }

    /// Acceptance summary of every move, with the swap move split by direction.
    pub fn move_records(&self) -> Vec<MoveRecord> {
        let mut records = Vec::with_capacity(self.moves.len() + 2);
        for m in &self.moves {
            records.push(record(m.name(), m.stats()));
            if let MonteCarloMove::Swap(swap) = m {
                records.push(record(
                    "swap_to_adsorbent",
                    swap.direction_stats(SwapDirection::ToAdsorbent),
                ));
                records.push(record(
                    "swap_to_gas",
                    swap.direction_stats(SwapDirection::ToGas),
                ));
            }
        }
        records
    }
}

fn record(name: &str, stats: &MoveStats) -> MoveRecord {
    MoveRecord {
        name: name.to_string(),
        attempts: stats.attempts,
        acceptances: stats.acceptances,
        accept_rate: stats.accept_rate(),
    }
}
