use crate::core::forcefield::params::ForceField;
use crate::core::forcefield::term::EnergyTerm;
use crate::core::io::series::MoveRecord;
use crate::core::models::container::Container;
use crate::core::models::lattice::Lattice;
use crate::engine::config::{GibbsConfig, GrandCanonicalConfig};
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::simulation::Simulation;
use crate::engine::statistics::SeriesSummary;
use tracing::{info, instrument, warn};

/// Which driver an adsorption run uses.
#[derive(Debug, Clone, PartialEq)]
pub enum Ensemble {
    GrandCanonical(GrandCanonicalConfig),
    Gibbs(GibbsConfig),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdsorptionConfig {
    pub ensemble: Ensemble,
    /// Steps run before the counters are reset.
    pub equilibration_steps: u64,
    /// Steps whose particle counts make up the result.
    pub production_steps: u64,
    /// Number of blocks for the standard-error estimate.
    pub blocks: usize,
}

#[derive(Debug, Clone)]
pub struct AdsorptionResult {
    /// Adsorbed particle count after each production step.
    pub series: Vec<usize>,
    pub summary: Option<SeriesSummary>,
    pub moves: Vec<MoveRecord>,
    /// Particles in the gas box at the end of a two-phase run.
    pub final_gas_count: Option<usize>,
    /// Guest-framework energy of the final configuration, in Kelvin.
    pub framework_energy: EnergyTerm,
}

/// Runs an equilibration phase, resets the statistics, and runs a production phase.
///
/// The force field and the lattice are only borrowed, so callers may run several
/// independent chains against the same inputs in parallel.
#[instrument(skip_all, name = "adsorption_workflow")]
pub fn run(
    forcefield: &ForceField,
    lattice: &Lattice,
    config: &AdsorptionConfig,
    reporter: &ProgressReporter,
) -> Result<AdsorptionResult, EngineError> {
    reporter.report(Progress::PhaseStart {
        name: "Preparation",
    });
    let mut simulation = match &config.ensemble {
        Ensemble::GrandCanonical(c) => Simulation::grand_canonical(forcefield, lattice, c)?,
        Ensemble::Gibbs(c) => Simulation::gibbs(forcefield, lattice, c)?,
    };
    if config.production_steps == 0 {
        warn!("No production steps requested; the result will be empty.");
    }
    reporter.report(Progress::PhaseFinish);

    reporter.report(Progress::PhaseStart {
        name: "Equilibration",
    });
    info!("Equilibrating for {} steps.", config.equilibration_steps);
    simulation.run_with_progress(config.equilibration_steps, reporter);
    simulation.reset();
    reporter.report(Progress::PhaseFinish);

    reporter.report(Progress::PhaseStart { name: "Production" });
    info!("Sampling for {} steps.", config.production_steps);
    simulation.run_with_progress(config.production_steps, reporter);
    reporter.report(Progress::PhaseFinish);

    let series = simulation.adsorption_record().to_vec();
    let summary = SeriesSummary::from_counts(&series, config.blocks);
    if let Some(s) = &summary {
        info!(
            "Workflow complete. <N> = {:.4} (variance {:.4}) over {} samples.",
            s.mean, s.variance, s.samples
        );
    }
    let moves = simulation.move_records();
    for record in &moves {
        if record.accept_rate.is_none() && !record.name.starts_with("swap_") {
            warn!("Move '{}' was never attempted during production.", record.name);
        }
    }

    Ok(AdsorptionResult {
        series,
        summary,
        moves,
        final_gas_count: simulation.state().gas.as_ref().map(|gas| gas.len()),
        framework_energy: simulation.framework_energy(),
    })
}
