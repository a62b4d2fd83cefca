use crate::cli::RunArgs;
use crate::error::{CliError, Result};
use nalgebra::Point3;
use ptmonte::core::constants::PhysicalConstants;
use ptmonte::core::models::cubic_box::CubicBox;
use ptmonte::core::models::particle::Particle;
use ptmonte::engine::config::{GibbsConfigBuilder, GrandCanonicalConfigBuilder};
use ptmonte::workflows::adsorption::{AdsorptionConfig, Ensemble};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

const DEFAULT_MAX_DISPLACEMENT: f64 = 1.0;
const DEFAULT_MAX_LOG_VOLUME_STEP: f64 = 0.1;
const DEFAULT_GRAND_CANONICAL_PROBABILITIES: [f64; 3] = [0.4, 0.3, 0.3];
const DEFAULT_GIBBS_PROBABILITIES: [f64; 4] = [0.3, 0.3, 0.1, 0.3];
const DEFAULT_BLOCKS: usize = 10;

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum EnsembleKind {
    #[default]
    GrandCanonical,
    Gibbs,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialPathConfig {
    path: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialGuestConfig {
    #[serde(rename = "type")]
    particle_type: Option<String>,
    charge: Option<f64>,
    mass: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialConditionsConfig {
    ensemble: Option<EnsembleKind>,
    temperature: Option<f64>,
    pressure: Option<f64>,
    #[serde(rename = "gas-box-side")]
    gas_box_side: Option<f64>,
    #[serde(rename = "gas-particles")]
    gas_particles: Option<usize>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialMovesConfig {
    #[serde(rename = "max-displacement")]
    max_displacement: Option<f64>,
    #[serde(rename = "max-log-volume-step")]
    max_log_volume_step: Option<f64>,
    translation: Option<f64>,
    insertion: Option<f64>,
    deletion: Option<f64>,
    #[serde(rename = "gas-translation")]
    gas_translation: Option<f64>,
    volume: Option<f64>,
    swap: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialRunSection {
    #[serde(rename = "equilibration-steps")]
    equilibration_steps: Option<u64>,
    #[serde(rename = "production-steps")]
    production_steps: Option<u64>,
    blocks: Option<usize>,
    chains: Option<usize>,
    seed: Option<u64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialOutputConfig {
    series: Option<PathBuf>,
    moves: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialRunConfig {
    structure: Option<PartialPathConfig>,
    forcefield: Option<PartialPathConfig>,
    guest: Option<PartialGuestConfig>,
    conditions: Option<PartialConditionsConfig>,
    moves: Option<PartialMovesConfig>,
    run: Option<PartialRunSection>,
    output: Option<PartialOutputConfig>,
}

/// Fully merged settings of a `run` invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub structure: PathBuf,
    pub forcefield: PathBuf,
    pub ensemble: EnsembleKind,
    pub guest: Particle,
    pub mass: f64,
    pub temperature: f64,
    pub pressure: f64,
    pub max_displacement: f64,
    pub max_log_volume_step: f64,
    pub grand_canonical_probabilities: [f64; 3],
    pub gibbs_probabilities: [f64; 4],
    pub gas_box_side: Option<f64>,
    pub gas_particles: usize,
    pub equilibration_steps: u64,
    pub production_steps: u64,
    pub blocks: usize,
    pub chains: usize,
    pub seed: Option<u64>,
    pub series_output: Option<PathBuf>,
    pub moves_output: Option<PathBuf>,
    pub constants: PhysicalConstants,
}

impl PartialRunConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    pub fn merge_with_cli(mut self, args: &RunArgs) -> Result<RunSettings> {
        self.apply_set_values(&args.set_values)?;

        let guest = self.guest.take().unwrap_or_default();
        let conditions = self.conditions.take().unwrap_or_default();
        let moves = self.moves.take().unwrap_or_default();
        let run = self.run.take().unwrap_or_default();
        let output = self.output.take().unwrap_or_default();

        let structure = args
            .structure
            .clone()
            .or(self.structure.and_then(|s| s.path))
            .ok_or_else(|| required("structure.path", "--structure"))?;
        let forcefield = args
            .forcefield
            .clone()
            .or(self.forcefield.and_then(|f| f.path))
            .ok_or_else(|| required("forcefield.path", "--forcefield"))?;

        let particle_type = guest
            .particle_type
            .ok_or_else(|| required("guest.type", "-S guest.type=..."))?;
        let guest_particle =
            Particle::new(&particle_type, Point3::origin()).with_charge(guest.charge.unwrap_or(0.0));
        let ensemble = conditions.ensemble.unwrap_or_default();

        let grand_canonical_probabilities = match (moves.translation, moves.insertion, moves.deletion) {
            (None, None, None) => DEFAULT_GRAND_CANONICAL_PROBABILITIES,
            (t, i, d) => [t.unwrap_or(0.0), i.unwrap_or(0.0), d.unwrap_or(0.0)],
        };
        let gibbs_probabilities = match (
            moves.translation,
            moves.gas_translation,
            moves.volume,
            moves.swap,
        ) {
            (None, None, None, None) => DEFAULT_GIBBS_PROBABILITIES,
            (t, g, v, s) => [
                t.unwrap_or(0.0),
                g.unwrap_or(0.0),
                v.unwrap_or(0.0),
                s.unwrap_or(0.0),
            ],
        };

        let settings = RunSettings {
            structure,
            forcefield,
            ensemble,
            guest: guest_particle,
            mass: guest
                .mass
                .ok_or_else(|| required("guest.mass", "-S guest.mass=..."))?,
            temperature: args
                .temperature
                .or(conditions.temperature)
                .ok_or_else(|| required("conditions.temperature", "--temperature"))?,
            pressure: args
                .pressure
                .or(conditions.pressure)
                .ok_or_else(|| required("conditions.pressure", "--pressure"))?,
            max_displacement: moves.max_displacement.unwrap_or(DEFAULT_MAX_DISPLACEMENT),
            max_log_volume_step: moves
                .max_log_volume_step
                .unwrap_or(DEFAULT_MAX_LOG_VOLUME_STEP),
            grand_canonical_probabilities,
            gibbs_probabilities,
            gas_box_side: conditions.gas_box_side,
            gas_particles: conditions.gas_particles.unwrap_or(0),
            equilibration_steps: run.equilibration_steps.unwrap_or(0),
            production_steps: args
                .steps
                .or(run.production_steps)
                .ok_or_else(|| required("run.production-steps", "--steps"))?,
            blocks: run.blocks.unwrap_or(DEFAULT_BLOCKS),
            chains: args.chains.or(run.chains).unwrap_or(1),
            seed: args.seed.or(run.seed),
            series_output: args.output.clone().or(output.series),
            moves_output: output.moves,
            constants: PhysicalConstants::default(),
        };

        if settings.chains == 0 {
            return Err(CliError::Config(
                "The number of chains must be at least 1.".to_string(),
            ));
        }
        if settings.ensemble == EnsembleKind::Gibbs && settings.gas_box_side.is_none() {
            return Err(required("conditions.gas-box-side", "-S conditions.gas-box-side=..."));
        }
        Ok(settings)
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value_str)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };

            match key {
                "guest.type" => {
                    self.guest.get_or_insert_with(Default::default).particle_type =
                        Some(value_str.to_string());
                }
                "guest.charge" => {
                    self.guest.get_or_insert_with(Default::default).charge =
                        Some(parse_value(key, value_str)?);
                }
                "guest.mass" => {
                    self.guest.get_or_insert_with(Default::default).mass =
                        Some(parse_value(key, value_str)?);
                }
                "conditions.temperature" => {
                    self.conditions.get_or_insert_with(Default::default).temperature =
                        Some(parse_value(key, value_str)?);
                }
                "conditions.pressure" => {
                    self.conditions.get_or_insert_with(Default::default).pressure =
                        Some(parse_value(key, value_str)?);
                }
                "conditions.gas-box-side" => {
                    self.conditions.get_or_insert_with(Default::default).gas_box_side =
                        Some(parse_value(key, value_str)?);
                }
                "conditions.gas-particles" => {
                    self.conditions.get_or_insert_with(Default::default).gas_particles =
                        Some(parse_value(key, value_str)?);
                }
                "moves.max-displacement" => {
                    self.moves.get_or_insert_with(Default::default).max_displacement =
                        Some(parse_value(key, value_str)?);
                }
                "moves.max-log-volume-step" => {
                    self.moves.get_or_insert_with(Default::default).max_log_volume_step =
                        Some(parse_value(key, value_str)?);
                }
                "run.equilibration-steps" => {
                    self.run.get_or_insert_with(Default::default).equilibration_steps =
                        Some(parse_value(key, value_str)?);
                }
                "run.production-steps" => {
                    self.run.get_or_insert_with(Default::default).production_steps =
                        Some(parse_value(key, value_str)?);
                }
                "run.blocks" => {
                    self.run.get_or_insert_with(Default::default).blocks =
                        Some(parse_value(key, value_str)?);
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}

impl RunSettings {
    /// The workflow configuration of chain `chain`, seeded with `seed + chain` when a seed is set.
    pub fn chain_config(&self, chain: usize) -> Result<AdsorptionConfig> {
        let seed = self.seed.map(|s| s.wrapping_add(chain as u64));
        let ensemble = match self.ensemble {
            EnsembleKind::GrandCanonical => {
                let [t, i, d] = self.grand_canonical_probabilities;
                let mut builder = GrandCanonicalConfigBuilder::new()
                    .temperature(self.temperature)
                    .pressure(self.pressure)
                    .max_displacement(self.max_displacement)
                    .mass(self.mass)
                    .move_probabilities(t, i, d)
                    .guest(self.guest.clone())
                    .constants(self.constants);
                if let Some(seed) = seed {
                    builder = builder.seed(seed);
                }
                Ensemble::GrandCanonical(builder.build().map_err(config_error)?)
            }
            EnsembleKind::Gibbs => {
                let side = self
                    .gas_box_side
                    .ok_or_else(|| required("conditions.gas-box-side", "-S conditions.gas-box-side=..."))?;
                let mut gas = CubicBox::new(side).map_err(|e| CliError::Config(e.to_string()))?;
                let mut rng = match seed {
                    Some(seed) => StdRng::seed_from_u64(seed),
                    None => StdRng::from_entropy(),
                };
                gas.fill_random(&self.guest, self.gas_particles, &mut rng);

                let [t, g, v, s] = self.gibbs_probabilities;
                let mut builder = GibbsConfigBuilder::new()
                    .temperature(self.temperature)
                    .pressure(self.pressure)
                    .max_displacement(self.max_displacement)
                    .max_log_volume_step(self.max_log_volume_step)
                    .gas(gas)
                    .move_probabilities(t, g, v, s)
                    .constants(self.constants);
                if let Some(seed) = seed {
                    builder = builder.seed(seed);
                }
                Ensemble::Gibbs(builder.build().map_err(config_error)?)
            }
        };
        Ok(AdsorptionConfig {
            ensemble,
            equilibration_steps: self.equilibration_steps,
            production_steps: self.production_steps,
            blocks: self.blocks,
        })
    }
}

fn required(key: &str, flag: &str) -> CliError {
    CliError::Config(format!(
        "A value for '{}' is required either in the config file or via {}.",
        key, flag
    ))
}

fn config_error(e: ptmonte::engine::config::ConfigError) -> CliError {
    CliError::Config(e.to_string())
}

fn parse_value<T: FromStr>(key: &str, value_str: &str) -> Result<T> {
    value_str.parse().map_err(|_| {
        CliError::Config(format!("Invalid value for {}: {}", key, value_str))
    })
}
