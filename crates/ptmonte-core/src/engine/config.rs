use crate::core::constants::PhysicalConstants;
use crate::core::models::cubic_box::CubicBox;
use crate::core::models::particle::Particle;
use thiserror::Error;

/// Tolerance on the sum of a move-probability vector.
pub const PROBABILITY_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for '{name}': {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Settings of a grand-canonical run: a guest species exchanging with an ideal-gas reservoir.
#[derive(Debug, Clone, PartialEq)]
pub struct GrandCanonicalConfig {
    /// Temperature in K.
    pub temperature: f64,
    /// Reservoir pressure in Pa.
    pub pressure: f64,
    /// Edge length of the cube translation displacements are drawn from, in Å.
    pub max_displacement: f64,
    /// Guest mass in amu.
    pub mass: f64,
    /// Probabilities of translation, insertion and deletion, in that order.
    pub move_probabilities: [f64; 3],
    /// Template for inserted guests; only the type label and charge are used.
    pub guest: Particle,
    pub seed: Option<u64>,
    pub constants: PhysicalConstants,
}

#[derive(Default)]
pub struct GrandCanonicalConfigBuilder {
    temperature: Option<f64>,
    pressure: Option<f64>,
    max_displacement: Option<f64>,
    mass: Option<f64>,
    move_probabilities: Option<[f64; 3]>,
    guest: Option<Particle>,
    seed: Option<u64>,
    constants: Option<PhysicalConstants>,
}

impl GrandCanonicalConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn temperature(mut self, kelvin: f64) -> Self {
        self.temperature = Some(kelvin);
        self
    }
    pub fn pressure(mut self, pascal: f64) -> Self {
        self.pressure = Some(pascal);
        self
    }
    pub fn max_displacement(mut self, angstrom: f64) -> Self {
        self.max_displacement = Some(angstrom);
        self
    }
    pub fn mass(mut self, amu: f64) -> Self {
        self.mass = Some(amu);
        self
    }
    pub fn move_probabilities(mut self, translation: f64, insertion: f64, deletion: f64) -> Self {
        self.move_probabilities = Some([translation, insertion, deletion]);
        self
    }
    pub fn guest(mut self, template: Particle) -> Self {
        self.guest = Some(template);
        self
    }
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
    pub fn constants(mut self, constants: PhysicalConstants) -> Self {
        self.constants = Some(constants);
        self
    }

    pub fn build(self) -> Result<GrandCanonicalConfig, ConfigError> {
        let config = GrandCanonicalConfig {
            temperature: self
                .temperature
                .ok_or(ConfigError::MissingParameter("temperature"))?,
            pressure: self
                .pressure
                .ok_or(ConfigError::MissingParameter("pressure"))?,
            max_displacement: self
                .max_displacement
                .ok_or(ConfigError::MissingParameter("max_displacement"))?,
            mass: self.mass.ok_or(ConfigError::MissingParameter("mass"))?,
            move_probabilities: self
                .move_probabilities
                .ok_or(ConfigError::MissingParameter("move_probabilities"))?,
            guest: self.guest.ok_or(ConfigError::MissingParameter("guest"))?,
            seed: self.seed,
            constants: self.constants.unwrap_or_default(),
        };

        require_positive("temperature", config.temperature)?;
        require_positive("pressure", config.pressure)?;
        require_positive("mass", config.mass)?;
        require_non_negative("max_displacement", config.max_displacement)?;
        validate_probabilities(&config.move_probabilities)?;
        Ok(config)
    }
}

/// Settings of a two-phase run: an adsorbed phase in equilibrium with a bulk gas box.
#[derive(Debug, Clone, PartialEq)]
pub struct GibbsConfig {
    pub temperature: f64,
    pub pressure: f64,
    pub max_displacement: f64,
    /// Width of the uniform step applied to `ln V` of the gas box.
    pub max_log_volume_step: f64,
    /// Initial bulk phase; its particles must carry force-field type labels.
    pub gas: CubicBox,
    /// Probabilities of adsorbent translation, gas translation, volume change and swap.
    pub move_probabilities: [f64; 4],
    pub seed: Option<u64>,
    pub constants: PhysicalConstants,
}

#[derive(Default)]
pub struct GibbsConfigBuilder {
    temperature: Option<f64>,
    pressure: Option<f64>,
    max_displacement: Option<f64>,
    max_log_volume_step: Option<f64>,
    gas: Option<CubicBox>,
    move_probabilities: Option<[f64; 4]>,
    seed: Option<u64>,
    constants: Option<PhysicalConstants>,
}

impl GibbsConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn temperature(mut self, kelvin: f64) -> Self {
        self.temperature = Some(kelvin);
        self
    }
    pub fn pressure(mut self, pascal: f64) -> Self {
        self.pressure = Some(pascal);
        self
    }
    pub fn max_displacement(mut self, angstrom: f64) -> Self {
        self.max_displacement = Some(angstrom);
        self
    }
    pub fn max_log_volume_step(mut self, step: f64) -> Self {
        self.max_log_volume_step = Some(step);
        self
    }
    pub fn gas(mut self, gas: CubicBox) -> Self {
        self.gas = Some(gas);
        self
    }
    pub fn move_probabilities(
        mut self,
        adsorbent_translation: f64,
        gas_translation: f64,
        volume: f64,
        swap: f64,
    ) -> Self {
        self.move_probabilities = Some([adsorbent_translation, gas_translation, volume, swap]);
        self
    }
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
    pub fn constants(mut self, constants: PhysicalConstants) -> Self {
        self.constants = Some(constants);
        self
    }

    pub fn build(self) -> Result<GibbsConfig, ConfigError> {
        let config = GibbsConfig {
            temperature: self
                .temperature
                .ok_or(ConfigError::MissingParameter("temperature"))?,
            pressure: self
                .pressure
                .ok_or(ConfigError::MissingParameter("pressure"))?,
            max_displacement: self
                .max_displacement
                .ok_or(ConfigError::MissingParameter("max_displacement"))?,
            max_log_volume_step: self
                .max_log_volume_step
                .ok_or(ConfigError::MissingParameter("max_log_volume_step"))?,
            gas: self.gas.ok_or(ConfigError::MissingParameter("gas"))?,
            move_probabilities: self
                .move_probabilities
                .ok_or(ConfigError::MissingParameter("move_probabilities"))?,
            seed: self.seed,
            constants: self.constants.unwrap_or_default(),
        };

        require_positive("temperature", config.temperature)?;
        require_positive("pressure", config.pressure)?;
        require_non_negative("max_displacement", config.max_displacement)?;
        require_non_negative("max_log_volume_step", config.max_log_volume_step)?;
        validate_probabilities(&config.move_probabilities)?;
        Ok(config)
    }
}

fn require_positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            name,
            reason: format!("must be positive and finite, got {}", value),
        })
    }
}

fn require_non_negative(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            name,
            reason: format!("must be non-negative and finite, got {}", value),
        })
    }
}

/// Checks that `weights` form a categorical distribution.
pub fn validate_probabilities(weights: &[f64]) -> Result<(), ConfigError> {
    if weights.is_empty() {
        return Err(ConfigError::Invalid {
            name: "move_probabilities",
            reason: "at least one move is required".to_string(),
        });
    }
    if let Some(bad) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
        return Err(ConfigError::Invalid {
            name: "move_probabilities",
            reason: format!("weights must be non-negative, got {}", bad),
        });
    }
    let sum: f64 = weights.iter().sum();
    if (sum - 1.0).abs() > PROBABILITY_TOLERANCE {
        return Err(ConfigError::Invalid {
            name: "move_probabilities",
            reason: format!("weights must sum to 1, got {}", sum),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn methane() -> Particle {
        Particle::new("CH4", Point3::origin())
    }

    fn complete_gcmc() -> GrandCanonicalConfigBuilder {
        GrandCanonicalConfigBuilder::new()
            .temperature(300.0)
            .pressure(1.0e5)
            .max_displacement(1.0)
            .mass(16.04)
            .move_probabilities(0.4, 0.3, 0.3)
            .guest(methane())
    }

    #[test]
    fn gcmc_builder_succeeds_with_all_parameters() {
        let config = complete_gcmc().seed(7).build().unwrap();
        assert_eq!(config.temperature, 300.0);
        assert_eq!(config.move_probabilities, [0.4, 0.3, 0.3]);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.constants, PhysicalConstants::default());
    }

    #[test]
    fn gcmc_builder_reports_missing_parameter() {
        let result = GrandCanonicalConfigBuilder::new()
            .temperature(300.0)
            .pressure(1.0e5)
            .build();
        assert_eq!(
            result.unwrap_err(),
            ConfigError::MissingParameter("max_displacement")
        );
    }

    #[test]
    fn gcmc_builder_rejects_zero_temperature() {
        let result = complete_gcmc().temperature(0.0).build();
        assert!(matches!(
            result,
            Err(ConfigError::Invalid {
                name: "temperature",
                ..
            })
        ));
    }

    #[test]
    fn gcmc_builder_rejects_non_normalized_probabilities() {
        let result = complete_gcmc().move_probabilities(0.5, 0.3, 0.3).build();
        assert!(matches!(
            result,
            Err(ConfigError::Invalid {
                name: "move_probabilities",
                ..
            })
        ));
    }

    #[test]
    fn gibbs_builder_validates_volume_step() {
        let result = GibbsConfigBuilder::new()
            .temperature(300.0)
            .pressure(1.0e5)
            .max_displacement(1.0)
            .max_log_volume_step(-0.1)
            .gas(CubicBox::new(20.0).unwrap())
            .move_probabilities(0.25, 0.25, 0.25, 0.25)
            .build();
        assert!(matches!(
            result,
            Err(ConfigError::Invalid {
                name: "max_log_volume_step",
                ..
            })
        ));
    }

    #[test]
    fn validate_probabilities_accepts_rounding_noise() {
        assert!(validate_probabilities(&[0.1, 0.2, 0.7 + 1e-12]).is_ok());
        assert!(validate_probabilities(&[1.5, -0.5]).is_err());
        assert!(validate_probabilities(&[]).is_err());
    }
}
