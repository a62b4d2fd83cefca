/// Boltzmann constant expressed in Pa·Å³/K.
pub const BOLTZMANN_ANGSTROM: f64 = 1.38065e7;
/// Thermal de Broglie prefactor in Å for a mass in amu and a temperature in K.
pub const DE_BROGLIE: f64 = 17.458;
/// Coulomb conversion factor in K·Å/e².
pub const ELECTRIC_CONSTANT: f64 = 1.67105e5;

/// Unit conversions used by the energy model and the acceptance rules.
///
/// The value is immutable once constructed and is handed to every component that needs it,
/// so that independent simulations can run with different unit systems side by side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicalConstants {
    /// Boltzmann constant in the length unit of the system (Pa·Å³/K).
    pub boltzmann: f64,
    /// Prefactor `λ0` of the thermal wavelength `Λ = λ0 / sqrt(m·T)`.
    pub de_broglie: f64,
    /// Electrostatic conversion constant `k_e` (K·Å/e²).
    pub electric: f64,
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self {
            boltzmann: BOLTZMANN_ANGSTROM,
            de_broglie: DE_BROGLIE,
            electric: ELECTRIC_CONSTANT,
        }
    }
}

impl PhysicalConstants {
    /// Cubed thermal de Broglie wavelength in Å³.
    #[inline]
    pub fn thermal_wavelength_cubed(&self, mass: f64, temperature: f64) -> f64 {
        (self.de_broglie / (mass * temperature).sqrt()).powi(3)
    }

    /// Reservoir chemical potential `μ = T·ln(Λ³·P / (k_B·T))`, in Kelvin.
    #[inline]
    pub fn chemical_potential(&self, lambda3: f64, pressure: f64, temperature: f64) -> f64 {
        temperature * (lambda3 * pressure / (self.boltzmann * temperature)).ln()
    }
}
