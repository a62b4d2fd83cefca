use crate::core::constants::PhysicalConstants;
use tracing::debug;

/// The ideal-gas reservoir a grand-canonical system exchanges particles with.
///
/// `Λ³` and `μ` are derived once from temperature, pressure and guest mass and stay fixed
/// for the lifetime of the moves that hold a copy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reservoir {
    /// Temperature in K.
    pub temperature: f64,
    /// Cubed thermal de Broglie wavelength in Å³.
    pub lambda3: f64,
    /// Chemical potential divided by `k_B`, in K.
    pub mu: f64,
}

impl Reservoir {
    pub fn new(constants: &PhysicalConstants, mass: f64, temperature: f64, pressure: f64) -> Self {
        let lambda3 = constants.thermal_wavelength_cubed(mass, temperature);
        let mu = constants.chemical_potential(lambda3, pressure, temperature);
        debug!(
            "Reservoir at T = {} K, P = {} Pa, m = {} amu: Λ³ = {:.6e} Å³, μ/k_B = {:.4} K.",
            temperature, pressure, mass, lambda3, mu
        );
        Self {
            temperature,
            lambda3,
            mu,
        }
    }

    /// Ideal-gas activity `exp(μ/T)/Λ³`, i.e. the reservoir number density `P/(k_B·T)` in Å⁻³.
    pub fn activity(&self) -> f64 {
        (self.mu / self.temperature).exp() / self.lambda3
    }
}
