/// Squared distances at or below this value are treated as a self-interaction or a pair of
/// coincident particles and contribute exactly zero energy.
pub const SINGULARITY_THRESHOLD_SQ: f64 = 1e-5;

/// 12-6 Lennard-Jones energy from a squared distance and pre-combined parameters.
///
/// `sigma2` is the squared combined σ and `epsilon4` is four times the combined ε.
#[inline]
pub fn lennard_jones_12_6(r2: f64, sigma2: f64, epsilon4: f64) -> f64 {
    let s = sigma2 / r2;
    let s6 = s * s * s;
    epsilon4 * (s6 * s6 - s6)
}

/// Bare Coulomb energy `k_e·q1·q2 / r`, without any long-range correction.
#[inline]
pub fn coulomb(r2: f64, q1: f64, q2: f64, electric: f64) -> f64 {
    electric * q1 * q2 / r2.sqrt()
}
