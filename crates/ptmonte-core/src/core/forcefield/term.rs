use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// Energy split into its dispersion and electrostatic parts, in Kelvin.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EnergyTerm {
    pub vdw: f64,
    pub coulomb: f64,
}

impl EnergyTerm {
    pub fn new(vdw: f64, coulomb: f64) -> Self {
        Self { vdw, coulomb }
    }

    #[inline]
    pub fn total(&self) -> f64 {
        self.vdw + self.coulomb
    }
}

impl Add for EnergyTerm {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            vdw: self.vdw + rhs.vdw,
            coulomb: self.coulomb + rhs.coulomb,
        }
    }
}

impl AddAssign for EnergyTerm {
    fn add_assign(&mut self, rhs: Self) {
        self.vdw += rhs.vdw;
        self.coulomb += rhs.coulomb;
    }
}

impl Sum for EnergyTerm {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_returns_sum_of_both_terms() {
        let term = EnergyTerm::new(1.5, -2.0);
        assert_eq!(term.total(), -0.5);
    }

    #[test]
    fn add_sums_each_field_correctly() {
        let result = EnergyTerm::new(1.0, 2.0) + EnergyTerm::new(4.0, 5.0);
        assert_eq!(result, EnergyTerm::new(5.0, 7.0));
    }

    #[test]
    fn add_assign_accumulates_each_field_correctly() {
        let mut a = EnergyTerm::new(1.0, 2.0);
        a += EnergyTerm::new(-4.0, 5.0);
        assert_eq!(a, EnergyTerm::new(-3.0, 7.0));
    }

    #[test]
    fn sum_over_iterator_matches_fold() {
        let terms = vec![EnergyTerm::new(1.0, 0.5), EnergyTerm::new(2.0, -1.5), EnergyTerm::default()];
        let total: EnergyTerm = terms.into_iter().sum();
        assert_eq!(total, EnergyTerm::new(3.0, -1.0));
    }

    #[test]
    fn default_initializes_all_fields_to_zero() {
        let term = EnergyTerm::default();
        assert_eq!(term.vdw, 0.0);
        assert_eq!(term.coulomb, 0.0);
    }
}
