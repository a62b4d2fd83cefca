use crate::core::models::adsorbent::Adsorbent;
use crate::core::models::container::Container;
use crate::core::models::cubic_box::CubicBox;
use crate::core::models::lattice::Lattice;

/// The containers a simulation mutates: guests adsorbed in a fixed lattice and, for
/// two-phase runs, a bulk gas box.
#[derive(Debug, Clone)]
pub struct SystemState<'a> {
    pub lattice: &'a Lattice,
    pub adsorbent: Adsorbent<'a>,
    pub gas: Option<CubicBox>,
}

impl<'a> SystemState<'a> {
    /// An empty adsorbed phase with no gas box.
    pub fn new(lattice: &'a Lattice) -> Self {
        Self {
            lattice,
            adsorbent: Adsorbent::new(lattice),
            gas: None,
        }
    }

    pub fn with_gas(mut self, gas: CubicBox) -> Self {
        self.gas = Some(gas);
        self
    }

    pub fn adsorbed_count(&self) -> usize {
        self.adsorbent.len()
    }

    pub fn gas_count(&self) -> usize {
        self.gas.as_ref().map_or(0, |gas| gas.len())
    }
}
