//! # Core Module
//!
//! Fundamental building blocks of the adsorption engine.
//!
//! - **Particles and cells** ([`models`]) - Point particles, triclinic lattices, the guest
//!   adsorbent phase and the cubic gas box, together with their periodic wrapping rules
//! - **Energy model** ([`forcefield`]) - Lennard-Jones parameter tables, mixing rules,
//!   type resolution and pairwise / aggregate energy sums
//! - **Physical constants** ([`constants`]) - Unit conversions shared by the force field and
//!   the move acceptance rules
//! - **File I/O** ([`io`]) - Readers for crystal structures and force-field tables, and CSV
//!   export of recorded observables
//!
//! Energies are expressed in Kelvin (energy divided by the Boltzmann constant), lengths in
//! Angstroms, pressures in Pascal and masses in atomic mass units.

pub mod constants;
pub mod forcefield;
pub mod io;
pub mod models;
