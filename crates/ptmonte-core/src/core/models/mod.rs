//! # Core Models Module
//!
//! Data structures describing the simulated system: point particles and the periodic cells
//! they live in.
//!
//! ## Key Components
//!
//! - [`particle`] - Point particle with position, force-field type and partial charge
//! - [`cell`] - Cell parameters and the cartesian/fractional transform pair
//! - [`symmetry`] - Affine symmetry operators parsed once from `x,y,z` notation
//! - [`lattice`] - Rigid host framework expanded from an asymmetric unit
//! - [`adsorbent`] - Variable-size guest phase embedded in a lattice
//! - [`cubic_box`] - Variable-volume cubic bulk phase
//! - [`container`] - Traits shared by every cell that energy sums and moves operate on
//!
//! ## Usage
//!
//! ```ignore
//! use ptmonte::core::models::{cell::CellParameters, lattice::Lattice, adsorbent::Adsorbent};
//!
//! let lattice = Lattice::build(cell, &asymmetric_unit, &operators)?;
//! let adsorbent = Adsorbent::new(&lattice);
//! ```

pub mod adsorbent;
pub mod cell;
pub mod container;
pub mod cubic_box;
pub mod lattice;
pub mod particle;
pub mod symmetry;
