//! # Force Field Module
//!
//! The energy model of the engine: a pairwise 12-6 Lennard-Jones term plus a bare Coulomb
//! term, evaluated with the minimum-image distance of whichever cell the particles live in.
//!
//! ## Overview
//!
//! - Per-type raw parameters (σ, ε) are collected by a [`params::ForceFieldBuilder`] and
//!   combined once into symmetric `sigma2` / `epsilon4` matrices.
//! - Particle type labels are mapped onto table rows by [`resolution`], which keeps the legacy
//!   "prefix before separator" fallback used by framework force fields.
//! - [`energy`] provides the pair, single-particle and whole-container sums used by the moves.
//!
//! Long-range electrostatics (Ewald) are deliberately not part of the model.
//!
//! ## Usage
//!
//! ```ignore
//! use ptmonte::core::forcefield::params::ForceFieldBuilder;
//!
//! let forcefield = ForceFieldBuilder::new()
//!     .add_type("CH4_sp3", 3.73, 148.0)
//!     .build(&PhysicalConstants::default())?;
//! forcefield.resolve_type(&mut particle)?;
//! let energy = forcefield.interaction_energy(&particle, &lattice);
//! ```

pub mod energy;
pub mod params;
pub mod potentials;
pub mod resolution;
pub mod term;
