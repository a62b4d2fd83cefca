//! # ptmonte Core Library
//!
//! A grand-canonical Monte Carlo engine for simulating guest-particle adsorption inside a
//! rigid, periodic host framework.
//!
//! ## Architectural Philosophy
//!
//! The library keeps the same three-layer split throughout:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Particle`, `Lattice`, `Adsorbent`,
//!   `CubicBox`), the pairwise Lennard-Jones + Coulomb force field, physical constants, and
//!   the file adapters that populate them (CIF, RASPA definition tables, CSV export).
//!
//! - **[`engine`]: The Monte Carlo Kernel.** The stateful layer: move kinds with their
//!   ensemble-specific acceptance rules, the `Simulation` driver that samples moves from a
//!   categorical distribution, configuration builders, and time-series statistics.
//!
//! - **[`workflows`]: The Public API.** Complete procedures such as an adsorption run
//!   (equilibrate, reset, produce, summarise) built from the two layers below.

pub mod core;
pub mod engine;
pub mod workflows;
