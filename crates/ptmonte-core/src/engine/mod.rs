//! # Engine Module
//!
//! The stateful Monte Carlo machinery that samples guest adsorption in a rigid lattice.
//!
//! ## Overview
//!
//! A [`simulation::Simulation`] owns the mutable [`state::SystemState`] (the adsorbed guests
//! and, for two-phase runs, a bulk gas box), a weighted list of [`moves`], and a seeded
//! random number generator. It borrows the force field and the lattice, which stay immutable
//! for the whole run and can therefore be shared between independent chains.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Builders for grand-canonical and two-phase runs
//! - **Reservoir** ([`reservoir`]) - Thermal wavelength and chemical potential of the gas reservoir
//! - **Moves** ([`moves`]) - Translation, insertion, deletion, volume change and swap
//! - **Driver** ([`simulation`]) - Move selection, stepping, counters and the particle-count record
//! - **Statistics** ([`statistics`]) - Mean, variance and block-averaged errors of recorded series
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress events
//! - **Error Handling** ([`error`]) - Engine-level error aggregation

pub mod config;
pub mod error;
pub mod moves;
pub mod progress;
pub mod reservoir;
pub mod simulation;
pub mod state;
pub mod statistics;
