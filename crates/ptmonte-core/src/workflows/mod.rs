//! # Workflows Module
//!
//! High-level entry points that orchestrate complete simulations.
//!
//! ## Overview
//!
//! A workflow takes fully loaded inputs (a force field and a resolved lattice), assembles a
//! simulation, runs its phases with progress reporting, and returns the recorded series
//! together with summary statistics and move acceptance rates.
//!
//! - **Adsorption Workflow** ([`adsorption`]) - Equilibration, counter reset and production
//!   for grand-canonical or two-phase runs.

pub mod adsorption;
