//! Input/output adapters.
//!
//! Readers populate the core data structures once at startup: crystal structures from CIF
//! files and Lennard-Jones tables from RASPA-style definition files. The writer side exports
//! the recorded particle-count series and per-move acceptance summaries as CSV.

pub mod cif;
pub mod raspa;
pub mod series;
pub mod traits;
