//! Heuristics module for the TSP.
//!
//! This module exports the Ant Colony Optimization solver.

pub mod aco;

pub use aco::*;
