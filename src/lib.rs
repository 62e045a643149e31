//! ACO TSP Solver Library
//!
//! Approximate solutions to the symmetric Traveling Salesman Problem using
//! Ant Colony Optimization (Ant System).
//!
//! # Features
//!
//! - Validated instances from distance matrices or TSP-LIB files
//! - Seedable, sequential Ant System with per-ant pheromone deposit and
//!   per-iteration evaporation
//! - Repeated-run benchmarking with CSV export
//!
//! # Example
//!
//! ```no_run
//! use aco_tsp_solver::heuristics::aco::{ACOConfig, AntColonyOptimization};
//! use aco_tsp_solver::instance::TspInstance;
//!
//! let instance = TspInstance::sample();
//! let config = ACOConfig { seed: Some(42), ..Default::default() };
//!
//! let mut aco = AntColonyOptimization::new(instance, config).unwrap();
//! aco.run(100);
//!
//! if let (Some(route), Some(distance)) = (aco.best_route(), aco.best_distance()) {
//!     println!("Best route: {:?} ({:.2})", route, distance);
//! }
//! ```

pub mod error;
pub mod matrix;
pub mod instance;
pub mod solution;
pub mod heuristics;
pub mod benchmark;

pub use error::{ColonyError, Result};
pub use instance::TspInstance;
pub use solution::Solution;
