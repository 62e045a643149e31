//! Ant Colony Optimization for the TSP.
//!
//! This module implements the classic Ant System: every ant builds a full
//! tour with roulette-wheel selection, deposits `q / length` on the edges of
//! its tour right away, and the whole matrix evaporates once per iteration.

use crate::error::{ColonyError, Result};
use crate::instance::TspInstance;
use crate::matrix::Matrix;
use crate::solution::Solution;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{Duration, Instant};

/// Pheromone level on every edge before the first iteration
pub const INITIAL_PHEROMONE: f64 = 0.01;

/// ACO configuration parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ACOConfig {
    /// Number of ants per iteration
    pub num_ants: usize,
    /// Number of iterations used when the caller does not give one
    pub num_iterations: usize,
    /// Pheromone importance (alpha)
    pub alpha: f64,
    /// Heuristic importance (beta)
    pub beta: f64,
    /// Evaporation rate (rho)
    pub rho: f64,
    /// Pheromone deposit factor
    pub q: f64,
    /// Random seed, `None` draws one from the OS
    pub seed: Option<u64>,
}

impl Default for ACOConfig {
    fn default() -> Self {
        ACOConfig {
            num_ants: 10,
            num_iterations: 100,
            alpha: 1.0,
            beta: 2.0,
            rho: 0.5,
            q: 100.0,
            seed: None,
        }
    }
}

impl ACOConfig {
    /// Load a configuration from a JSON file. Missing fields keep their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: ACOConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check parameter ranges
    pub fn validate(&self) -> Result<()> {
        fn invalid(name: &'static str, value: f64, constraint: &'static str) -> Result<()> {
            Err(ColonyError::InvalidParameter { name, value, constraint })
        }

        // Written as negated comparisons so that NaN is rejected too
        if !(self.alpha >= 0.0 && self.alpha.is_finite()) {
            return invalid("alpha", self.alpha, "must be finite and >= 0");
        }
        if !(self.beta >= 0.0 && self.beta.is_finite()) {
            return invalid("beta", self.beta, "must be finite and >= 0");
        }
        if !(0.0..=1.0).contains(&self.rho) {
            return invalid("rho", self.rho, "must lie in [0, 1]");
        }
        if !(self.q > 0.0 && self.q.is_finite()) {
            return invalid("q", self.q, "must be finite and > 0");
        }
        Ok(())
    }
}

/// Ant Colony Optimization solver
pub struct AntColonyOptimization<R = ChaCha8Rng> {
    config: ACOConfig,
    instance: TspInstance,
    pheromone: Matrix,
    best: Option<(Vec<usize>, f64)>,
    history: Vec<f64>,
    iterations_completed: usize,
    elapsed: Duration,
    rng: R,
}

impl AntColonyOptimization<ChaCha8Rng> {
    /// Build a colony seeded from `config.seed`, or from OS entropy when unset
    pub fn new(instance: TspInstance, config: ACOConfig) -> Result<Self> {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self::with_rng(instance, config, rng)
    }
}

impl<R: Rng> AntColonyOptimization<R> {
    /// Build a colony drawing from the given random stream
    pub fn with_rng(instance: TspInstance, config: ACOConfig, rng: R) -> Result<Self> {
        config.validate()?;

        let pheromone = Matrix::filled_with(instance.dimension(), INITIAL_PHEROMONE);

        Ok(AntColonyOptimization {
            config,
            instance,
            pheromone,
            best: None,
            history: Vec::new(),
            iterations_completed: 0,
            elapsed: Duration::ZERO,
            rng,
        })
    }

    /// Run `num_iterations` more iterations, continuing from the current pheromone state
    pub fn run(&mut self, num_iterations: usize) {
        let start = Instant::now();

        for _ in 0..num_iterations {
            for _ in 0..self.config.num_ants {
                let tour = self.construct_tour();
                let distance = self.score_tour(&tour);
                self.reinforce(&tour, distance);
                self.update_best(tour, distance);
            }

            self.evaporate();
            self.iterations_completed += 1;

            if let Some(best) = self.best_distance() {
                self.history.push(best);
                log::trace!("Iteration {}: best distance {:.2}", self.iterations_completed, best);
            }
        }

        self.elapsed += start.elapsed();

        match self.best_distance() {
            Some(best) => log::info!(
                "ACO finished {} iterations ({} total), best distance {:.2}",
                num_iterations,
                self.iterations_completed,
                best
            ),
            None => log::info!(
                "ACO finished {} iterations without completing a tour",
                num_iterations
            ),
        }
    }

    /// Run the iteration count stored in the configuration
    pub fn run_configured(&mut self) {
        self.run(self.config.num_iterations);
    }

    /// Build one ant's tour from a uniformly random start city
    pub fn construct_tour(&mut self) -> Vec<usize> {
        let n = self.instance.dimension();
        let mut tour = Vec::with_capacity(n);
        let mut visited = vec![false; n];

        let mut current = self.rng.gen_range(0..n);
        tour.push(current);
        visited[current] = true;

        while tour.len() < n {
            match self.select_next_city(current, &visited) {
                Some(next) => {
                    tour.push(next);
                    visited[next] = true;
                    current = next;
                }
                None => break,
            }
        }

        tour
    }

    /// Roulette-wheel choice among unvisited cities, weighted by
    /// `pheromone^alpha * (1 / distance)^beta`.
    ///
    /// When rounding (or a zero / NaN weight sum) leaves the wheel without a
    /// winner, the first unvisited city by index is returned. `None` only if
    /// every city is already visited.
    fn select_next_city(&mut self, current: usize, visited: &[bool]) -> Option<usize> {
        let n = self.instance.dimension();
        let mut scores = vec![0.0; n];
        let mut total = 0.0;

        for j in 0..n {
            if visited[j] {
                continue;
            }

            let tau = self.pheromone[current][j].powf(self.config.alpha);
            let eta = (1.0 / self.instance.distance(current, j)).powf(self.config.beta);
            scores[j] = tau * eta;
            total += scores[j];
        }

        let pick = self.rng.gen::<f64>() * total;
        let mut cumulative = 0.0;

        for j in 0..n {
            if visited[j] {
                continue;
            }
            cumulative += scores[j];
            if cumulative >= pick {
                return Some(j);
            }
        }

        log::trace!(
            "Roulette wheel from city {} found no winner (total {}), taking first unvisited",
            current,
            total
        );
        visited.iter().position(|&v| !v)
    }

    /// Closed tour length
    pub fn score_tour(&self, tour: &[usize]) -> f64 {
        self.instance.tour_length(tour)
    }

    /// Deposit `q / distance` on both directions of every edge of the closed tour
    fn reinforce(&mut self, tour: &[usize], distance: f64) {
        // Single-city tours only have the zero-length self loop
        if tour.len() < 2 || distance <= 0.0 {
            return;
        }

        let delta = self.config.q / distance;
        let m = tour.len();
        for i in 0..m {
            let from = tour[i];
            let to = tour[(i + 1) % m];
            self.pheromone.add_symmetric(from, to, delta);
        }
    }

    fn evaporate(&mut self) {
        let keep = 1.0 - self.config.rho;
        self.pheromone.map_inplace(|tau| tau * keep);
    }

    /// Strict improvement only, so the first of equally long tours is kept
    fn update_best(&mut self, tour: Vec<usize>, distance: f64) {
        let improved = match &self.best {
            None => true,
            Some((_, best)) => distance < *best,
        };

        if improved {
            log::debug!(
                "New best tour of length {:.2} at iteration {}",
                distance,
                self.iterations_completed + 1
            );
            self.best = Some((tour, distance));
        }
    }

    /// Best tour found so far, `None` before any ant has completed a tour
    pub fn best_route(&self) -> Option<&[usize]> {
        self.best.as_ref().map(|(tour, _)| tour.as_slice())
    }

    /// Length of the best tour, `None` before any ant has completed a tour
    pub fn best_distance(&self) -> Option<f64> {
        self.best.as_ref().map(|&(_, distance)| distance)
    }

    /// Get best solution found
    pub fn best_solution(&self) -> Option<Solution> {
        self.best.as_ref().map(|(tour, _)| {
            let mut solution = Solution::from_tour(&self.instance, tour.clone(), "ACO");
            solution.computation_time = self.elapsed.as_secs_f64();
            solution.iterations = Some(self.iterations_completed);
            solution
        })
    }

    #[inline]
    pub fn pheromone(&self, i: usize, j: usize) -> f64 {
        self.pheromone[i][j]
    }

    pub fn pheromones(&self) -> &Matrix {
        &self.pheromone
    }

    /// Best distance after each completed iteration
    pub fn history(&self) -> &[f64] {
        &self.history
    }

    pub fn iterations_completed(&self) -> usize {
        self.iterations_completed
    }

    pub fn instance(&self) -> &TspInstance {
        &self.instance
    }

    pub fn config(&self) -> &ACOConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;

    fn seeded(seed: u64) -> ACOConfig {
        ACOConfig {
            seed: Some(seed),
            ..Default::default()
        }
    }

    fn is_permutation(tour: &[usize], n: usize) -> bool {
        let mut seen = vec![false; n];
        tour.len() == n
            && tour.iter().all(|&c| c < n && !std::mem::replace(&mut seen[c], true))
    }

    #[test]
    fn test_default_config_matches_sample_parameters() {
        let config = ACOConfig::default();
        assert_eq!(config.num_ants, 10);
        assert_eq!(config.num_iterations, 100);
        assert_eq!(config.alpha, 1.0);
        assert_eq!(config.beta, 2.0);
        assert_eq!(config.rho, 0.5);
        assert_eq!(config.q, 100.0);
    }

    #[test]
    fn test_invalid_parameters() {
        let cases = [
            ACOConfig { alpha: -1.0, ..Default::default() },
            ACOConfig { beta: f64::NAN, ..Default::default() },
            ACOConfig { rho: 1.5, ..Default::default() },
            ACOConfig { rho: -0.1, ..Default::default() },
            ACOConfig { q: 0.0, ..Default::default() },
        ];

        for config in cases {
            let result = AntColonyOptimization::new(TspInstance::sample(), config);
            assert!(matches!(result, Err(ColonyError::InvalidParameter { .. })));
        }
    }

    #[test]
    fn test_initial_state() {
        let aco = AntColonyOptimization::new(TspInstance::sample(), seeded(1)).unwrap();
        assert!(aco.best_route().is_none());
        assert!(aco.best_distance().is_none());
        assert!(aco.best_solution().is_none());
        assert!(aco.pheromones().rows().flatten().all(|&t| t == INITIAL_PHEROMONE));
    }

    #[test]
    fn test_sample_converges() {
        for seed in 0..5 {
            let mut aco = AntColonyOptimization::new(TspInstance::sample(), seeded(seed)).unwrap();
            aco.run(100);
            let best = aco.best_distance().unwrap();
            assert!(best <= 90.0, "seed {} ended at {}", seed, best);
        }
    }

    #[test]
    fn test_best_route_is_scored_permutation() {
        let instance = TspInstance::sample();
        let mut aco = AntColonyOptimization::new(instance.clone(), seeded(7)).unwrap();
        aco.run(5);

        let route = aco.best_route().unwrap();
        assert!(is_permutation(route, 5));
        assert_eq!(aco.best_distance().unwrap(), instance.tour_length(route));

        let solution = aco.best_solution().unwrap();
        assert!(solution.is_complete(&instance));
        assert_eq!(solution.iterations, Some(5));
    }

    #[test]
    fn test_history_is_monotone() {
        let mut aco = AntColonyOptimization::new(TspInstance::sample(), seeded(3)).unwrap();
        aco.run(30);
        assert_eq!(aco.history().len(), 30);
        assert!(aco.history().windows(2).all(|w| w[1] <= w[0]));
    }

    #[test]
    fn test_single_city() {
        let instance = TspInstance::from_matrix(1, vec![vec![0.0]]).unwrap();
        let mut aco = AntColonyOptimization::new(instance, seeded(0)).unwrap();
        aco.run(3);
        assert_eq!(aco.best_route(), Some(&[0][..]));
        assert_eq!(aco.best_distance(), Some(0.0));
        assert!(aco.pheromone(0, 0).is_finite());
    }

    #[test]
    fn test_deterministic_with_seed() {
        let mut a = AntColonyOptimization::new(TspInstance::sample(), seeded(42)).unwrap();
        let mut b = AntColonyOptimization::new(TspInstance::sample(), seeded(42)).unwrap();
        a.run(20);
        b.run(20);
        assert_eq!(a.best_route(), b.best_route());
        assert_eq!(a.best_distance(), b.best_distance());
        assert_eq!(a.pheromones(), b.pheromones());
    }

    #[test]
    fn test_injected_rng() {
        let config = ACOConfig::default();
        let rng = StdRng::seed_from_u64(9);
        let mut aco = AntColonyOptimization::with_rng(TspInstance::sample(), config, rng).unwrap();
        aco.run(2);
        assert!(aco.best_route().is_some());
    }

    #[test]
    fn test_pheromone_stays_symmetric() {
        let rows = vec![
            vec![0.0, 3.0, 4.0, 2.0, 7.0, 5.0],
            vec![3.0, 0.0, 4.0, 6.0, 3.0, 1.0],
            vec![4.0, 4.0, 0.0, 5.0, 8.0, 9.0],
            vec![2.0, 6.0, 5.0, 0.0, 6.0, 2.0],
            vec![7.0, 3.0, 8.0, 6.0, 0.0, 4.0],
            vec![5.0, 1.0, 9.0, 2.0, 4.0, 0.0],
        ];
        let instance = TspInstance::from_matrix(6, rows).unwrap();
        let mut aco = AntColonyOptimization::new(instance, seeded(11)).unwrap();
        for _ in 0..5 {
            aco.run(3);
            assert!(aco.pheromones().is_symmetric());
        }
    }

    #[test]
    fn test_no_iterations_or_no_ants() {
        let mut aco = AntColonyOptimization::new(TspInstance::sample(), seeded(0)).unwrap();
        aco.run(0);
        assert!(aco.best_route().is_none());

        let config = ACOConfig { num_ants: 0, seed: Some(0), ..Default::default() };
        let mut aco = AntColonyOptimization::new(TspInstance::sample(), config).unwrap();
        aco.run(10);
        assert!(aco.best_route().is_none());
        assert!(aco.history().is_empty());
        assert_eq!(aco.iterations_completed(), 10);
    }

    #[test]
    fn test_run_continues_without_reset() {
        let mut aco = AntColonyOptimization::new(TspInstance::sample(), seeded(5)).unwrap();
        aco.run(1);
        let after_first = aco.pheromones().clone();
        assert_ne!(after_first, Matrix::filled_with(5, INITIAL_PHEROMONE));

        aco.run(2);
        assert_eq!(aco.iterations_completed(), 3);
        assert_eq!(aco.history().len(), 3);
        assert_eq!(aco.best_solution().unwrap().iterations, Some(3));
    }

    #[test]
    fn test_construct_tour_is_permutation() {
        let mut aco = AntColonyOptimization::new(TspInstance::sample(), seeded(2)).unwrap();
        for _ in 0..50 {
            let tour = aco.construct_tour();
            assert!(is_permutation(&tour, 5));
        }
    }

    #[test]
    fn test_select_skips_visited() {
        let mut aco = AntColonyOptimization::new(TspInstance::sample(), seeded(4)).unwrap();
        let visited = [true, false, true, true, false];
        for _ in 0..50 {
            let next = aco.select_next_city(0, &visited).unwrap();
            assert!(next == 1 || next == 4);
        }

        let visited = [true, true, true, false, true];
        assert_eq!(aco.select_next_city(4, &visited), Some(3));
        assert_eq!(aco.select_next_city(4, &[true; 5]), None);
    }

    #[test]
    fn test_select_falls_back_to_first_unvisited() {
        let mut aco = AntColonyOptimization::new(TspInstance::sample(), seeded(4)).unwrap();
        aco.pheromone = Matrix::filled_with(5, f64::NAN);
        let visited = [true, false, false, true, false];
        for _ in 0..10 {
            assert_eq!(aco.select_next_city(0, &visited), Some(1));
        }

        // Zero pheromone gives a zero weight sum
        aco.pheromone = Matrix::new(5);
        assert_eq!(aco.select_next_city(3, &[false, true, false, true, false]), Some(0));
    }

    #[test]
    fn test_reinforce_and_evaporate() {
        let mut aco = AntColonyOptimization::new(TspInstance::sample(), seeded(0)).unwrap();
        let tour = [0, 1, 2, 3, 4];
        aco.reinforce(&tour, 85.0);

        let expected = INITIAL_PHEROMONE + 100.0 / 85.0;
        for (a, b) in [(0, 1), (1, 2), (2, 3), (3, 4), (4, 0)] {
            assert!((aco.pheromone(a, b) - expected).abs() < 1e-12);
            assert!((aco.pheromone(b, a) - expected).abs() < 1e-12);
        }
        assert_eq!(aco.pheromone(0, 2), INITIAL_PHEROMONE);

        aco.evaporate();
        assert!((aco.pheromone(0, 1) - expected * 0.5).abs() < 1e-12);
        assert!((aco.pheromone(0, 2) - INITIAL_PHEROMONE * 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_deposit_per_ant_and_evaporation_per_iteration() {
        let config = ACOConfig { num_ants: 4, ..seeded(21) };
        let mut colony = AntColonyOptimization::new(TspInstance::sample(), config.clone()).unwrap();
        let mut replay = AntColonyOptimization::new(TspInstance::sample(), config).unwrap();

        colony.run(1);

        for _ in 0..4 {
            let tour = replay.construct_tour();
            let distance = replay.score_tour(&tour);
            replay.reinforce(&tour, distance);
        }
        replay.evaporate();

        assert_eq!(colony.pheromones(), replay.pheromones());
    }

    #[test]
    fn test_ties_keep_first_best() {
        let mut aco = AntColonyOptimization::new(TspInstance::sample(), seeded(0)).unwrap();
        aco.update_best(vec![0, 1, 2, 3, 4], 85.0);
        aco.update_best(vec![4, 3, 2, 1, 0], 85.0);
        assert_eq!(aco.best_route(), Some(&[0, 1, 2, 3, 4][..]));

        aco.update_best(vec![0, 2, 1, 3, 4], 111.0);
        assert_eq!(aco.best_distance(), Some(85.0));
    }

    #[test]
    fn test_config_from_json_file() {
        let path = std::env::temp_dir().join("aco_tsp_solver_config_test.json");
        std::fs::write(&path, r#"{ "num_ants": 4, "rho": 0.2, "seed": 17 }"#).unwrap();
        let config = ACOConfig::from_json_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.num_ants, 4);
        assert_eq!(config.rho, 0.2);
        assert_eq!(config.seed, Some(17));
        assert_eq!(config.beta, 2.0);

        let path = std::env::temp_dir().join("aco_tsp_solver_bad_config_test.json");
        std::fs::write(&path, r#"{ "rho": 2.0 }"#).unwrap();
        let result = ACOConfig::from_json_file(&path);
        std::fs::remove_file(&path).ok();
        assert!(matches!(result, Err(ColonyError::InvalidParameter { name: "rho", .. })));
    }
}
