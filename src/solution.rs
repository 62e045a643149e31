//! Solution representation for the TSP.
//!
//! A solution is a closed tour over every city together with its length and
//! a few bookkeeping fields describing how it was obtained.

use crate::instance::TspInstance;
use serde::{Deserialize, Serialize};

/// Represents a solution to the TSP
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Solution {
    /// The tour as a permutation of city indices (implicitly closed)
    pub tour: Vec<usize>,
    /// Total closed tour length
    pub cost: f64,
    /// Algorithm that generated this solution
    pub algorithm: String,
    /// Computation time in seconds
    pub computation_time: f64,
    /// Number of iterations (if applicable)
    pub iterations: Option<usize>,
}

impl Solution {
    /// Create a solution from a tour
    pub fn from_tour(instance: &TspInstance, tour: Vec<usize>, algorithm: &str) -> Self {
        let cost = instance.tour_length(&tour);

        Solution {
            tour,
            cost,
            algorithm: algorithm.to_string(),
            computation_time: 0.0,
            iterations: None,
        }
    }

    /// Check if every city is visited exactly once
    pub fn is_complete(&self, instance: &TspInstance) -> bool {
        if self.tour.len() != instance.dimension() {
            return false;
        }

        let mut seen = vec![false; instance.dimension()];
        for &city in &self.tour {
            if city >= instance.dimension() || seen[city] {
                return false;
            }
            seen[city] = true;
        }
        true
    }

    /// The same tour rotated so that it starts at city 0
    pub fn normalized_tour(&self) -> Vec<usize> {
        let mut tour = self.tour.clone();
        if let Some(pos) = tour.iter().position(|&c| c == 0) {
            tour.rotate_left(pos);
        }
        tour
    }
}

impl std::fmt::Display for Solution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Solution ({})", self.algorithm)?;
        writeln!(f, "  Cost: {:.2}", self.cost)?;
        writeln!(f, "  Time: {:.4}s", self.computation_time)?;
        if let Some(iter) = self.iterations {
            writeln!(f, "  Iterations: {}", iter)?;
        }
        writeln!(f, "  Tour: {:?}", self.tour)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solution_from_tour() {
        let instance = TspInstance::sample();
        let sol = Solution::from_tour(&instance, vec![2, 3, 4, 0, 1], "test");
        assert_eq!(sol.cost, 85.0);
        assert!(sol.is_complete(&instance));
        assert_eq!(sol.normalized_tour(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_incomplete_tours() {
        let instance = TspInstance::sample();
        let short = Solution::from_tour(&instance, vec![0, 1, 2, 3], "test");
        assert!(!short.is_complete(&instance));

        let duplicate = Solution::from_tour(&instance, vec![0, 1, 1, 3, 4], "test");
        assert!(!duplicate.is_complete(&instance));
    }

    #[test]
    fn test_display_and_json() {
        let instance = TspInstance::sample();
        let mut sol = Solution::from_tour(&instance, vec![0, 1, 2, 3, 4], "ACO");
        sol.iterations = Some(3);
        let text = sol.to_string();
        assert!(text.contains("Cost: 85.00"));
        assert!(text.contains("Iterations: 3"));

        let json = serde_json::to_string(&sol).unwrap();
        let back: Solution = serde_json::from_str(&json).unwrap();
        assert_eq!(back.tour, sol.tour);
    }
}
