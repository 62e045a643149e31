//! Benchmarking module for the ACO solver.
//!
//! Runs the colony several times on one instance with consecutive seeds,
//! one run after another, collects per-run results and summarises them.

use crate::error::{ColonyError, Result};
use crate::heuristics::aco::{ACOConfig, AntColonyOptimization};
use crate::instance::TspInstance;

use indicatif::{ProgressBar, ProgressStyle};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::fs::File;
use std::path::Path;

/// Result of a single seeded run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    /// Instance name
    pub instance: String,
    /// Instance dimension
    pub dimension: usize,
    /// Run index
    pub run: usize,
    /// Seed used for this run
    pub seed: u64,
    /// Best tour length, absent if no ant completed a tour
    pub cost: Option<f64>,
    /// Computation time in seconds
    pub time: f64,
    /// Iterations performed
    pub iterations: usize,
    /// Gap to best known in percent (if available)
    pub gap_to_best: Option<f64>,
    /// Best tour, cities joined with '-'
    pub tour: String,
}

/// Aggregated statistics over all runs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkStatistics {
    pub instance: String,
    pub num_runs: usize,
    /// Runs that produced a tour
    pub num_solved: usize,
    pub best_cost: f64,
    pub worst_cost: f64,
    pub avg_cost: f64,
    /// Sample standard deviation, 0 for a single run
    pub std_cost: f64,
    pub avg_time: f64,
    pub total_time: f64,
    /// Runs that reached the best known value
    pub hits: Option<usize>,
    pub avg_gap: Option<f64>,
}

/// Benchmark configuration
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    /// Number of seeded runs
    pub num_runs: usize,
    /// Seed of the first run, run `k` uses `base_seed + k` (wrapping)
    pub base_seed: u64,
    /// Best known tour length used for gaps and hit counts
    pub best_known: Option<f64>,
    /// Draw a progress bar on stderr
    pub show_progress: bool,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        BenchmarkConfig {
            num_runs: 5,
            base_seed: 0,
            best_known: None,
            show_progress: true,
        }
    }
}

/// Benchmarking engine
pub struct Benchmark {
    config: BenchmarkConfig,
    results: Vec<RunResult>,
}

impl Benchmark {
    pub fn new(config: BenchmarkConfig) -> Self {
        Benchmark {
            config,
            results: Vec::new(),
        }
    }

    /// Run the colony `num_runs` times on `instance`. The seed in `aco_config` is replaced per run.
    pub fn run(&mut self, instance: &TspInstance, aco_config: &ACOConfig) -> Result<()> {
        if let Some(best) = self.config.best_known {
            if !(best > 0.0 && best.is_finite()) {
                return Err(ColonyError::InvalidParameter {
                    name: "best_known",
                    value: best,
                    constraint: "must be finite and > 0",
                });
            }
        }

        log::info!(
            "Benchmarking {} (n={}) with {} runs",
            instance.name,
            instance.dimension(),
            self.config.num_runs
        );

        let progress = if self.config.show_progress {
            ProgressBar::new(self.config.num_runs as u64)
        } else {
            ProgressBar::hidden()
        };
        if let Ok(style) = ProgressStyle::with_template("{bar:40} {pos}/{len} runs ({elapsed})") {
            progress.set_style(style);
        }

        for run in 0..self.config.num_runs {
            let seed = self.config.base_seed.wrapping_add(run as u64);
            let config = ACOConfig {
                seed: Some(seed),
                ..aco_config.clone()
            };

            let mut aco = AntColonyOptimization::new(instance.clone(), config)?;
            aco.run_configured();

            self.record_result(instance, &aco, run, seed);
            progress.inc(1);
        }

        progress.finish_and_clear();
        Ok(())
    }

    fn record_result(
        &mut self,
        instance: &TspInstance,
        aco: &AntColonyOptimization,
        run: usize,
        seed: u64,
    ) {
        let solution = aco.best_solution();
        let cost = solution.as_ref().map(|s| s.cost);
        let gap_to_best = cost
            .zip(self.config.best_known)
            .map(|(cost, best)| (cost - best) / best * 100.0);

        let tour = solution
            .as_ref()
            .map(|s| {
                s.tour
                    .iter()
                    .map(|c| c.to_string())
                    .collect::<Vec<_>>()
                    .join("-")
            })
            .unwrap_or_default();

        log::debug!("Run {} (seed {}): cost {:?}", run, seed, cost);

        self.results.push(RunResult {
            instance: instance.name.clone(),
            dimension: instance.dimension(),
            run,
            seed,
            cost,
            time: solution.as_ref().map(|s| s.computation_time).unwrap_or(0.0),
            iterations: aco.iterations_completed(),
            gap_to_best,
            tour,
        });
    }

    /// Summarise the recorded runs, `None` if no run produced a tour
    pub fn compute_statistics(&self) -> Option<BenchmarkStatistics> {
        let solved: Vec<&RunResult> = self.results.iter().filter(|r| r.cost.is_some()).collect();
        if solved.is_empty() {
            return None;
        }

        let costs: Vec<f64> = solved.iter().filter_map(|r| r.cost).collect();
        let times: Vec<f64> = solved.iter().map(|r| r.time).collect();
        let gaps: Vec<f64> = solved.iter().filter_map(|r| r.gap_to_best).collect();

        let std_cost = if costs.len() > 1 { costs.iter().std_dev() } else { 0.0 };

        let hits = self.config.best_known.map(|best| {
            costs.iter().filter(|&&c| c <= best + 1e-9).count()
        });

        let avg_gap = if gaps.is_empty() {
            None
        } else {
            Some(gaps.iter().mean())
        };

        Some(BenchmarkStatistics {
            instance: solved[0].instance.clone(),
            num_runs: self.results.len(),
            num_solved: solved.len(),
            best_cost: costs.iter().cloned().fold(f64::INFINITY, f64::min),
            worst_cost: costs.iter().cloned().fold(0.0, f64::max),
            avg_cost: costs.iter().mean(),
            std_cost,
            avg_time: times.iter().mean(),
            total_time: times.iter().sum(),
            hits,
            avg_gap,
        })
    }

    /// Run with the shortest tour, first one on ties
    pub fn best_run(&self) -> Option<&RunResult> {
        self.results
            .iter()
            .filter(|r| r.cost.is_some())
            .min_by_key(|r| OrderedFloat(r.cost.unwrap_or(f64::INFINITY)))
    }

    /// Export results to CSV
    pub fn export_to_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);

        for result in &self.results {
            writer.serialize(result)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Export statistics to CSV
    pub fn export_statistics_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);

        if let Some(stats) = self.compute_statistics() {
            writer.serialize(stats)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Generate summary report
    pub fn generate_report(&self) -> String {
        let mut report = String::new();

        report.push_str("========================================\n");
        report.push_str("        ACO TSP Benchmark Report\n");
        report.push_str("========================================\n");
        report.push_str(&format!(
            "Generated: {}\n\n",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        ));

        report.push_str(&format!("{:<6} {:>10} {:>12} {:>10} {:>10}\n", "Run", "Seed", "Cost", "Gap%", "Time"));
        report.push_str("-".repeat(52).as_str());
        report.push('\n');

        for result in &self.results {
            let cost_str = result
                .cost
                .map(|c| format!("{:.2}", c))
                .unwrap_or_else(|| "-".to_string());
            let gap_str = result
                .gap_to_best
                .map(|g| format!("{:.2}%", g))
                .unwrap_or_else(|| "-".to_string());

            report.push_str(&format!(
                "{:<6} {:>10} {:>12} {:>10} {:>10.4}\n",
                result.run, result.seed, cost_str, gap_str, result.time
            ));
        }

        report.push_str("-".repeat(52).as_str());
        report.push('\n');

        match self.compute_statistics() {
            Some(stats) => {
                report.push_str(&format!("Solved: {}/{}\n", stats.num_solved, stats.num_runs));
                report.push_str(&format!("Best: {:.2}  Worst: {:.2}\n", stats.best_cost, stats.worst_cost));
                report.push_str(&format!("Mean: {:.2}  Std: {:.2}\n", stats.avg_cost, stats.std_cost));
                report.push_str(&format!("Avg time: {:.4}s  Total: {:.4}s\n", stats.avg_time, stats.total_time));
                if let Some(hits) = stats.hits {
                    report.push_str(&format!("Hit best known: {}/{}\n", hits, stats.num_solved));
                }
            }
            None => report.push_str("No run produced a tour\n"),
        }

        if let Some(best) = self.best_run() {
            report.push_str(&format!("Best tour (run {}): {}\n", best.run, best.tour));
        }

        report
    }

    /// Get all results
    pub fn results(&self) -> &[RunResult] {
        &self.results
    }
}
