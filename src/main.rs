//! ACO TSP Solver - Command Line Interface
//!
//! Ant Colony Optimization for the symmetric Traveling Salesman Problem.

use aco_tsp_solver::benchmark::{Benchmark, BenchmarkConfig};
use aco_tsp_solver::heuristics::aco::{ACOConfig, AntColonyOptimization};
use aco_tsp_solver::instance::TspInstance;
use aco_tsp_solver::Result;
use clap::{Args, Parser, Subcommand};

use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "aco-tsp-solver")]
#[command(author = "M2 AI2D Student")]
#[command(version = "1.0")]
#[command(about = "Ant Colony Optimization solver for the symmetric TSP")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve the built-in 5-city example with the reference parameters
    Demo {
        /// Random seed (random if omitted)
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Solve an instance file
    Solve {
        /// Path to the instance file
        #[arg(short, long)]
        instance: PathBuf,

        #[command(flatten)]
        params: ParamArgs,

        /// Output solution to file (JSON)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Run the colony several times with consecutive seeds
    Benchmark {
        /// Path to the instance file (built-in example if omitted)
        #[arg(short, long)]
        instance: Option<PathBuf>,

        #[command(flatten)]
        params: ParamArgs,

        /// Number of runs
        #[arg(short, long, default_value = "10")]
        runs: usize,

        /// Best known tour length, used for gaps
        #[arg(long)]
        best_known: Option<f64>,

        /// Output directory for results
        #[arg(short, long, default_value = "results")]
        output: PathBuf,
    },

    /// Analyze an instance
    Analyze {
        /// Path to the instance file
        #[arg(short, long)]
        instance: PathBuf,
    },
}

/// Algorithm parameters. Flags override values read from `--config`.
#[derive(Args)]
struct ParamArgs {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of ants per iteration
    #[arg(long)]
    ants: Option<usize>,

    /// Number of iterations
    #[arg(long)]
    iterations: Option<usize>,

    /// Pheromone importance
    #[arg(long)]
    alpha: Option<f64>,

    /// Distance heuristic importance
    #[arg(long)]
    beta: Option<f64>,

    /// Evaporation rate
    #[arg(long)]
    rho: Option<f64>,

    /// Pheromone deposit factor
    #[arg(short, long)]
    q: Option<f64>,

    /// Random seed
    #[arg(short, long)]
    seed: Option<u64>,
}

impl ParamArgs {
    fn to_config(&self) -> Result<ACOConfig> {
        let mut config = match &self.config {
            Some(path) => ACOConfig::from_json_file(path)?,
            None => ACOConfig::default(),
        };

        if let Some(ants) = self.ants {
            config.num_ants = ants;
        }
        if let Some(iterations) = self.iterations {
            config.num_iterations = iterations;
        }
        if let Some(alpha) = self.alpha {
            config.alpha = alpha;
        }
        if let Some(beta) = self.beta {
            config.beta = beta;
        }
        if let Some(rho) = self.rho {
            config.rho = rho;
        }
        if let Some(q) = self.q {
            config.q = q;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Demo { seed } => run_demo(seed),
        Commands::Solve { instance, params, output, verbose } => {
            solve_instance(&instance, &params, output, verbose)
        }
        Commands::Benchmark { instance, params, runs, best_known, output } => {
            run_benchmark(instance.as_deref(), &params, runs, best_known, &output)
        }
        Commands::Analyze { instance } => analyze_instance(&instance),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run_demo(seed: Option<u64>) -> Result<()> {
    let config = ACOConfig {
        seed,
        ..Default::default()
    };

    let mut aco = AntColonyOptimization::new(TspInstance::sample(), config)?;
    aco.run_configured();

    match (aco.best_route(), aco.best_distance()) {
        (Some(route), Some(distance)) => {
            println!("Best route: {:?}", route);
            println!("Best distance: {}", distance);
        }
        _ => println!("No route found"),
    }

    Ok(())
}

fn load_instance(path: &Path) -> Result<TspInstance> {
    println!("Loading instance from {:?}...", path);
    TspInstance::from_file(path)
}

fn solve_instance(path: &Path, params: &ParamArgs, output: Option<PathBuf>, verbose: bool) -> Result<()> {
    let instance = load_instance(path)?;
    let config = params.to_config()?;

    if verbose {
        println!("{}", instance.statistics());
        println!("Parameters: {:?}", config);
    }

    println!("Solving with ACO ({} ants, {} iterations)...", config.num_ants, config.num_iterations);
    let mut aco = AntColonyOptimization::new(instance, config)?;
    aco.run_configured();

    let Some(solution) = aco.best_solution() else {
        println!("No ant completed a tour (check the number of ants and iterations)");
        return Ok(());
    };

    println!("\n========== Results ==========");
    println!("Algorithm: {}", solution.algorithm);
    println!("Cost: {:.2}", solution.cost);
    println!("Time: {:.4}s", solution.computation_time);
    if let Some(iter) = solution.iterations {
        println!("Iterations: {}", iter);
    }
    println!("Tour: {:?}", solution.tour);

    if verbose {
        println!("\nConvergence (best per iteration): {:?}", aco.history());
    }

    if let Some(out_path) = output {
        let json = serde_json::to_string_pretty(&solution)?;
        std::fs::write(&out_path, json)?;
        println!("\nSolution saved to {:?}", out_path);
    }

    Ok(())
}

fn run_benchmark(
    path: Option<&Path>,
    params: &ParamArgs,
    runs: usize,
    best_known: Option<f64>,
    output: &Path,
) -> Result<()> {
    let instance = match path {
        Some(path) => load_instance(path)?,
        None => TspInstance::sample(),
    };
    let config = params.to_config()?;

    std::fs::create_dir_all(output)?;

    let bench_config = BenchmarkConfig {
        num_runs: runs,
        base_seed: config.seed.unwrap_or(0),
        best_known,
        ..Default::default()
    };

    println!("Benchmarking {} (n={}) over {} runs...", instance.name, instance.dimension(), runs);
    let mut benchmark = Benchmark::new(bench_config);
    benchmark.run(&instance, &config)?;

    let results_path = output.join("results.csv");
    benchmark.export_to_csv(&results_path)?;
    println!("\nResults exported to {:?}", results_path);

    let stats_path = output.join("statistics.csv");
    benchmark.export_statistics_csv(&stats_path)?;
    println!("Statistics exported to {:?}", stats_path);

    let report = benchmark.generate_report();
    println!("\n{}", report);

    let report_path = output.join("report.txt");
    std::fs::write(&report_path, &report)?;
    println!("Report saved to {:?}", report_path);

    Ok(())
}

fn analyze_instance(path: &Path) -> Result<()> {
    let instance = load_instance(path)?;

    println!("========== Instance Analysis ==========\n");
    println!("{}", instance.statistics());

    let n = instance.dimension();
    let nearest: Vec<f64> = (0..n)
        .filter_map(|i| {
            (0..n)
                .filter(|&j| j != i)
                .map(|j| instance.distance(i, j))
                .reduce(f64::min)
        })
        .collect();

    if !nearest.is_empty() {
        // Both tour edges at a city are at least its shortest incident edge
        let bound: f64 = nearest.iter().sum();
        println!("Nearest-neighbour edge sum (lower bound): {:.2}", bound);
    }

    Ok(())
}
