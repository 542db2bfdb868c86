//! Estimates an ALAAM on a simulated network with Equilibrium Expectation and
//! then refines the estimate with Robbins-Monro.
//!
//! Usage: `alaam-demo [config.toml]`. Traces are written to
//! `theta_values_demo.txt` and `dzA_values_demo.txt` in the working directory.

use std::error::Error;
use std::time::Instant;

use mini_alaam::change_stats::{Activity, BinaryCovariate, Contagion, ContinuousCovariate, Density};
use mini_alaam::config::EstimationConfig;
use mini_alaam::estimator::Estimator;
use mini_alaam::model::Model;
use mini_alaam::network::Graph;
use mini_alaam::sampler::{basic_sampler, SampleMode};
use mini_alaam::trace::NoTrace;
use ndarray::array;
use rand::distributions::Bernoulli;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

const NODES: usize = 500;
const EDGE_PROBABILITY: f64 = 0.01;
const SIMULATION_PROPOSALS: usize = 200_000;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => EstimationConfig::from_toml_file(path)?,
        None => EstimationConfig::default().set_seed(42),
    };

    let mut rng = SmallRng::seed_from_u64(config.seed ^ 0x5eed);
    let mut g = Graph::erdos_renyi(NODES, EDGE_PROBABILITY, &mut rng)?;
    let coin = Bernoulli::new(0.5)?;
    let normal = Normal::new(0.0, 1.0)?;
    g.set_binary_attribute("binary", (0..NODES).map(|_| Some(coin.sample(&mut rng))).collect())?;
    g.set_continuous_attribute("continuous", (0..NODES).map(|_| normal.sample(&mut rng)).collect())?;

    let model = Model::<Graph>::empty()
        .with(Density)
        .with(Activity)
        .with(Contagion)
        .with_labelled(BinaryCovariate::new("binary"), "Binary")
        .with_labelled(ContinuousCovariate::new("continuous"), "Continuous");

    // Simulate an outcome vector from known parameters.
    let true_theta = array![-1.0, 0.0, 0.5, 1.0, 1.0];
    let mut observed = vec![0u8; NODES];
    basic_sampler(
        &g,
        &mut observed,
        &model,
        &true_theta,
        SIMULATION_PROPOSALS,
        SampleMode::PerformMove,
        &mut rng,
    )?;
    println!("Simulated outcome from theta = {true_theta}");

    let mut estimator = Estimator::new(&g, &model, config)?;

    let start = Instant::now();
    let ee = estimator.run_ee_to_files(&observed, ".", "demo")?;
    println!("Equilibrium Expectation ({:.2?}):\n{ee}", start.elapsed());

    let start = Instant::now();
    match estimator.run_sa(&observed, Some(&ee.theta), &mut NoTrace) {
        Ok(sa) => println!("Robbins-Monro ({:.2?}):\n{sa}", start.elapsed()),
        Err(e) => eprintln!("Robbins-Monro failed: {e}"),
    }
    Ok(())
}
