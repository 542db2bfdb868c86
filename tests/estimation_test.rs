//! End-to-end estimation runs through the public API.
//!
//! 1. `density_end_to_end`: a 10-node density-only model with three positive
//!    nodes has Zobs = [3] and a positive 1×1 Phase-1 covariance.
//! 2. `duplicate_statistics_are_degenerate`: redundant statistics abort
//!    Robbins-Monro without a theta.
//! 3. The remaining tests cover determinism, trace files and early
//!    configuration errors.

use mini_alaam::change_stats::{Activity, Contagion, Density};
use mini_alaam::config::EstimationConfig;
use mini_alaam::error::AlaamError;
use mini_alaam::estimator::Estimator;
use mini_alaam::model::Model;
use mini_alaam::network::Graph;
use mini_alaam::stochastic_approximation::stochastic_approximation;
use mini_alaam::trace::{trace_paths, MemoryTrace, NoTrace};
use ndarray::array;

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::SmallRng, SeedableRng};

    fn quick_config(seed: u64) -> EstimationConfig {
        EstimationConfig::default()
            .set_seed(seed)
            .with_sampler_m(100)
            .with_algorithm_s_iterations(10)
            .with_ee_iterations(10, 10)
            .with_sa_iterations_in_step(5)
            .with_sa_subphases(2)
    }

    fn network() -> (Graph, Vec<u8>) {
        let g = Graph::erdos_renyi(40, 0.1, &mut SmallRng::seed_from_u64(2024)).unwrap();
        let observed = (0..40).map(|i| (i % 3 == 0) as u8).collect();
        (g, observed)
    }

    #[test]
    fn density_end_to_end() {
        let g = Graph::new(10);
        let model = Model::<Graph>::empty().with(Density);
        let mut outcome = vec![0u8, 1, 0, 0, 1, 0, 1, 0, 0, 0];
        let mut rng = SmallRng::seed_from_u64(42);
        let est = stochastic_approximation(
            &g,
            &mut outcome,
            &model,
            &array![0.0],
            &quick_config(42),
            &mut NoTrace,
            &mut rng,
        )
        .unwrap();
        assert_eq!(est.zobs, array![3.0]);
        assert_eq!(est.covariance.shape(), &[1, 1]);
        assert!(est.covariance[[0, 0]] > 0.0);
    }

    #[test]
    fn duplicate_statistics_are_degenerate() {
        let g = Graph::new(10);
        let model = Model::<Graph>::empty().with(Density).with(Density);
        let observed = vec![1u8; 10];
        let mut estimator = Estimator::new(&g, &model, quick_config(1)).unwrap();
        let mut trace = MemoryTrace::default();
        let result = estimator.run_sa(&observed, Some(&array![50.0, 50.0]), &mut trace);
        match result {
            Err(AlaamError::DegenerateModel { rcond }) => assert!(rcond < f64::EPSILON),
            other => panic!("Expected a degenerate model, got {other:?}"),
        }
        assert!(trace.theta.is_empty());
    }

    #[test]
    fn ee_is_deterministic_for_a_seed() {
        let (g, observed) = network();
        let model = Model::<Graph>::empty()
            .with(Density)
            .with(Activity)
            .with(Contagion);
        let run = |seed: u64| {
            let mut estimator = Estimator::new(&g, &model, quick_config(seed)).unwrap();
            let mut trace = MemoryTrace::default();
            let estimate = estimator.run_ee(&observed, &mut trace).unwrap();
            (estimate, trace)
        };
        let (a, trace_a) = run(7);
        let (b, trace_b) = run(7);
        assert_eq!(a, b);
        assert_eq!(trace_a, trace_b);
        // 10 Algorithm S rows then one row per outer EE iteration
        assert_eq!(trace_a.theta.len(), 10 + 10);
        assert_eq!(trace_a.dza.len(), 10);
    }

    #[test]
    fn sa_is_deterministic_for_a_seed() {
        let (g, observed) = network();
        let model = Model::<Graph>::empty().with(Density).with(Activity);
        let run = || {
            let mut estimator = Estimator::new(&g, &model, quick_config(11)).unwrap();
            let mut trace = MemoryTrace::default();
            let estimate = estimator
                .run_sa(&observed, Some(&array![-0.5, 0.0]), &mut trace)
                .unwrap();
            (estimate, trace)
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn ee_writes_trace_files() {
        let (g, observed) = network();
        let model = Model::<Graph>::empty()
            .with(Density)
            .with_labelled(Contagion, "Influence");
        let dir = tempfile::tempdir().unwrap();
        let mut estimator = Estimator::new(&g, &model, quick_config(3)).unwrap();
        let estimate = estimator
            .run_ee_to_files(&observed, dir.path(), "ring")
            .unwrap();

        let (theta_path, dza_path) = trace_paths(dir.path(), "ring");
        let theta_text = std::fs::read_to_string(theta_path).unwrap();
        let dza_text = std::fs::read_to_string(dza_path).unwrap();

        let theta_lines: Vec<&str> = theta_text.lines().collect();
        assert_eq!(theta_lines[0], "t Density Influence AcceptanceRate");
        assert_eq!(theta_lines.len(), 1 + 10 + 10);
        assert!(theta_lines[1].starts_with("-10 "));
        assert!(theta_lines.last().unwrap().starts_with("100 "));
        for line in &theta_lines[1..] {
            let fields: Vec<f64> = line.split(' ').map(|f| f.parse().unwrap()).collect();
            assert_eq!(fields.len(), 4);
            assert!((0.0..=1.0).contains(&fields[3]));
        }
        let last: Vec<f64> = theta_lines
            .last()
            .unwrap()
            .split(' ')
            .map(|f| f.parse().unwrap())
            .collect();
        assert_eq!(&last[1..3], estimate.theta.as_slice().unwrap());

        let dza_lines: Vec<&str> = dza_text.lines().collect();
        assert_eq!(dza_lines[0], "t Density Influence");
        assert_eq!(dza_lines.len(), 1 + 10);
        assert!(dza_lines[1].starts_with("10 "));
    }

    #[test]
    fn configuration_errors_come_before_sampling() {
        let (g, observed) = network();
        let model = Model::<Graph>::empty().with(Density);
        let dir = tempfile::tempdir().unwrap();
        let mut estimator = Estimator::new(&g, &model, quick_config(5)).unwrap();

        let short = &observed[..10];
        let err = estimator
            .run_ee_to_files(short, dir.path(), "short")
            .unwrap_err();
        assert!(matches!(err, AlaamError::DimensionMismatch { .. }));
        // no trace files are created for a rejected run
        let (theta_path, _) = trace_paths(dir.path(), "short");
        assert!(!theta_path.exists());

        let mut bad = observed.clone();
        bad[5] = 3;
        let err = estimator.run_sa(&bad, None, &mut NoTrace).unwrap_err();
        assert!(matches!(err, AlaamError::InvalidOutcome { node: 5, value: 3 }));

        let err = estimator
            .run_sa(&observed, Some(&array![0.0, 0.0]), &mut NoTrace)
            .unwrap_err();
        assert!(err.is_configuration());

        let empty = Model::<Graph>::empty();
        let mut estimator = Estimator::new(&g, &empty, quick_config(5)).unwrap();
        assert!(estimator
            .run_ee(&observed, &mut NoTrace)
            .unwrap_err()
            .is_configuration());
    }

    #[test]
    fn config_file_drives_a_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.toml");
        std::fs::write(
            &path,
            "seed = 9\nsampler_m = 50\nalgorithm_s_iterations = 4\nee_outer_iterations = 3\nee_inner_iterations = 4\n",
        )
        .unwrap();
        let config = EstimationConfig::from_toml_file(&path).unwrap();
        let (g, observed) = network();
        let model = Model::<Graph>::empty().with(Density);
        let mut estimator = Estimator::new(&g, &model, config).unwrap();
        let mut trace = MemoryTrace::default();
        estimator.run_ee(&observed, &mut trace).unwrap();
        assert_eq!(trace.theta.len(), 4 + 3);
        assert_eq!(trace.theta.last().unwrap().0, 12);
    }
}
