/*!
Algorithm EE: Equilibrium Expectation estimation.

The sampler runs with moves persisted, so the outcome vector drifts away from
the observed one. The net statistic change since the start of the run is the
discrepancy `dzA`; theta is nudged against its sign with a quadratic step so
that the chain is pulled back towards the observed statistics. After every
outer iteration the per-parameter step scale `D0` is rescaled by the inverse
coefficient of variation of theta across the inner iterations.

Byshkin M, Stivala A, Mira A, Robins G, Lomi A (2018). Fast maximum likelihood
estimation via equilibrium expectation for large network data. Scientific
Reports 8:11509.
*/

use ndarray::{Array1, Array2, Zip};
use rand::Rng;

use crate::config::EstimationConfig;
use crate::error::{ensure_finite, Result};
use crate::model::Model;
use crate::network::Network;
use crate::progress::progress_bar;
use crate::sampler::{basic_sampler, SampleMode};
use crate::stats::{column_mean_std, sign};
use crate::trace::TraceSink;

/**
Runs `ee_outer_iterations × ee_inner_iterations` sampler calls of `sampler_m`
proposals each, starting from `theta0` with step scale `d0`.

# Arguments

* `network` - The fixed network.
* `outcome` - Working outcome vector, mutated by accepted moves.
* `model` - The change statistics.
* `theta0` - Initial parameters, typically from [`crate::algorithm_s::algorithm_s`].
* `d0` - Initial per-parameter step scale.
* `config` - Iteration counts and the `ee_aca` / `ee_comp_c` multipliers.
* `trace` - Receives one theta row and one dzA row per outer iteration.
* `rng` - The run's random source.

# Returns

The final theta. There is no convergence test; judge convergence from the
trace.
*/
#[allow(clippy::too_many_arguments)]
pub fn algorithm_ee<N, R, T>(
    network: &N,
    outcome: &mut [u8],
    model: &Model<N>,
    theta0: &Array1<f64>,
    d0: &Array1<f64>,
    config: &EstimationConfig,
    trace: &mut T,
    rng: &mut R,
) -> Result<Array1<f64>>
where
    N: Network + ?Sized,
    R: Rng + ?Sized,
    T: TraceSink + ?Sized,
{
    model.check_theta(theta0)?;
    model.check_theta(d0)?;
    ensure_finite(d0, "Algorithm EE step scale", 0)?;

    let n = model.dimension();
    let outer = config.ee_outer_iterations;
    let inner = config.ee_inner_iterations;

    let mut theta = theta0.clone();
    let mut d0 = d0.clone();
    let mut dza = Array1::<f64>::zeros(n);
    let mut theta_matrix = Array2::<f64>::zeros((inner, n));
    let mut t = 0usize;
    let mut acceptance_rate = 0.0;

    let pb = progress_bar(config.show_progress, outer, "Algorithm EE");

    for touter in 0..outer {
        for tinner in 0..inner {
            let out = basic_sampler(
                network,
                outcome,
                model,
                &theta,
                config.sampler_m,
                SampleMode::PerformMove,
                rng,
            )
            .map_err(|e| e.at_iteration(t))?;
            acceptance_rate = out.acceptance_rate;
            dza += &out.net_change();

            Zip::from(&mut theta)
                .and(&dza)
                .and(&d0)
                .for_each(|th, &dz, &d| *th -= sign(dz) * d * config.ee_aca * dz * dz);
            ensure_finite(&theta, "Algorithm EE theta", t)?;

            theta_matrix.row_mut(tinner).assign(&theta);
            t += 1;
        }

        trace.record_theta(t as i64, &theta, acceptance_rate)?;
        trace.record_dza(t as i64, &dza)?;

        let (mut mean, sd) = column_mean_std(&theta_matrix)?;
        mean.mapv_inplace(|m| if m.abs() < 1.0 { 1.0 } else { m });
        Zip::from(&mut d0)
            .and(&mean)
            .and(&sd)
            .for_each(|d, &m, &s| *d *= config.ee_comp_c / (s / m.abs()));
        ensure_finite(&d0, "Algorithm EE step scale", t)?;

        log::debug!("EE outer iteration {touter}: theta = {theta}, acceptance rate = {acceptance_rate:.3}");
        pb.set_message(format!("AcceptRate={acceptance_rate:.3}"));
        pb.inc(1);
    }
    pb.finish_with_message("done");

    log::info!("Algorithm EE finished after {t} iterations: theta = {theta}");
    Ok(theta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm_s::algorithm_s;
    use crate::change_stats::{Activity, Contagion, Density};
    use crate::error::AlaamError;
    use crate::network::Graph;
    use crate::trace::{MemoryTrace, NoTrace};
    use ndarray::array;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn setup() -> (Graph, Vec<u8>) {
        let g = Graph::erdos_renyi(50, 0.08, &mut SmallRng::seed_from_u64(3)).unwrap();
        let a = (0..50).map(|i| (i % 5 == 0) as u8).collect();
        (g, a)
    }

    fn config() -> EstimationConfig {
        EstimationConfig::default()
            .set_seed(5)
            .with_sampler_m(100)
            .with_algorithm_s_iterations(10)
            .with_ee_iterations(8, 10)
    }

    #[test]
    fn trace_rows_use_cumulative_inner_count() {
        let (g, a) = setup();
        let model = Model::<Graph>::empty().with(Density).with(Activity);
        let mut outcome = a;
        let mut trace = MemoryTrace::default();
        let mut rng = SmallRng::seed_from_u64(1);
        let theta = algorithm_ee(
            &g,
            &mut outcome,
            &model,
            &array![-1.0, 0.0],
            &array![10.0, 1.0],
            &config(),
            &mut trace,
            &mut rng,
        )
        .unwrap();

        let ts: Vec<i64> = trace.theta.iter().map(|(t, _, _)| *t).collect();
        assert_eq!(ts, vec![10, 20, 30, 40, 50, 60, 70, 80]);
        let dza_ts: Vec<i64> = trace.dza.iter().map(|(t, _)| *t).collect();
        assert_eq!(dza_ts, ts);
        assert_eq!(trace.theta.last().unwrap().1, theta);
        assert!(outcome.iter().all(|&v| v <= 1));
    }

    #[test]
    fn dza_tracks_net_statistic_change() {
        // the density discrepancy is the change in the number of ones
        let (g, a) = setup();
        let model = Model::<Graph>::empty().with(Density);
        let start: f64 = a.iter().map(|&v| v as f64).sum();
        let mut outcome = a;
        let mut trace = MemoryTrace::default();
        let mut rng = SmallRng::seed_from_u64(2);
        algorithm_ee(
            &g,
            &mut outcome,
            &model,
            &array![-1.0],
            &array![5.0],
            &config(),
            &mut trace,
            &mut rng,
        )
        .unwrap();
        let end: f64 = outcome.iter().map(|&v| v as f64).sum();
        assert_eq!(trace.dza.last().unwrap().1[0], end - start);
    }

    #[test]
    fn warm_start_then_ee_is_deterministic() {
        let (g, a) = setup();
        let model = Model::<Graph>::empty()
            .with(Density)
            .with(Activity)
            .with(Contagion);
        let run = || {
            let mut rng = SmallRng::seed_from_u64(99);
            let mut outcome = a.clone();
            let mut trace = MemoryTrace::default();
            let warm = algorithm_s(&g, &mut outcome, &model, &config(), &mut trace, &mut rng).unwrap();
            let theta = algorithm_ee(
                &g,
                &mut outcome,
                &model,
                &warm.theta,
                &warm.d_mean,
                &config(),
                &mut trace,
                &mut rng,
            )
            .unwrap();
            (theta, trace)
        };
        let (theta1, trace1) = run();
        let (theta2, trace2) = run();
        assert_eq!(theta1, theta2);
        assert_eq!(trace1, trace2);
    }

    #[test]
    fn frozen_parameter_is_a_numerical_error() {
        // a zero step scale keeps theta constant, so its coefficient of
        // variation is zero and the rescaled scale is infinite
        let (g, a) = setup();
        let model = Model::<Graph>::empty().with(Density);
        let mut outcome = a;
        let mut rng = SmallRng::seed_from_u64(2);
        let err = algorithm_ee(
            &g,
            &mut outcome,
            &model,
            &array![-1.0],
            &array![0.0],
            &config(),
            &mut NoTrace,
            &mut rng,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            AlaamError::Numerical {
                context: "Algorithm EE step scale",
                ..
            }
        ));
    }

    #[test]
    fn step_scale_dimension_is_checked() {
        let (g, a) = setup();
        let model = Model::<Graph>::empty().with(Density);
        let mut outcome = a;
        let mut rng = SmallRng::seed_from_u64(2);
        let err = algorithm_ee(
            &g,
            &mut outcome,
            &model,
            &array![-1.0],
            &array![1.0, 1.0],
            &config(),
            &mut NoTrace,
            &mut rng,
        )
        .unwrap_err();
        assert!(err.is_configuration());
    }
}
