/*!
Algorithm S: a crude warm start for Equilibrium Expectation.

The sampler is run in dry-run mode, so the outcome vector never changes, and
theta climbs in the direction of the sign of the to-0 minus to-1 discrepancy
with a step scaled by the inverse squared change-statistic sum. The squared
discrepancies are accumulated into `D0`, whose inverse (times the batch size)
is the per-parameter step scale handed to Algorithm EE.

Byshkin M, Stivala A, Mira A, Robins G, Lomi A (2018). Fast maximum likelihood
estimation via equilibrium expectation for large network data. Scientific
Reports 8:11509.
*/

use ndarray::{Array1, Zip};
use rand::Rng;

use crate::config::EstimationConfig;
use crate::error::{ensure_finite, Result};
use crate::model::Model;
use crate::network::Network;
use crate::sampler::{basic_sampler, SampleMode};
use crate::stats::sign;
use crate::trace::TraceSink;

/// Result of Algorithm S.
#[derive(Debug, Clone, PartialEq)]
pub struct WarmStart {
    pub theta: Array1<f64>,
    /// Per-parameter step scale, `sampler_m / D0`.
    pub d_mean: Array1<f64>,
}

/**
Runs `config.algorithm_s_iterations` dry-run sampler calls of
`config.sampler_m` proposals each.

Theta rows are recorded with iteration index `t - M1`, so they precede the
rows of a following Algorithm EE run in the same trace.

# Errors

[`crate::error::AlaamError::Numerical`] if theta becomes non-finite or a
parameter's discrepancy was zero on every iteration (its step scale would be
infinite).
*/
pub fn algorithm_s<N, R, T>(
    network: &N,
    outcome: &mut [u8],
    model: &Model<N>,
    config: &EstimationConfig,
    trace: &mut T,
    rng: &mut R,
) -> Result<WarmStart>
where
    N: Network + ?Sized,
    R: Rng + ?Sized,
    T: TraceSink + ?Sized,
{
    let n = model.dimension();
    let m1 = config.algorithm_s_iterations;
    let sampler_m = config.sampler_m as f64;
    let max_step = config.algorithm_s_max_step;

    let mut theta = Array1::<f64>::zeros(n);
    let mut d0 = Array1::<f64>::zeros(n);

    for t in 0..m1 {
        let out = basic_sampler(
            network,
            outcome,
            model,
            &theta,
            config.sampler_m,
            SampleMode::DryRun,
            rng,
        )
        .map_err(|e| e.at_iteration(t))?;
        let dza = &out.to_zero - &out.to_one;
        let sum_changes = &out.to_one + &out.to_zero;
        d0 += &dza.mapv(|v| v * v);

        let da = sum_changes.mapv(|s| {
            if s != 0.0 {
                config.algorithm_s_aca / (s * s)
            } else {
                0.0
            }
        });
        let step = Zip::from(&dza)
            .and(&da)
            .map_collect(|&d, &a| (sign(d / sampler_m) * a * d * d).clamp(-max_step, max_step));
        theta += &step;
        ensure_finite(&theta, "Algorithm S theta", t)?;

        trace.record_theta(t as i64 - m1 as i64, &theta, out.acceptance_rate)?;
    }

    let d_mean = d0.mapv(|d| sampler_m / d);
    ensure_finite(&d_mean, "Algorithm S derivative estimate", m1)?;
    log::info!("Algorithm S finished: theta = {theta}, Dmean = {d_mean}");

    Ok(WarmStart { theta, d_mean })
}
