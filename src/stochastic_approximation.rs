/*!
Robbins-Monro stochastic approximation.

Phase 1 estimates the covariance `D` of the simulated statistics around the
starting theta and takes one Newton-like step `theta -= a · D⁻¹ (Z̄ − Zobs)`.
Phase 2 runs `sa_subphases` subphases of diagonal Robbins-Monro updates
`theta -= a · D0⁻¹ ⊙ (Z − Zobs)`, replacing theta with its subphase average and
halving `a` after each. Phase 3 (covariance of the estimator) is not run.

Snijders TAB (2002). Markov chain Monte Carlo estimation of exponential
random graph models. Journal of Social Structure 3(2).
*/

use ndarray::{Array1, Array2, Axis};
use rand::Rng;

use crate::config::EstimationConfig;
use crate::error::{ensure_finite, AlaamError, Result};
use crate::linalg::{inverse, reciprocal_condition_number};
use crate::model::Model;
use crate::network::Network;
use crate::progress::progress_bar;
use crate::sampler::{basic_sampler, SampleMode};
use crate::stats::{population_covariance, SuccessiveProducts};
use crate::trace::TraceSink;

/// Outcome of a completed Robbins-Monro run.
#[derive(Debug, Clone, PartialEq)]
pub struct SaEstimate {
    pub theta: Array1<f64>,
    /// Observed statistics.
    pub zobs: Array1<f64>,
    /// Phase-1 covariance of the simulated statistics.
    pub covariance: Array2<f64>,
}

/// Number of Phase-1 steps for `n` parameters.
pub fn phase1_steps(n: usize) -> usize {
    7 + 3 * n
}

/// Minimum and maximum iteration counts of Phase-2 subphase `k` (0-based).
pub fn subphase_bounds(k: usize, n: usize) -> (usize, usize) {
    let exponent = u32::try_from(4 * k / 3).unwrap_or(u32::MAX);
    let nk_min = 2usize.saturating_pow(exponent).saturating_mul(7 + n);
    (nk_min, nk_min.saturating_add(200))
}

/// A subphase always runs `nk_min` iterations, then continues while every
/// coordinate of the successive-products sum is negative, up to `nk_max`.
fn continue_subphase(i: usize, nk_min: usize, nk_max: usize, products: &SuccessiveProducts) -> bool {
    i < nk_max && (i < nk_min || products.all_negative())
}

/// Statistics of the current simulated configuration, kept as
/// `Zobs + Σ (to1 − to0)` over every persisted move of the run.
struct SimulatedStatistics {
    z: Array1<f64>,
}

impl SimulatedStatistics {
    fn step<N, R>(
        &mut self,
        network: &N,
        outcome: &mut [u8],
        model: &Model<N>,
        theta: &Array1<f64>,
        proposals: usize,
        rng: &mut R,
    ) -> Result<f64>
    where
        N: Network + ?Sized,
        R: Rng + ?Sized,
    {
        let out = basic_sampler(
            network,
            outcome,
            model,
            theta,
            proposals,
            SampleMode::PerformMove,
            rng,
        )?;
        self.z += &out.net_change();
        Ok(out.acceptance_rate)
    }
}

/**
Estimates theta by stochastic approximation, starting from `theta0` and the
observed outcome vector `outcome`, which is used as the chain's working state.

# Errors

* [`AlaamError::DegenerateModel`] if the reciprocal condition number of the
  Phase-1 covariance is below machine epsilon. No theta is returned.
* [`AlaamError::Numerical`] if the covariance cannot be inverted, has a zero
  variance on its diagonal, or theta becomes non-finite.
* Configuration errors for an invalid model, outcome vector or `theta0`.
*/
pub fn stochastic_approximation<N, R, T>(
    network: &N,
    outcome: &mut [u8],
    model: &Model<N>,
    theta0: &Array1<f64>,
    config: &EstimationConfig,
    trace: &mut T,
    rng: &mut R,
) -> Result<SaEstimate>
where
    N: Network + ?Sized,
    R: Rng + ?Sized,
    T: TraceSink + ?Sized,
{
    model.check_theta(theta0)?;
    ensure_finite(theta0, "initial theta", 0)?;
    let zobs = model.observed_statistics(network, outcome)?;
    log::info!("Zobs = {zobs}");

    let n = model.dimension();
    let steps_per_call = config.sa_iterations_in_step;
    let mut theta = theta0.clone();
    let mut sim = SimulatedStatistics { z: zobs.clone() };

    // Phase 1
    let steps = phase1_steps(n);
    let mut zmatrix = Array2::<f64>::zeros((steps, n));
    for i in 0..steps {
        sim.step(network, outcome, model, &theta, steps_per_call, rng)
            .map_err(|e| e.at_iteration(i))?;
        zmatrix.row_mut(i).assign(&sim.z);
    }
    let zmean = zmatrix
        .mean_axis(Axis(0))
        .ok_or_else(|| AlaamError::Configuration("no Phase 1 steps".to_string()))?;
    let d = population_covariance(&zmatrix)?;
    log::debug!("Phase 1: Zmean = {zmean}, D = {d}");

    let rcond = reciprocal_condition_number(&d);
    if rcond < f64::EPSILON {
        log::warn!("Covariance matrix is singular (rcond = {rcond:e}): degenerate model");
        return Err(AlaamError::DegenerateModel { rcond });
    }
    let d0inv = d.diag().mapv(|v| 1.0 / v);
    ensure_finite(&d0inv, "inverse covariance diagonal", 0)?;
    let dinv = inverse(&d)?;

    theta -= &(dinv.dot(&(&zmean - &zobs)) * config.sa_initial_step);
    ensure_finite(&theta, "Phase 1 theta", steps)?;
    log::info!("Phase 1 finished after {steps} steps: theta = {theta}");

    // Phase 2
    let mut a = config.sa_initial_step;
    let mut t = 0usize;
    for k in 0..config.sa_subphases {
        let (nk_min, nk_max) = subphase_bounds(k, n);
        log::debug!("Subphase {k}: a = {a}, NkMin = {nk_min}, NkMax = {nk_max}, theta = {theta}");

        let pb = progress_bar(config.show_progress, nk_max, &format!("Subphase {k}"));
        let mut products = SuccessiveProducts::new(n);
        let mut theta_sum = Array1::<f64>::zeros(n);
        let mut i = 0usize;
        while continue_subphase(i, nk_min, nk_max, &products) {
            let mut acceptance_rate = 0.0;
            for _ in 0..steps_per_call {
                acceptance_rate = sim
                    .step(network, outcome, model, &theta, steps_per_call, rng)
                    .map_err(|e| e.at_iteration(t))?;
            }
            let dz = &sim.z - &zobs;
            theta -= &(&d0inv * &dz * a);
            ensure_finite(&theta, "Phase 2 theta", t)?;
            theta_sum += &theta;
            products.push(&dz);
            i += 1;
            t += 1;

            trace.record_theta(t as i64, &theta, acceptance_rate)?;
            trace.record_dza(t as i64, &dz)?;
            pb.set_message(format!("AcceptRate={acceptance_rate:.3}"));
            pb.inc(1);
        }
        pb.set_length(i as u64);
        pb.finish_and_clear();

        theta = theta_sum / i as f64;
        a /= 2.0;
        log::debug!("Subphase {k} finished after {i} iterations: theta = {theta}");
    }

    // Phase 3 would re-estimate the covariance at the final theta.
    log::info!("Robbins-Monro finished: theta = {theta}");
    Ok(SaEstimate {
        theta,
        zobs,
        covariance: d,
    })
}
