//! Parameter estimation for Autologistic Actor Attribute Models (ALAAM):
//! Equilibrium Expectation (Algorithm S then Algorithm EE) and Robbins-Monro
//! stochastic approximation over a binary outcome on a fixed network.

pub mod algorithm_ee;
pub mod algorithm_s;
pub mod change_stats;
pub mod config;
pub mod error;
pub mod estimator;
pub mod linalg;
pub mod model;
pub mod network;
mod progress;
pub mod sampler;
pub mod stats;
pub mod stochastic_approximation;
pub mod trace;
