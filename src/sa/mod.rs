//! Adaptive Simulated Annealing (SA) over continuous state spaces.
//!
//! A single-solution trajectory metaheuristic: candidates are drawn around
//! the current state and accepted with the Metropolis criterion at a
//! temperature that decreases exponentially. In adaptive mode, the step
//! distribution is reshaped after every temperature level from the
//! covariance of the states just visited, so that steps grow along
//! directions in which the objective is flat.
//!
//! # References
//!
//! - Kirkpatrick, Gelatt & Vecchi (1983), "Optimization by Simulated Annealing"
//! - Vanderbilt & Louie (1984), "A Monte Carlo Simulated Annealing Approach
//!   to Optimization over Continuous Variables"

mod acceptance;
mod adaptation;
mod candidate;
mod config;
mod convergence;
mod error;
mod runner;
mod state;
mod types;

pub use acceptance::acceptance_probability;
pub use adaptation::sample_covariance;
pub use config::{CandidateGeneration, Direction, SaConfig, DEFAULT_BETA, DEFAULT_XI};
pub use convergence::{is_converged, relative_spread};
pub use error::SaError;
pub use runner::{SaOptimizer, SaResult, SaRunner};
pub use types::{LevelEvent, ObjectiveFunction, OptimPoint, SaObserver, SampleEvent, Termination};
