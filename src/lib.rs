//! Adaptive simulated annealing for continuous optimization.
//!
//! The [`sa`] module provides a derivative-free global optimizer for a
//! scalar objective over `R^n`:
//!
//! - **Isotropic** candidate generation: uniform random steps of fixed
//!   length scale, cooling after every sample.
//! - **Adaptive** candidate generation (Vanderbilt & Louie): steps reshaped
//!   by the scaled Cholesky factor of the covariance of recently visited
//!   states, cooling once per temperature level.
//!
//! Runs are reproducible for a fixed seed and a deterministic objective.
//! Configuration and numerical failures are reported as typed
//! [`sa::SaError`] values; ordinary stops are a [`sa::Termination`].
//!
//! # Architecture
//!
//! The objective is an opaque callable; parameter files, geometry and
//! anything else that defines a cost live in the calling crate.
//!
//! # Example
//!
//! ```
//! use u_anneal::sa::{Direction, SaConfig, SaRunner};
//!
//! let config = SaConfig::default()
//!     .with_direction(Direction::Minimize)
//!     .with_step_length_factor(0.2)
//!     .with_num_cost_samples(25)
//!     .with_max_cooling_iterations(5_000);
//!
//! let rosenbrock = |x: &[f64]| (1.0 - x[0]).powi(2) + 100.0 * (x[1] - x[0] * x[0]).powi(2);
//! let result = SaRunner::run(rosenbrock, &config, vec![-1.0, 1.0]).unwrap();
//! assert!(result.best_cost <= 4.0);
//! ```

pub mod sa;
