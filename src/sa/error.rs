//! Error types for the annealing optimizer.

use thiserror::Error;

/// Errors that prevent an annealing run from starting or completing.
///
/// Ordinary terminations (convergence, iteration bound, a batch without
/// accepted candidates) are not errors; they are reported as a
/// [`Termination`](super::Termination).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SaError {
    /// A required option has no value and no default.
    #[error("missing required parameter `{0}`")]
    MissingParameter(&'static str),

    /// An option holds a value outside its admissible range.
    #[error("invalid value {value} for parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Canonical option name.
        name: &'static str,
        /// Offending value.
        value: f64,
        /// What the option requires.
        reason: &'static str,
    },

    /// The initial guess has zero dimensions.
    #[error("initial guess must have at least one component")]
    EmptyInitialGuess,

    /// `anneal` was called before any initial guess was set.
    #[error("no initial guess has been set")]
    NoInitialGuess,

    /// The covariance of the sampled states could not be factorized.
    #[error("covariance of sampled states is not positive definite (cooling iteration {cooling_iteration})")]
    NotPositiveDefinite {
        /// Number of completed cooling iterations when the update failed.
        cooling_iteration: usize,
    },
}

impl SaError {
    /// Returns `true` for errors raised before the run starts.
    pub fn is_configuration(&self) -> bool {
        !self.is_numerical()
    }

    /// Returns `true` for numerical failures raised during the run.
    pub fn is_numerical(&self) -> bool {
        matches!(self, SaError::NotPositiveDefinite { .. })
    }
}
