//! Core traits and value types for the annealing optimizer.

use std::fmt;

/// A scalar objective over a continuous state space.
///
/// Implemented for every `Fn(&[f64]) -> f64`, so closures can be passed
/// directly. The optimizer never mutates the objective and calls it with a
/// slice whose length equals the dimension of the initial guess.
///
/// Reproducible runs require the objective to be deterministic.
///
/// # Examples
///
/// ```
/// use u_anneal::sa::ObjectiveFunction;
///
/// let neg_sphere = |x: &[f64]| -x.iter().map(|v| v * v).sum::<f64>();
/// assert_eq!(neg_sphere.cost(&[1.0, 2.0]), -5.0);
/// ```
pub trait ObjectiveFunction {
    /// Evaluates the objective at `state`.
    fn cost(&self, state: &[f64]) -> f64;
}

impl<F> ObjectiveFunction for F
where
    F: Fn(&[f64]) -> f64,
{
    fn cost(&self, state: &[f64]) -> f64 {
        self(state)
    }
}

/// Why an annealing run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Termination {
    /// The sampled costs at one temperature level reached a plateau.
    Convergence,
    /// The maximum number of cooling iterations was reached.
    MaxCoolingIter,
    /// Adaptive mode only: no candidate was accepted during a whole level,
    /// so the state covariance cannot be estimated.
    NoCandidateAccepted,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Termination::Convergence => "CONVERGENCE",
            Termination::MaxCoolingIter => "MAX_COOLING_ITER",
            Termination::NoCandidateAccepted => "NO_CAND_ACCEPTED",
        };
        f.write_str(name)
    }
}

/// A point in the search space together with its objective value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OptimPoint {
    /// Coordinates of the point.
    pub state: Vec<f64>,
    /// Objective value at `state`.
    pub cost: f64,
}

/// Snapshot of one candidate evaluation, handed to [`SaObserver::on_sample`].
#[derive(Debug, Clone, Copy)]
pub struct SampleEvent<'a> {
    /// Zero-based temperature level.
    pub level: usize,
    /// Zero-based index of the sample within its level.
    pub sample: usize,
    /// The candidate that was evaluated.
    pub candidate: &'a [f64],
    /// Objective value of the candidate.
    pub candidate_cost: f64,
    /// Cost of the current state *after* the acceptance decision.
    pub current_cost: f64,
    /// Best cost *after* the acceptance decision.
    pub best_cost: f64,
    /// Temperature used for the acceptance test.
    pub temperature: f64,
    /// Metropolis acceptance probability, in `[0, 1]`.
    pub acceptance_probability: f64,
    /// Whether the candidate became the current state.
    pub accepted: bool,
    /// Whether the candidate became the new best state.
    pub improved: bool,
}

/// Summary of a completed temperature level, handed to
/// [`SaObserver::on_level`].
#[derive(Debug, Clone, Copy)]
pub struct LevelEvent {
    /// Zero-based temperature level.
    pub level: usize,
    /// Temperature after the level's cooling.
    pub temperature: f64,
    /// Candidates accepted during the level.
    pub accepted: usize,
    /// Best cost at the end of the level.
    pub best_cost: f64,
}

/// Read-only hooks into a running annealer.
///
/// Both methods default to doing nothing. `()` is the no-op observer.
pub trait SaObserver {
    /// Called after every candidate evaluation and acceptance decision.
    fn on_sample(&mut self, _event: &SampleEvent<'_>) {}

    /// Called once per completed temperature level.
    fn on_level(&mut self, _event: &LevelEvent) {}
}

impl SaObserver for () {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_is_objective() {
        let sum = |x: &[f64]| x.iter().sum::<f64>();
        assert_eq!(sum.cost(&[1.0, 2.0, 3.0]), 6.0);
    }

    #[test]
    fn test_termination_display() {
        assert_eq!(Termination::Convergence.to_string(), "CONVERGENCE");
        assert_eq!(Termination::MaxCoolingIter.to_string(), "MAX_COOLING_ITER");
        assert_eq!(
            Termination::NoCandidateAccepted.to_string(),
            "NO_CAND_ACCEPTED"
        );
    }
}
