//! Current / candidate / best state vectors and the annealing temperature.

use super::config::Direction;

/// The three named points of an annealing run and their costs.
///
/// All vectors share the dimension of the initial guess for the lifetime of
/// the state. Costs are `NaN` until the objective has been evaluated.
#[derive(Debug, Clone)]
pub(crate) struct AnnealState {
    pub current: Vec<f64>,
    pub candidate: Vec<f64>,
    pub best: Vec<f64>,
    pub current_cost: f64,
    pub candidate_cost: f64,
    pub best_cost: f64,
}

impl AnnealState {
    pub fn new(guess: &[f64]) -> Self {
        Self {
            current: guess.to_vec(),
            candidate: guess.to_vec(),
            best: guess.to_vec(),
            current_cost: f64::NAN,
            candidate_cost: f64::NAN,
            best_cost: f64::NAN,
        }
    }

    /// Makes the candidate the current state, and the best state if it
    /// improves on it. Returns whether the best state changed.
    pub fn accept_candidate(&mut self, direction: Direction) -> bool {
        self.current.copy_from_slice(&self.candidate);
        self.current_cost = self.candidate_cost;
        if direction.improves(self.candidate_cost, self.best_cost) {
            self.best.copy_from_slice(&self.candidate);
            self.best_cost = self.candidate_cost;
            true
        } else {
            false
        }
    }
}

/// Annealing temperature under exponential cooling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Temperature(f64);

impl Temperature {
    pub fn new(initial: f64) -> Self {
        Temperature(initial)
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// `T <- T * factor`.
    pub fn cool(&mut self, factor: f64) {
        self.0 *= factor;
    }
}
