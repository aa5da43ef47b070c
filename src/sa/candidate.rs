//! Candidate state generation.
//!
//! Raw step directions are drawn component-wise from `U[-sqrt(3), sqrt(3))`,
//! which has unit variance, so the adaptation matrix alone determines the
//! covariance of adaptive steps.

use nalgebra::{DMatrix, DVector};
use rand::Rng;

/// Generates candidates around the current state.
///
/// Owns the per-dimension scratch buffers so that no allocation happens
/// inside the annealing loop.
#[derive(Debug, Clone)]
pub(crate) struct CandidateGenerator {
    step_length: f64,
    half_width: f64,
    direction: DVector<f64>,
    step: DVector<f64>,
}

impl CandidateGenerator {
    pub fn new(dim: usize, step_length: f64) -> Self {
        Self {
            step_length,
            half_width: 3.0f64.sqrt(),
            direction: DVector::zeros(dim),
            step: DVector::zeros(dim),
        }
    }

    fn draw_direction<R: Rng>(&mut self, rng: &mut R) {
        let w = self.half_width;
        for d in self.direction.iter_mut() {
            *d = rng.random_range(-w..w);
        }
    }

    /// `candidate = current + s * d`.
    pub fn isotropic<R: Rng>(&mut self, current: &[f64], candidate: &mut [f64], rng: &mut R) {
        self.draw_direction(rng);
        let s = self.step_length;
        for ((c, &x), &d) in candidate
            .iter_mut()
            .zip(current)
            .zip(self.direction.iter())
        {
            *c = x + s * d;
        }
    }

    /// `candidate = current + s * (A * d)`.
    pub fn adaptive<R: Rng>(
        &mut self,
        current: &[f64],
        candidate: &mut [f64],
        adaptation: &DMatrix<f64>,
        rng: &mut R,
    ) {
        self.draw_direction(rng);
        self.step
            .gemv(self.step_length, adaptation, &self.direction, 0.0);
        for ((c, &x), &dx) in candidate.iter_mut().zip(current).zip(self.step.iter()) {
            *c = x + dx;
        }
    }
}
