//! Sample history and the Vanderbilt–Louie adaptation matrix.
//!
//! After each temperature level the covariance `C` of the states visited
//! during the level is estimated, and the step-shaping matrix becomes
//!
//! ```text
//! A = xi / (beta * N) * L,    C = L * L^T
//! ```
//!
//! where `L` is the lower Cholesky factor and `N` the number of samples per
//! level. Steps `A * d` with unit-variance `d` then have covariance
//! proportional to `C`, i.e. they are longer along flat directions of the
//! objective.
//!
//! # References
//!
//! - Vanderbilt & Louie (1984), J. Comput. Phys. 56, 259-271

use nalgebra::{Cholesky, DMatrix};

use super::error::SaError;

/// Per-level record of sampled costs and (adaptive mode) visited states.
#[derive(Debug, Clone)]
pub(crate) struct SampleHistory {
    costs: Vec<f64>,
    /// Column `i` is the current state after sample `i`. Has zero rows when
    /// states are not tracked.
    states: DMatrix<f64>,
}

impl SampleHistory {
    pub fn new(num_samples: usize, dim: usize, track_states: bool) -> Self {
        Self {
            costs: vec![0.0; num_samples],
            states: DMatrix::zeros(if track_states { dim } else { 0 }, num_samples),
        }
    }

    pub fn record_cost(&mut self, sample: usize, cost: f64) {
        self.costs[sample] = cost;
    }

    pub fn record_state(&mut self, sample: usize, state: &[f64]) {
        if self.states.nrows() > 0 {
            self.states.column_mut(sample).copy_from_slice(state);
        }
    }

    pub fn costs(&self) -> &[f64] {
        &self.costs
    }

    pub fn states(&self) -> &DMatrix<f64> {
        &self.states
    }
}

/// Covariance of the columns of `samples` about their mean.
///
/// Second moment divided by the number of samples.
pub fn sample_covariance(samples: &DMatrix<f64>) -> DMatrix<f64> {
    let n = samples.ncols();
    if n == 0 {
        return DMatrix::zeros(samples.nrows(), samples.nrows());
    }
    let mean = samples.column_mean();
    let mut centered = samples.clone();
    for mut col in centered.column_iter_mut() {
        col -= &mean;
    }
    (&centered * centered.transpose()) / n as f64
}

/// Step-shaping matrix applied to raw candidate directions.
#[derive(Debug, Clone)]
pub(crate) struct AdaptationMatrix {
    matrix: DMatrix<f64>,
}

impl AdaptationMatrix {
    pub fn identity(dim: usize) -> Self {
        Self {
            matrix: DMatrix::identity(dim, dim),
        }
    }

    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }

    /// Replaces the matrix with the scaled Cholesky factor of the covariance
    /// of `states`.
    ///
    /// On failure the matrix is left untouched and
    /// [`SaError::NotPositiveDefinite`] is returned with `cooling_iteration`
    /// filled in.
    pub fn update(
        &mut self,
        states: &DMatrix<f64>,
        beta: f64,
        xi: f64,
        cooling_iteration: usize,
    ) -> Result<(), SaError> {
        let covariance = sample_covariance(states);
        let not_pd = SaError::NotPositiveDefinite { cooling_iteration };
        if covariance.iter().any(|v| !v.is_finite()) {
            return Err(not_pd);
        }
        let mut factor = Cholesky::new(covariance).ok_or(not_pd)?.unpack();
        factor *= xi / (beta * states.ncols() as f64);
        self.matrix = factor;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Columns (1,0), (-1,0), (0,2), (0,-2): zero mean, cov = diag(0.5, 2).
    fn cross_samples() -> DMatrix<f64> {
        DMatrix::from_column_slice(2, 4, &[1.0, 0.0, -1.0, 0.0, 0.0, 2.0, 0.0, -2.0])
    }

    #[test]
    fn test_sample_covariance_diagonal() {
        let cov = sample_covariance(&cross_samples());
        assert!((cov[(0, 0)] - 0.5).abs() < 1e-12);
        assert!((cov[(1, 1)] - 2.0).abs() < 1e-12);
        assert!(cov[(0, 1)].abs() < 1e-12);
        assert!(cov[(1, 0)].abs() < 1e-12);
    }

    #[test]
    fn test_sample_covariance_ignores_offset() {
        let mut shifted = cross_samples();
        for mut col in shifted.column_iter_mut() {
            col[0] += 100.0;
            col[1] -= 7.0;
        }
        let a = sample_covariance(&cross_samples());
        let b = sample_covariance(&shifted);
        assert!((a - b).amax() < 1e-9);
    }

    #[test]
    fn test_sample_covariance_correlated() {
        // y = 2x: cov = [[v, 2v], [2v, 4v]]
        let samples =
            DMatrix::from_column_slice(2, 3, &[-1.0, -2.0, 0.0, 0.0, 1.0, 2.0]);
        let cov = sample_covariance(&samples);
        let v = 2.0 / 3.0;
        assert!((cov[(0, 0)] - v).abs() < 1e-12);
        assert!((cov[(0, 1)] - 2.0 * v).abs() < 1e-12);
        assert!((cov[(1, 1)] - 4.0 * v).abs() < 1e-12);
    }

    #[test]
    fn test_update_scaled_cholesky() {
        let mut adaptation = AdaptationMatrix::identity(2);
        let (beta, xi) = (0.11, 3.0);
        adaptation.update(&cross_samples(), beta, xi, 0).unwrap();

        let scale = xi / (beta * 4.0);
        let a = adaptation.matrix();
        assert!((a[(0, 0)] - scale * 0.5f64.sqrt()).abs() < 1e-12);
        assert!((a[(1, 1)] - scale * 2.0f64.sqrt()).abs() < 1e-12);
        assert_eq!(a[(0, 1)], 0.0);
        assert!(a[(1, 0)].abs() < 1e-12);
    }

    #[test]
    fn test_update_reconstructs_covariance() {
        let samples = DMatrix::from_column_slice(
            3,
            5,
            &[
                0.1, 0.4, -0.2, //
                1.0, -0.3, 0.5, //
                -0.7, 0.2, 0.9, //
                0.3, 1.1, -0.4, //
                0.6, -0.8, 0.0,
            ],
        );
        let mut adaptation = AdaptationMatrix::identity(3);
        adaptation.update(&samples, 1.0, 5.0, 0).unwrap();

        // scale = xi / (beta * N) = 1, so A * A^T must equal the covariance
        let a = adaptation.matrix();
        let reconstructed = a * a.transpose();
        let cov = sample_covariance(&samples);
        assert!((reconstructed - cov).amax() < 1e-10);
        // lower triangular
        assert_eq!(a[(0, 1)], 0.0);
        assert_eq!(a[(0, 2)], 0.0);
        assert_eq!(a[(1, 2)], 0.0);
    }

    #[test]
    fn test_update_constant_batch_fails() {
        let samples = DMatrix::from_element(2, 6, 1.5);
        let mut adaptation = AdaptationMatrix::identity(2);
        let err = adaptation.update(&samples, 0.11, 3.0, 4).unwrap_err();
        assert_eq!(
            err,
            SaError::NotPositiveDefinite {
                cooling_iteration: 4
            }
        );
        // failed update leaves the previous matrix in place
        assert_eq!(adaptation.matrix(), &DMatrix::<f64>::identity(2, 2));
    }

    #[test]
    fn test_update_non_finite_fails() {
        let mut samples = cross_samples();
        samples[(0, 0)] = f64::INFINITY;
        let mut adaptation = AdaptationMatrix::identity(2);
        assert!(adaptation.update(&samples, 0.11, 3.0, 0).is_err());
    }

    #[test]
    fn test_history_records_columns() {
        let mut history = SampleHistory::new(3, 2, true);
        history.record_state(1, &[4.0, 5.0]);
        history.record_cost(1, -2.0);
        let states = history.states();
        assert_eq!(states.nrows(), 2);
        assert_eq!(states.ncols(), 3);
        assert_eq!(states[(0, 1)], 4.0);
        assert_eq!(states[(1, 1)], 5.0);
        assert_eq!(history.costs(), &[0.0, -2.0, 0.0]);
    }

    #[test]
    fn test_history_without_states() {
        let mut history = SampleHistory::new(4, 3, false);
        history.record_state(0, &[1.0, 2.0, 3.0]);
        assert_eq!(history.states().nrows(), 0);
        assert_eq!(history.costs().len(), 4);
    }
}
