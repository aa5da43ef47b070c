//! Plateau detection over the cost samples of one temperature level.

/// Relative spread `|(mean - min) / min|` of a batch of costs.
///
/// Returns `None` when the spread is undefined: empty batch, non-finite
/// mean or minimum, or a non-zero spread around a zero minimum. A batch
/// whose mean equals its minimum has spread `0` regardless of the minimum.
pub fn relative_spread(costs: &[f64]) -> Option<f64> {
    if costs.is_empty() {
        return None;
    }
    let mean = costs.iter().sum::<f64>() / costs.len() as f64;
    let min = costs.iter().copied().fold(f64::INFINITY, f64::min);
    let spread = mean - min;
    if !spread.is_finite() {
        return None;
    }
    if spread == 0.0 {
        return Some(0.0);
    }
    if min == 0.0 {
        return None;
    }
    Some((spread / min).abs())
}

/// Returns `true` if the relative spread of the batch is strictly below
/// `tolerance`. A tolerance of `0` never converges.
pub fn is_converged(costs: &[f64], tolerance: f64) -> bool {
    relative_spread(costs).is_some_and(|spread| spread < tolerance)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_batch_converged() {
        assert!(is_converged(&[5.0; 10], 0.01));
        assert!(is_converged(&[-3.0; 4], 1e-12));
    }

    #[test]
    fn test_zero_tolerance_never_converges() {
        assert_eq!(relative_spread(&[-3.0; 4]), Some(0.0));
        assert!(!is_converged(&[-3.0; 4], 0.0));
        assert!(!is_converged(&[0.0; 5], 0.0));
        assert!(!is_converged(&[100.0, 100.0, 100.001], 0.0));
    }

    #[test]
    fn test_constant_zero_batch_converged() {
        assert_eq!(relative_spread(&[0.0; 5]), Some(0.0));
        assert!(is_converged(&[0.0; 5], 1e-8));
    }

    #[test]
    fn test_relative_spread_value() {
        // mean 2, min 1
        let spread = relative_spread(&[1.0, 2.0, 3.0]).unwrap();
        assert!((spread - 1.0).abs() < 1e-15);
        assert!(!is_converged(&[1.0, 2.0, 3.0], 0.5));
        assert!(is_converged(&[1.0, 2.0, 3.0], 1.5));
    }

    #[test]
    fn test_negative_minimum_uses_magnitude() {
        // mean -9, min -10
        let spread = relative_spread(&[-10.0, -8.0]).unwrap();
        assert!((spread - 0.1).abs() < 1e-15);
    }

    #[test]
    fn test_near_plateau() {
        let costs = [100.0, 100.0, 100.0, 100.001];
        assert!(is_converged(&costs, 1e-4));
        assert!(!is_converged(&costs, 1e-7));
    }

    #[test]
    fn test_undefined_spread_not_converged() {
        assert_eq!(relative_spread(&[]), None);
        assert_eq!(relative_spread(&[0.0, 1.0]), None);
        assert_eq!(relative_spread(&[f64::NEG_INFINITY; 5]), None);
        assert_eq!(relative_spread(&[1.0, f64::NAN]), None);
        assert!(!is_converged(&[f64::NEG_INFINITY; 5], 1.0));
        assert!(!is_converged(&[0.0, 1.0], 1e6));
    }
}
