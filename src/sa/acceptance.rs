//! Metropolis acceptance criterion.

use rand::Rng;

use super::config::Direction;

/// Boltzmann acceptance probability `min(exp(gain / T), 1)`.
///
/// `gain` is the direction-aware improvement of the candidate over the
/// current state, so any candidate at least as good as the current state is
/// accepted with probability 1. An undefined gain (both costs infinite of
/// the same sign, or a `NaN` cost) gives probability 0.
pub fn acceptance_probability(
    current_cost: f64,
    candidate_cost: f64,
    temperature: f64,
    direction: Direction,
) -> f64 {
    let gain = direction.gain(current_cost, candidate_cost);
    if gain.is_nan() {
        return 0.0;
    }
    if gain >= 0.0 {
        return 1.0;
    }
    let p = (gain / temperature).exp();
    if p.is_nan() {
        0.0
    } else {
        p.min(1.0)
    }
}

/// Draws `r` uniformly from `[0, 1)` and accepts iff `r < probability`.
pub(crate) fn metropolis<R: Rng>(probability: f64, rng: &mut R) -> bool {
    let r: f64 = rng.random_range(0.0..1.0);
    r < probability
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_improvement_always_accepted() {
        assert_eq!(
            acceptance_probability(1.0, 2.0, 0.1, Direction::Maximize),
            1.0
        );
        assert_eq!(
            acceptance_probability(2.0, 1.0, 0.1, Direction::Minimize),
            1.0
        );
        assert_eq!(
            acceptance_probability(1.0, 1.0, 0.1, Direction::Maximize),
            1.0
        );
    }

    #[test]
    fn test_worse_candidate_boltzmann() {
        let p = acceptance_probability(2.0, 1.0, 1.0, Direction::Maximize);
        assert!((p - (-1.0f64).exp()).abs() < 1e-15);
        let p = acceptance_probability(1.0, 2.0, 2.0, Direction::Minimize);
        assert!((p - (-0.5f64).exp()).abs() < 1e-15);
    }

    #[test]
    fn test_non_finite_costs() {
        // -inf candidate is never accepted
        let p = acceptance_probability(0.0, f64::NEG_INFINITY, 1.0, Direction::Maximize);
        assert_eq!(p, 0.0);
        // -inf vs -inf is undefined
        let p = acceptance_probability(
            f64::NEG_INFINITY,
            f64::NEG_INFINITY,
            1.0,
            Direction::Maximize,
        );
        assert_eq!(p, 0.0);
        let p = acceptance_probability(0.0, f64::NAN, 1.0, Direction::Maximize);
        assert_eq!(p, 0.0);
    }

    #[test]
    fn test_metropolis_extremes() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..1000 {
            assert!(metropolis(1.0, &mut rng));
            assert!(!metropolis(0.0, &mut rng));
        }
    }

    #[test]
    fn test_metropolis_frequency() {
        let mut rng = StdRng::seed_from_u64(42);
        let n = 20_000;
        let hits = (0..n).filter(|_| metropolis(0.3, &mut rng)).count();
        let freq = hits as f64 / n as f64;
        assert!((freq - 0.3).abs() < 0.02, "acceptance frequency {freq}");
    }

    proptest! {
        #[test]
        fn prop_probability_in_unit_interval(
            current in -1e3f64..1e3,
            candidate in -1e3f64..1e3,
            temperature in 1e-3f64..1e3,
            maximize in any::<bool>(),
        ) {
            let direction = if maximize { Direction::Maximize } else { Direction::Minimize };
            let p = acceptance_probability(current, candidate, temperature, direction);
            prop_assert!((0.0..=1.0).contains(&p));
            if direction.gain(current, candidate) >= 0.0 {
                prop_assert_eq!(p, 1.0);
            }
        }
    }
}
