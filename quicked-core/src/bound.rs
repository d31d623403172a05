//! Upper-bound estimation for the bound-and-align search

use crate::config::{AlignerConfig, Algorithm};
use std::cmp::{max, min};

/// Resolve a length-relative setting.
///
/// A factor in `[0, 1]` is a fraction of `base`; anything larger is taken as
/// an absolute count.
pub fn nominal_prop(base: usize, factor: f64) -> usize {
    if (0.0..=1.0).contains(&factor) {
        (base as f64 * factor) as usize
    } else {
        factor as usize
    }
}

/// Proposes edit bounds: a small first guess, then geometric growth up to a
/// cap, so the number of passes is logarithmic in the true distance.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundEstimator {
    initial: usize,
    growth: f64,
    cap: usize,
    single_shot: bool,
}

impl BoundEstimator {
    /// Adaptive estimator for a `pattern_len x text_len` problem.
    ///
    /// No bound below `|pattern_len - text_len|` can hold, so that is the
    /// floor of the first guess.
    pub fn new(config: &AlignerConfig, pattern_len: usize, text_len: usize) -> Self {
        let floor = pattern_len.abs_diff(text_len);
        let shorter = min(pattern_len, text_len);
        Self {
            initial: max(nominal_prop(shorter, config.initial_bound), floor),
            growth: config.growth_factor,
            cap: Self::cap_for(config, pattern_len, text_len),
            single_shot: false,
        }
    }

    /// Estimator that proposes `bound` once
    pub fn fixed(bound: usize, cap: usize) -> Self {
        Self {
            initial: bound,
            growth: 2.0,
            cap,
            single_shot: true,
        }
    }

    /// Estimator for the configured algorithm
    pub fn for_config(config: &AlignerConfig, pattern_len: usize, text_len: usize) -> Self {
        let floor = pattern_len.abs_diff(text_len);
        let shorter = min(pattern_len, text_len);
        match config.algorithm {
            Algorithm::Quicked => Self::new(config, pattern_len, text_len),
            Algorithm::Banded => Self::fixed(
                max(nominal_prop(shorter, config.bandwidth), floor),
                Self::cap_for(config, pattern_len, text_len),
            ),
            // Wide enough to cover the whole matrix; never capped.
            Algorithm::Hirschberg => Self::fixed(max(pattern_len, text_len), pattern_len + text_len),
        }
    }

    fn cap_for(config: &AlignerConfig, pattern_len: usize, text_len: usize) -> usize {
        let trivial = pattern_len + text_len;
        config.bound_cap.map_or(trivial, |cap| min(cap, trivial))
    }

    pub fn initial_bound(&self) -> usize {
        self.initial
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Bound to try after `failed_attempts` inconclusive passes, or `None`
    /// once the search is exhausted.
    pub fn propose(&self, failed_attempts: u32) -> Option<usize> {
        if self.single_shot && failed_attempts > 0 {
            return None;
        }
        let mut bound = self.initial;
        for _ in 0..failed_attempts {
            bound = grow(bound, self.growth);
            if bound > self.cap {
                return None;
            }
        }
        (bound <= self.cap).then_some(bound)
    }
}

fn grow(bound: usize, growth: f64) -> usize {
    let grown = (bound as f64 * growth).ceil();
    if grown >= usize::MAX as f64 {
        return usize::MAX;
    }
    max(grown as usize, bound + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nominal_prop() {
        assert_eq!(nominal_prop(1000, 0.01), 10);
        assert_eq!(nominal_prop(1000, 1.0), 1000);
        assert_eq!(nominal_prop(1000, 0.0), 0);
        assert_eq!(nominal_prop(1000, 25.0), 25);
    }

    #[test]
    fn test_geometric_growth() {
        let config = AlignerConfig::default();
        let estimator = BoundEstimator::new(&config, 10_000, 10_000);
        assert_eq!(estimator.initial_bound(), 100);
        assert_eq!(estimator.propose(0), Some(100));
        assert_eq!(estimator.propose(1), Some(200));
        assert_eq!(estimator.propose(3), Some(800));
        assert_eq!(estimator.cap(), 20_000);
        assert_eq!(estimator.propose(7), Some(12_800));
        assert_eq!(estimator.propose(8), None);
    }

    #[test]
    fn test_zero_bound_still_grows() {
        let config = AlignerConfig::default();
        let estimator = BoundEstimator::new(&config, 4, 4);
        assert_eq!(estimator.propose(0), Some(0));
        assert_eq!(estimator.propose(1), Some(1));
        assert_eq!(estimator.propose(2), Some(2));
        assert_eq!(estimator.propose(3), Some(4));
        assert_eq!(estimator.propose(4), Some(8));
        assert_eq!(estimator.propose(5), None);
    }

    #[test]
    fn test_length_difference_floor() {
        let config = AlignerConfig::default();
        let estimator = BoundEstimator::new(&config, 10, 40);
        assert_eq!(estimator.initial_bound(), 30);
    }

    #[test]
    fn test_attempts_are_logarithmic() {
        let config = AlignerConfig::default();
        let estimator = BoundEstimator::new(&config, 1 << 20, 1 << 20);
        let attempts = (0..).take_while(|&k| estimator.propose(k).is_some()).count();
        assert!(attempts <= 24, "{} attempts", attempts);
    }

    #[test]
    fn test_user_cap() {
        let config = AlignerConfig {
            bound_cap: Some(5),
            ..Default::default()
        };
        let estimator = BoundEstimator::new(&config, 100, 100);
        assert_eq!(estimator.propose(0), Some(1));
        assert_eq!(estimator.propose(2), Some(4));
        assert_eq!(estimator.propose(3), None);
    }

    #[test]
    fn test_fixed_modes() {
        let config = AlignerConfig {
            algorithm: Algorithm::Banded,
            ..Default::default()
        };
        let estimator = BoundEstimator::for_config(&config, 200, 220);
        assert_eq!(estimator.propose(0), Some(30));
        assert_eq!(estimator.propose(1), None);

        let config = AlignerConfig {
            algorithm: Algorithm::Hirschberg,
            bound_cap: Some(1),
            ..Default::default()
        };
        let estimator = BoundEstimator::for_config(&config, 200, 220);
        assert_eq!(estimator.propose(0), Some(220));
    }
}
