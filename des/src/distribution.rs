//! Distribution sampler (spec §4.1): a pure function from a tagged spec to
//! an hours value, drawing uniform(0,1) samples from an injectable source.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::rng::RandomSource;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Distribution {
    Deterministic {
        #[serde(alias = "value")]
        value_hours: Option<f64>,
    },
    Exponential {
        #[serde(alias = "rate")]
        rate_per_hour: Option<f64>,
    },
    Triangular { a: f64, m: f64, b: f64 },
    Lognormal { mu: f64, sigma: f64 },
}

/// Sample an hours value from `dist`. Negative or NaN raw samples (possible
/// from a degenerate triangular spec) are clamped to zero — open question
/// §9.2, resolved in DESIGN.md.
pub fn sample(dist: &Distribution, rng: &mut dyn RandomSource) -> f64 {
    let raw = match *dist {
        Distribution::Deterministic { value_hours } => value_hours.unwrap_or(0.0),
        Distribution::Exponential { rate_per_hour } => {
            let rate = rate_per_hour.unwrap_or(1.0);
            let u = rng.uniform();
            -((1.0 - u).ln()) / rate
        }
        Distribution::Triangular { a, m, b } => {
            let u = rng.uniform();
            let c = (m - a) / (b - a);
            if u < c {
                a + (u * (b - a) * (m - a)).sqrt()
            } else {
                b - ((1.0 - u) * (b - a) * (b - m)).sqrt()
            }
        }
        Distribution::Lognormal { mu, sigma } => {
            let u1: f64 = rng.uniform();
            let u2: f64 = rng.uniform();
            // Box-Muller; u1 must stay off zero to avoid ln(0).
            let u1 = u1.max(f64::MIN_POSITIVE);
            let z = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
            (mu + sigma * z).exp()
        }
    };
    if raw.is_nan() {
        0.0
    } else {
        raw.max(0.0)
    }
}

/// `sample` over an `Option<&Distribution>`; absent spec samples to 0, same
/// as passing a `Deterministic { value_hours: None }` spec (spec §4.1).
pub fn sample_opt(dist: Option<&Distribution>, rng: &mut dyn RandomSource) -> f64 {
    dist.map(|d| sample(d, rng)).unwrap_or(0.0)
}

/// Closed-form mean of the distribution family, used by the ODO average-case
/// mission span computation (spec §4.5) where sampling would be
/// non-deterministic relative to the rest of demand generation.
pub fn mean(dist: &Distribution) -> f64 {
    match *dist {
        Distribution::Deterministic { value_hours } => value_hours.unwrap_or(0.0),
        Distribution::Exponential { rate_per_hour } => 1.0 / rate_per_hour.unwrap_or(1.0),
        Distribution::Triangular { a, m, b } => (a + m + b) / 3.0,
        Distribution::Lognormal { mu, sigma } => (mu + sigma * sigma / 2.0).exp(),
    }
}

pub fn mean_opt(dist: Option<&Distribution>) -> f64 {
    dist.map(mean).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SeededRandomSource;

    #[test]
    fn deterministic_returns_value() {
        let d = Distribution::Deterministic { value_hours: Some(3.5) };
        let mut rng = SeededRandomSource::new(1);
        assert_eq!(sample(&d, &mut rng), 3.5);
    }

    #[test]
    fn deterministic_absent_is_zero() {
        let d = Distribution::Deterministic { value_hours: None };
        let mut rng = SeededRandomSource::new(1);
        assert_eq!(sample(&d, &mut rng), 0.0);
    }

    #[test]
    fn exponential_nonnegative() {
        let d = Distribution::Exponential { rate_per_hour: Some(2.0) };
        let mut rng = SeededRandomSource::new(7);
        for _ in 0..256 {
            assert!(sample(&d, &mut rng) >= 0.0);
        }
    }

    #[test]
    fn triangular_within_bounds() {
        let d = Distribution::Triangular { a: 1.0, m: 2.0, b: 5.0 };
        let mut rng = SeededRandomSource::new(3);
        for _ in 0..256 {
            let v = sample(&d, &mut rng);
            assert!((1.0..=5.0).contains(&v));
        }
    }

    #[test]
    fn triangular_degenerate_clamped_not_nan() {
        // a == m == b makes c = 0/0 = NaN; must clamp to 0, not propagate NaN.
        let d = Distribution::Triangular { a: 2.0, m: 2.0, b: 2.0 };
        let mut rng = SeededRandomSource::new(9);
        let v = sample(&d, &mut rng);
        assert!(!v.is_nan());
        assert!(v >= 0.0);
    }

    #[test]
    fn lognormal_nonnegative() {
        let d = Distribution::Lognormal { mu: 0.0, sigma: 1.0 };
        let mut rng = SeededRandomSource::new(11);
        for _ in 0..256 {
            assert!(sample(&d, &mut rng) >= 0.0);
        }
    }

    #[test]
    fn means_match_closed_forms() {
        assert_eq!(mean(&Distribution::Deterministic { value_hours: Some(4.0) }), 4.0);
        assert_eq!(mean(&Distribution::Exponential { rate_per_hour: Some(2.0) }), 0.5);
        assert_eq!(mean(&Distribution::Triangular { a: 0.0, m: 3.0, b: 6.0 }), 3.0);
    }

    #[test]
    fn same_seed_same_sample_stream() {
        let d = Distribution::Exponential { rate_per_hour: Some(1.5) };
        let mut r1 = SeededRandomSource::new(123);
        let mut r2 = SeededRandomSource::new(123);
        let s1: Vec<f64> = (0..32).map(|_| sample(&d, &mut r1)).collect();
        let s2: Vec<f64> = (0..32).map(|_| sample(&d, &mut r2)).collect();
        assert_eq!(s1, s2);
    }
}
