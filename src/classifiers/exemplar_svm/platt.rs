use serde::{Deserialize, Serialize};

use crate::error::{EsvmError, Result};

const MAX_ITERATIONS: usize = 100;
const MIN_STEP: f64 = 1e-10;
const SIGMA: f64 = 1e-12;
const GRADIENT_TOLERANCE: f64 = 1e-5;

/// `P(+1 | f) = 1 / (1 + exp(a * f + b))` over a decision value `f`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlattSigmoid {
    pub a: f64,
    pub b: f64,
}

#[inline]
fn log1p_exp_term(f_apb: f64, target: f64) -> f64 {
    if f_apb >= 0.0 {
        target * f_apb + (-f_apb).exp().ln_1p()
    } else {
        (target - 1.0) * f_apb + f_apb.exp().ln_1p()
    }
}

impl PlattSigmoid {
    pub fn new(a: f64, b: f64) -> Self {
        Self { a, b }
    }

    #[inline]
    pub fn probability(&self, decision: f64) -> f64 {
        let f_apb = decision * self.a + self.b;
        if f_apb >= 0.0 {
            let e = (-f_apb).exp();
            e / (1.0 + e)
        } else {
            1.0 / (1.0 + f_apb.exp())
        }
    }

    /// Fits the sigmoid to decision values with a Newton method and
    /// backtracking line search, using Platt's smoothed targets.
    pub fn fit(decisions: &[f64], positives: &[bool]) -> Result<Self> {
        if decisions.len() != positives.len() {
            return Err(EsvmError::DimensionMismatch {
                expected: decisions.len(),
                actual: positives.len(),
            });
        }
        let prior1 = positives.iter().filter(|p| **p).count() as f64;
        let prior0 = positives.len() as f64 - prior1;
        if prior1 == 0.0 || prior0 == 0.0 {
            return Err(EsvmError::Training(
                "probability calibration needs both classes".into(),
            ));
        }

        let hi = (prior1 + 1.0) / (prior1 + 2.0);
        let lo = 1.0 / (prior0 + 2.0);
        let targets: Vec<f64> = positives.iter().map(|p| if *p { hi } else { lo }).collect();

        let objective = |a: f64, b: f64| -> f64 {
            decisions
                .iter()
                .zip(&targets)
                .map(|(&f, &t)| log1p_exp_term(f * a + b, t))
                .sum()
        };

        let mut a = 0.0;
        let mut b = ((prior0 + 1.0) / (prior1 + 1.0)).ln();
        let mut fval = objective(a, b);

        for iteration in 0..MAX_ITERATIONS {
            let (mut h11, mut h22, mut h21) = (SIGMA, SIGMA, 0.0);
            let (mut g1, mut g2) = (0.0, 0.0);
            for (&f, &t) in decisions.iter().zip(&targets) {
                let f_apb = f * a + b;
                let (p, q) = if f_apb >= 0.0 {
                    let e = (-f_apb).exp();
                    (e / (1.0 + e), 1.0 / (1.0 + e))
                } else {
                    let e = f_apb.exp();
                    (1.0 / (1.0 + e), e / (1.0 + e))
                };
                let d2 = p * q;
                h11 += f * f * d2;
                h22 += d2;
                h21 += f * d2;
                let d1 = t - p;
                g1 += f * d1;
                g2 += d1;
            }

            if g1.abs() < GRADIENT_TOLERANCE && g2.abs() < GRADIENT_TOLERANCE {
                break;
            }

            let det = h11 * h22 - h21 * h21;
            let da = -(h22 * g1 - h21 * g2) / det;
            let db = -(-h21 * g1 + h11 * g2) / det;
            let gd = g1 * da + g2 * db;

            let mut step = 1.0;
            while step >= MIN_STEP {
                let (na, nb) = (a + step * da, b + step * db);
                let nf = objective(na, nb);
                if nf < fval + 1e-4 * step * gd {
                    a = na;
                    b = nb;
                    fval = nf;
                    break;
                }
                step /= 2.0;
            }

            if step < MIN_STEP {
                tracing::warn!(iteration, "platt line search failed, keeping last sigmoid");
                break;
            }
            if iteration + 1 == MAX_ITERATIONS {
                tracing::warn!("platt fit reached the iteration cap");
            }
        }

        Ok(Self { a, b })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probability_is_monotone_for_negative_slope() {
        let s = PlattSigmoid::new(-2.0, 0.0);
        assert!((s.probability(0.0) - 0.5).abs() < 1e-12);
        assert!(s.probability(1.0) > s.probability(0.0));
        assert!(s.probability(-1.0) < s.probability(0.0));
        assert!(s.probability(1e6) <= 1.0);
        assert!(s.probability(-1e6) >= 0.0);
    }

    #[test]
    fn fit_orders_classes() {
        let decisions = [2.0, 1.5, 1.0, -0.5, -1.0, -1.5, -2.0, 0.2];
        let labels = [true, true, true, false, false, false, false, false];
        let s = PlattSigmoid::fit(&decisions, &labels).unwrap();
        assert!(s.a < 0.0);
        assert!(s.probability(2.0) > 0.5);
        assert!(s.probability(-2.0) < 0.5);
    }

    #[test]
    fn fit_needs_both_classes() {
        assert!(matches!(
            PlattSigmoid::fit(&[1.0, 2.0], &[true, true]),
            Err(EsvmError::Training(_))
        ));
        assert!(matches!(
            PlattSigmoid::fit(&[1.0], &[true, false]),
            Err(EsvmError::DimensionMismatch { .. })
        ));
    }
}
