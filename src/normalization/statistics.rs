use crate::error::{EsvmError, Result};
use crate::normalization::{NormMethod, NormParams};

/// Streaming min/max/mean/variance accumulator (Welford).
///
/// `NaN` observations are ignored. The variance is the population variance.
#[derive(Debug, Clone, Copy)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl Default for RunningStats {
    fn default() -> Self {
        Self {
            count: 0,
            mean: 0.0,
            m2: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }
}

impl RunningStats {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn add(&mut self, v: f64) {
        if v.is_nan() {
            return;
        }
        self.count += 1;
        let delta = v - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (v - self.mean);
        if v < self.min {
            self.min = v;
        }
        if v > self.max {
            self.max = v;
        }
    }

    pub fn extend<I: IntoIterator<Item = f64>>(&mut self, values: I) {
        for v in values {
            self.add(v);
        }
    }

    /// Combines two disjoint accumulations.
    pub fn merge(&mut self, other: &RunningStats) {
        if other.count == 0 {
            return;
        }
        if self.count == 0 {
            *self = *other;
            return;
        }
        let n_a = self.count as f64;
        let n_b = other.count as f64;
        let n = n_a + n_b;
        let delta = other.mean - self.mean;
        self.mean += delta * n_b / n;
        self.m2 += other.m2 + delta * delta * n_a * n_b / n;
        self.count += other.count;
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    #[inline]
    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn min(&self) -> f64 {
        if self.count > 0 { self.min } else { f64::NAN }
    }

    pub fn max(&self) -> f64 {
        if self.count > 0 { self.max } else { f64::NAN }
    }

    pub fn mean(&self) -> f64 {
        if self.count > 0 { self.mean } else { f64::NAN }
    }

    pub fn variance(&self) -> f64 {
        if self.count > 0 {
            self.m2 / self.count as f64
        } else {
            f64::NAN
        }
    }

    pub fn stddev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Parameter pair for `method` over everything observed so far.
    pub fn params(&self, method: NormMethod) -> Result<NormParams> {
        if self.count == 0 {
            return Err(EsvmError::EmptyPopulation(
                "no finite values to derive normalization parameters from".into(),
            ));
        }
        Ok(match method {
            NormMethod::MinMax => NormParams::min_max(self.min, self.max),
            NormMethod::ZScore => NormParams::z_score(self.mean, self.stddev()),
        })
    }
}
