use serde::{Deserialize, Serialize};

/// Running mean and sample variance (Welford's algorithm).
#[derive(Debug, Clone, Default)]
pub struct Accumulator {
    n_vals: usize,
    mean: f64,
    diff_2_sum: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccumulatorReport {
    pub mean: f64,
    pub std_dev: f64,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, val: f64) {
        self.n_vals += 1;

        let diff_a = val - self.mean;
        self.mean += diff_a / self.n_vals as f64;

        let diff_b = val - self.mean;
        self.diff_2_sum += diff_a * diff_b;
    }

    pub fn n_vals(&self) -> usize {
        self.n_vals
    }

    pub fn report(&self) -> AccumulatorReport {
        AccumulatorReport {
            mean: if self.n_vals > 0 { self.mean } else { f64::NAN },
            std_dev: if self.n_vals > 1 {
                (self.diff_2_sum / (self.n_vals as f64 - 1.0)).sqrt()
            } else {
                f64::NAN
            },
        }
    }
}

/// Time series of counts with its extremes.
#[derive(Debug, Clone, Default)]
pub struct TimeSeries {
    acc: Accumulator,
    min: Option<usize>,
    max: Option<(usize, usize)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesReport {
    pub mean: f64,
    pub std_dev: f64,
    pub min: usize,
    pub max: usize,
    /// Index of the first occurrence of `max`.
    pub i_max: usize,
}

impl TimeSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, val: usize) {
        let idx = self.acc.n_vals();
        self.acc.add(val as f64);
        self.min = Some(self.min.map_or(val, |min| min.min(val)));
        if self.max.is_none_or(|(max, _)| val > max) {
            self.max = Some((val, idx));
        }
    }

    /// Summary of the series, or `None` if nothing was pushed.
    pub fn report(&self) -> Option<TimeSeriesReport> {
        let (max, i_max) = self.max?;
        let AccumulatorReport { mean, std_dev } = self.acc.report();
        Some(TimeSeriesReport {
            mean,
            std_dev,
            min: self.min?,
            max,
            i_max,
        })
    }
}
