use serde::{Deserialize, Serialize};

/// Online mean and standard deviation (Welford's algorithm).
///
/// Meant for independent samples, such as the records of episodes that all
/// restart from the same parameters.
#[derive(Default)]
pub struct Accumulator {
    n_vals: usize,
    mean: f64,
    diff_2_sum: f64,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct AccumulatorReport {
    pub n_vals: usize,
    pub mean: f64,
    pub std_dev: f64,
    /// Standard error of the mean.
    pub sem: f64,
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

    pub fn report(&self) -> AccumulatorReport {
        let std_dev = if self.n_vals > 1 {
            (self.diff_2_sum / (self.n_vals as f64 - 1.0)).sqrt()
        } else {
            f64::NAN
        };
        AccumulatorReport {
            n_vals: self.n_vals,
            mean: if self.n_vals > 0 { self.mean } else { f64::NAN },
            std_dev,
            sem: std_dev / (self.n_vals as f64).sqrt(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulator_matches_direct_formulas() {
        let vals = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let mut acc = Accumulator::new();
        vals.iter().for_each(|&val| acc.add(val));

        let var = vals.iter().map(|val| (val - 5.0_f64).powi(2)).sum::<f64>() / 7.0;

        let report = acc.report();
        assert_eq!(report.n_vals, 8);
        assert!((report.mean - 5.0).abs() < 1e-12);
        assert!((report.std_dev - var.sqrt()).abs() < 1e-12);
        assert!((report.sem - (var / 8.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn every_value_counts_towards_the_mean() {
        // A leading run of outliers must not be trimmed away.
        let mut acc = Accumulator::new();
        (0..16).for_each(|_| acc.add(100.0));
        (0..48).for_each(|_| acc.add(0.0));

        let report = acc.report();
        assert_eq!(report.n_vals, 64);
        assert!((report.mean - 25.0).abs() < 1e-12);
    }

    #[test]
    fn constant_values_have_zero_spread() {
        let mut acc = Accumulator::new();
        (0..64).for_each(|_| acc.add(3.0));

        let report = acc.report();
        assert_eq!(report.mean, 3.0);
        assert_eq!(report.std_dev, 0.0);
        assert_eq!(report.sem, 0.0);
    }

    #[test]
    fn single_value_is_reported() {
        let mut acc = Accumulator::new();
        acc.add(1.5);

        let report = acc.report();
        assert_eq!(report.mean, 1.5);
        assert!(report.std_dev.is_nan());
        assert!(report.sem.is_nan());
    }

    #[test]
    fn empty_accumulator_reports_nan() {
        let report = Accumulator::new().report();
        assert_eq!(report.n_vals, 0);
        assert!(report.mean.is_nan());
        assert!(report.std_dev.is_nan());
    }
}
