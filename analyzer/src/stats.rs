/// Read-only summary statistics over a completed entropy series.
///
/// Takes a snapshot of the full series (median needs the whole
/// distribution, so nothing is computed incrementally) and keeps a sorted
/// copy for order statistics. The input series is never modified.
pub struct SeriesStats {
    sorted: Vec<f64>,
}

impl SeriesStats {
    pub fn new(series: &[f64]) -> Self {
        let mut sorted = series.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        Self { sorted }
    }

    /// Arithmetic mean. NaN for an empty series.
    pub fn mean(&self) -> f64 {
        self.sorted.iter().sum::<f64>() / self.sorted.len() as f64
    }

    /// Sample standard deviation (N-1 denominator). NaN when fewer than
    /// two values are present.
    pub fn std_dev(&self) -> f64 {
        let n = self.sorted.len();
        if n < 2 {
            return f64::NAN;
        }
        let mean = self.mean();
        let variance = self
            .sorted
            .iter()
            .map(|v| (v - mean) * (v - mean))
            .sum::<f64>()
            / (n - 1) as f64;
        variance.sqrt()
    }

    /// Median (50th percentile). For an even count this is the mean of the
    /// two central order statistics. NaN for an empty series.
    pub fn median(&self) -> f64 {
        let n = self.sorted.len();
        if n == 0 {
            return f64::NAN;
        }
        if n % 2 == 1 {
            self.sorted[n / 2]
        } else {
            (self.sorted[n / 2 - 1] + self.sorted[n / 2]) / 2.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_values() {
        let stats = SeriesStats::new(&[1.0, 2.0, 3.0]);
        assert_eq!(stats.mean(), 2.0);
        assert_eq!(stats.median(), 2.0);
        assert!((stats.std_dev() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn insertion_order_does_not_matter() {
        let stats = SeriesStats::new(&[3.0, 1.0, 2.0]);
        assert_eq!(stats.median(), 2.0);
    }

    #[test]
    fn even_count_interpolates_median() {
        let stats = SeriesStats::new(&[4.0, 1.0, 3.0, 2.0]);
        assert_eq!(stats.median(), 2.5);
    }

    #[test]
    fn empty_series_is_nan_not_a_panic() {
        let stats = SeriesStats::new(&[]);
        assert!(stats.mean().is_nan());
        assert!(stats.std_dev().is_nan());
        assert!(stats.median().is_nan());
    }

    #[test]
    fn single_value_has_undefined_std_dev() {
        let stats = SeriesStats::new(&[1.5]);
        assert_eq!(stats.mean(), 1.5);
        assert_eq!(stats.median(), 1.5);
        assert!(stats.std_dev().is_nan());
    }
}
