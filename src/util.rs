// Population mean and standard deviation (divisor N) of the defined values.
// NaN entries are skipped, the same way an undefined rating is left out of the team pool.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoolStats {
    pub mean: f64,
    pub stdev: f64,
    pub count: usize,
}

pub fn pool_stats(values: &[f64]) -> Option<PoolStats> {
    let defined: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if defined.is_empty() { return None; }

    // Identical values must give exactly zero spread. Summing them can leave rounding noise
    // in the mean, which would turn a dead tie into z-scores of +-1.
    let first = defined[0];
    if defined.iter().all(|v| *v == first) {
        return Some(PoolStats { mean: first, stdev: 0.0, count: defined.len() });
    }

    let n = defined.len() as f64;
    let mean = sum_vector(&defined) / n;
    let variance = defined.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

    Some(PoolStats { mean, stdev: variance.sqrt(), count: defined.len() })
}

// NaN when the spread is zero. That is a signal to the caller, not something to paper over.
pub fn z_score(value: f64, stats: &PoolStats) -> f64 {
    if stats.stdev == 0.0 { return f64::NAN; }
    (value - stats.mean) / stats.stdev
}

// Standardizes a whole column. Undefined inputs stay undefined.
pub fn z_scores(values: &[f64]) -> Vec<f64> {
    match pool_stats(values) {
        Some(stats) => values.iter().map(|v| z_score(*v, &stats)).collect(),
        None => vec![f64::NAN; values.len()],
    }
}

pub fn sum_vector(vec: &[f64]) -> f64 {
    let mut sum = 0.0;
    for i in vec { sum += i }
    sum
}

pub fn mean(vec: &[f64]) -> Option<f64> {
    if vec.is_empty() { return None; }
    Some(sum_vector(vec) / vec.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn population_stdev_uses_n() {
        let stats = pool_stats(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_eq!(stats.mean, 5.0);
        assert_eq!(stats.stdev, 2.0);
        assert_eq!(stats.count, 8);
    }

    #[test]
    fn identical_values_give_nan_z() {
        let z = z_scores(&[0.1, 0.1, 0.1]);
        assert!(z.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn nan_is_left_out_of_the_pool() {
        let z = z_scores(&[1.0, f64::NAN, 3.0]);
        assert_eq!(z[0], -1.0);
        assert!(z[1].is_nan());
        assert_eq!(z[2], 1.0);

        assert!(pool_stats(&[f64::NAN]).is_none());
        assert!(z_scores(&[f64::NAN, f64::NAN]).iter().all(|v| v.is_nan()));
    }

    #[test]
    fn mean_of_nothing_is_undefined() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[1.0, 2.0]), Some(1.5));
    }
}
