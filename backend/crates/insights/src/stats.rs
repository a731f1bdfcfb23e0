//! Small numeric toolkit shared by the generators.
//!
//! Every function is total: degenerate input yields 0 instead of NaN.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quartiles {
    pub q1: f64,
    pub q2: f64,
    pub q3: f64,
}

impl Quartiles {
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }

    /// Tukey fences `[q1 - k*iqr, q3 + k*iqr]`.
    pub fn fences(&self, k: f64) -> (f64, f64) {
        let iqr = self.iqr();
        (self.q1 - k * iqr, self.q3 + k * iqr)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Mean of `values`; 0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation; 0 for fewer than two values.
pub fn stddev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Standard score of `value` against `history`; 0 when the history is flat.
pub fn zscore(value: f64, history: &[f64]) -> f64 {
    let sd = stddev(history);
    if sd == 0.0 {
        return 0.0;
    }
    (value - mean(history)) / sd
}

fn median_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    match n {
        0 => 0.0,
        _ if n % 2 == 0 => (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0,
        _ => sorted[n / 2],
    }
}

/// Quartiles by the median-of-halves method.
///
/// For odd lengths the overall median belongs to neither half. A single
/// value is its own Q1, Q2 and Q3.
pub fn quartiles(values: &[f64]) -> Quartiles {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let n = sorted.len();
    if n < 2 {
        let v = sorted.first().copied().unwrap_or(0.0);
        return Quartiles { q1: v, q2: v, q3: v };
    }

    let lower = &sorted[..n / 2];
    let upper = &sorted[(n + 1) / 2..];
    Quartiles {
        q1: median_sorted(lower),
        q2: median_sorted(&sorted),
        q3: median_sorted(upper),
    }
}

/// Pearson correlation coefficient.
///
/// Returns 0 for mismatched lengths, fewer than two pairs, or a
/// zero-variance side. A 0 here is a convention, not a failure signal.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.len() < 2 {
        return 0.0;
    }
    let mx = mean(x);
    let my = mean(y);

    let mut cov = 0.0;
    let mut vx = 0.0;
    let mut vy = 0.0;
    for (a, b) in x.iter().zip(y) {
        let dx = a - mx;
        let dy = b - my;
        cov += dx * dy;
        vx += dx * dx;
        vy += dy * dy;
    }

    let denom = (vx * vy).sqrt();
    if denom == 0.0 {
        return 0.0;
    }
    cov / denom
}

/// Ordinary least squares over `x = 0..n-1`.
pub fn linear_regression(values: &[f64]) -> LinearFit {
    let n = values.len() as f64;
    if values.len() < 2 {
        return LinearFit {
            slope: 0.0,
            intercept: values.first().copied().unwrap_or(0.0),
        };
    }

    let sum_x: f64 = (0..values.len()).map(|i| i as f64).sum();
    let sum_y: f64 = values.iter().sum();
    let sum_xy: f64 = values.iter().enumerate().map(|(i, &y)| i as f64 * y).sum();
    let sum_x2: f64 = (0..values.len()).map(|i| (i as f64).powi(2)).sum();

    let denominator = n * sum_x2 - sum_x.powi(2);
    let slope = (n * sum_xy - sum_x * sum_y) / denominator;
    let intercept = (sum_y - slope * sum_x) / n;
    LinearFit { slope, intercept }
}

/// `(current - previous) / previous * 100`, or `None` when `previous` is 0.
pub fn pct_change(previous: f64, current: f64) -> Option<f64> {
    if previous == 0.0 {
        return None;
    }
    Some((current - previous) / previous * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    // ── mean / stddev / zscore ──────────────────────────────────────

    #[test]
    fn mean_of_empty_is_zero() {
        assert_eq!(mean(&[]), 0.0);
        assert!((mean(&[1.0, 2.0, 3.0, 4.0]) - 2.5).abs() < EPS);
    }

    #[test]
    fn stddev_is_population() {
        // population sd of 2,4,4,4,5,5,7,9 is exactly 2
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((stddev(&v) - 2.0).abs() < EPS);
        assert_eq!(stddev(&[5.0]), 0.0);
        assert_eq!(stddev(&[]), 0.0);
    }

    #[test]
    fn constant_series_has_zero_spread_and_zero_score() {
        let flat = [7.0; 8];
        assert_eq!(stddev(&flat), 0.0);
        assert_eq!(zscore(7.0, &flat), 0.0);
        assert_eq!(zscore(1000.0, &flat), 0.0);
    }

    #[test]
    fn zscore_signs_follow_deviation() {
        let history = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((zscore(9.0, &history) - 2.0).abs() < EPS);
        assert!((zscore(1.0, &history) + 2.0).abs() < EPS);
    }

    // ── quartiles ───────────────────────────────────────────────────

    #[test]
    fn quartiles_odd_length_excludes_median_from_halves() {
        let q = quartiles(&[6.0, 7.0, 15.0, 36.0, 39.0, 40.0, 41.0, 42.0, 43.0, 47.0, 49.0]);
        assert!((q.q1 - 15.0).abs() < EPS);
        assert!((q.q2 - 40.0).abs() < EPS);
        assert!((q.q3 - 43.0).abs() < EPS);
    }

    #[test]
    fn quartiles_even_length_averages_centres() {
        let q = quartiles(&[7.0, 15.0, 36.0, 39.0, 40.0, 41.0]);
        assert!((q.q1 - 15.0).abs() < EPS);
        assert!((q.q2 - 37.5).abs() < EPS);
        assert!((q.q3 - 40.0).abs() < EPS);
        assert!((q.iqr() - 25.0).abs() < EPS);
    }

    #[test]
    fn quartiles_sort_their_input() {
        let q = quartiles(&[3.0, 1.0, 2.0]);
        assert_eq!(q, Quartiles { q1: 1.0, q2: 2.0, q3: 3.0 });
    }

    #[test]
    fn fences_use_multiplier() {
        let q = Quartiles { q1: 10.0, q2: 15.0, q3: 20.0 };
        assert_eq!(q.fences(1.5), (-5.0, 35.0));
    }

    // ── pearson ─────────────────────────────────────────────────────

    #[test]
    fn pearson_detects_perfect_relationships() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [2.0, 4.0, 6.0, 8.0, 10.0];
        let z = [10.0, 8.0, 6.0, 4.0, 2.0];
        assert!((pearson(&x, &y) - 1.0).abs() < EPS);
        assert!((pearson(&x, &z) + 1.0).abs() < EPS);
    }

    #[test]
    fn pearson_is_symmetric() {
        let x = [3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0];
        let y = [2.0, 7.0, 1.0, 8.0, 2.0, 8.0, 1.0, 8.0];
        assert!((pearson(&x, &y) - pearson(&y, &x)).abs() < EPS);
    }

    #[test]
    fn pearson_degenerate_inputs_are_zero() {
        assert_eq!(pearson(&[1.0, 2.0], &[1.0]), 0.0);
        assert_eq!(pearson(&[1.0], &[1.0]), 0.0);
        assert_eq!(pearson(&[1.0, 2.0, 3.0], &[5.0, 5.0, 5.0]), 0.0);
    }

    // ── regression / pct change ─────────────────────────────────────

    #[test]
    fn regression_recovers_line() {
        let values: Vec<f64> = (0..6).map(|i| 3.0 * i as f64 + 10.0).collect();
        let fit = linear_regression(&values);
        assert!((fit.slope - 3.0).abs() < EPS);
        assert!((fit.intercept - 10.0).abs() < EPS);
        assert!((fit.predict(6.0) - 28.0).abs() < EPS);
    }

    #[test]
    fn pct_change_guards_zero_base() {
        assert_eq!(pct_change(0.0, 10.0), None);
        assert!((pct_change(80.0, 85.0).unwrap() - 6.25).abs() < EPS);
        assert!((pct_change(50.0, 40.0).unwrap() + 20.0).abs() < EPS);
    }
}
