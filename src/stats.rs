//! Shared numeric helpers for analysis blocks
//!
//! Plain-slice statistics: means, variances, Pearson correlation and the
//! conformal calibration quantile. All functions are total: degenerate
//! inputs (empty slices, zero variance) yield a defined value instead of
//! NaN so results stay JSON-representable.

/// Arithmetic mean. Empty input yields 0.0.
pub fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Population variance. Empty input yields 0.0.
pub fn variance(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    let m = mean(xs);
    xs.iter().map(|x| (x - m).powi(2)).sum::<f64>() / xs.len() as f64
}

/// Pearson correlation coefficient between two equal-length sequences.
///
/// Returns 0.0 when either sequence is empty, lengths differ, or either
/// sequence has zero variance (constant output has no linear relationship
/// to report).
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    if x.is_empty() || x.len() != y.len() {
        return 0.0;
    }
    let mx = mean(x);
    let my = mean(y);
    let mut cov = 0.0;
    let mut vx = 0.0;
    let mut vy = 0.0;
    for (a, b) in x.iter().zip(y.iter()) {
        cov += (a - mx) * (b - my);
        vx += (a - mx).powi(2);
        vy += (b - my).powi(2);
    }
    if vx == 0.0 || vy == 0.0 {
        return 0.0;
    }
    (cov / (vx.sqrt() * vy.sqrt())).clamp(-1.0, 1.0)
}

/// Pairwise Pearson correlation matrix across N sequences.
///
/// The result is N×N and symmetric with a unit diagonal. Off-diagonal
/// entries involving a zero-variance sequence are 0.0.
pub fn correlation_matrix(series: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let n = series.len();
    let mut matrix = vec![vec![0.0; n]; n];
    for i in 0..n {
        matrix[i][i] = 1.0;
        for j in (i + 1)..n {
            let r = pearson(&series[i], &series[j]);
            matrix[i][j] = r;
            matrix[j][i] = r;
        }
    }
    matrix
}

/// Split-conformal calibration quantile.
///
/// Given conformity scores and a miscoverage rate `alpha`, returns the
/// `ceil((1 - alpha) * (n + 1))`-th smallest score (clamped to the sample),
/// the threshold that delivers `P(score <= q) >= 1 - alpha` under
/// exchangeability. Empty input yields 0.0.
pub fn conformal_quantile(scores: &[f64], alpha: f64) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    let mut sorted = scores.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = sorted.len();
    let rank = ((1.0 - alpha.clamp(0.0, 1.0)) * (n as f64 + 1.0)).ceil() as usize;
    sorted[rank.clamp(1, n) - 1]
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::collection::vec;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_pearson_bounded(
            x in vec(-1e3f64..1e3, 2..50),
            y in vec(-1e3f64..1e3, 2..50),
        ) {
            let n = x.len().min(y.len());
            let r = pearson(&x[..n], &y[..n]);
            prop_assert!((-1.0..=1.0).contains(&r));
            prop_assert!(!r.is_nan());
        }

        #[test]
        fn prop_pearson_symmetric(
            pairs in vec((-1e3f64..1e3, -1e3f64..1e3), 2..50),
        ) {
            let x: Vec<f64> = pairs.iter().map(|p| p.0).collect();
            let y: Vec<f64> = pairs.iter().map(|p| p.1).collect();
            prop_assert!((pearson(&x, &y) - pearson(&y, &x)).abs() < 1e-12);
        }

        #[test]
        fn prop_conformal_quantile_is_sample_member(
            scores in vec(0.0f64..1e3, 1..100),
            alpha in 0.0f64..1.0,
        ) {
            let q = conformal_quantile(&scores, alpha);
            prop_assert!(scores.iter().any(|&s| (s - q).abs() < 1e-12));
        }
    }
}
