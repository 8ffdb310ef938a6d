//! Regression metrics

/// R² coefficient of determination. A constant truth sequence yields 0.0.
pub fn r2(pred: &[f64], truth: &[f64]) -> f64 {
    if pred.is_empty() || pred.len() != truth.len() {
        return 0.0;
    }
    let mean = truth.iter().sum::<f64>() / truth.len() as f64;
    let ss_tot: f64 = truth.iter().map(|y| (y - mean).powi(2)).sum();
    if ss_tot == 0.0 {
        return 0.0;
    }
    let ss_res: f64 = pred
        .iter()
        .zip(truth.iter())
        .map(|(p, y)| (y - p).powi(2))
        .sum();
    1.0 - ss_res / ss_tot
}

/// Mean absolute error.
pub fn mean_absolute_error(pred: &[f64], truth: &[f64]) -> f64 {
    if pred.is_empty() || pred.len() != truth.len() {
        return 0.0;
    }
    pred.iter()
        .zip(truth.iter())
        .map(|(p, y)| (p - y).abs())
        .sum::<f64>()
        / pred.len() as f64
}

/// Mean squared error.
pub fn mean_squared_error(pred: &[f64], truth: &[f64]) -> f64 {
    if pred.is_empty() || pred.len() != truth.len() {
        return 0.0;
    }
    pred.iter()
        .zip(truth.iter())
        .map(|(p, y)| (p - y).powi(2))
        .sum::<f64>()
        / pred.len() as f64
}
