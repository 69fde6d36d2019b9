// Descriptive statistics over f64 samples

/// Arithmetic mean, `None` for an empty sample
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Median, averaging the two middle values of an even-sized sample
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Sample standard deviation (n - 1 denominator); 0.0 below two samples
pub fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = values.iter().sum::<f64>() / values.len() as f64;
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    (ss / (values.len() - 1) as f64).sqrt()
}

/// Sum of squared deviations from the mean
pub fn sum_sq_dev(values: &[f64]) -> f64 {
    match mean(values) {
        Some(m) => values.iter().map(|v| (v - m).powi(2)).sum(),
        None => 0.0,
    }
}

/// Pearson correlation; `None` when either side has zero variance
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    let mx = mean(xs)?;
    let my = mean(ys)?;
    let cov: f64 = xs.iter().zip(ys).map(|(x, y)| (x - mx) * (y - my)).sum();
    let sx = sum_sq_dev(xs);
    let sy = sum_sq_dev(ys);
    if sx == 0.0 || sy == 0.0 {
        return None;
    }
    Some((cov / (sx * sy).sqrt()).clamp(-1.0, 1.0))
}
