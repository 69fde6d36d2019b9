// Single-predictor ordinary least squares: forks ~ stars

use super::stats::{mean, sum_sq_dev};
use crate::errors::AnalysisError;
use crate::models::RegressionResult;
use crate::table::RepositoryTable;

/// (stars, forks) pairs for rows that carry a fork count
pub fn stars_forks_pairs(table: &RepositoryTable) -> (Vec<f64>, Vec<f64>) {
    table
        .stars
        .iter()
        .zip(&table.forks)
        .filter_map(|(stars, forks)| forks.map(|f| (*stars as f64, f as f64)))
        .unzip()
}

/// Fit forks on stars with an intercept
pub fn fit_linear(table: &RepositoryTable) -> Result<RegressionResult, AnalysisError> {
    if table.is_empty() {
        return Err(AnalysisError::EmptyTable);
    }

    let (xs, ys) = stars_forks_pairs(table);
    if xs.len() < 2 {
        return Err(AnalysisError::InsufficientData {
            required: 2,
            actual: xs.len(),
        });
    }

    let sxx = sum_sq_dev(&xs);
    if sxx == 0.0 {
        return Err(AnalysisError::ZeroVariance);
    }

    let mx = mean(&xs).unwrap_or(0.0);
    let my = mean(&ys).unwrap_or(0.0);
    let sxy: f64 = xs.iter().zip(&ys).map(|(x, y)| (x - mx) * (y - my)).sum();

    let slope = sxy / sxx;
    let intercept = my - slope * mx;

    let ss_res: f64 = xs
        .iter()
        .zip(&ys)
        .map(|(x, y)| (y - (intercept + slope * x)).powi(2))
        .sum();
    let ss_tot = sum_sq_dev(&ys);

    // Constant target: perfect fit scores 1.0, anything else 0.0
    let r_squared = if ss_tot == 0.0 {
        if ss_res == 0.0 {
            1.0
        } else {
            0.0
        }
    } else {
        (1.0 - ss_res / ss_tot).clamp(0.0, 1.0)
    };

    Ok(RegressionResult {
        slope,
        intercept,
        r_squared,
        samples: xs.len(),
    })
}
