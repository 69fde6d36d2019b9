use super::stats::sample_std_dev;
use crate::models::{Volatility, VolatilityLevel};
use crate::table::RepositoryTable;

/// Stars standard deviation above which a table counts as volatile
pub const VOLATILITY_THRESHOLD: f64 = 100.0;

/// Dispersion of the stars column, classified against [`VOLATILITY_THRESHOLD`]
pub fn volatility(table: &RepositoryTable) -> Volatility {
    let stars: Vec<f64> = table.stars.iter().map(|s| *s as f64).collect();
    let std_dev = sample_std_dev(&stars);
    let level = if std_dev > VOLATILITY_THRESHOLD {
        VolatilityLevel::High
    } else {
        VolatilityLevel::Low
    };
    Volatility { std_dev, level }
}
