// Chart model for the presentation layer
// Builders turn analysis output into serializable chart specs; the dashboard
// renders them client-side (bar, scatter, line, histogram) or as a table (heatmap)

use crate::analysis::stars_forks_pairs;
use crate::models::{Bucket, CorrelationMatrix, RegressionResult, Repository};
use crate::table::RepositoryTable;
use serde::Serialize;

pub const DEFAULT_HISTOGRAM_BINS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Scatter,
    Line,
    Heatmap,
    Histogram,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SeriesData {
    Values(Vec<f64>),
    Points(Vec<Point>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    pub label: String,
    pub color: String,
    pub data: SeriesData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub id: String,
    pub kind: ChartKind,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matrix: Option<Vec<Vec<f64>>>,
}

impl ChartSpec {
    fn new(id: &str, kind: ChartKind, title: &str, x_label: &str, y_label: &str) -> Self {
        Self {
            id: id.to_string(),
            kind,
            title: title.to_string(),
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            labels: Vec::new(),
            datasets: Vec::new(),
            matrix: None,
        }
    }

    fn with_values(mut self, label: &str, color: &str, values: Vec<f64>) -> Self {
        self.datasets.push(Dataset {
            label: label.to_string(),
            color: color.to_string(),
            data: SeriesData::Values(values),
        });
        self
    }
}

/// Stars, forks, watchers and open issues per repository
pub fn repository_stats_bar(records: &[Repository]) -> ChartSpec {
    let column = |f: fn(&Repository) -> u64| -> Vec<f64> {
        records.iter().map(|r| f(r) as f64).collect()
    };

    let mut chart = ChartSpec::new(
        "repository-stats",
        ChartKind::Bar,
        "GitHub Repository Stats",
        "Repository",
        "Count",
    )
    .with_values("Stars", "skyblue", column(|r| r.stars))
    .with_values("Forks", "orange", column(|r| r.forks.unwrap_or_default()))
    .with_values("Watchers", "green", column(|r| r.watchers))
    .with_values("Open Issues", "red", column(|r| r.open_issues));
    chart.labels = records.iter().map(|r| r.name.clone()).collect();
    chart
}

/// Repository count per language, most common first
pub fn language_distribution_bar(histogram: &[(String, usize)]) -> ChartSpec {
    let mut sorted = histogram.to_vec();
    sorted.sort_by(|a, b| b.1.cmp(&a.1));

    let mut chart = ChartSpec::new(
        "language-distribution",
        ChartKind::Bar,
        "Distribution of Programming Languages",
        "Programming Language",
        "Number of Repositories",
    )
    .with_values(
        "Repositories",
        "skyblue",
        sorted.iter().map(|(_, count)| *count as f64).collect(),
    );
    chart.labels = sorted.into_iter().map(|(name, _)| name).collect();
    chart
}

/// Stars against forks, with the fitted line when a regression is available
pub fn stars_forks_scatter(table: &RepositoryTable, fit: Option<&RegressionResult>) -> ChartSpec {
    let (xs, ys) = stars_forks_pairs(table);
    let points: Vec<Point> = xs.iter().zip(&ys).map(|(x, y)| Point { x: *x, y: *y }).collect();

    let mut chart = ChartSpec::new(
        "stars-vs-forks",
        ChartKind::Scatter,
        "Stars vs Forks",
        "Stars",
        "Forks",
    );
    chart.datasets.push(Dataset {
        label: "Repositories".to_string(),
        color: "skyblue".to_string(),
        data: SeriesData::Points(points),
    });

    if let Some(fit) = fit {
        let lo = xs.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if lo.is_finite() && hi.is_finite() {
            chart.datasets.push(Dataset {
                label: format!("Fit (R² = {:.3})", fit.r_squared),
                color: "red".to_string(),
                data: SeriesData::Points(vec![
                    Point { x: lo, y: fit.predict(lo) },
                    Point { x: hi, y: fit.predict(hi) },
                ]),
            });
        }
    }
    chart
}

/// Stars and forks statistic per period
pub fn trend_line(buckets: &[Bucket], title: &str) -> ChartSpec {
    let mut chart = ChartSpec::new("trend", ChartKind::Line, title, "Period", "Value")
        .with_values("Stars", "skyblue", buckets.iter().map(|b| b.stars).collect())
        .with_values("Forks", "orange", buckets.iter().map(|b| b.forks).collect());
    chart.labels = buckets.iter().map(|b| b.period.to_string()).collect();
    chart
}

/// Equal-width histogram of the stars column
pub fn stars_histogram(table: &RepositoryTable, bins: usize) -> ChartSpec {
    let bins = bins.max(1);
    let mut chart = ChartSpec::new(
        "stars-histogram",
        ChartKind::Histogram,
        "Distribution of Stars",
        "Stars",
        "Repositories",
    );

    let (lo, hi) = match (table.stars.iter().min(), table.stars.iter().max()) {
        (Some(lo), Some(hi)) => (*lo as f64, *hi as f64),
        _ => return chart.with_values("Repositories", "skyblue", Vec::new()),
    };

    // A constant column collapses into one bin
    let bins = if hi > lo { bins } else { 1 };
    let width = if hi > lo { (hi - lo) / bins as f64 } else { 1.0 };

    let mut counts = vec![0.0; bins];
    for stars in &table.stars {
        let idx = (((*stars as f64) - lo) / width) as usize;
        counts[idx.min(bins - 1)] += 1.0;
    }

    chart.labels = (0..bins)
        .map(|i| {
            let start = lo + width * i as f64;
            format!("{:.0}-{:.0}", start, start + width)
        })
        .collect();
    chart.with_values("Repositories", "skyblue", counts)
}

/// Correlation heatmap over the numeric columns
pub fn correlation_heatmap(matrix: &CorrelationMatrix) -> ChartSpec {
    let mut chart = ChartSpec::new(
        "correlation",
        ChartKind::Heatmap,
        "Correlation Heatmap",
        "",
        "",
    );
    chart.labels = matrix.columns.clone();
    chart.matrix = Some(matrix.values.clone());
    chart
}
