use super::stats::pearson;
use crate::models::CorrelationMatrix;
use crate::table::RepositoryTable;

/// Pearson correlation across stars, forks, watchers and open issues
///
/// Rows without forks are dropped from every column so all pairs see the
/// same rows. Zero-variance pairs report 0.0; the diagonal is always 1.0.
pub fn correlation_matrix(table: &RepositoryTable) -> CorrelationMatrix {
    let rows: Vec<usize> = (0..table.len()).filter(|&i| table.forks[i].is_some()).collect();
    let column = |values: &dyn Fn(usize) -> u64| -> Vec<f64> {
        rows.iter().map(|&i| values(i) as f64).collect()
    };

    let series = vec![
        ("stars", column(&|i: usize| table.stars[i])),
        ("forks", column(&|i: usize| table.forks[i].unwrap_or_default())),
        ("watchers", column(&|i: usize| table.watchers[i])),
        ("open_issues", column(&|i: usize| table.open_issues[i])),
    ];

    let values = series
        .iter()
        .enumerate()
        .map(|(a, (_, xs))| {
            series
                .iter()
                .enumerate()
                .map(|(b, (_, ys))| {
                    if a == b {
                        1.0
                    } else {
                        pearson(xs, ys).unwrap_or(0.0)
                    }
                })
                .collect()
        })
        .collect();

    CorrelationMatrix {
        columns: series.iter().map(|(name, _)| name.to_string()).collect(),
        values,
    }
}
