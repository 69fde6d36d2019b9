// Period bucketing: yearly means and quarterly medians of stars and forks

use super::stats::{mean, median};
use crate::config::DatePolicy;
use crate::errors::AnalysisError;
use crate::models::{Bucket, Period, PeriodKey};
use crate::table::RepositoryTable;
use std::collections::BTreeMap;

#[derive(Default)]
struct Accumulator {
    stars: Vec<f64>,
    forks: Vec<f64>,
    count: usize,
}

/// Group rows by year or quarter and reduce stars and forks
///
/// Years use the mean, quarters the median. Buckets come back in ascending
/// key order. Rows without forks still count toward the stars statistic.
pub fn bucket_by_period(
    table: &RepositoryTable,
    period: Period,
    policy: DatePolicy,
) -> Result<Vec<Bucket>, AnalysisError> {
    let mut groups: BTreeMap<PeriodKey, Accumulator> = BTreeMap::new();

    for (row, cell) in table.dates.iter().enumerate() {
        let date = match cell.value {
            Some(date) => date,
            None => {
                let value = cell.raw.clone().unwrap_or_default();
                match policy {
                    DatePolicy::Strict => return Err(AnalysisError::InvalidDate { row, value }),
                    DatePolicy::SkipAndWarn => {
                        tracing::warn!(row = row, value = %value, "Skipping row with unparseable date");
                        continue;
                    }
                }
            }
        };

        let acc = groups.entry(PeriodKey::for_date(date, period)).or_default();
        acc.stars.push(table.stars[row] as f64);
        if let Some(forks) = table.forks[row] {
            acc.forks.push(forks as f64);
        }
        acc.count += 1;
    }

    let reduce: fn(&[f64]) -> Option<f64> = match period {
        Period::Year => mean,
        Period::Quarter => median,
    };

    Ok(groups
        .into_iter()
        .map(|(key, acc)| Bucket {
            period: key,
            stars: reduce(&acc.stars).unwrap_or(0.0),
            forks: reduce(&acc.forks).unwrap_or(0.0),
            count: acc.count,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Repository;
    use chrono::NaiveDate;

    fn repo(date: &str, stars: u64, forks: Option<u64>) -> Repository {
        Repository {
            name: format!("repo-{}", stars),
            url: String::new(),
            description: None,
            stars,
            forks,
            watchers: 0,
            open_issues: 0,
            language: None,
            owner: None,
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").ok(),
        }
    }

    #[test]
    fn test_yearly_mean_single_bucket() {
        let table = RepositoryTable::from_records(&[
            repo("2023-01-01", 100, Some(10)),
            repo("2023-06-01", 200, Some(30)),
        ]);
        let buckets = bucket_by_period(&table, Period::Year, DatePolicy::Strict).unwrap();
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].period.to_string(), "2023");
        assert_eq!(buckets[0].stars, 150.0);
        assert_eq!(buckets[0].forks, 20.0);
        assert_eq!(buckets[0].count, 2);
    }

    #[test]
    fn test_quarterly_median_sorted_keys() {
        let table = RepositoryTable::from_records(&[
            repo("2023-05-01", 50, Some(5)),
            repo("2022-11-01", 10, Some(1)),
            repo("2023-04-10", 30, Some(3)),
            repo("2023-06-30", 40, None),
            repo("2023-02-01", 7, Some(7)),
        ]);
        let buckets = bucket_by_period(&table, Period::Quarter, DatePolicy::Strict).unwrap();
        let keys: Vec<String> = buckets.iter().map(|b| b.period.to_string()).collect();
        assert_eq!(keys, vec!["2022Q4", "2023Q1", "2023Q2"]);

        let q2 = &buckets[2];
        assert_eq!(q2.count, 3);
        assert_eq!(q2.stars, 40.0);
        // Forks median only over the two rows that carry forks
        assert_eq!(q2.forks, 4.0);
    }

    #[test]
    fn test_strict_policy_fails_on_missing_date() {
        let mut table = RepositoryTable::from_records(&[repo("2023-01-01", 1, Some(1))]);
        table.push(&repo("garbage", 2, Some(2)));
        let err = bucket_by_period(&table, Period::Year, DatePolicy::Strict).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidDate { row: 1, .. }));
    }

    #[test]
    fn test_skip_policy_drops_bad_rows() {
        let mut table = RepositoryTable::from_records(&[repo("2023-01-01", 1, Some(1))]);
        table.push(&repo("garbage", 2, Some(2)));
        let buckets = bucket_by_period(&table, Period::Year, DatePolicy::SkipAndWarn).unwrap();
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].count, 1);
    }

    #[test]
    fn test_empty_table_yields_no_buckets() {
        let table = RepositoryTable::default();
        let buckets = bucket_by_period(&table, Period::Year, DatePolicy::Strict).unwrap();
        assert!(buckets.is_empty());
    }
}
