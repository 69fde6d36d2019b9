// Scalar reductions over raw repository records

use crate::models::{Repository, ScalarSummary};

/// Reported when no record carries a language
pub const UNKNOWN_LANGUAGE: &str = "Unknown";

/// Arithmetic mean of stars; 0.0 for no records
pub fn mean_stars(records: &[Repository]) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    let total: u64 = records.iter().map(|r| r.stars).sum();
    total as f64 / records.len() as f64
}

/// Sum of forks over records that carry a fork count
pub fn total_forks(records: &[Repository]) -> u64 {
    records.iter().filter_map(|r| r.forks).sum()
}

/// Repository count per language, in order of first appearance
pub fn language_histogram(records: &[Repository]) -> Vec<(String, usize)> {
    let mut histogram: Vec<(String, usize)> = Vec::new();
    for language in records
        .iter()
        .filter_map(|r| r.language.as_deref())
        .filter(|l| !l.is_empty())
    {
        match histogram.iter_mut().find(|(name, _)| name == language) {
            Some((_, count)) => *count += 1,
            None => histogram.push((language.to_string(), 1)),
        }
    }
    histogram
}

/// Most frequent language; ties go to the language seen first
pub fn modal_language(records: &[Repository]) -> String {
    most_frequent(&language_histogram(records))
}

fn most_frequent(histogram: &[(String, usize)]) -> String {
    let mut best: Option<&(String, usize)> = None;
    for entry in histogram {
        if best.map_or(true, |b| entry.1 > b.1) {
            best = Some(entry);
        }
    }
    best.map(|(name, _)| name.clone())
        .unwrap_or_else(|| UNKNOWN_LANGUAGE.to_string())
}

/// All scalar summaries in one pass over the histogram
pub fn scalar_summaries(records: &[Repository]) -> ScalarSummary {
    let language_histogram = language_histogram(records);
    ScalarSummary {
        mean_stars: mean_stars(records),
        total_forks: total_forks(records),
        modal_language: most_frequent(&language_histogram),
        language_histogram,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo(stars: u64, forks: Option<u64>, language: Option<&str>) -> Repository {
        Repository {
            name: "r".to_string(),
            url: String::new(),
            description: None,
            stars,
            forks,
            watchers: 0,
            open_issues: 0,
            language: language.map(str::to_string),
            owner: None,
            date: None,
        }
    }

    #[test]
    fn test_modal_language_python() {
        let records = vec![
            repo(0, None, Some("Python")),
            repo(0, None, Some("JavaScript")),
            repo(0, None, Some("Python")),
        ];
        assert_eq!(modal_language(&records), "Python");
    }

    #[test]
    fn test_modal_language_tie_goes_to_first_seen() {
        let records = vec![
            repo(0, None, Some("Rust")),
            repo(0, None, Some("Go")),
            repo(0, None, Some("Go")),
            repo(0, None, Some("Rust")),
        ];
        assert_eq!(modal_language(&records), "Rust");
    }

    #[test]
    fn test_modal_language_unknown_without_languages() {
        assert_eq!(modal_language(&[repo(1, None, None)]), UNKNOWN_LANGUAGE);
        assert_eq!(modal_language(&[]), UNKNOWN_LANGUAGE);
    }

    #[test]
    fn test_mean_stars() {
        let records = vec![
            repo(100, None, None),
            repo(200, None, None),
            repo(150, None, None),
        ];
        assert_eq!(mean_stars(&records), 150.0);
        assert_eq!(mean_stars(&[]), 0.0);
    }

    #[test]
    fn test_total_forks_skips_missing() {
        let records = vec![repo(0, Some(50), None), repo(0, None, None), repo(0, Some(80), None)];
        assert_eq!(total_forks(&records), 130);
    }

    #[test]
    fn test_histogram_first_seen_order() {
        let records = vec![
            repo(0, None, Some("Java")),
            repo(0, None, None),
            repo(0, None, Some("Python")),
            repo(0, None, Some("Java")),
        ];
        assert_eq!(
            language_histogram(&records),
            vec![("Java".to_string(), 2), ("Python".to_string(), 1)]
        );
    }

    #[test]
    fn test_scalar_summaries_combines_reductions() {
        let records = vec![
            repo(100, Some(50), Some("Python")),
            repo(200, Some(100), Some("JavaScript")),
            repo(150, Some(80), Some("Python")),
        ];
        let summary = scalar_summaries(&records);
        assert_eq!(summary.mean_stars, 150.0);
        assert_eq!(summary.total_forks, 230);
        assert_eq!(summary.modal_language, "Python");
        assert_eq!(summary.language_histogram.len(), 2);
    }
}
