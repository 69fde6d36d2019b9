use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::ValidationError;

// ============================================================================
// Repository Models
// ============================================================================

/// Repository is one repository's metadata row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    pub url: String,
    pub description: Option<String>,
    pub stars: u64,
    pub forks: Option<u64>,
    pub watchers: u64,
    pub open_issues: u64,
    pub language: Option<String>,
    pub owner: Option<String>,
    pub date: Option<NaiveDate>,
}

/// Public profile of a GitHub user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub login: String,
    pub name: Option<String>,
    pub html_url: String,
    #[serde(default)]
    pub public_repos: u64,
    #[serde(default)]
    pub followers: u64,
    #[serde(default)]
    pub following: u64,
}

// ============================================================================
// Analysis Models
// ============================================================================

/// Time period used to bucket rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Year,
    Quarter,
}

/// Bucket key: a calendar year, or a calendar year plus quarter (1-4)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PeriodKey {
    pub year: i32,
    pub quarter: Option<u8>,
}

impl PeriodKey {
    pub fn for_date(date: NaiveDate, period: Period) -> Self {
        use chrono::Datelike;

        let quarter = match period {
            Period::Year => None,
            Period::Quarter => Some((date.month0() / 3 + 1) as u8),
        };
        Self {
            year: date.year(),
            quarter,
        }
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.quarter {
            Some(q) => write!(f, "{}Q{}", self.year, q),
            None => write!(f, "{}", self.year),
        }
    }
}

impl Serialize for PeriodKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One aggregated period: statistic(stars) and statistic(forks)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    pub period: PeriodKey,
    pub stars: f64,
    pub forks: f64,
    pub count: usize,
}

/// Ordinary least squares fit of forks on stars
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegressionResult {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    pub samples: usize,
}

impl RegressionResult {
    pub fn predict(&self, stars: f64) -> f64 {
        self.intercept + self.slope * stars
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VolatilityLevel {
    High,
    Low,
}

impl fmt::Display for VolatilityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VolatilityLevel::High => write!(f, "High"),
            VolatilityLevel::Low => write!(f, "Low"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Volatility {
    pub std_dev: f64,
    pub level: VolatilityLevel,
}

/// Independent reductions over a record sequence
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScalarSummary {
    pub mean_stars: f64,
    pub total_forks: u64,
    pub modal_language: String,
    pub language_histogram: Vec<(String, usize)>,
}

/// Pearson correlation across the numeric columns
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

/// Outcome of one analysis request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnalysisOutcome {
    Yearly { buckets: Vec<Bucket> },
    Quarterly { buckets: Vec<Bucket> },
    Regression { result: RegressionResult },
    Volatility { result: Volatility },
}

// ============================================================================
// Selector Models
// ============================================================================

/// Analysis picked from the sidebar dropdown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    #[default]
    Yearly,
    Quarterly,
    Regression,
    Volatility,
}

impl AnalysisKind {
    pub const ALL: [AnalysisKind; 4] = [
        AnalysisKind::Yearly,
        AnalysisKind::Quarterly,
        AnalysisKind::Regression,
        AnalysisKind::Volatility,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisKind::Yearly => "yearly",
            AnalysisKind::Quarterly => "quarterly",
            AnalysisKind::Regression => "regression",
            AnalysisKind::Volatility => "volatility",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AnalysisKind::Yearly => "Yearly Trends",
            AnalysisKind::Quarterly => "Quarterly Trends",
            AnalysisKind::Regression => "Regression Analysis",
            AnalysisKind::Volatility => "Volatility Analysis",
        }
    }
}

impl FromStr for AnalysisKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AnalysisKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ValidationError::InvalidFieldValue {
                field: "analysis".to_string(),
                reason: format!("unknown analysis '{}'", s),
            })
    }
}

/// Chart picked from the visualization multi-select
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visualization {
    RepositoryStats,
    LanguageDistribution,
    StarsVsForks,
    Trend,
    Correlation,
    StarsHistogram,
}

impl Visualization {
    pub const ALL: [Visualization; 6] = [
        Visualization::RepositoryStats,
        Visualization::LanguageDistribution,
        Visualization::StarsVsForks,
        Visualization::Trend,
        Visualization::Correlation,
        Visualization::StarsHistogram,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Visualization::RepositoryStats => "repository_stats",
            Visualization::LanguageDistribution => "language_distribution",
            Visualization::StarsVsForks => "stars_vs_forks",
            Visualization::Trend => "trend",
            Visualization::Correlation => "correlation",
            Visualization::StarsHistogram => "stars_histogram",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Visualization::RepositoryStats => "Repository Stats (bar)",
            Visualization::LanguageDistribution => "Language Distribution (bar)",
            Visualization::StarsVsForks => "Stars vs Forks (scatter)",
            Visualization::Trend => "Yearly Trend (line)",
            Visualization::Correlation => "Correlation (heatmap)",
            Visualization::StarsHistogram => "Stars (histogram)",
        }
    }
}

impl FromStr for Visualization {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Visualization::ALL
            .into_iter()
            .find(|viz| viz.as_str() == s)
            .ok_or_else(|| ValidationError::InvalidFieldValue {
                field: "viz".to_string(),
                reason: format!("unknown visualization '{}'", s),
            })
    }
}

/// Where the analysis table comes from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    #[default]
    Live,
    Csv,
}
