// Sidebar selector parsing
// Query strings come in as raw pairs so the visualization multi-select can repeat `viz`

use common::config::Settings;
use common::errors::ValidationError;
use common::models::{AnalysisKind, DataSource, Visualization};
use common::source::{clamp_limit, MAX_LIMIT, MIN_LIMIT};
use serde::Serialize;

/// Language text entry and result-count slider
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepositoryParams {
    pub language: String,
    pub limit: u32,
}

impl RepositoryParams {
    pub fn from_pairs(pairs: &[(String, String)], settings: &Settings) -> Result<Self, ValidationError> {
        let language = last_value(pairs, "language")
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(settings.github.default_language.as_str())
            .to_string();

        let limit = match last_value(pairs, "limit").filter(|s| !s.is_empty()) {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .map(clamp_limit)
                .map_err(|_| ValidationError::InvalidFieldValue {
                    field: "limit".to_string(),
                    reason: format!("expected an integer between {} and {}", MIN_LIMIT, MAX_LIMIT),
                })?,
            None => clamp_limit(settings.github.default_limit),
        };

        Ok(Self { language, limit })
    }
}

/// Full analysis sidebar state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisParams {
    pub source: DataSource,
    pub repositories: RepositoryParams,
    pub analysis: AnalysisKind,
    pub visualizations: Vec<Visualization>,
    pub export: bool,
}

impl AnalysisParams {
    pub fn from_pairs(pairs: &[(String, String)], settings: &Settings) -> Result<Self, ValidationError> {
        let source = match last_value(pairs, "source").filter(|s| !s.is_empty()) {
            None | Some("live") => DataSource::Live,
            Some("csv") => DataSource::Csv,
            Some(other) => {
                return Err(ValidationError::InvalidFieldValue {
                    field: "source".to_string(),
                    reason: format!("unknown source '{}'", other),
                })
            }
        };

        let analysis = match last_value(pairs, "analysis").filter(|s| !s.is_empty()) {
            Some(raw) => raw.parse()?,
            None => AnalysisKind::default(),
        };

        let mut visualizations = Vec::new();
        for (_, raw) in pairs.iter().filter(|(k, v)| k == "viz" && !v.is_empty()) {
            let viz: Visualization = raw.parse()?;
            if !visualizations.contains(&viz) {
                visualizations.push(viz);
            }
        }

        let export = matches!(last_value(pairs, "export"), Some("true") | Some("1") | Some("on"));

        Ok(Self {
            source,
            repositories: RepositoryParams::from_pairs(pairs, settings)?,
            analysis,
            visualizations,
            export,
        })
    }
}

fn last_value<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .rev()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}
