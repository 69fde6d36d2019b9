// Aggregation engine and scalar summaries over repository tables
// Every operation is a pure, synchronous function of its input

mod correlation;
mod regression;
pub mod stats;
mod summary;
mod trends;
mod volatility;

pub use correlation::correlation_matrix;
pub use regression::{fit_linear, stars_forks_pairs};
pub use summary::{
    language_histogram, mean_stars, modal_language, scalar_summaries, total_forks,
    UNKNOWN_LANGUAGE,
};
pub use trends::bucket_by_period;
pub use volatility::{volatility, VOLATILITY_THRESHOLD};

use crate::config::DatePolicy;
use crate::errors::AnalysisError;
use crate::models::{AnalysisKind, AnalysisOutcome, Period};
use crate::table::RepositoryTable;
use crate::telemetry;
use std::time::Instant;

/// Run the analysis picked in the sidebar against a table
#[tracing::instrument(skip(table), fields(rows = table.len()))]
pub fn run_analysis(
    kind: AnalysisKind,
    table: &RepositoryTable,
    policy: DatePolicy,
) -> Result<AnalysisOutcome, AnalysisError> {
    let started = Instant::now();

    let outcome = match kind {
        AnalysisKind::Yearly => bucket_by_period(table, Period::Year, policy)
            .map(|buckets| AnalysisOutcome::Yearly { buckets }),
        AnalysisKind::Quarterly => bucket_by_period(table, Period::Quarter, policy)
            .map(|buckets| AnalysisOutcome::Quarterly { buckets }),
        AnalysisKind::Regression => {
            fit_linear(table).map(|result| AnalysisOutcome::Regression { result })
        }
        AnalysisKind::Volatility => Ok(AnalysisOutcome::Volatility {
            result: volatility(table),
        }),
    };

    telemetry::record_analysis_duration(kind.as_str(), started.elapsed().as_secs_f64());
    if let Err(e) = &outcome {
        tracing::warn!(analysis = kind.as_str(), error = %e, "Analysis failed");
    }
    outcome
}
