mod analysis_store;

pub use analysis_store::SqliteStore;

use crate::domain::models::Score;

/// Scores are stored as nullable integers; "N/A" becomes NULL.
pub(crate) fn score_column(score: Score) -> Option<i64> {
    score.value().map(i64::from)
}
