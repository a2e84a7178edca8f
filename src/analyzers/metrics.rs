//! Whole-dataset and per-category satisfaction metrics.
//!
//! Every function is total: empty input yields 0.0 or an empty collection.

use indexmap::IndexMap;

use crate::analyzers::types::CategoryMetrics;
use crate::analyzers::utility::{mean, pct};
use crate::record::SurveyRecord;

/// Scores at or above this count as satisfied.
pub const SATISFIED_SCORE: i64 = 4;

/// Upper bound of the satisfaction scale.
pub const MAX_SCORE: i64 = 5;

pub const DEFAULT_UNHAPPY_THRESHOLD: i64 = 3;

/// Running counts for one group of records.
#[derive(Debug, Default)]
pub(crate) struct Tally {
    total: usize,
    satisfied: usize,
    scores: Vec<f64>,
}

impl Tally {
    pub(crate) fn over<'a>(records: impl IntoIterator<Item = &'a SurveyRecord>) -> Self {
        let mut tally = Tally::default();
        for record in records {
            tally.push(record);
        }
        tally
    }

    pub(crate) fn push(&mut self, record: &SurveyRecord) {
        let value = record.scoring_value();
        self.total += 1;
        if value >= SATISFIED_SCORE {
            self.satisfied += 1;
        }
        self.scores.push(value.clamp(0, MAX_SCORE) as f64);
    }

    pub(crate) fn total(&self) -> usize {
        self.total
    }

    pub(crate) fn csat(&self) -> f64 {
        pct(self.satisfied, self.total)
    }

    pub(crate) fn composite(&self) -> f64 {
        mean(&self.scores)
    }
}

/// Percentage of records scoring [`SATISFIED_SCORE`] or higher.
pub fn csat(records: &[SurveyRecord]) -> f64 {
    Tally::over(records).csat()
}

/// Mean score on the 0-5 scale. Non-numeric scores count as 0.
pub fn composite_csat(records: &[SurveyRecord]) -> f64 {
    Tally::over(records).composite()
}

/// Partitions records by exact category label, in first-seen order, and
/// scores each partition independently.
pub fn by_category(records: &[SurveyRecord]) -> IndexMap<String, CategoryMetrics> {
    let mut partitions: IndexMap<&str, Tally> = IndexMap::new();

    for record in records {
        partitions
            .entry(record.category.as_str())
            .or_default()
            .push(record);
    }

    partitions
        .into_iter()
        .map(|(category, tally)| {
            (
                category.to_string(),
                CategoryMetrics {
                    csat_percentage: tally.csat(),
                    composite_score: tally.composite(),
                    sample_size: tally.total(),
                },
            )
        })
        .collect()
}

/// Records with a numeric score at or below `threshold`, in dataset order.
/// Records without a numeric score are never included.
pub fn unhappy(records: &[SurveyRecord], threshold: i64) -> Vec<SurveyRecord> {
    records
        .iter()
        .filter(|record| record.numeric_score().is_some_and(|score| score <= threshold))
        .cloned()
        .collect()
}
