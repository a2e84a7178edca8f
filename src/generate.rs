//! Synthetic survey data.
//!
//! Output is a pure function of the [`SampleSpec`], the reference date, and the random
//! source, so a seeded `StdRng` reproduces the same dataset.

use chrono::{Days, NaiveDate};
use rand::Rng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use rand::seq::IndexedRandom;
use tracing::info;

use crate::error::AnalysisError;
use crate::record::{Dataset, Score, SurveyDate, SurveyRecord};

pub const DEFAULT_CATEGORIES: [&str; 4] = ["Product", "Customer Service", "Website", "App"];

/// Relative weights of scores 1 through 5.
pub const SCORE_WEIGHTS: [f64; 5] = [0.05, 0.10, 0.20, 0.35, 0.30];

/// Dates are drawn from `[today - LOOKBACK_DAYS, today]`.
pub const LOOKBACK_DAYS: u64 = 90;

#[derive(Debug, Clone, PartialEq)]
pub struct SampleSpec {
    pub count: usize,
    pub categories: Vec<String>,
    pub score_weights: [f64; 5],
}

impl Default for SampleSpec {
    fn default() -> Self {
        Self {
            count: 100,
            categories: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
            score_weights: SCORE_WEIGHTS,
        }
    }
}

impl SampleSpec {
    pub fn new(count: usize) -> Self {
        Self {
            count,
            ..Self::default()
        }
    }

    /// Replaces the category set. An empty set keeps the defaults.
    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let categories: Vec<String> = categories
            .into_iter()
            .map(Into::into)
            .filter(|c| !c.trim().is_empty())
            .collect();
        if !categories.is_empty() {
            self.categories = categories;
        }
        self
    }
}

/// Comment text whose tone follows the score tier.
pub fn comment_for(score: i64, category: &str) -> String {
    let category = category.to_lowercase();
    match score {
        s if s >= 4 => format!("Satisfied with the {category}. Works great!"),
        3 => format!("The {category} is okay, but could be improved."),
        _ => format!("Disappointed with the {category}. Needs significant improvements."),
    }
}

/// Generates `spec.count` survey records dated within [`LOOKBACK_DAYS`] of `today`.
///
/// # Errors
///
/// Returns [`AnalysisError::InvalidDistribution`] if the score weights are
/// negative, non-finite, or all zero.
pub fn generate<R: Rng + ?Sized>(
    spec: &SampleSpec,
    today: NaiveDate,
    rng: &mut R,
) -> Result<Dataset, AnalysisError> {
    let scores = WeightedIndex::new(spec.score_weights)
        .map_err(|e| AnalysisError::InvalidDistribution(e.to_string()))?;
    let fallback: Vec<String>;
    let categories = if spec.categories.is_empty() {
        fallback = SampleSpec::default().categories;
        &fallback
    } else {
        &spec.categories
    };

    let mut records = Vec::with_capacity(spec.count);
    for i in 1..=spec.count {
        let days_ago = rng.random_range(0..=LOOKBACK_DAYS);
        let date = today.checked_sub_days(Days::new(days_ago)).unwrap_or(today);
        let score = scores.sample(rng) as i64 + 1;
        let category = categories
            .choose(rng)
            .cloned()
            .unwrap_or_default();

        records.push(SurveyRecord {
            customer_id: format!("CUST_{i:04}"),
            date: Some(SurveyDate::Parsed(date)),
            comments: comment_for(score, &category),
            category,
            satisfaction_score: Some(Score::Numeric(score)),
        });
    }

    info!(count = spec.count, "Generated sample survey responses");
    Ok(Dataset::new(records))
}
