//! Calendar bucketing of survey responses.
//!
//! Period keys are zero-padded ISO strings, so their lexical order is their
//! chronological order and a `BTreeMap` iterates them oldest first.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDate};
use tracing::{debug, warn};

use crate::analyzers::metrics::Tally;
use crate::analyzers::types::TrendPoint;
use crate::error::AnalysisError;
use crate::record::SurveyRecord;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Frequency {
    Daily,
    #[default]
    Weekly,
    Monthly,
}

impl Frequency {
    /// Parses `raw`, falling back to [`Frequency::Weekly`] when it is not recognized.
    pub fn parse_or_default(raw: &str) -> Self {
        raw.parse().unwrap_or_else(|e: AnalysisError| {
            warn!(error = %e, "Falling back to weekly trends");
            Frequency::default()
        })
    }
}

impl FromStr for Frequency {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            _ => Err(AnalysisError::InvalidFrequency(s.to_string())),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
        };
        f.write_str(name)
    }
}

/// Monday on or before `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = u64::from(date.weekday().num_days_from_monday());
    date.checked_sub_days(Days::new(offset)).unwrap_or(date)
}

pub fn period_key(date: NaiveDate, frequency: Frequency) -> String {
    match frequency {
        Frequency::Daily => date.format("%Y-%m-%d").to_string(),
        Frequency::Weekly => week_start(date).format("%Y-%m-%d").to_string(),
        Frequency::Monthly => date.format("%Y-%m").to_string(),
    }
}

/// Aggregates records into calendar periods. Records without a parseable
/// date are skipped.
pub fn trends(records: &[SurveyRecord], frequency: Frequency) -> BTreeMap<String, TrendPoint> {
    let mut periods: BTreeMap<String, Tally> = BTreeMap::new();
    let mut undated = 0usize;

    for record in records {
        let Some(date) = record.parsed_date() else {
            undated += 1;
            continue;
        };
        periods
            .entry(period_key(date, frequency))
            .or_default()
            .push(record);
    }

    if undated > 0 {
        debug!(undated, "Skipped records without a valid date");
    }

    periods
        .into_iter()
        .map(|(key, tally)| {
            (
                key,
                TrendPoint {
                    avg_score: tally.composite(),
                    csat_percentage: tally.csat(),
                    response_count: tally.total(),
                },
            )
        })
        .collect()
}
