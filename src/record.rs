//! In-memory survey rows.
//!
//! Fields that may fail coercion keep their raw text, so nothing a source
//! supplied is lost even when it cannot be scored or bucketed.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::error::AnalysisError;

/// A single string-keyed row as supplied by a tabular source.
pub type RawRow = HashMap<String, String>;

pub const CUSTOMER_ID: &str = "customer_id";
pub const DATE: &str = "date";
pub const CATEGORY: &str = "category";
pub const SATISFACTION_SCORE: &str = "satisfaction_score";
pub const COMMENTS: &str = "comments";

/// A satisfaction score, numeric when the source value parsed as an integer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Score {
    Numeric(i64),
    Unparsed(String),
}

impl Score {
    pub fn parse(raw: &str) -> Result<i64, AnalysisError> {
        raw.trim()
            .parse::<i64>()
            .map_err(|_| AnalysisError::MalformedField {
                field: SATISFACTION_SCORE,
                value: raw.to_string(),
            })
    }

    /// Parses `raw`, keeping the original text when it is not an integer.
    pub fn coerce(raw: &str) -> Score {
        match Self::parse(raw) {
            Ok(value) => Score::Numeric(value),
            Err(e) => {
                debug!(error = %e, "Keeping score verbatim");
                Score::Unparsed(raw.to_string())
            }
        }
    }

    pub fn numeric(&self) -> Option<i64> {
        match self {
            Score::Numeric(value) => Some(*value),
            Score::Unparsed(_) => None,
        }
    }
}

/// A survey date: either a parsed ISO calendar date or the text that failed to parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SurveyDate {
    Parsed(NaiveDate),
    Invalid(String),
}

impl SurveyDate {
    pub fn parse(raw: &str) -> Result<NaiveDate, AnalysisError> {
        NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
            AnalysisError::MalformedField {
                field: DATE,
                value: raw.to_string(),
            }
        })
    }

    pub fn coerce(raw: &str) -> SurveyDate {
        match Self::parse(raw) {
            Ok(date) => SurveyDate::Parsed(date),
            Err(e) => {
                debug!(error = %e, "Date left unparsed");
                SurveyDate::Invalid(raw.to_string())
            }
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            SurveyDate::Parsed(date) => Some(*date),
            SurveyDate::Invalid(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyRecord {
    #[serde(default)]
    pub customer_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<SurveyDate>,
    #[serde(default)]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub satisfaction_score: Option<Score>,
    #[serde(default)]
    pub comments: String,
}

impl SurveyRecord {
    /// Builds a record from a raw row. Missing or blank fields become empty or absent.
    pub fn from_row(row: &RawRow) -> Self {
        let text = |key: &str| row.get(key).cloned().unwrap_or_default();

        SurveyRecord {
            customer_id: text(CUSTOMER_ID),
            date: row
                .get(DATE)
                .filter(|raw| !raw.trim().is_empty())
                .map(|raw| SurveyDate::coerce(raw)),
            category: text(CATEGORY),
            satisfaction_score: row
                .get(SATISFACTION_SCORE)
                .filter(|raw| !raw.trim().is_empty())
                .map(|raw| Score::coerce(raw)),
            comments: text(COMMENTS),
        }
    }

    pub fn numeric_score(&self) -> Option<i64> {
        self.satisfaction_score.as_ref().and_then(Score::numeric)
    }

    /// The value this record contributes to sums and means; non-numeric counts as 0.
    pub fn scoring_value(&self) -> i64 {
        self.numeric_score().unwrap_or(0)
    }

    pub fn parsed_date(&self) -> Option<NaiveDate> {
        self.date.as_ref().and_then(SurveyDate::as_date)
    }

    /// Score as it should be shown to a reader, verbatim when unparsed.
    pub fn display_score(&self) -> String {
        match &self.satisfaction_score {
            Some(Score::Numeric(value)) => value.to_string(),
            Some(Score::Unparsed(raw)) => raw.clone(),
            None => String::new(),
        }
    }

    pub fn display_date(&self) -> String {
        match &self.date {
            Some(SurveyDate::Parsed(date)) => date.format("%Y-%m-%d").to_string(),
            Some(SurveyDate::Invalid(raw)) => raw.clone(),
            None => String::new(),
        }
    }
}

/// Ordered survey rows for one analysis session. Duplicates are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    records: Vec<SurveyRecord>,
}

impl Dataset {
    pub fn new(records: Vec<SurveyRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[SurveyRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SurveyRecord> {
        self.records.iter()
    }
}

impl FromIterator<SurveyRecord> for Dataset {
    fn from_iter<I: IntoIterator<Item = SurveyRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a SurveyRecord;
    type IntoIter = std::slice::Iter<'a, SurveyRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
