//! Error taxonomy for ingestion, analysis, and export.
//!
//! Only source and sink failures ever reach a caller. Field coercion and
//! frequency parsing errors are produced by the parsers and recovered in place
//! with a documented default.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("field '{field}' could not be coerced from '{value}'")]
    MalformedField { field: &'static str, value: String },
    #[error("tabular source '{source_name}' is unavailable: {reason}")]
    SourceUnavailable { source_name: String, reason: String },
    #[error("unrecognized trend frequency '{0}'")]
    InvalidFrequency(String),
    #[error("could not write report to '{destination}': {reason}")]
    SinkWrite { destination: String, reason: String },
    #[error("unsupported source format for '{0}'")]
    UnsupportedFormat(String),
    #[error("invalid score distribution: {0}")]
    InvalidDistribution(String),
}

impl AnalysisError {
    pub fn source_unavailable(source_name: impl Into<String>, reason: impl ToString) -> Self {
        AnalysisError::SourceUnavailable {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }

    pub fn sink_write(destination: impl Into<String>, reason: impl ToString) -> Self {
        AnalysisError::SinkWrite {
            destination: destination.into(),
            reason: reason.to_string(),
        }
    }
}
