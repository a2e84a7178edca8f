//! Report sinks and dataset persistence.
//!
//! Supports pretty-printing, JSON and markdown report files, and CSV export
//! of a dataset.

use std::fs;
use std::path::Path;

use anyhow::Result;
use csv::WriterBuilder;
use tracing::{debug, info};

use crate::error::AnalysisError;
use crate::record::{CATEGORY, COMMENTS, CUSTOMER_ID, DATE, Dataset, SATISFACTION_SCORE};
use crate::report::{Report, render_markdown};

/// Receives an assembled report and persists it at `destination`.
pub trait ReportSink {
    fn write(&mut self, report: &Report, destination: &str) -> Result<(), AnalysisError>;
}

/// Writes the report as pretty-printed JSON.
#[derive(Debug, Default)]
pub struct JsonFileSink;

impl ReportSink for JsonFileSink {
    fn write(&mut self, report: &Report, destination: &str) -> Result<(), AnalysisError> {
        let body = serde_json::to_string_pretty(report)
            .map_err(|e| AnalysisError::sink_write(destination, e))?;
        write_file(destination, body.as_bytes())?;
        info!(destination, "Results exported");
        Ok(())
    }
}

/// Writes the report as a markdown document.
#[derive(Debug, Default)]
pub struct MarkdownFileSink;

impl ReportSink for MarkdownFileSink {
    fn write(&mut self, report: &Report, destination: &str) -> Result<(), AnalysisError> {
        write_file(destination, render_markdown(report).as_bytes())?;
        info!(destination, "Markdown report written");
        Ok(())
    }
}

fn write_file(destination: &str, body: &[u8]) -> Result<(), AnalysisError> {
    let path = Path::new(destination);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| AnalysisError::sink_write(destination, e))?;
    }
    fs::write(path, body).map_err(|e| AnalysisError::sink_write(destination, e))
}

/// Logs the report using Rust's debug pretty-print format.
pub fn print_pretty(report: &Report) {
    debug!("{:#?}", report);
}

/// Logs the report as pretty-printed JSON.
pub fn print_json(report: &Report) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

/// Writes every record of `dataset` to a CSV file with a header row,
/// replacing any existing file. Scores and dates are written verbatim.
pub fn write_dataset_csv(path: &str, dataset: &Dataset) -> Result<(), AnalysisError> {
    debug!(path, records = dataset.len(), "Writing dataset CSV");

    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|e| AnalysisError::sink_write(path, e))?;

    let mut rows = vec![[
        CUSTOMER_ID.to_string(),
        DATE.to_string(),
        CATEGORY.to_string(),
        SATISFACTION_SCORE.to_string(),
        COMMENTS.to_string(),
    ]];
    rows.extend(dataset.iter().map(|record| {
        [
            record.customer_id.clone(),
            record.display_date(),
            record.category.clone(),
            record.display_score(),
            record.comments.clone(),
        ]
    }));

    for row in &rows {
        writer
            .write_record(row)
            .map_err(|e| AnalysisError::sink_write(path, e))?;
    }
    writer.flush().map_err(|e| AnalysisError::sink_write(path, e))?;

    info!(path, records = dataset.len(), "Sample data saved");
    Ok(())
}
