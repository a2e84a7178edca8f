//! Tabular sources that supply raw survey rows, and ingestion into a [`Dataset`].
//!
//! Supports CSV files, JSON arrays of flat objects, and in-memory rows.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::{debug, info};

use crate::error::AnalysisError;
use crate::record::{Dataset, RawRow, SurveyRecord};

/// Supplies an ordered sequence of string-keyed rows.
pub trait TabularSource {
    /// Human-readable name used in logs and errors.
    fn name(&self) -> &str;

    fn rows(&mut self) -> Result<Vec<RawRow>, AnalysisError>;
}

impl TabularSource for Vec<RawRow> {
    fn name(&self) -> &str {
        "memory"
    }

    fn rows(&mut self) -> Result<Vec<RawRow>, AnalysisError> {
        Ok(std::mem::take(self))
    }
}

/// Reads rows from CSV with a header line. Short rows are accepted; the
/// missing trailing fields are simply absent.
pub struct CsvSource<R: Read> {
    name: String,
    reader: csv::Reader<R>,
}

impl CsvSource<File> {
    pub fn from_path(path: &Path) -> Result<Self, AnalysisError> {
        let name = path.display().to_string();
        let file = File::open(path).map_err(|e| AnalysisError::source_unavailable(&name, e))?;
        Ok(Self::from_reader(name, file))
    }
}

impl<R: Read> CsvSource<R> {
    pub fn from_reader(name: impl Into<String>, reader: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);
        Self {
            name: name.into(),
            reader,
        }
    }
}

impl<R: Read> TabularSource for CsvSource<R> {
    fn name(&self) -> &str {
        &self.name
    }

    fn rows(&mut self) -> Result<Vec<RawRow>, AnalysisError> {
        let headers = self
            .reader
            .headers()
            .map_err(|e| AnalysisError::source_unavailable(&self.name, e))?
            .clone();

        let mut rows = Vec::new();
        for result in self.reader.records() {
            let record = result.map_err(|e| AnalysisError::source_unavailable(&self.name, e))?;
            let row: RawRow = headers
                .iter()
                .zip(record.iter())
                .map(|(header, value)| (header.to_string(), value.to_string()))
                .collect();
            rows.push(row);
        }
        Ok(rows)
    }
}

/// Reads rows from a JSON array of flat objects. Scalar values are taken as
/// their textual form; nulls are treated as missing fields.
pub struct JsonSource<R: Read> {
    name: String,
    reader: Option<R>,
}

impl JsonSource<File> {
    pub fn from_path(path: &Path) -> Result<Self, AnalysisError> {
        let name = path.display().to_string();
        let file = File::open(path).map_err(|e| AnalysisError::source_unavailable(&name, e))?;
        Ok(Self::from_reader(name, file))
    }
}

impl<R: Read> JsonSource<R> {
    pub fn from_reader(name: impl Into<String>, reader: R) -> Self {
        Self {
            name: name.into(),
            reader: Some(reader),
        }
    }
}

impl<R: Read> TabularSource for JsonSource<R> {
    fn name(&self) -> &str {
        &self.name
    }

    fn rows(&mut self) -> Result<Vec<RawRow>, AnalysisError> {
        let Some(reader) = self.reader.take() else {
            return Ok(Vec::new());
        };

        let objects: Vec<serde_json::Map<String, serde_json::Value>> =
            serde_json::from_reader(reader)
                .map_err(|e| AnalysisError::source_unavailable(&self.name, e))?;

        Ok(objects
            .into_iter()
            .map(|object| {
                object
                    .into_iter()
                    .filter_map(|(key, value)| match value {
                        serde_json::Value::Null => None,
                        serde_json::Value::String(text) => Some((key, text)),
                        other => Some((key, other.to_string())),
                    })
                    .collect()
            })
            .collect())
    }
}

/// File formats a source can be opened from, selected by file suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Json,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Result<Self, AnalysisError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("csv") => Ok(SourceFormat::Csv),
            Some("json") => Ok(SourceFormat::Json),
            _ => Err(AnalysisError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Opens the source matching the suffix of `path`.
pub fn open_source(path: &Path) -> Result<Box<dyn TabularSource>, AnalysisError> {
    let format = SourceFormat::from_path(path)?;
    debug!(path = %path.display(), ?format, "Opening tabular source");

    Ok(match format {
        SourceFormat::Csv => Box::new(CsvSource::from_path(path)?),
        SourceFormat::Json => Box::new(JsonSource::from_path(path)?),
    })
}

/// Ingests every row of `source` into a [`Dataset`], in source order.
///
/// # Errors
///
/// Returns [`AnalysisError::SourceUnavailable`] if the source cannot be read.
/// Individual malformed fields never fail the load.
pub fn load(source: &mut dyn TabularSource) -> Result<Dataset, AnalysisError> {
    let rows = source.rows()?;
    let dataset: Dataset = rows.iter().map(SurveyRecord::from_row).collect();

    info!(
        source = source.name(),
        records = dataset.len(),
        "Loaded survey responses"
    );
    Ok(dataset)
}
