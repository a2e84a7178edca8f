//! Analysis session and pipeline driver.
//!
//! An [`Analyzer`] owns one [`Dataset`] and the metrics computed over it so
//! far. Each metric step reads the dataset only, so steps are independent and
//! a failed export leaves every computed figure available for another attempt.

use std::collections::BTreeMap;

use chrono::{Local, NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use rand::Rng;
use tracing::{error, info, warn};

use crate::analyzers::types::{CategoryMetrics, TrendPoint};
use crate::analyzers::{self, Frequency};
use crate::error::AnalysisError;
use crate::generate::{SampleSpec, generate};
use crate::output::ReportSink;
use crate::record::{Dataset, SurveyRecord};
use crate::report::{MetricsResult, Report, assemble};
use crate::source::{TabularSource, load};

const UNHAPPY_PREVIEW: usize = 5;

/// Metric steps, in the order the pipeline runs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MetricKind {
    Csat,
    Composite,
    Category,
    Unhappy,
    Trends,
}

impl MetricKind {
    pub const ALL: [MetricKind; 5] = [
        MetricKind::Csat,
        MetricKind::Composite,
        MetricKind::Category,
        MetricKind::Unhappy,
        MetricKind::Trends,
    ];
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOptions {
    pub metrics: Vec<MetricKind>,
    pub unhappy_threshold: i64,
    /// Trend frequency as given by the user; unrecognized values mean weekly.
    pub frequency: String,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            metrics: MetricKind::ALL.to_vec(),
            unhappy_threshold: analyzers::metrics::DEFAULT_UNHAPPY_THRESHOLD,
            frequency: Frequency::default().to_string(),
        }
    }
}

#[derive(Debug, Default)]
pub struct Analyzer {
    dataset: Dataset,
    results: MetricsResult,
}

impl Analyzer {
    pub fn new(dataset: Dataset) -> Self {
        Self {
            dataset,
            results: MetricsResult::default(),
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn results(&self) -> &MetricsResult {
        &self.results
    }

    /// Replaces the session dataset with the rows of `source`.
    ///
    /// On failure the session is left with an empty dataset and the error is
    /// returned to the caller.
    #[tracing::instrument(skip_all, fields(source = source.name()))]
    pub fn load(&mut self, source: &mut dyn TabularSource) -> Result<usize, AnalysisError> {
        self.results = MetricsResult::default();
        match load(source) {
            Ok(dataset) => {
                self.dataset = dataset;
                Ok(self.dataset.len())
            }
            Err(e) => {
                error!(error = %e, "Error loading data");
                self.dataset = Dataset::default();
                Err(e)
            }
        }
    }

    /// Replaces the session dataset with generated sample data.
    pub fn generate<R: Rng + ?Sized>(
        &mut self,
        spec: &SampleSpec,
        today: NaiveDate,
        rng: &mut R,
    ) -> Result<usize, AnalysisError> {
        self.results = MetricsResult::default();
        self.dataset = generate(spec, today, rng)?;
        Ok(self.dataset.len())
    }

    fn records(&self) -> &[SurveyRecord] {
        self.dataset.records()
    }

    pub fn calculate_csat(&mut self) -> f64 {
        let value = analyzers::csat(self.records());
        info!(
            responses = self.dataset.len(),
            "CSAT Score: {:.2}%", value
        );
        *self.results.csat_percentage.insert(value)
    }

    pub fn calculate_composite_csat(&mut self) -> f64 {
        let value = analyzers::composite_csat(self.records());
        info!("Composite CSAT Score: {:.2} / 5.00", value);
        *self.results.composite_csat.insert(value)
    }

    pub fn analyze_by_category(&mut self) -> &IndexMap<String, CategoryMetrics> {
        let categories = analyzers::by_category(self.records());
        for (category, metrics) in &categories {
            info!(
                category = %category,
                sample_size = metrics.sample_size,
                "CSAT {:.2}%, Composite Score {:.2} / 5.00",
                metrics.csat_percentage,
                metrics.composite_score
            );
        }
        self.results.category_analysis.insert(categories)
    }

    pub fn identify_unhappy_customers(&mut self, threshold: i64) -> &[SurveyRecord] {
        let unhappy = analyzers::unhappy(self.records(), threshold);

        if unhappy.is_empty() {
            info!(threshold, "No unhappy customers identified");
        } else {
            info!(
                count = unhappy.len(),
                threshold, "Identified unhappy customers"
            );
            for (i, record) in unhappy.iter().take(UNHAPPY_PREVIEW).enumerate() {
                info!(
                    rank = i + 1,
                    customer_id = %record.customer_id,
                    score = %record.display_score(),
                    category = %record.category,
                    "Unhappy customer"
                );
            }
            if unhappy.len() > UNHAPPY_PREVIEW {
                info!("... and {} more", unhappy.len() - UNHAPPY_PREVIEW);
            }
        }

        self.results.unhappy_customers.insert(unhappy)
    }

    /// Buckets responses by period. An unrecognized `frequency` is treated as weekly.
    pub fn analyze_trends(&mut self, frequency: &str) -> &BTreeMap<String, TrendPoint> {
        let frequency = Frequency::parse_or_default(frequency);
        let trends = analyzers::trends(self.records(), frequency);

        if trends.is_empty() {
            warn!(%frequency, "No valid dates found for trend analysis");
        }
        for (period, point) in &trends {
            info!(
                %frequency,
                period = %period,
                "CSAT {:.2}%, Avg Score {:.2}, Responses {}",
                point.csat_percentage,
                point.avg_score,
                point.response_count
            );
        }

        self.results.trends.insert(trends)
    }

    /// Runs every requested metric step once, in pipeline order.
    #[tracing::instrument(skip_all, fields(records = self.dataset.len()))]
    pub fn compute(&mut self, options: &AnalysisOptions) {
        for kind in MetricKind::ALL {
            if !options.metrics.contains(&kind) {
                continue;
            }
            match kind {
                MetricKind::Csat => {
                    self.calculate_csat();
                }
                MetricKind::Composite => {
                    self.calculate_composite_csat();
                }
                MetricKind::Category => {
                    self.analyze_by_category();
                }
                MetricKind::Unhappy => {
                    self.identify_unhappy_customers(options.unhappy_threshold);
                }
                MetricKind::Trends => {
                    self.analyze_trends(&options.frequency);
                }
            }
        }
    }

    /// Assembles the metrics computed so far, stamped with `analyzed_at`.
    pub fn report(&self, analyzed_at: NaiveDateTime) -> Report {
        assemble(&self.dataset, &self.results, analyzed_at)
    }

    /// Assembles the current results and hands them to `sink`.
    ///
    /// # Errors
    ///
    /// Returns the sink's [`AnalysisError::SinkWrite`]; computed results are
    /// kept either way.
    #[tracing::instrument(skip(self, sink))]
    pub fn export(
        &self,
        sink: &mut dyn ReportSink,
        destination: &str,
    ) -> Result<Report, AnalysisError> {
        if self.results.is_empty() {
            warn!("No metrics computed, exporting summary only");
        }
        let report = self.report(Local::now().naive_local());
        if let Err(e) = sink.write(&report, destination) {
            error!(error = %e, "Error exporting results");
            return Err(e);
        }
        Ok(report)
    }

    /// Computes the requested metrics over the current dataset and exports them.
    pub fn execute(
        &mut self,
        options: &AnalysisOptions,
        sink: &mut dyn ReportSink,
        destination: &str,
    ) -> Result<Report, AnalysisError> {
        self.compute(options);
        self.export(sink, destination)
    }

    /// Full pipeline: load from `source`, compute, assemble, and export.
    /// Nothing is computed when the source cannot be read.
    pub fn run(
        &mut self,
        source: &mut dyn TabularSource,
        options: &AnalysisOptions,
        sink: &mut dyn ReportSink,
        destination: &str,
    ) -> Result<Report, AnalysisError> {
        self.load(source)?;
        self.execute(options, sink, destination)
    }
}
