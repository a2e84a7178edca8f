//! Report assembly and human-readable rendering.
//!
//! [`MetricsResult`] accumulates whichever metrics a session has computed;
//! [`assemble`] turns it into the [`Report`] tree handed to a sink.

use std::collections::BTreeMap;
use std::fmt::Write;

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::analyzers::types::{CategoryMetrics, TrendPoint};
use crate::record::{Dataset, SurveyRecord};

pub const ANALYSIS_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Unhappy customers listed individually in rendered output; the rest are counted.
const UNHAPPY_PREVIEW: usize = 5;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsResult {
    pub csat_percentage: Option<f64>,
    pub composite_csat: Option<f64>,
    pub category_analysis: Option<IndexMap<String, CategoryMetrics>>,
    pub unhappy_customers: Option<Vec<SurveyRecord>>,
    pub trends: Option<BTreeMap<String, TrendPoint>>,
}

impl MetricsResult {
    pub fn is_empty(&self) -> bool {
        self.csat_percentage.is_none()
            && self.composite_csat.is_none()
            && self.category_analysis.is_none()
            && self.unhappy_customers.is_none()
            && self.trends.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub csat_percentage: f64,
    pub composite_csat: f64,
    pub total_responses: usize,
    pub analysis_date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub summary: Summary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_analysis: Option<IndexMap<String, CategoryMetrics>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unhappy_customers: Option<Vec<SurveyRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trends: Option<BTreeMap<String, TrendPoint>>,
}

/// Merges computed metrics into a report. Metrics not yet computed are
/// absent from the tree, except the summary figures which default to zero.
pub fn assemble(dataset: &Dataset, results: &MetricsResult, analyzed_at: NaiveDateTime) -> Report {
    Report {
        summary: Summary {
            csat_percentage: results.csat_percentage.unwrap_or(0.0),
            composite_csat: results.composite_csat.unwrap_or(0.0),
            total_responses: dataset.len(),
            analysis_date: analyzed_at.format(ANALYSIS_DATE_FORMAT).to_string(),
        },
        category_analysis: results.category_analysis.clone(),
        unhappy_customers: results.unhappy_customers.clone(),
        trends: results.trends.clone(),
    }
}

/// Renders a report as markdown with percentages and scores to two decimals.
pub fn render_markdown(report: &Report) -> String {
    let mut output = String::new();
    let summary = &report.summary;

    let _ = writeln!(output, "# Customer Satisfaction Report");
    let _ = writeln!(output, "Generated {}", summary.analysis_date);
    let _ = writeln!(output);
    let _ = writeln!(output, "## Summary");
    let _ = writeln!(output, "- CSAT: {:.2}%", summary.csat_percentage);
    let _ = writeln!(
        output,
        "- Composite CSAT: {:.2} / 5.00",
        summary.composite_csat
    );
    let _ = writeln!(output, "- Responses: {}", summary.total_responses);

    if let Some(categories) = &report.category_analysis {
        let _ = writeln!(output);
        let _ = writeln!(output, "## By Category");
        if categories.is_empty() {
            let _ = writeln!(output, "No responses to break down.");
        } else {
            let _ = writeln!(output, "| Category | CSAT | Composite | Sample Size |");
            let _ = writeln!(output, "|---|---|---|---|");
            for (category, metrics) in categories {
                let _ = writeln!(
                    output,
                    "| {} | {:.2}% | {:.2} / 5.00 | {} |",
                    category, metrics.csat_percentage, metrics.composite_score, metrics.sample_size
                );
            }
        }
    }

    if let Some(unhappy) = &report.unhappy_customers {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Unhappy Customers");
        if unhappy.is_empty() {
            let _ = writeln!(output, "No unhappy customers identified.");
        } else {
            for (i, record) in unhappy.iter().take(UNHAPPY_PREVIEW).enumerate() {
                let _ = writeln!(
                    output,
                    "{}. {} scored {} ({}): {}",
                    i + 1,
                    record.customer_id,
                    record.display_score(),
                    record.category,
                    record.comments
                );
            }
            if unhappy.len() > UNHAPPY_PREVIEW {
                let _ = writeln!(output, "... and {} more", unhappy.len() - UNHAPPY_PREVIEW);
            }
        }
    }

    if let Some(trends) = &report.trends {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Trends");
        if trends.is_empty() {
            let _ = writeln!(output, "No dated responses to chart.");
        } else {
            for (period, point) in trends {
                let _ = writeln!(
                    output,
                    "- {}: CSAT {:.2}%, Avg Score {:.2}, Responses {}",
                    period, point.csat_percentage, point.avg_score, point.response_count
                );
            }
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::{self, Frequency};
    use crate::record::{Score, SurveyDate};
    use chrono::NaiveDate;

    fn analyzed_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn record(id: &str, date: &str, category: &str, score: i64) -> SurveyRecord {
        SurveyRecord {
            customer_id: id.to_string(),
            date: Some(SurveyDate::coerce(date)),
            category: category.to_string(),
            satisfaction_score: Some(Score::Numeric(score)),
            comments: format!("comment {id}"),
        }
    }

    fn dataset() -> Dataset {
        Dataset::new(vec![
            record("C1", "2024-01-01", "Product", 5),
            record("C2", "2024-01-03", "App", 2),
            record("C3", "2024-01-09", "Product", 4),
            record("C4", "2024-01-10", "App", 1),
        ])
    }

    fn full_results(dataset: &Dataset) -> MetricsResult {
        let records = dataset.records();
        MetricsResult {
            csat_percentage: Some(analyzers::csat(records)),
            composite_csat: Some(analyzers::composite_csat(records)),
            category_analysis: Some(analyzers::by_category(records)),
            unhappy_customers: Some(analyzers::unhappy(records, 3)),
            trends: Some(analyzers::trends(records, Frequency::Weekly)),
        }
    }

    #[test]
    fn test_assemble_without_metrics_is_summary_only() {
        let report = assemble(&dataset(), &MetricsResult::default(), analyzed_at());
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["summary"]["csat_percentage"], 0.0);
        assert_eq!(json["summary"]["composite_csat"], 0.0);
        assert_eq!(json["summary"]["total_responses"], 4);
        assert_eq!(json["summary"]["analysis_date"], "2024-05-01 09:30:00");
        let keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["summary"]);
    }

    #[test]
    fn test_assemble_includes_computed_sections() {
        let dataset = dataset();
        let report = assemble(&dataset, &full_results(&dataset), analyzed_at());

        assert_eq!(report.summary.csat_percentage, 50.0);
        assert_eq!(report.summary.composite_csat, 3.0);
        assert_eq!(report.category_analysis.as_ref().unwrap().len(), 2);
        assert_eq!(report.unhappy_customers.as_ref().unwrap().len(), 2);

        let trends = report.trends.as_ref().unwrap();
        let keys: Vec<_> = trends.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["2024-01-01", "2024-01-08"]);
    }

    #[test]
    fn test_exported_tree_round_trips_summary() {
        let dataset = dataset();
        let report = assemble(&dataset, &full_results(&dataset), analyzed_at());
        let text = serde_json::to_string_pretty(&report).unwrap();
        let back: Report = serde_json::from_str(&text).unwrap();

        assert_eq!(
            format!("{:.2}", back.summary.csat_percentage),
            format!("{:.2}", report.summary.csat_percentage)
        );
        assert_eq!(
            format!("{:.2}", back.summary.composite_csat),
            format!("{:.2}", report.summary.composite_csat)
        );
        assert_eq!(back.summary.total_responses, report.summary.total_responses);
        assert_eq!(back, report);
    }

    #[test]
    fn test_category_order_survives_serialization() {
        let dataset = Dataset::new(vec![
            record("C1", "2024-01-01", "Website", 5),
            record("C2", "2024-01-01", "App", 5),
            record("C3", "2024-01-01", "Customer Service", 5),
        ]);
        let report = assemble(&dataset, &full_results(&dataset), analyzed_at());
        let text = serde_json::to_string(&report).unwrap();

        let website = text.find("\"Website\"").unwrap();
        let app = text.find("\"App\"").unwrap();
        let service = text.find("\"Customer Service\"").unwrap();
        assert!(website < app && app < service);
    }

    #[test]
    fn test_render_markdown_uses_two_decimals() {
        let dataset = Dataset::new(vec![
            record("C1", "2024-01-01", "App", 5),
            record("C2", "2024-01-01", "App", 4),
            record("C3", "2024-01-01", "App", 1),
        ]);
        let report = assemble(&dataset, &full_results(&dataset), analyzed_at());
        let markdown = render_markdown(&report);

        assert!(markdown.contains("- CSAT: 66.67%"));
        assert!(markdown.contains("- Composite CSAT: 3.33 / 5.00"));
        assert!(markdown.contains("| App | 66.67% | 3.33 / 5.00 | 3 |"));
        assert!(markdown.contains("1. C3 scored 1 (App): comment C3"));
        assert!(markdown.contains("- 2024-01-01: CSAT 66.67%, Avg Score 3.33, Responses 3"));
    }

    #[test]
    fn test_render_markdown_truncates_unhappy_list() {
        let records: Vec<_> = (1..=8)
            .map(|i| record(&format!("C{i}"), "2024-01-01", "App", 1))
            .collect();
        let dataset = Dataset::new(records);
        let report = assemble(&dataset, &full_results(&dataset), analyzed_at());
        let markdown = render_markdown(&report);

        assert!(markdown.contains("5. C5 scored 1"));
        assert!(!markdown.contains("6. C6"));
        assert!(markdown.contains("... and 3 more"));
    }

    #[test]
    fn test_render_markdown_summary_only() {
        let report = assemble(&Dataset::default(), &MetricsResult::default(), analyzed_at());
        let markdown = render_markdown(&report);

        assert!(markdown.contains("- CSAT: 0.00%"));
        assert!(!markdown.contains("## By Category"));
        assert!(!markdown.contains("## Trends"));
    }
}
