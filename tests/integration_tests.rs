use chrono::NaiveDate;
use csat_analyzer::analyzers::Frequency;
use csat_analyzer::error::AnalysisError;
use csat_analyzer::generate::SampleSpec;
use csat_analyzer::output::ReportSink;
use csat_analyzer::pipeline::{AnalysisOptions, Analyzer};
use csat_analyzer::report::Report;
use csat_analyzer::source::CsvSource;
use rand::SeedableRng;
use rand::rngs::StdRng;

#[derive(Default)]
struct MemorySink {
    reports: Vec<Report>,
}

impl ReportSink for MemorySink {
    fn write(&mut self, report: &Report, _destination: &str) -> Result<(), AnalysisError> {
        self.reports.push(report.clone());
        Ok(())
    }
}

#[test]
fn test_full_pipeline() {
    let csv = include_str!("fixtures/sample_survey.csv");
    let mut source = CsvSource::from_reader("sample_survey.csv", csv.as_bytes());
    let mut sink = MemorySink::default();
    let mut analyzer = Analyzer::default();

    let report = analyzer
        .run(
            &mut source,
            &AnalysisOptions::default(),
            &mut sink,
            "satisfaction_analysis.json",
        )
        .expect("pipeline should succeed");

    // scores 5,2,4,3,1,"five"(0),4,5 => 4 satisfied of 8, sum 24
    assert_eq!(report.summary.total_responses, 8);
    assert_eq!(report.summary.csat_percentage, 50.0);
    assert_eq!(report.summary.composite_csat, 3.0);

    let categories = report.category_analysis.as_ref().unwrap();
    let keys: Vec<_> = categories.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["Product", "Customer Service", "Website", "App"]);
    assert_eq!(categories["Website"].sample_size, 2);
    assert_eq!(categories["Website"].composite_score, 2.0);

    let unhappy: Vec<_> = report
        .unhappy_customers
        .as_ref()
        .unwrap()
        .iter()
        .map(|r| r.customer_id.as_str())
        .collect();
    assert_eq!(unhappy, vec!["CUST_0002", "CUST_0004", "CUST_0005"]);

    let trends = report.trends.as_ref().unwrap();
    let periods: Vec<_> = trends.keys().map(String::as_str).collect();
    assert_eq!(
        periods,
        vec!["2024-01-01", "2024-01-08", "2024-01-15", "2024-01-29", "2024-02-05"]
    );
    assert_eq!(trends["2024-01-01"].response_count, 3);

    assert_eq!(sink.reports.len(), 1);
}

#[test]
fn test_exported_json_round_trips() {
    let csv = include_str!("fixtures/sample_survey.csv");
    let mut source = CsvSource::from_reader("sample_survey.csv", csv.as_bytes());
    let mut analyzer = Analyzer::default();
    let report = analyzer
        .run(
            &mut source,
            &AnalysisOptions::default(),
            &mut MemorySink::default(),
            "out.json",
        )
        .unwrap();

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

    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["unhappy_customers"][0]["satisfaction_score"], 2);
}

#[test]
fn test_generated_pipeline_is_reproducible() {
    let today = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
    let spec = SampleSpec::new(120);
    let options = AnalysisOptions {
        frequency: Frequency::Monthly.to_string(),
        ..AnalysisOptions::default()
    };

    let mut first = Analyzer::default();
    first
        .generate(&spec, today, &mut StdRng::seed_from_u64(11))
        .unwrap();
    let a = first.execute(&options, &mut MemorySink::default(), "a.json").unwrap();

    let mut second = Analyzer::default();
    second
        .generate(&spec, today, &mut StdRng::seed_from_u64(11))
        .unwrap();
    let b = second.execute(&options, &mut MemorySink::default(), "b.json").unwrap();

    assert_eq!(a.summary.csat_percentage, b.summary.csat_percentage);
    assert_eq!(a.category_analysis, b.category_analysis);
    assert_eq!(a.trends, b.trends);

    assert!((0.0..=100.0).contains(&a.summary.csat_percentage));
    assert!((0.0..=5.0).contains(&a.summary.composite_csat));
    let partitioned: usize = a
        .category_analysis
        .as_ref()
        .unwrap()
        .values()
        .map(|m| m.sample_size)
        .sum();
    assert_eq!(partitioned, 120);
}
