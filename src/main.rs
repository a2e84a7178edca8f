//! CLI entry point for the customer satisfaction analyzer.
//!
//! Provides subcommands for analyzing an existing survey export and for
//! generating, saving, and analyzing synthetic survey data.

use anyhow::Result;
use chrono::Local;
use clap::{Args, Parser, Subcommand, ValueEnum};
use csat_analyzer::output::{JsonFileSink, MarkdownFileSink, ReportSink, write_dataset_csv};
use csat_analyzer::pipeline::{AnalysisOptions, Analyzer, MetricKind};
use csat_analyzer::{generate::SampleSpec, source::open_source};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "csat_analyzer")]
#[command(about = "Analyze customer satisfaction survey responses", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze survey responses from a CSV or JSON file
    Analyze {
        /// Path to the survey export
        #[arg(value_name = "FILE")]
        source: PathBuf,

        #[command(flatten)]
        analysis: AnalysisArgs,
    },
    /// Generate sample survey responses, save them, and analyze them
    Generate {
        /// Number of responses to generate
        #[arg(short = 'n', long, default_value_t = 100)]
        count: usize,

        /// Categories to draw from (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        categories: Vec<String>,

        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,

        /// CSV file to save the generated responses to
        #[arg(short, long, default_value = "sample_satisfaction_data.csv")]
        save: String,

        #[command(flatten)]
        analysis: AnalysisArgs,
    },
}

#[derive(Args)]
struct AnalysisArgs {
    /// JSON file to export results to
    #[arg(short, long, env = "CSAT_OUTPUT", default_value = "satisfaction_analysis.json")]
    output: String,

    /// Scores at or below this value are flagged as unhappy
    #[arg(short, long, env = "CSAT_UNHAPPY_THRESHOLD", default_value_t = 3)]
    threshold: i64,

    /// Trend bucket: daily, weekly, or monthly
    #[arg(short, long, env = "CSAT_TREND_FREQUENCY", default_value = "weekly")]
    frequency: String,

    /// Metrics to compute (comma-separated, default all)
    #[arg(short, long, value_enum, value_delimiter = ',')]
    metrics: Vec<MetricArg>,

    /// Optional: also write a markdown report to this path
    #[arg(long)]
    markdown: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum MetricArg {
    Csat,
    Composite,
    Category,
    Unhappy,
    Trends,
}

impl From<MetricArg> for MetricKind {
    fn from(arg: MetricArg) -> Self {
        match arg {
            MetricArg::Csat => MetricKind::Csat,
            MetricArg::Composite => MetricKind::Composite,
            MetricArg::Category => MetricKind::Category,
            MetricArg::Unhappy => MetricKind::Unhappy,
            MetricArg::Trends => MetricKind::Trends,
        }
    }
}

impl AnalysisArgs {
    fn options(&self) -> AnalysisOptions {
        let mut options = AnalysisOptions {
            unhappy_threshold: self.threshold,
            frequency: self.frequency.clone(),
            ..AnalysisOptions::default()
        };
        if !self.metrics.is_empty() {
            options.metrics = self.metrics.iter().copied().map(MetricKind::from).collect();
        }
        options
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/csat_analyzer.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("csat_analyzer.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let mut analyzer = Analyzer::default();

    match cli.command {
        Commands::Analyze { source, analysis } => {
            let mut source = open_source(&source)?;
            analyzer.load(&mut *source)?;
            if analyzer.dataset().is_empty() {
                warn!("No data available for analysis");
            }
            analyze(&mut analyzer, &analysis)?;
        }
        Commands::Generate {
            count,
            categories,
            seed,
            save,
            analysis,
        } => {
            let spec = SampleSpec::new(count).with_categories(categories);
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_os_rng(),
            };
            analyzer.generate(&spec, Local::now().date_naive(), &mut rng)?;
            write_dataset_csv(&save, analyzer.dataset())?;
            analyze(&mut analyzer, &analysis)?;
        }
    }

    info!("Analysis complete");
    Ok(())
}

/// Computes the requested metrics and writes the JSON (and optional markdown) report.
fn analyze(analyzer: &mut Analyzer, args: &AnalysisArgs) -> Result<()> {
    let report = analyzer.execute(&args.options(), &mut JsonFileSink, &args.output)?;

    if let Some(path) = &args.markdown {
        MarkdownFileSink.write(&report, path)?;
    }

    Ok(())
}
