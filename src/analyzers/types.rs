//! Result types produced by the metric and trend analyzers.

use serde::{Deserialize, Serialize};

/// Satisfaction figures for one category partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryMetrics {
    pub csat_percentage: f64,
    pub composite_score: f64,
    pub sample_size: usize,
}

/// Satisfaction figures for one calendar period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub avg_score: f64,
    pub csat_percentage: f64,
    pub response_count: usize,
}
