//! Survey metric computation.
//!
//! Pure functions over a slice of records: overall and per-category CSAT,
//! composite scores, low-score scans, and calendar trend buckets.

pub mod metrics;
pub mod trends;
pub mod types;
pub mod utility;

pub use metrics::{by_category, composite_csat, csat, unhappy};
pub use trends::{Frequency, trends};
