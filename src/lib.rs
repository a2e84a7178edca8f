pub mod analyzers;
pub mod error;
pub mod generate;
pub mod output;
pub mod pipeline;
pub mod record;
pub mod report;
pub mod source;
