pub mod matching_service;
pub mod report_writer;
pub mod statistics_service;

pub use matching_service::MatchingService;
pub use report_writer::ReportWriter;
pub use statistics_service::{aggregate, RunStatistics};
