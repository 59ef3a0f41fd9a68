pub mod advisor;
pub mod analyzer;
pub mod assembler;
pub mod http;
pub mod insights;
pub mod performance;
pub mod probe;
pub mod report_renderer;
pub mod scoring;
pub mod security;
pub mod statistics;

pub use analyzer::SiteAnalyzer;
pub use assembler::ReportAssembler;
pub use http::HttpFetcher;
pub use report_renderer::{ReportDocument, ReportKind};

#[cfg(test)]
mod tests;
