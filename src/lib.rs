pub mod cli;
pub mod commands;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod extractor;
pub mod lifecycle;
pub mod repository;
pub mod service;
pub mod test_utils;

pub use config::{AnalyzerConfig, AuditMode};
pub use domain::models::AnalysisReport;
pub use error::{AnalysisFailure, AppError};
pub use service::SiteAnalyzer;
