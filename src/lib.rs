pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod model;
pub mod report;
pub mod size;

#[cfg(feature = "elasticsearch")]
pub mod client;

pub use config::{Config, ElasticsearchConfig, ElasticsearchCredential, ReportConfig};
