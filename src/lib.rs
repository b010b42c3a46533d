pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{LocalStorage, SmtpMailer};
#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{MailCredentials, ReportConfig};
pub use core::{
    engine::{ReportEngine, RunSummary},
    extract::Extractor,
    fetch::Fetcher,
    notify::Notifier,
    persist::Persister,
    pipeline::StockReportPipeline,
};
pub use utils::error::{ReportError, Result};
