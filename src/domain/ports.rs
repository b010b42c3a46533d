use crate::domain::model::{EmailMessage, MailAttachment, ReportArtifacts, StockTable};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Local};
use std::path::PathBuf;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    /// Location a relative path resolves to.
    fn locate(&self, path: &str) -> PathBuf;
}

pub trait Mailer: Send + Sync {
    fn send(
        &self,
        message: &EmailMessage,
        attachments: Vec<MailAttachment>,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn fetch(&self) -> Result<String>;
    async fn extract(&self, html: String) -> Result<StockTable>;
    async fn persist(&self, table: &StockTable, timestamp: DateTime<Local>)
        -> Result<ReportArtifacts>;
    /// `Ok(false)` when notifications are disabled for the run.
    async fn notify(&self, artifacts: &ReportArtifacts, collected_at: DateTime<Local>)
        -> Result<bool>;
}
