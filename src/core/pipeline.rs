use crate::core::extract::Extractor;
use crate::core::fetch::Fetcher;
use crate::core::notify::Notifier;
use crate::core::persist::Persister;
use crate::domain::model::{ReportArtifacts, StockTable};
use crate::domain::ports::{Mailer, Pipeline, Storage};
use crate::utils::error::Result;
use chrono::{DateTime, Local};

/// Fetch, extract, persist and notify for the most active listing.
pub struct StockReportPipeline<S: Storage, M: Mailer> {
    fetcher: Fetcher,
    extractor: Extractor<S>,
    persister: Persister<S>,
    notifier: Option<Notifier<M>>,
}

impl<S: Storage, M: Mailer> StockReportPipeline<S, M> {
    /// `notifier` is `None` when the run should not send email.
    pub fn new(
        fetcher: Fetcher,
        extractor: Extractor<S>,
        persister: Persister<S>,
        notifier: Option<Notifier<M>>,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            persister,
            notifier,
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage, M: Mailer> Pipeline for StockReportPipeline<S, M> {
    async fn fetch(&self) -> Result<String> {
        self.fetcher.fetch().await
    }

    async fn extract(&self, html: String) -> Result<StockTable> {
        self.extractor.extract(&html).await
    }

    async fn persist(
        &self,
        table: &StockTable,
        timestamp: DateTime<Local>,
    ) -> Result<ReportArtifacts> {
        self.persister.persist(table, timestamp).await
    }

    async fn notify(
        &self,
        artifacts: &ReportArtifacts,
        collected_at: DateTime<Local>,
    ) -> Result<bool> {
        match &self.notifier {
            Some(notifier) => {
                notifier.notify(artifacts, collected_at).await?;
                Ok(true)
            }
            None => {
                tracing::info!("✉️ Email disabled, skipping notification");
                Ok(false)
            }
        }
    }
}
