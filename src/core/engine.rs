use crate::core::Pipeline;
use crate::domain::model::ReportArtifacts;
use crate::utils::error::Result;
use chrono::Local;

/// Outcome of a completed run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub rows: usize,
    pub artifacts: ReportArtifacts,
    pub emailed: bool,
}

pub struct ReportEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> ReportEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    /// Runs the stages in order; the first failure aborts the rest.
    pub async fn run(&self) -> Result<RunSummary> {
        println!(
            "Fetching most active stocks at {}",
            Local::now().format("%Y-%m-%d %H:%M:%S")
        );

        // Fetch
        let html = self.pipeline.fetch().await?;

        // Extract
        let table = self.pipeline.extract(html).await?;
        println!("\nMost Active Stocks ({} rows):", table.len());
        println!("{}", table);

        // Persist
        let timestamp = Local::now();
        let artifacts = self.pipeline.persist(&table, timestamp).await?;
        println!("Data saved to {}", artifacts.csv_path.display());
        println!(
            "Formatted data saved to {}",
            artifacts.spreadsheet_path.display()
        );

        // Notify
        let emailed = self.pipeline.notify(&artifacts, timestamp).await?;
        if emailed {
            println!("Email with the stock data sent successfully!");
        }

        Ok(RunSummary {
            rows: table.len(),
            artifacts,
            emailed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{StockRow, StockTable};
    use crate::utils::error::ReportError;
    use chrono::DateTime;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct ScriptedPipeline {
        fail_at: Option<&'static str>,
        calls: AtomicUsize,
    }

    impl ScriptedPipeline {
        fn failing_at(stage: &'static str) -> Self {
            Self {
                fail_at: Some(stage),
                calls: AtomicUsize::new(0),
            }
        }

        fn step(&self, stage: &'static str) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_at == Some(stage) {
                return Err(ReportError::MailError {
                    message: format!("{} failed", stage),
                });
            }
            Ok(())
        }
    }

    #[async_trait::async_trait]
    impl Pipeline for ScriptedPipeline {
        async fn fetch(&self) -> Result<String> {
            self.step("fetch")?;
            Ok("<table></table>".to_string())
        }

        async fn extract(&self, _html: String) -> Result<StockTable> {
            self.step("extract")?;
            Ok(StockTable::new(vec![StockRow {
                symbol: "NVDA".to_string(),
                name: "NVIDIA".to_string(),
                price: "120.50".to_string(),
                change: "+2.35".to_string(),
                change_percent: "+1.99%".to_string(),
                volume: "312.4M".to_string(),
                market_cap: "2.95T".to_string(),
            }]))
        }

        async fn persist(
            &self,
            _table: &StockTable,
            _timestamp: DateTime<Local>,
        ) -> Result<ReportArtifacts> {
            self.step("persist")?;
            Ok(ReportArtifacts {
                csv_path: PathBuf::from("report.csv"),
                spreadsheet_path: PathBuf::from("report.xlsx"),
            })
        }

        async fn notify(
            &self,
            _artifacts: &ReportArtifacts,
            _collected_at: DateTime<Local>,
        ) -> Result<bool> {
            self.step("notify")?;
            Ok(true)
        }
    }

    #[tokio::test]
    async fn test_run_all_stages() {
        let engine = ReportEngine::new(ScriptedPipeline::default());
        let summary = engine.run().await.unwrap();

        assert_eq!(summary.rows, 1);
        assert!(summary.emailed);
        assert_eq!(engine.pipeline.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_failure_short_circuits_later_stages() {
        for (stage, expected_calls) in [("fetch", 1), ("extract", 2), ("persist", 3), ("notify", 4)] {
            let engine = ReportEngine::new(ScriptedPipeline::failing_at(stage));
            assert!(engine.run().await.is_err());
            assert_eq!(engine.pipeline.calls.load(Ordering::SeqCst), expected_calls);
        }
    }
}
