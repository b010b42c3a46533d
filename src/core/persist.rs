use crate::config::OutputConfig;
use crate::core::spreadsheet::{render_spreadsheet, SheetLayout};
use crate::domain::model::{ReportArtifacts, StockTable, COLUMNS};
use crate::domain::ports::Storage;
use crate::utils::error::{ReportError, Result};
use chrono::{DateTime, Local};

pub struct Persister<S: Storage> {
    storage: S,
    config: OutputConfig,
}

impl<S: Storage> Persister<S> {
    pub fn new(storage: S, config: OutputConfig) -> Self {
        Self { storage, config }
    }

    /// `<prefix>_<YYYYmmdd_HHMMSS>.csv` and `.xlsx`.
    pub fn artifact_names(&self, timestamp: DateTime<Local>) -> (String, String) {
        let stem = format!(
            "{}_{}",
            self.config.file_prefix,
            timestamp.format("%Y%m%d_%H%M%S")
        );
        (format!("{}.csv", stem), format!("{}.xlsx", stem))
    }

    pub async fn persist(
        &self,
        table: &StockTable,
        timestamp: DateTime<Local>,
    ) -> Result<ReportArtifacts> {
        let (csv_name, xlsx_name) = self.artifact_names(timestamp);

        // 先在記憶體中產生兩個檔案
        let csv_data = render_csv(table)?;
        let layout = SheetLayout {
            sheet_name: self.config.sheet_name.clone(),
            title: self.config.title.clone(),
        };
        let xlsx_data = render_spreadsheet(table, &layout, timestamp)?;

        tracing::debug!("Writing CSV file ({} bytes) to storage", csv_data.len());
        self.storage.write_file(&csv_name, &csv_data).await?;
        let csv_path = self.storage.locate(&csv_name);
        tracing::info!("💾 Data saved to {}", csv_path.display());

        tracing::debug!("Writing XLSX file ({} bytes) to storage", xlsx_data.len());
        self.storage.write_file(&xlsx_name, &xlsx_data).await?;
        let spreadsheet_path = self.storage.locate(&xlsx_name);
        tracing::info!("📊 Formatted report saved to {}", spreadsheet_path.display());

        Ok(ReportArtifacts {
            csv_path,
            spreadsheet_path,
        })
    }
}

/// Header row from `COLUMNS`, then one record per row.
pub fn render_csv(table: &StockTable) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(COLUMNS)?;
    for row in table.rows() {
        writer.serialize(row)?;
    }

    writer
        .into_inner()
        .map_err(|e| ReportError::IoError(e.into_error()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::StockRow;
    use chrono::TimeZone;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }

        fn locate(&self, path: &str) -> PathBuf {
            PathBuf::from("reports").join(path)
        }
    }

    fn sample_table() -> StockTable {
        let rows = [
            ("NVDA", "NVIDIA Corporation", "120.50", "+2.35"),
            ("F", "Ford Motor Company", "10.12", "-0.08"),
            ("BRK.B", "Berkshire Hathaway, Inc.", "410.00", "0.00"),
        ]
        .iter()
        .map(|(symbol, name, price, change)| StockRow {
            symbol: symbol.to_string(),
            name: name.to_string(),
            price: price.to_string(),
            change: change.to_string(),
            change_percent: "+0.50%".to_string(),
            volume: "12.3M".to_string(),
            market_cap: "N/A".to_string(),
        })
        .collect();
        StockTable::new(rows)
    }

    fn timestamp() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 10, 16, 18, 5, 9).unwrap()
    }

    #[test]
    fn test_artifact_names() {
        let persister = Persister::new(MockStorage::new(), OutputConfig::default());
        let (csv_name, xlsx_name) = persister.artifact_names(timestamp());
        assert_eq!(csv_name, "yahoo_most_active_20261016_180509.csv");
        assert_eq!(xlsx_name, "yahoo_most_active_20261016_180509.xlsx");
    }

    #[test]
    fn test_render_csv_round_trip() {
        let table = sample_table();
        let data = render_csv(&table).unwrap();

        let text = String::from_utf8(data.clone()).unwrap();
        assert!(text.starts_with("Symbol,Name,Price,Change,Change %,Volume,Market Cap\n"));
        assert!(text.contains("\"Berkshire Hathaway, Inc.\""));

        let mut reader = csv::Reader::from_reader(data.as_slice());
        let rows: Vec<StockRow> = reader
            .deserialize::<StockRow>()
            .collect::<std::result::Result<_, _>>()
            .unwrap();

        assert_eq!(rows.len(), table.len());
        let symbols: Vec<&str> = rows.iter().map(|row| row.symbol.as_str()).collect();
        assert_eq!(symbols, table.symbols());
        assert_eq!(rows, table.rows());
    }

    #[tokio::test]
    async fn test_persist_writes_both_files() {
        let storage = MockStorage::new();
        let persister = Persister::new(storage.clone(), OutputConfig::default());

        let artifacts = persister.persist(&sample_table(), timestamp()).await.unwrap();

        assert_eq!(
            artifacts.csv_path,
            PathBuf::from("reports/yahoo_most_active_20261016_180509.csv")
        );
        assert_eq!(
            artifacts.spreadsheet_path,
            PathBuf::from("reports/yahoo_most_active_20261016_180509.xlsx")
        );

        let csv_data = storage
            .get_file("yahoo_most_active_20261016_180509.csv")
            .await
            .unwrap();
        assert_eq!(String::from_utf8(csv_data).unwrap().lines().count(), 4);

        let xlsx_data = storage
            .get_file("yahoo_most_active_20261016_180509.xlsx")
            .await
            .unwrap();
        assert!(xlsx_data.starts_with(b"PK"));
    }
}
