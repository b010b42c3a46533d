use crate::domain::ports::Storage;
use crate::utils::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }
}

impl Storage for LocalStorage {
    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.locate(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(full_path, data)?;
        Ok(())
    }

    fn locate(&self, path: &str) -> PathBuf {
        let full_path = Path::new(&self.base_path).join(path);
        // 郵件附件需要絕對路徑
        std::path::absolute(&full_path).unwrap_or(full_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_creates_missing_directories() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path().join("nested/reports");
        let storage = LocalStorage::new(base.to_str().unwrap().to_string());

        storage.write_file("report.csv", b"Symbol\nNVDA\n").await.unwrap();

        let data = fs::read(storage.locate("report.csv")).unwrap();
        assert_eq!(data, b"Symbol\nNVDA\n");
        assert!(base.join("report.csv").exists());
    }

    #[test]
    fn test_locate_is_absolute() {
        let storage = LocalStorage::new(".".to_string());
        let located = storage.locate("report.xlsx");
        assert!(located.is_absolute());
        assert!(located.ends_with("report.xlsx"));
    }
}
