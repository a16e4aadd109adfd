use crate::core::Storage;
use crate::utils::error::Result;
use std::fs;
use std::path::Path;

/// 寫入本機目錄，同名檔案直接覆寫
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
    async fn write_file(&self, path: &str, data: &[u8]) -> Result<String> {
        let full_path = Path::new(&self.base_path).join(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&full_path, data)?;
        tracing::debug!("Wrote {} bytes to {}", data.len(), full_path.display());
        Ok(full_path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_file_overwrites_previous_content() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());

        storage.write_file("out.csv", b"old,content\n").await.unwrap();
        let written = storage.write_file("out.csv", b"a\n1\n").await.unwrap();

        assert!(written.ends_with("out.csv"));
        let content = fs::read_to_string(temp_dir.path().join("out.csv")).unwrap();
        assert_eq!(content, "a\n1\n");
    }

    #[tokio::test]
    async fn test_write_file_creates_missing_directories() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("nested").join("dir");
        let storage = LocalStorage::new(nested.to_str().unwrap().to_string());

        storage.write_file("out.csv", b"x\n").await.unwrap();

        assert!(nested.join("out.csv").exists());
    }
}
