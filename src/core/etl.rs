use crate::config::{ApiConfig, OUTPUT_FILE_NAME};
use crate::core::fetch::{AverageInterestRatesSource, SecuritiesSalesSource};
use crate::core::portfolio::PortfolioAssembler;
use crate::core::{export, Portfolio, SecuritySource, Storage};
use crate::utils::error::Result;
use reqwest::Client;

/// 一次執行的結果：資料本身與輸出檔路徑
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub portfolio: Portfolio,
    pub output_path: String,
}

pub struct EtlEngine<P: SecuritySource, F: SecuritySource, S: Storage> {
    assembler: PortfolioAssembler<P, F>,
    storage: S,
}

impl<S: Storage> EtlEngine<AverageInterestRatesSource, SecuritiesSalesSource, S> {
    /// 以同一個 HTTP client 建立主要與備援來源
    pub fn for_treasury(config: ApiConfig, storage: S) -> Self {
        let client = Client::new();
        let assembler = PortfolioAssembler::new(
            AverageInterestRatesSource::with_client(client.clone(), config.clone()),
            SecuritiesSalesSource::with_client(client, config),
        );
        Self::new(assembler, storage)
    }
}

impl<P: SecuritySource, F: SecuritySource, S: Storage> EtlEngine<P, F, S> {
    pub fn new(assembler: PortfolioAssembler<P, F>, storage: S) -> Self {
        Self { assembler, storage }
    }

    /// 抓取成功後才寫檔；兩個來源都失敗時不產生任何輸出
    pub async fn run(&self) -> Result<RunSummary> {
        let portfolio = self.assembler.assemble().await?;

        tracing::debug!(
            "Serializing {} records from {} source",
            portfolio.result_set.len(),
            portfolio.source
        );
        let csv_data = export::to_csv_bytes(&portfolio.result_set)?;
        let output_path = self.storage.write_file(OUTPUT_FILE_NAME, &csv_data).await?;

        tracing::info!("✓ Saved raw data to: {}", output_path);
        Ok(RunSummary {
            portfolio,
            output_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Record, ResultSet, SourceKind};
    use crate::utils::error::{EtlError, RemoteRequestError};
    use std::collections::HashMap;
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
        async fn write_file(&self, path: &str, data: &[u8]) -> Result<String> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(format!("memory/{}", path))
        }
    }

    struct FixedSource(Option<Vec<(&'static str, &'static str)>>);

    #[async_trait::async_trait]
    impl SecuritySource for FixedSource {
        fn name(&self) -> &str {
            "fixed"
        }

        fn url(&self) -> String {
            "stub://fixed".to_string()
        }

        async fn fetch(&self) -> Result<ResultSet> {
            match &self.0 {
                Some(cells) => {
                    let mut record = Record::default();
                    for (key, value) in cells {
                        record.data.insert(key.to_string(), value.to_string());
                    }
                    Ok(ResultSet::new(vec![record]))
                }
                None => Err(RemoteRequestError::Status {
                    status: 500,
                    body: None,
                }
                .into()),
            }
        }
    }

    #[tokio::test]
    async fn test_run_writes_csv_from_primary() {
        let storage = MockStorage::new();
        let engine = EtlEngine::new(
            PortfolioAssembler::new(
                FixedSource(Some(vec![
                    ("record_date", "2025-01-01"),
                    ("avg_interest_rate_amt", "4.5"),
                ])),
                FixedSource(None),
            ),
            storage.clone(),
        );

        let summary = engine.run().await.unwrap();

        assert_eq!(summary.output_path, format!("memory/{}", OUTPUT_FILE_NAME));
        assert_eq!(summary.portfolio.source, SourceKind::Primary);
        let written = storage.get_file(OUTPUT_FILE_NAME).await.unwrap();
        assert_eq!(
            String::from_utf8(written).unwrap(),
            "record_date,avg_interest_rate_amt\n2025-01-01,4.5\n"
        );
    }

    #[tokio::test]
    async fn test_run_writes_nothing_when_both_sources_fail() {
        let storage = MockStorage::new();
        let engine = EtlEngine::new(
            PortfolioAssembler::new(FixedSource(None), FixedSource(None)),
            storage.clone(),
        );

        let err = engine.run().await.unwrap_err();

        assert!(matches!(err, EtlError::RemoteRequest(_)));
        assert!(storage.get_file(OUTPUT_FILE_NAME).await.is_none());
    }
}
