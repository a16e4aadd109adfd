use crate::core::{Portfolio, SecuritySource, SourceKind};
use crate::utils::error::Result;

/// 先抓主要來源，失敗時改抓備援來源一次；兩者結果不合併
pub struct PortfolioAssembler<P: SecuritySource, F: SecuritySource> {
    primary: P,
    fallback: F,
}

impl<P: SecuritySource, F: SecuritySource> PortfolioAssembler<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }

    pub fn primary(&self) -> &P {
        &self.primary
    }

    pub fn fallback(&self) -> &F {
        &self.fallback
    }

    pub async fn assemble(&self) -> Result<Portfolio> {
        tracing::info!("📡 Fetching data from US Treasury Fiscal Data API...");
        tracing::info!("URL: {}", self.primary.url());

        let primary_failure = match self.primary.fetch().await {
            Ok(result_set) => {
                tracing::info!(
                    "✓ Retrieved {} records from {}",
                    result_set.len(),
                    self.primary.name()
                );
                return Ok(Portfolio {
                    source: SourceKind::Primary,
                    result_set,
                    primary_failure: None,
                });
            }
            Err(e) => e,
        };

        tracing::warn!("Primary API failed: {}", primary_failure);
        tracing::info!("🔄 Trying alternative endpoint...");
        tracing::info!("URL: {}", self.fallback.url());

        // 備援失敗時直接往上拋，沒有第三個來源
        let result_set = self.fallback.fetch().await?;
        tracing::info!(
            "✓ Retrieved {} records from {}",
            result_set.len(),
            self.fallback.name()
        );

        Ok(Portfolio {
            source: SourceKind::Fallback,
            result_set,
            primary_failure: Some(primary_failure.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use crate::core::fetch::{AverageInterestRatesSource, SecuritiesSalesSource};
    use crate::core::{Record, ResultSet};
    use crate::utils::error::{EtlError, RemoteRequestError};
    use httpmock::prelude::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    enum Scripted {
        Rows(usize),
        Status(u16),
    }

    struct StubSource {
        name: &'static str,
        outcome: Scripted,
        calls: AtomicUsize,
    }

    impl StubSource {
        fn new(name: &'static str, outcome: Scripted) -> Self {
            Self {
                name,
                outcome,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl SecuritySource for StubSource {
        fn name(&self) -> &str {
            self.name
        }

        fn url(&self) -> String {
            format!("stub://{}", self.name)
        }

        async fn fetch(&self) -> Result<ResultSet> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.outcome {
                Scripted::Rows(n) => {
                    let records = (0..n)
                        .map(|i| {
                            let mut record = Record::default();
                            record
                                .data
                                .insert("src_line_nbr".to_string(), (i + 1).to_string());
                            record
                        })
                        .collect();
                    Ok(ResultSet::new(records))
                }
                Scripted::Status(status) => Err(RemoteRequestError::Status {
                    status,
                    body: None,
                }
                .into()),
            }
        }
    }

    #[tokio::test]
    async fn test_primary_success_skips_fallback() {
        let assembler = PortfolioAssembler::new(
            StubSource::new("primary", Scripted::Rows(4)),
            StubSource::new("fallback", Scripted::Rows(1)),
        );

        let portfolio = assembler.assemble().await.unwrap();

        assert_eq!(portfolio.source, SourceKind::Primary);
        assert_eq!(portfolio.result_set.len(), 4);
        assert!(portfolio.primary_failure.is_none());
        assert_eq!(assembler.primary().calls(), 1);
        assert_eq!(assembler.fallback().calls(), 0);
    }

    #[tokio::test]
    async fn test_primary_failure_runs_fallback_once() {
        let assembler = PortfolioAssembler::new(
            StubSource::new("primary", Scripted::Status(500)),
            StubSource::new("fallback", Scripted::Rows(2)),
        );

        let portfolio = assembler.assemble().await.unwrap();

        assert_eq!(portfolio.source, SourceKind::Fallback);
        assert_eq!(portfolio.result_set.len(), 2);
        assert!(portfolio
            .primary_failure
            .as_deref()
            .unwrap()
            .contains("500"));
        assert_eq!(assembler.primary().calls(), 1);
        assert_eq!(assembler.fallback().calls(), 1);
    }

    #[tokio::test]
    async fn test_fallback_failure_propagates_fallback_error() {
        let assembler = PortfolioAssembler::new(
            StubSource::new("primary", Scripted::Status(500)),
            StubSource::new("fallback", Scripted::Status(502)),
        );

        let err = assembler.assemble().await.unwrap_err();

        match err {
            EtlError::RemoteRequest(inner) => assert_eq!(inner.status(), Some(502)),
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(assembler.primary().calls(), 1);
        assert_eq!(assembler.fallback().calls(), 1);
    }

    #[tokio::test]
    async fn test_primary_404_hits_each_endpoint_exactly_once() {
        let server = MockServer::start_async().await;
        let primary_mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/v2/accounting/od/avg_interest_rates");
                then.status(404).body("not found");
            })
            .await;
        let fallback_mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/v1/accounting/od/securities_sales");
                then.status(200).json_body(json!({
                    "data": [{"record_date": "2024-06-30", "securities_sold_cnt": "7"}]
                }));
            })
            .await;

        let config = ApiConfig::with_base_url(server.base_url());
        let assembler = PortfolioAssembler::new(
            AverageInterestRatesSource::new(config.clone()),
            SecuritiesSalesSource::new(config),
        );

        let portfolio = assembler.assemble().await.unwrap();

        primary_mock.assert_hits_async(1).await;
        fallback_mock.assert_hits_async(1).await;
        assert_eq!(portfolio.source, SourceKind::Fallback);
        assert_eq!(portfolio.result_set.len(), 1);
    }

    #[tokio::test]
    async fn test_primary_without_data_key_triggers_fallback() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v2/accounting/od/avg_interest_rates");
                then.status(200).json_body(json!({"foo": []}));
            })
            .await;
        let fallback_mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/v1/accounting/od/securities_sales");
                then.status(200).json_body(json!({"data": []}));
            })
            .await;

        let config = ApiConfig::with_base_url(server.base_url());
        let assembler = PortfolioAssembler::new(
            AverageInterestRatesSource::new(config.clone()),
            SecuritiesSalesSource::new(config),
        );

        let portfolio = assembler.assemble().await.unwrap();

        fallback_mock.assert_hits_async(1).await;
        assert_eq!(portfolio.source, SourceKind::Fallback);
        assert!(portfolio.result_set.is_empty());
        assert!(portfolio
            .primary_failure
            .as_deref()
            .unwrap()
            .starts_with("No data returned from API"));
    }
}
