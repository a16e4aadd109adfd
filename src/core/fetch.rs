use crate::config::ApiConfig;
use crate::core::{ResultSet, SecuritySource};
use crate::utils::error::{EtlError, RemoteRequestError, Result};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use url::Url;

struct RawResponse {
    status: StatusCode,
    body: String,
}

/// 送出單次 GET，不重試；逾時轉為 EtlError::Timeout
async fn send_get(client: &Client, url: &Url, timeout_seconds: u64) -> Result<RawResponse> {
    tracing::debug!("Making API request to: {}", url);

    let response = client
        .get(url.clone())
        .timeout(Duration::from_secs(timeout_seconds))
        .send()
        .await
        .map_err(|e| EtlError::from_transport(e, url.as_str(), timeout_seconds))?;

    let status = response.status();
    tracing::debug!("API response status: {}", status);

    let body = response
        .text()
        .await
        .map_err(|e| EtlError::from_transport(e, url.as_str(), timeout_seconds))?;

    Ok(RawResponse { status, body })
}

enum Envelope {
    Rows(Vec<serde_json::Value>),
    Missing(serde_json::Value),
}

/// 拆開 `{"data": [...]}`，其他頂層 key 一律忽略
fn open_envelope(body: serde_json::Value) -> Result<Envelope> {
    match body {
        serde_json::Value::Object(mut obj) => match obj.remove("data") {
            Some(serde_json::Value::Array(rows)) => Ok(Envelope::Rows(rows)),
            Some(other) => Err(EtlError::ProcessingError {
                message: format!("'data' is not an array: {}", other),
            }),
            None => Ok(Envelope::Missing(serde_json::Value::Object(obj))),
        },
        other => Ok(Envelope::Missing(other)),
    }
}

/// 主要來源：平均利率端點。缺少 `data` 視為失敗
pub struct AverageInterestRatesSource {
    client: Client,
    config: ApiConfig,
}

impl AverageInterestRatesSource {
    pub fn new(config: ApiConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(client: Client, config: ApiConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait::async_trait]
impl SecuritySource for AverageInterestRatesSource {
    fn name(&self) -> &str {
        "Treasury API"
    }

    fn url(&self) -> String {
        self.config
            .primary_url()
            .map(|url| url.to_string())
            .unwrap_or_else(|_| format!("{}{}", self.config.base_url, self.config.primary.path))
    }

    async fn fetch(&self) -> Result<ResultSet> {
        let url = self.config.primary_url()?;
        let response = send_get(&self.client, &url, self.config.timeout_seconds).await?;

        if response.status != StatusCode::OK {
            return Err(RemoteRequestError::Status {
                status: response.status.as_u16(),
                body: Some(response.body),
            }
            .into());
        }

        let body: serde_json::Value = serde_json::from_str(&response.body)?;
        match open_envelope(body)? {
            Envelope::Rows(rows) => ResultSet::from_json_rows(rows),
            Envelope::Missing(body) => Err(RemoteRequestError::MissingData { body }.into()),
        }
    }
}

/// 備援來源：公債銷售端點。缺少 `data` 時回傳空的 ResultSet
pub struct SecuritiesSalesSource {
    client: Client,
    config: ApiConfig,
}

impl SecuritiesSalesSource {
    pub fn new(config: ApiConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(client: Client, config: ApiConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait::async_trait]
impl SecuritySource for SecuritiesSalesSource {
    fn name(&self) -> &str {
        "alternative source"
    }

    fn url(&self) -> String {
        self.config
            .fallback_url()
            .map(|url| url.to_string())
            .unwrap_or_else(|_| format!("{}{}", self.config.base_url, self.config.fallback.path))
    }

    async fn fetch(&self) -> Result<ResultSet> {
        let url = self.config.fallback_url()?;
        let response = send_get(&self.client, &url, self.config.timeout_seconds).await?;

        // 備援端點的錯誤不帶回應內容
        if response.status != StatusCode::OK {
            return Err(RemoteRequestError::Status {
                status: response.status.as_u16(),
                body: None,
            }
            .into());
        }

        let body: serde_json::Value = serde_json::from_str(&response.body)?;
        match open_envelope(body)? {
            Envelope::Rows(rows) => ResultSet::from_json_rows(rows),
            Envelope::Missing(_) => {
                tracing::warn!("⚠️ No 'data' key in {} response, using empty result", self.name());
                Ok(ResultSet::empty())
            }
        }
    }
}
