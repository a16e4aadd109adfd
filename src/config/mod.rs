pub mod cli;
pub mod toml_config;

use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use url::Url;

pub const DEFAULT_BASE_URL: &str =
    "https://api.fiscaldata.treasury.gov/services/api/fiscal_service";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_OUTPUT_DIR: &str = ".";
pub const OUTPUT_FILE_NAME: &str = "treasury_securities_raw_data.csv";
pub const API_DOCUMENTATION_URL: &str = "https://fiscaldata.treasury.gov/api-documentation/";

/// 單一 Fiscal Data 端點的路徑與查詢參數
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub path: String,
    pub fields: Option<String>,
    pub sort: String,
    pub page_size: usize,
    pub filter: String,
}

impl EndpointConfig {
    /// 平均利率端點 (主要來源)
    pub fn average_interest_rates() -> Self {
        Self {
            path: "/v2/accounting/od/avg_interest_rates".to_string(),
            fields: Some(
                "record_date,security_desc,avg_interest_rate_amt,src_line_nbr,security_type_desc"
                    .to_string(),
            ),
            sort: "-record_date".to_string(),
            page_size: 1000,
            filter: "record_date:gte:2025-01-01".to_string(),
        }
    }

    /// 公債銷售端點 (備援來源)，不做欄位投影
    pub fn securities_sales() -> Self {
        Self {
            path: "/v1/accounting/od/securities_sales".to_string(),
            fields: None,
            sort: "-record_date".to_string(),
            page_size: 100,
            filter: "record_date:gte:2024-01-01".to_string(),
        }
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(4);
        if let Some(fields) = &self.fields {
            pairs.push(("fields", fields.clone()));
        }
        pairs.push(("sort", self.sort.clone()));
        pairs.push(("page[size]", self.page_size.to_string()));
        pairs.push(("filter", self.filter.clone()));
        pairs
    }

    /// 組出完整請求 URL
    pub fn url(&self, base_url: &str) -> Result<Url> {
        let endpoint = format!("{}{}", base_url.trim_end_matches('/'), self.path);
        Url::parse_with_params(&endpoint, self.query_pairs()).map_err(|e| {
            EtlError::InvalidConfigValueError {
                field: "source.base_url".to_string(),
                value: endpoint.clone(),
                reason: format!("Invalid URL format: {}", e),
            }
        })
    }

    fn validate_as(&self, prefix: &str) -> Result<()> {
        validation::validate_endpoint_path(&format!("{}.path", prefix), &self.path)?;
        validation::validate_non_empty_string(&format!("{}.sort", prefix), &self.sort)?;
        validation::validate_positive_number(&format!("{}.page_size", prefix), self.page_size, 1)?;
        validation::validate_non_empty_string(&format!("{}.filter", prefix), &self.filter)?;
        Ok(())
    }
}

/// 注入到各個 fetcher 的 API 設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
    pub primary: EndpointConfig,
    pub fallback: EndpointConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            primary: EndpointConfig::average_interest_rates(),
            fallback: EndpointConfig::securities_sales(),
        }
    }
}

impl ApiConfig {
    /// 指向其他 base URL (例如本機 stub server)，其餘參數不變
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn primary_url(&self) -> Result<Url> {
        self.primary.url(&self.base_url)
    }

    pub fn fallback_url(&self) -> Result<Url> {
        self.fallback.url(&self.base_url)
    }
}

impl Validate for ApiConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("source.base_url", &self.base_url)?;
        validation::validate_range("source.timeout_seconds", self.timeout_seconds, 1, 600)?;
        self.primary.validate_as("primary")?;
        self.fallback.validate_as("fallback")?;
        Ok(())
    }
}

/// 一次執行所需的完整設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub api: ApiConfig,
    pub output_dir: String,
    pub preview_rows: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            output_dir: DEFAULT_OUTPUT_DIR.to_string(),
            preview_rows: 10,
        }
    }
}

impl Validate for RunConfig {
    fn validate(&self) -> Result<()> {
        self.api.validate()?;
        validation::validate_path("load.output_dir", &self.output_dir)?;
        Ok(())
    }
}

#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "treasury-fetch")]
#[command(about = "Fetch US Treasury securities data from the Fiscal Data API into a CSV file")]
pub struct CliConfig {
    /// Path to an optional TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Override the Fiscal Data API base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Directory the CSV file is written to
    #[arg(long)]
    pub output_dir: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    /// Number of rows shown in the console preview
    #[arg(long, default_value = "10")]
    pub preview_rows: usize,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// 預設值 < TOML 檔案 < 命令列參數
    pub fn resolve(&self) -> Result<RunConfig> {
        let mut run = match &self.config {
            Some(path) => toml_config::TomlConfig::from_file(path)?.into_run_config(),
            None => RunConfig::default(),
        };

        if let Some(base_url) = &self.base_url {
            run.api.base_url = base_url.clone();
        }
        if let Some(output_dir) = &self.output_dir {
            run.output_dir = output_dir.clone();
        }
        if let Some(timeout) = self.timeout_seconds {
            run.api.timeout_seconds = timeout;
        }
        run.preview_rows = self.preview_rows;

        run.validate()?;
        Ok(run)
    }
}
