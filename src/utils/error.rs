use thiserror::Error;

/// Fiscal Data API 回應不符合預期時的錯誤
#[derive(Error, Debug)]
pub enum RemoteRequestError {
    #[error("API request failed with status {status}{}", body_suffix(.body))]
    Status { status: u16, body: Option<String> },

    #[error("No data returned from API. Response: {body}")]
    MissingData { body: serde_json::Value },
}

fn body_suffix(body: &Option<String>) -> String {
    body.as_deref()
        .map(|b| format!(": {}", b))
        .unwrap_or_default()
}

impl RemoteRequestError {
    pub fn status(&self) -> Option<u16> {
        match self {
            RemoteRequestError::Status { status, .. } => Some(*status),
            RemoteRequestError::MissingData { .. } => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum EtlError {
    #[error(transparent)]
    RemoteRequest(#[from] RemoteRequestError),

    #[error("Request to {url} timed out after {seconds}s")]
    Timeout { url: String, seconds: u64 },

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Remote,
    Data,
    Storage,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    /// 將 reqwest 傳輸錯誤轉換為 EtlError，逾時單獨歸類
    pub fn from_transport(err: reqwest::Error, url: &str, seconds: u64) -> Self {
        if err.is_timeout() {
            EtlError::Timeout {
                url: url.to_string(),
                seconds,
            }
        } else {
            EtlError::ApiError(err)
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::Timeout { .. } | EtlError::ApiError(_) => ErrorCategory::Network,
            EtlError::RemoteRequest(_) => ErrorCategory::Remote,
            EtlError::SerializationError(_) | EtlError::ProcessingError { .. } => {
                ErrorCategory::Data
            }
            EtlError::CsvError(_) | EtlError::IoError(_) => ErrorCategory::Storage,
            EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network | ErrorCategory::Remote => ErrorSeverity::Medium,
            ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::Storage | ErrorCategory::Configuration => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => {
                "Check network connectivity or raise --timeout-seconds, then run again"
            }
            ErrorCategory::Remote => {
                "The API may have changed or may be temporarily unavailable. Please verify the endpoint at: https://fiscaldata.treasury.gov/api-documentation/"
            }
            ErrorCategory::Data => {
                "The response shape did not match the expected {\"data\": [...]} envelope"
            }
            ErrorCategory::Storage => "Check that the output directory exists and is writable",
            ErrorCategory::Configuration => "Fix the configuration value and run again",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::RemoteRequest(inner) => format!("Treasury API error: {}", inner),
            EtlError::Timeout { url, seconds } => {
                format!("No response from {} within {} seconds", url, seconds)
            }
            EtlError::ApiError(e) => format!("Could not reach the Treasury API: {}", e),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
