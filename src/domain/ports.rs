use crate::domain::model::ResultSet;
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

/// 可抓取一頁 Fiscal Data 資料的來源
#[async_trait]
pub trait SecuritySource: Send + Sync {
    fn name(&self) -> &str;

    /// 完整請求 URL (含查詢參數)，用於診斷輸出
    fn url(&self) -> String;

    async fn fetch(&self) -> Result<ResultSet>;
}
