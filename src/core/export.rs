use crate::core::ResultSet;
use crate::utils::error::{EtlError, Result};

/// 將 ResultSet 轉成 CSV：標頭為欄位順序，值原樣寫出
pub fn to_csv_bytes(result_set: &ResultSet) -> Result<Vec<u8>> {
    if result_set.columns().is_empty() {
        return Ok(Vec::new());
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(result_set.columns())?;
    for record in result_set.records() {
        writer.write_record(result_set.row_values(record))?;
    }

    writer
        .into_inner()
        .map_err(|e| EtlError::IoError(e.into_error()))
}
