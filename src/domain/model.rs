use crate::utils::error::{EtlError, Result};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 單筆資料列，欄位順序與 API 回傳的 JSON key 順序一致
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub data: IndexMap<String, String>,
}

impl Record {
    /// 將扁平 JSON 物件轉為 Record，值一律保留為字串
    pub fn from_json_object(obj: serde_json::Map<String, serde_json::Value>) -> Self {
        let data = obj
            .into_iter()
            .map(|(key, value)| (key, cell_text(value)))
            .collect();
        Self { data }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.data.get(column).map(String::as_str)
    }
}

/// JSON 字串原樣保留，null 變成空字串，其他型別取緊湊 JSON 文字
fn cell_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// 一次抓取產生的表格資料
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResultSet {
    columns: Vec<String>,
    records: Vec<Record>,
}

impl ResultSet {
    pub fn new(records: Vec<Record>) -> Self {
        let mut seen = IndexSet::new();
        for record in &records {
            for key in record.data.keys() {
                if !seen.contains(key) {
                    seen.insert(key.clone());
                }
            }
        }

        Self {
            columns: seen.into_iter().collect(),
            records,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// 將 envelope 中 `data` 陣列轉為 ResultSet，陣列元素必須是物件
    pub fn from_json_rows(rows: Vec<serde_json::Value>) -> Result<Self> {
        let mut records = Vec::with_capacity(rows.len());
        for (index, row) in rows.into_iter().enumerate() {
            match row {
                serde_json::Value::Object(obj) => records.push(Record::from_json_object(obj)),
                other => {
                    return Err(EtlError::ProcessingError {
                        message: format!(
                            "Row {} of 'data' is not a JSON object: {}",
                            index, other
                        ),
                    })
                }
            }
        }
        Ok(Self::new(records))
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 依欄位順序取出某列的值，缺少的欄位以空字串補齊
    pub fn row_values<'a>(&'a self, record: &'a Record) -> impl Iterator<Item = &'a str> + 'a {
        self.columns
            .iter()
            .map(move |column| record.get(column).unwrap_or(""))
    }

    pub fn column_values<'a>(&'a self, column: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.records
            .iter()
            .map(move |record| record.get(column).unwrap_or(""))
    }
}

/// 資料來源：主要端點或備援端點
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceKind {
    Primary,
    Fallback,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Primary => write!(f, "primary"),
            SourceKind::Fallback => write!(f, "fallback"),
        }
    }
}

/// PortfolioAssembler 的結果
#[derive(Debug, Clone)]
pub struct Portfolio {
    pub source: SourceKind,
    pub result_set: ResultSet,
    pub primary_failure: Option<String>,
}
