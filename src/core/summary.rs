use crate::core::ResultSet;
use indexmap::IndexMap;
use std::fmt::Write;

/// 單一欄位的描述統計
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnSummary {
    Numeric {
        column: String,
        count: usize,
        mean: f64,
        std: Option<f64>,
        min: f64,
        q25: f64,
        q50: f64,
        q75: f64,
        max: f64,
    },
    Categorical {
        column: String,
        count: usize,
        unique: usize,
        top: Option<String>,
        freq: usize,
    },
}

impl ColumnSummary {
    pub fn column(&self) -> &str {
        match self {
            ColumnSummary::Numeric { column, .. } | ColumnSummary::Categorical { column, .. } => {
                column
            }
        }
    }
}

/// 空字串視為缺值；其餘值全部可解析為數字的欄位才算數值欄位
pub fn describe(result_set: &ResultSet) -> Vec<ColumnSummary> {
    result_set
        .columns()
        .iter()
        .map(|column| {
            let values: Vec<&str> = result_set
                .column_values(column)
                .filter(|v| !v.is_empty())
                .collect();

            match parse_numeric(&values) {
                Some(numbers) => numeric_summary(column, numbers),
                None => categorical_summary(column, &values),
            }
        })
        .collect()
}

fn parse_numeric(values: &[&str]) -> Option<Vec<f64>> {
    if values.is_empty() {
        return None;
    }
    values.iter().map(|v| v.trim().parse::<f64>().ok()).collect()
}

fn numeric_summary(column: &str, mut numbers: Vec<f64>) -> ColumnSummary {
    numbers.sort_by(|a, b| a.total_cmp(b));
    let count = numbers.len();
    let mean = numbers.iter().sum::<f64>() / count as f64;
    let std = if count > 1 {
        let variance =
            numbers.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
        Some(variance.sqrt())
    } else {
        None
    };

    ColumnSummary::Numeric {
        column: column.to_string(),
        count,
        mean,
        std,
        min: numbers[0],
        q25: quantile(&numbers, 0.25),
        q50: quantile(&numbers, 0.50),
        q75: quantile(&numbers, 0.75),
        max: numbers[count - 1],
    }
}

/// 線性內插分位數，輸入必須已排序且非空
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

fn categorical_summary(column: &str, values: &[&str]) -> ColumnSummary {
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for value in values {
        *counts.entry(*value).or_insert(0) += 1;
    }

    // 同票時取最先出現的值
    let mut top: Option<(&str, usize)> = None;
    for (value, n) in &counts {
        if top.map_or(true, |(_, best)| *n > best) {
            top = Some((*value, *n));
        }
    }

    ColumnSummary::Categorical {
        column: column.to_string(),
        count: values.len(),
        unique: counts.len(),
        top: top.map(|(value, _)| value.to_string()),
        freq: top.map_or(0, |(_, n)| n),
    }
}

pub fn render_describe(summaries: &[ColumnSummary]) -> String {
    let mut out = String::new();
    if summaries.is_empty() {
        out.push_str("(no columns)\n");
        return out;
    }

    let width = summaries
        .iter()
        .map(|s| s.column().len())
        .max()
        .unwrap_or(0);

    for summary in summaries {
        let _ = match summary {
            ColumnSummary::Numeric {
                column,
                count,
                mean,
                std,
                min,
                q25,
                q50,
                q75,
                max,
            } => writeln!(
                out,
                "{:<width$}  count={} mean={:.6} std={} min={:.6} 25%={:.6} 50%={:.6} 75%={:.6} max={:.6}",
                column,
                count,
                mean,
                std.map_or_else(|| "NaN".to_string(), |s| format!("{:.6}", s)),
                min,
                q25,
                q50,
                q75,
                max,
                width = width
            ),
            ColumnSummary::Categorical {
                column,
                count,
                unique,
                top,
                freq,
            } => writeln!(
                out,
                "{:<width$}  count={} unique={} top={} freq={}",
                column,
                count,
                unique,
                top.as_deref().unwrap_or("NaN"),
                freq,
                width = width
            ),
        };
    }
    out
}

/// 前 N 列的對齊文字預覽
pub fn render_preview(result_set: &ResultSet, rows: usize) -> String {
    let mut out = String::new();
    if result_set.columns().is_empty() {
        out.push_str("Empty result set\n");
        return out;
    }

    let shown: Vec<Vec<&str>> = result_set
        .records()
        .iter()
        .take(rows)
        .map(|record| result_set.row_values(record).collect())
        .collect();

    let index_width = shown.len().saturating_sub(1).to_string().len();
    let widths: Vec<usize> = result_set
        .columns()
        .iter()
        .enumerate()
        .map(|(i, column)| {
            shown
                .iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(column.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let _ = write!(out, "{:>index_width$}", "", index_width = index_width);
    for (column, width) in result_set.columns().iter().zip(&widths) {
        let _ = write!(out, "  {:>width$}", column, width = *width);
    }
    out.push('\n');

    for (index, row) in shown.iter().enumerate() {
        let _ = write!(out, "{:>index_width$}", index, index_width = index_width);
        for (value, width) in row.iter().zip(&widths) {
            let _ = write!(out, "  {:>width$}", value, width = *width);
        }
        out.push('\n');
    }
    out
}
