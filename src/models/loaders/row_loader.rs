use std::path::Path;

use serde_json::{Map, Value};
use tokio::fs;
use tracing::{debug, info};

use crate::error::{AppResult, RowSourceError};
use crate::models::row::Row;

/// 从表格文件加载题目行
///
/// 按扩展名选择格式：`.json` 为对象数组，`.csv` 以首行为表头，
/// 其余按 TOML 解析，行数据放在 `[[rows]]` 数组中。
///
/// # 参数
/// - `path`: 数据文件路径
/// - `question_column`: 问题列名
/// - `answer_column`: 期望答案列名
///
/// # 返回
/// 按文件顺序排列的行；任意一行不合法都会直接返回错误
pub async fn load_rows(
    path: &Path,
    question_column: &str,
    answer_column: &str,
) -> AppResult<Vec<Row>> {
    let path_str = path.display().to_string();

    let content = fs::read_to_string(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            RowSourceError::NotFound {
                path: path_str.clone(),
            }
        } else {
            RowSourceError::Unreadable {
                path: path_str.clone(),
                source: e,
            }
        }
    })?;

    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .map(str::to_ascii_lowercase);

    let records = match extension.as_deref() {
        Some("json") => parse_json_records(&content, &path_str)?,
        Some("csv") => parse_csv_records(&content, &path_str)?,
        _ => parse_toml_records(&content, &path_str)?,
    };
    debug!("{} 中共解析出 {} 条记录", path_str, records.len());

    let rows = records
        .iter()
        .enumerate()
        .map(|(idx, record)| row_from_record(idx + 1, record, question_column, answer_column))
        .collect::<Result<Vec<_>, _>>()?;

    info!("✓ 成功加载 {} 行题目: {}", rows.len(), path_str);
    Ok(rows)
}

fn parse_json_records(content: &str, path: &str) -> Result<Vec<Value>, RowSourceError> {
    let value: Value = serde_json::from_str(content).map_err(|e| RowSourceError::Malformed {
        path: path.to_string(),
        message: e.to_string(),
    })?;

    match value {
        Value::Array(items) => Ok(items),
        _ => Err(RowSourceError::Malformed {
            path: path.to_string(),
            message: "顶层必须是对象数组".to_string(),
        }),
    }
}

/// CSV 每行转为以表头为键的对象，单元格一律按字符串处理
fn parse_csv_records(content: &str, path: &str) -> Result<Vec<Value>, RowSourceError> {
    let malformed = |e: csv::Error| RowSourceError::Malformed {
        path: path.to_string(),
        message: e.to_string(),
    };

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(content.as_bytes());
    let headers = reader.headers().map_err(malformed)?.clone();

    reader
        .records()
        .map(|record| {
            let record = record.map_err(malformed)?;
            let cells: Map<String, Value> = headers
                .iter()
                .zip(record.iter())
                .map(|(header, cell)| (header.to_string(), Value::String(cell.to_string())))
                .collect();
            Ok(Value::Object(cells))
        })
        .collect()
}

fn parse_toml_records(content: &str, path: &str) -> Result<Vec<Value>, RowSourceError> {
    let table: toml::Table = toml::from_str(content).map_err(|e| RowSourceError::Malformed {
        path: path.to_string(),
        message: e.to_string(),
    })?;

    let Some(rows) = table.get("rows") else {
        return Ok(Vec::new());
    };

    let rows = rows.as_array().ok_or_else(|| RowSourceError::Malformed {
        path: path.to_string(),
        message: "rows 必须是表数组 ([[rows]])".to_string(),
    })?;

    rows.iter()
        .map(|row| {
            serde_json::to_value(row).map_err(|e| RowSourceError::Malformed {
                path: path.to_string(),
                message: e.to_string(),
            })
        })
        .collect()
}

fn row_from_record(
    row: usize,
    record: &Value,
    question_column: &str,
    answer_column: &str,
) -> Result<Row, RowSourceError> {
    let question = required_cell(row, record, question_column)?;
    let expected_answer = required_cell(row, record, answer_column)?;
    Ok(Row::new(question, expected_answer))
}

fn required_cell(row: usize, record: &Value, column: &str) -> Result<String, RowSourceError> {
    let cell = record.get(column).ok_or_else(|| RowSourceError::MissingField {
        row,
        column: column.to_string(),
    })?;

    let text = match cell {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => {
            return Err(RowSourceError::MissingField {
                row,
                column: column.to_string(),
            })
        }
        Value::Array(_) | Value::Object(_) => {
            return Err(RowSourceError::UnsupportedValue {
                row,
                column: column.to_string(),
            })
        }
    };

    if text.trim().is_empty() {
        return Err(RowSourceError::EmptyField {
            row,
            column: column.to_string(),
        });
    }

    Ok(text)
}
