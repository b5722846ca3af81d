//! 结果报告写入服务 - 业务能力层
//!
//! 只负责把结果列表和统计信息写成报告，不关心流程

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;
use tokio::fs;
use tracing::{debug, info};

use crate::error::{AppResult, FileError};
use crate::models::ResultRecord;
use crate::services::statistics_service::RunStatistics;

/// 明细表的一行
#[derive(Debug, Serialize)]
struct DetailRow<'a> {
    #[serde(rename = "序号")]
    index: usize,
    #[serde(rename = "问题")]
    question: &'a str,
    #[serde(rename = "期望答案")]
    expected_answer: &'a str,
    #[serde(rename = "工作流结果")]
    actual_answer: &'a str,
    #[serde(rename = "是否正确")]
    matched: &'static str,
    #[serde(rename = "匹配类型")]
    match_kind: &'static str,
    #[serde(rename = "错误信息")]
    failure: &'a str,
    #[serde(rename = "工作流运行ID")]
    correlation_id: &'a str,
}

impl<'a> DetailRow<'a> {
    fn new(index: usize, record: &'a ResultRecord) -> Self {
        Self {
            index,
            question: record.question(),
            expected_answer: record.expected_answer(),
            actual_answer: record.actual_answer().unwrap_or_default(),
            matched: if record.matched() { "✓" } else { "✗" },
            match_kind: record.match_kind().map(|k| k.as_str()).unwrap_or_default(),
            failure: record.failure().unwrap_or_default(),
            correlation_id: record.correlation_id().unwrap_or_default(),
        }
    }
}

/// 统计表的一行
#[derive(Debug, Serialize)]
struct MetricRow {
    #[serde(rename = "指标")]
    name: &'static str,
    #[serde(rename = "数值")]
    value: String,
}

#[derive(Debug, Serialize)]
struct Summary {
    metrics: Vec<MetricRow>,
    match_kind_histogram: BTreeMap<String, usize>,
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    generated_at: String,
    details: Vec<DetailRow<'a>>,
    summary: Summary,
}

/// 报告写入服务
pub struct ReportWriter {
    output_path: PathBuf,
}

impl ReportWriter {
    /// 创建新的报告写入服务
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
        }
    }

    /// 写入报告
    ///
    /// 报告分为两张表：逐行明细 `details` 与统计汇总 `summary`
    pub async fn write(&self, records: &[ResultRecord], stats: &RunStatistics) -> AppResult<()> {
        let json = render_report(records, stats)?;
        let path_str = self.output_path.display().to_string();

        if let Some(parent) = self.output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| FileError::write_failed(&path_str, e))?;
        }

        debug!("写入报告: {} ({} 字节)", path_str, json.len());
        fs::write(&self.output_path, json)
            .await
            .map_err(|e| FileError::write_failed(&path_str, e))?;

        info!("\n结果已保存到: {}", path_str);
        Ok(())
    }
}

fn render_report(records: &[ResultRecord], stats: &RunStatistics) -> Result<String, FileError> {
    let report = Report {
        generated_at: chrono::Local::now().to_rfc3339(),
        details: records
            .iter()
            .enumerate()
            .map(|(idx, record)| DetailRow::new(idx + 1, record))
            .collect(),
        summary: Summary {
            metrics: metric_rows(stats),
            match_kind_histogram: stats
                .match_kind_histogram
                .iter()
                .map(|(kind, count)| (kind.to_string(), *count))
                .collect(),
        },
    };

    Ok(serde_json::to_string_pretty(&report)?)
}

fn metric_rows(stats: &RunStatistics) -> Vec<MetricRow> {
    let metric = |name, value: String| MetricRow { name, value };
    vec![
        metric("总数量", stats.total.to_string()),
        metric("正确数量", stats.matched_count.to_string()),
        metric("错误数量", stats.unmatched_count.to_string()),
        metric("失败数量", stats.failed_count.to_string()),
        metric("准确率", stats.accuracy_percent()),
        metric("成功率", stats.success_rate_percent()),
    ]
}
