/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::ops::Range;

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::models::ResultRecord;
use crate::services::RunStatistics;

/// 初始化 tracing 日志
///
/// 优先使用 `RUST_LOG`，否则按 `verbose` 选择 debug / info 级别
pub fn init(verbose: bool) {
    let default_directive = if verbose {
        "dify_batch_eval=debug,info"
    } else {
        "dify_batch_eval=info,warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n批处理日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// 把最终统计追加到日志文件
pub fn append_stats_to_log_file(log_file_path: &str, stats: &RunStatistics) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)?;

    writeln!(file, "{}", stats_lines(stats).join("\n"))?;
    Ok(())
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 工作流批处理");
    info!("📄 数据文件: {}", config.source_path.display());
    info!("📋 问题列: {} / 答案列: {}", config.question_column, config.answer_column);
    info!("🔍 对比方法: {}", config.comparison_method);
    info!("⏱️ 请求延迟: {}秒", config.delay_secs);
    info!("{}", "=".repeat(60));
}

/// 记录处理范围
///
/// # 参数
/// - `total`: 数据源总行数
/// - `range`: 截断后的处理范围
pub fn log_range(total: usize, range: &Range<usize>) {
    if range.is_empty() {
        warn!("⚠️ 共 {} 行，处理范围为空", total);
    } else {
        info!(
            "共 {} 行，处理第 {} 行到第 {} 行",
            total,
            range.start,
            range.end - 1
        );
    }
    info!("{}", "-".repeat(60));
}

/// 记录单行开始
pub fn log_row_start(position: usize, total: usize, question: &str) {
    info!("[{}/{}] 处理问题: {}", position, total, truncate_text(question, 50));
}

/// 记录单行结果
pub fn log_row_result(record: &ResultRecord) {
    if let Some(failure) = record.failure() {
        warn!("  ✗ 失败: {}", failure);
    } else if record.matched() {
        let kind = record.match_kind().map(|k| k.as_str()).unwrap_or_default();
        info!("  ✓ 正确 ({})", kind);
    } else {
        info!("  ✗ 错误");
        info!("    期望: {}", truncate_text(record.expected_answer(), 100));
        info!(
            "    实际: {}",
            truncate_text(record.actual_answer().unwrap_or_default(), 100)
        );
    }
}

/// 打印最终统计信息
///
/// # 参数
/// - `stats`: 统计信息
/// - `log_file_path`: 日志文件路径
pub fn print_final_stats(stats: &RunStatistics, log_file_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 统计结果");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    for line in stats_lines(stats) {
        info!("{}", line);
    }
    info!("\n日志已保存至: {}", log_file_path);
}

fn stats_lines(stats: &RunStatistics) -> Vec<String> {
    let mut lines = vec![
        "=".repeat(60),
        format!("  总数量: {}", stats.total),
        format!("  正确数量: {}", stats.matched_count),
        format!("  错误数量: {}", stats.unmatched_count),
        format!("  失败数量: {}", stats.failed_count),
        format!("  准确率: {}", stats.accuracy_percent()),
        format!("  成功率: {}", stats.success_rate_percent()),
    ];
    if !stats.match_kind_histogram.is_empty() {
        lines.push("  匹配类型统计:".to_string());
        for (kind, count) in &stats.match_kind_histogram {
            lines.push(format!("    - {}: {}", kind, count));
        }
    }
    lines.push("=".repeat(60));
    lines
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（按字符计）
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::aggregate;

    #[test]
    fn test_truncate_text_counts_chars() {
        assert_eq!(truncate_text("北京是首都", 2), "北京...");
        assert_eq!(truncate_text("short", 10), "short");
    }

    #[test]
    fn test_stats_lines_for_empty_run() {
        let lines = stats_lines(&aggregate(&[]));

        assert!(lines.contains(&"  总数量: 0".to_string()));
        assert!(lines.contains(&"  准确率: 0.00%".to_string()));
        assert!(!lines.iter().any(|l| l.contains("匹配类型统计")));
    }

    #[test]
    fn test_log_file_header_and_stats() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output.txt");
        let path = path.to_str().unwrap();

        init_log_file(path).unwrap();
        append_stats_to_log_file(path, &aggregate(&[])).unwrap();

        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("批处理日志"));
        assert!(content.contains("总数量: 0"));
    }
}
