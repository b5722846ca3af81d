//! 应用主流程 - 编排层
//!
//! 配置 → 加载数据源 → 逐行处理 → 统计 → 写报告

use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use crate::clients::{DifyClient, Gateway};
use crate::config::Config;
use crate::models::{load_rows, ResultRecord};
use crate::orchestrator::batch_processor::Orchestrator;
use crate::services::{aggregate, ReportWriter, RunStatistics};
use crate::utils::logging::{
    append_stats_to_log_file, init_log_file, log_startup, print_final_stats,
};

/// 一次运行的产出
#[derive(Debug)]
pub struct RunReport {
    pub records: Vec<ResultRecord>,
    pub statistics: RunStatistics,
}

/// 应用主结构
pub struct App {
    config: Config,
    orchestrator: Orchestrator,
    report_writer: ReportWriter,
}

impl App {
    /// 初始化应用（使用 Dify 客户端）
    pub fn initialize(config: Config) -> Result<Self> {
        let client = DifyClient::new(&config)?;
        Self::with_gateway(config, Arc::new(client))
    }

    /// 使用指定网关初始化应用
    pub fn with_gateway(config: Config, gateway: Arc<dyn Gateway>) -> Result<Self> {
        config.validate()?;

        // 初始化日志文件
        init_log_file(&config.output_log_file)?;
        log_startup(&config);

        let orchestrator = Orchestrator::new(&config, gateway);
        let report_writer = ReportWriter::new(config.output_path.clone());

        Ok(Self {
            config,
            orchestrator,
            report_writer,
        })
    }

    /// 运行应用主逻辑
    ///
    /// 数据源读取失败或某行缺少必填列时直接返回错误，不做部分运行
    pub async fn run(&self) -> Result<RunReport> {
        info!("\n📁 正在加载数据文件...");
        let rows = load_rows(
            &self.config.source_path,
            &self.config.question_column,
            &self.config.answer_column,
        )
        .await?;

        if rows.is_empty() {
            warn!("⚠️ 数据文件中没有任何行");
        }

        let records = self.orchestrator.run(&rows, self.config.row_range()).await;
        let statistics = aggregate(&records);

        print_final_stats(&statistics, &self.config.output_log_file);
        append_stats_to_log_file(&self.config.output_log_file, &statistics)?;
        self.report_writer.write(&records, &statistics).await?;

        Ok(RunReport {
            records,
            statistics,
        })
    }
}
