//! 单行处理流程 - 流程层
//!
//! 核心职责：定义"一行题目"的完整处理流程
//!
//! 流程顺序：
//! 1. 调用网关 → 失败则记为失败行，不做比较
//! 2. 成功则用匹配服务比较期望答案与实际答案

use std::sync::Arc;

use tracing::debug;

use crate::clients::{Gateway, GatewayRequest};
use crate::config::Config;
use crate::models::{MatchStrategy, PendingRecord, ResultRecord, Row, RowOutcome};
use crate::services::MatchingService;
use crate::workflow::row_ctx::RowCtx;

/// 单行处理流程
///
/// - 不持有结果列表，只产出单行的终态
/// - 网关错误在这里转为 `RowOutcome::Failed`，不向上传播
pub struct RowFlow {
    gateway: Arc<dyn Gateway>,
    matcher: MatchingService,
    strategy: MatchStrategy,
    user: String,
    workflow_id: Option<String>,
}

impl RowFlow {
    /// 创建新的单行处理流程
    pub fn new(config: &Config, gateway: Arc<dyn Gateway>) -> Self {
        Self {
            gateway,
            matcher: MatchingService::new(config.fuzzy_threshold),
            strategy: config.comparison_method,
            user: config.user.clone(),
            workflow_id: config.workflow_id.clone(),
        }
    }

    /// 处理一行，返回终态
    pub async fn run(&self, pending: &PendingRecord, ctx: &RowCtx) -> RowOutcome {
        let request = GatewayRequest::new(pending.question(), &self.user)
            .with_workflow_id(self.workflow_id.clone());

        match self.gateway.ask(&request).await {
            Ok(response) => {
                let outcome = self.matcher.compare(
                    pending.expected_answer(),
                    &response.answer,
                    self.strategy,
                );
                RowOutcome::Answered {
                    actual_answer: response.answer,
                    correlation_id: response.correlation_id,
                    outcome,
                }
            }
            Err(e) => {
                debug!("{} 网关调用失败: {:?}", ctx, e);
                RowOutcome::Failed {
                    message: e.to_string(),
                }
            }
        }
    }

    /// 处理一行并定型为结果记录
    pub async fn process(&self, row: &Row, ctx: &RowCtx) -> ResultRecord {
        let pending = PendingRecord::new(row.question.clone(), row.expected_answer.clone());
        let outcome = self.run(&pending, ctx).await;
        pending.finish(outcome)
    }
}
