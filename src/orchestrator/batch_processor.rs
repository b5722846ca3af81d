//! 批处理编排器 - 编排层
//!
//! ## 职责
//!
//! 按数据源顺序逐行调用 `RowFlow`，组装结果列表。
//!
//! ## 设计特点
//!
//! - **严格顺序**：结果列表顺序与输入行顺序一致，第 i 条结果对应第 i 行
//! - **逐行隔离**：单行网关失败只记录在该行的 `failure` 中，运行继续
//! - **固定间隔**：两次网关调用之间阻塞等待 `pacing_delay`，最后一行之后不等待
//! - **单线程**：不并发派发请求，结果列表只由编排器持有

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;

use crate::clients::Gateway;
use crate::config::Config;
use crate::models::{ResultRecord, Row, RowRange};
use crate::utils::logging;
use crate::workflow::{RowCtx, RowFlow};

/// 批处理编排器
pub struct Orchestrator {
    flow: RowFlow,
    pacing_delay: Duration,
}

impl Orchestrator {
    /// 创建编排器
    pub fn new(config: &Config, gateway: Arc<dyn Gateway>) -> Self {
        Self {
            flow: RowFlow::new(config, gateway),
            pacing_delay: config.pacing_delay(),
        }
    }

    /// 处理 `range` 范围内的所有行
    ///
    /// `range.end` 超出数据源长度时自动截断；`start >= end` 返回空列表
    pub async fn run(&self, rows: &[Row], range: RowRange) -> Vec<ResultRecord> {
        let total = rows.len();
        let range = range.clamp(total);
        logging::log_range(total, &range);

        let mut results = Vec::with_capacity(range.len());
        let last = range.end.saturating_sub(1);

        for idx in range {
            let ctx = RowCtx::new(idx, total);
            results.push(self.process_row(&rows[idx], &ctx).await);

            if idx < last && !self.pacing_delay.is_zero() {
                sleep(self.pacing_delay).await;
            }
        }

        results
    }

    /// 处理单行
    ///
    /// 调用方可以用它自行逐行驱动，在行与行之间决定是否继续
    pub async fn process_row(&self, row: &Row, ctx: &RowCtx) -> ResultRecord {
        logging::log_row_start(ctx.position(), ctx.total_rows, &row.question);
        let record = self.flow.process(row, ctx).await;
        logging::log_row_result(&record);
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{GatewayRequest, GatewayResponse};
    use crate::error::GatewayError;
    use crate::models::MatchStrategy;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tokio::time::Instant;

    /// 按问题返回答案；问题以 "fail" 开头时失败
    struct ScriptedGateway {
        calls: Mutex<Vec<(String, Instant)>>,
    }

    impl ScriptedGateway {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
            })
        }

        fn call_times(&self) -> Vec<Instant> {
            self.calls.lock().unwrap().iter().map(|(_, t)| *t).collect()
        }
    }

    #[async_trait]
    impl Gateway for ScriptedGateway {
        async fn ask(&self, request: &GatewayRequest) -> Result<GatewayResponse, GatewayError> {
            self.calls
                .lock()
                .unwrap()
                .push((request.query.clone(), Instant::now()));

            if request.query.starts_with("fail") {
                return Err(GatewayError::Status {
                    endpoint: "/chat-messages".to_string(),
                    status: 429,
                    body: "rate limited".to_string(),
                });
            }
            Ok(GatewayResponse {
                answer: format!("answer to {}", request.query),
                correlation_id: Some(format!("task-{}", request.query)),
            })
        }
    }

    fn config(delay_secs: f64) -> Config {
        Config {
            delay_secs,
            comparison_method: MatchStrategy::Auto,
            ..Config::default()
        }
    }

    fn rows(questions: &[&str]) -> Vec<Row> {
        questions.iter().map(|q| Row::new(*q, *q)).collect()
    }

    #[tokio::test]
    async fn test_failure_is_isolated_and_order_preserved() {
        let gateway = ScriptedGateway::new();
        let orchestrator = Orchestrator::new(&config(0.0), gateway.clone());
        let rows = rows(&["q0", "q1", "fail2", "q3", "q4"]);

        let results = orchestrator.run(&rows, RowRange::all()).await;

        assert_eq!(results.len(), 5);
        for (idx, record) in results.iter().enumerate() {
            assert_eq!(record.question(), rows[idx].question);
            if idx == 2 {
                assert!(record.failure().unwrap().contains("429"));
                assert_eq!(record.actual_answer(), None);
                assert_eq!(record.match_kind(), None);
            } else {
                assert_eq!(record.failure(), None);
                assert_eq!(record.correlation_id(), Some(format!("task-q{}", idx).as_str()));
                assert!(record.match_kind().is_some());
            }
        }
    }

    #[tokio::test]
    async fn test_end_row_is_clamped() {
        let gateway = ScriptedGateway::new();
        let orchestrator = Orchestrator::new(&config(0.0), gateway.clone());

        let results = orchestrator
            .run(&rows(&["q0", "q1", "q2"]), RowRange::new(1, Some(100)))
            .await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].question(), "q1");
        assert_eq!(results[1].question(), "q2");
    }

    #[tokio::test]
    async fn test_empty_inputs_yield_empty_results() {
        let gateway = ScriptedGateway::new();
        let orchestrator = Orchestrator::new(&config(0.0), gateway.clone());

        assert!(orchestrator.run(&[], RowRange::all()).await.is_empty());
        assert!(orchestrator
            .run(&rows(&["q0", "q1"]), RowRange::new(2, Some(1)))
            .await
            .is_empty());
        assert!(gateway.calls.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_pacing_between_calls_only() {
        let gateway = ScriptedGateway::new();
        let orchestrator = Orchestrator::new(&config(0.5), gateway.clone());
        let start = Instant::now();

        orchestrator.run(&rows(&["q0", "q1", "q2"]), RowRange::all()).await;

        let times = gateway.call_times();
        assert_eq!(times.len(), 3);
        assert_eq!(times[1] - times[0], Duration::from_millis(500));
        assert_eq!(times[2] - times[1], Duration::from_millis(500));
        // 最后一行之后不再等待
        assert_eq!(start.elapsed(), Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_row_is_still_paced() {
        let gateway = ScriptedGateway::new();
        let orchestrator = Orchestrator::new(&config(1.0), gateway.clone());

        orchestrator.run(&rows(&["fail0", "q1"]), RowRange::all()).await;

        let times = gateway.call_times();
        assert_eq!(times[1] - times[0], Duration::from_secs(1));
    }
}
