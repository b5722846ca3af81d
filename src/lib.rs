//! # Dify Batch Eval
//!
//! 批量调用 Dify 问答工作流，并把返回的答案与期望答案逐行比对的工具
//!
//! ## 架构设计
//!
//! ### ① 客户端层（Clients）
//! - `clients/` - 与外部问答服务交互
//! - `Gateway` - 网关契约：提交问题，得到答案或失败
//! - `DifyClient` - 基于 reqwest 的 Dify 实现
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `MatchingService` - 精确 / 相似度 / 关键词 / 自动 四种比对
//! - `statistics_service` - 把结果列表归约为统计信息
//! - `ReportWriter` - 写出明细表与统计表
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一行"的完整处理流程
//! - `RowCtx` - 上下文封装（行号 + 总行数）
//! - `RowFlow` - 流程编排（网关调用 → 比对）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 顺序遍历行、逐行隔离失败、控制请求间隔
//! - `orchestrator/app` - 加载数据源、统计、写报告
//!
//! ## 模块结构
//!
//! ```text
//! clients/        Gateway 契约与 Dify 客户端
//! config.rs       配置加载（文件 → 环境变量 → 校验）
//! error.rs        错误类型
//! models/         Row / RowRange / 结果记录 / 数据源加载
//! services/       比对、统计、报告
//! workflow/       单行处理流程
//! orchestrator/   批处理与应用主流程
//! utils/          日志
//! ```

pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{DifyClient, Gateway, GatewayRequest, GatewayResponse};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{MatchKind, MatchOutcome, MatchStrategy, ResultRecord, Row, RowRange};
pub use orchestrator::{App, Orchestrator, RunReport};
pub use services::{aggregate, MatchingService, RunStatistics};
pub use workflow::{RowCtx, RowFlow};
