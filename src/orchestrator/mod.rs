//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量处理和流程调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `app` - 应用主流程
//! - 初始化日志文件和网关
//! - 加载数据源（Vec<Row>）
//! - 汇总统计、写出报告
//!
//! ### `batch_processor` - 批处理编排器
//! - 按顺序遍历处理范围内的行
//! - 逐行隔离网关失败
//! - 在两次调用之间等待固定间隔
//!
//! ## 层次关系
//!
//! ```text
//! app (加载 / 统计 / 报告)
//!     ↓
//! batch_processor (处理 Vec<Row>)
//!     ↓
//! workflow::RowFlow (处理单行)
//!     ↓
//! services / clients (能力层：match / gateway)
//! ```

pub mod app;
pub mod batch_processor;

// 重新导出主要类型
pub use app::{App, RunReport};
pub use batch_processor::Orchestrator;
