//! 问答网关契约
//!
//! 编排器只依赖这一个窄接口：提交问题，拿到答案或失败

use async_trait::async_trait;

use crate::error::GatewayError;

/// 网关请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayRequest {
    pub query: String,
    pub user: String,
    pub workflow_id: Option<String>,
}

impl GatewayRequest {
    pub fn new(query: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            user: user.into(),
            workflow_id: None,
        }
    }

    pub fn with_workflow_id(mut self, workflow_id: Option<String>) -> Self {
        self.workflow_id = workflow_id;
        self
    }
}

/// 网关响应：答案 + 用于追踪的关联 ID
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayResponse {
    pub answer: String,
    pub correlation_id: Option<String>,
}

/// 问答网关
#[async_trait]
pub trait Gateway: Send + Sync {
    /// 提交一个问题
    async fn ask(&self, request: &GatewayRequest) -> Result<GatewayResponse, GatewayError>;
}
