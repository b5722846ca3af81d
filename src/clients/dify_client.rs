/// Dify 工作流 API 客户端
///
/// 封装所有与 Dify API 相关的调用逻辑
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::clients::gateway::{Gateway, GatewayRequest, GatewayResponse};
use crate::config::Config;
use crate::error::GatewayError;
use crate::utils::logging::truncate_text;

/// `/chat-messages` 请求体
#[derive(Debug, Serialize)]
struct ChatMessageRequest<'a> {
    query: &'a str,
    inputs: Map<String, Value>,
    response_mode: &'a str,
    user: &'a str,
    conversation_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    workflow_id: Option<&'a str>,
}

/// Dify 客户端
pub struct DifyClient {
    http_client: Client,
    api_key: String,
    base_url: String,
    response_mode: String,
    input_variable_name: String,
    output_variable_name: String,
    timeout: Duration,
}

impl DifyClient {
    /// 创建新的 Dify 客户端
    pub fn new(config: &Config) -> Result<Self, GatewayError> {
        let http_client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| GatewayError::Client {
                message: e.to_string(),
            })?;

        Ok(Self::with_http_client(config, http_client))
    }

    fn with_http_client(config: &Config, http_client: Client) -> Self {
        Self {
            http_client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            response_mode: config.response_mode.clone(),
            input_variable_name: config.input_variable_name.clone(),
            output_variable_name: config.output_variable_name.clone(),
            timeout: config.timeout(),
        }
    }

    /// 执行工作流（聊天应用使用 `/chat-messages` 端点）
    ///
    /// # 返回
    /// 返回原始 JSON 响应
    pub async fn execute_workflow(&self, request: &GatewayRequest) -> Result<Value, GatewayError> {
        let endpoint = format!("{}/chat-messages", self.base_url);

        let mut inputs = Map::new();
        inputs.insert(
            self.input_variable_name.clone(),
            Value::String(request.query.clone()),
        );

        let body = ChatMessageRequest {
            query: &request.query,
            inputs,
            response_mode: &self.response_mode,
            user: &request.user,
            conversation_id: "",
            workflow_id: request.workflow_id.as_deref(),
        };

        debug!("调用 Dify API: {}", endpoint);

        let response = self
            .http_client
            .post(&endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(&endpoint, e))?;

        self.read_json(&endpoint, response).await
    }

    /// 获取工作流执行详情
    pub async fn get_workflow_run_detail(&self, workflow_run_id: &str) -> Result<Value, GatewayError> {
        let endpoint = format!("{}/workflows/run/{}", self.base_url, workflow_run_id);

        let response = self
            .http_client
            .get(&endpoint)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| self.transport_error(&endpoint, e))?;

        self.read_json(&endpoint, response).await
    }

    async fn read_json(
        &self,
        endpoint: &str,
        response: reqwest::Response,
    ) -> Result<Value, GatewayError> {
        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    warn!("读取错误响应体失败: {}", e);
                    format!("<响应体读取失败: {}>", e)
                }
            };
            warn!("Dify API 返回错误状态 {}: {}", status, truncate_text(&body, 200));
            return Err(GatewayError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body: truncate_text(&body, 200),
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| GatewayError::MalformedPayload {
                message: e.to_string(),
            })
    }

    fn transport_error(&self, endpoint: &str, err: reqwest::Error) -> GatewayError {
        if err.is_timeout() {
            GatewayError::Timeout {
                endpoint: endpoint.to_string(),
                secs: self.timeout.as_secs(),
            }
        } else {
            GatewayError::Request {
                endpoint: endpoint.to_string(),
                message: err.to_string(),
            }
        }
    }
}

#[async_trait]
impl Gateway for DifyClient {
    async fn ask(&self, request: &GatewayRequest) -> Result<GatewayResponse, GatewayError> {
        let payload = self.execute_workflow(request).await?;
        parse_response(&payload, &self.output_variable_name)
    }
}

/// 从响应中取出答案与关联 ID
///
/// 答案依次取：顶层 `answer` → `data.outputs[output_variable]` → `data.outputs` 的第一个值
pub fn parse_response(
    payload: &Value,
    output_variable_name: &str,
) -> Result<GatewayResponse, GatewayError> {
    let answer = extract_answer(payload, output_variable_name).ok_or_else(|| {
        GatewayError::MalformedPayload {
            message: format!(
                "响应中没有 answer 字段: {}",
                truncate_text(&payload.to_string(), 200)
            ),
        }
    })?;

    let correlation_id = ["task_id", "workflow_run_id", "message_id"]
        .iter()
        .find_map(|key| payload.get(*key).and_then(Value::as_str))
        .map(str::to_string);

    Ok(GatewayResponse {
        answer,
        correlation_id,
    })
}

fn extract_answer(payload: &Value, output_variable_name: &str) -> Option<String> {
    if let Some(answer) = payload.get("answer").filter(|v| !v.is_null()) {
        return Some(value_text(answer));
    }

    let outputs = payload
        .get("data")
        .and_then(|data| data.get("outputs"))
        .and_then(Value::as_object)?;

    outputs
        .get(output_variable_name)
        .or_else(|| outputs.values().next())
        .map(value_text)
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
