use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 数据源错误（读取题目表失败或缺少必填列）
    #[error("数据源错误: {0}")]
    RowSource(#[from] RowSourceError),
    /// 工作流服务调用错误
    #[error("网关错误: {0}")]
    Gateway(#[from] GatewayError),
    /// 匹配方法非法（调用方契约错误）
    #[error("匹配器错误: {0}")]
    Matcher(#[from] MatcherInputError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
}

/// 数据源错误
///
/// 在编排器运行之前抛出，不做逐行恢复。
#[derive(Debug, Error)]
pub enum RowSourceError {
    /// 文件不存在
    #[error("数据文件不存在: {path}")]
    NotFound { path: String },
    /// 读取文件失败
    #[error("读取数据文件失败 ({path}): {source}")]
    Unreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 文件内容无法解析
    #[error("数据文件格式错误 ({path}): {message}")]
    Malformed { path: String, message: String },
    /// 某行缺少必填列
    #[error("第 {row} 行缺少列: {column}")]
    MissingField { row: usize, column: String },
    /// 某行的必填列为空
    #[error("第 {row} 行的列 {column} 为空")]
    EmptyField { row: usize, column: String },
    /// 单元格不是标量值
    #[error("第 {row} 行的列 {column} 不是文本或数字")]
    UnsupportedValue { row: usize, column: String },
}

/// 网关错误
///
/// 编排器不区分子类型，一律记为该行失败。
#[derive(Debug, Error)]
pub enum GatewayError {
    /// 网络请求失败
    #[error("API请求失败 ({endpoint}): {message}")]
    Request { endpoint: String, message: String },
    /// 请求超时
    #[error("API请求超时 ({endpoint}): 超过 {secs} 秒")]
    Timeout { endpoint: String, secs: u64 },
    /// 非 2xx 响应
    #[error("API返回错误状态 ({endpoint}): {status} {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// 响应内容无法解析或缺少答案
    #[error("API响应格式错误: {message}")]
    MalformedPayload { message: String },
    /// HTTP 客户端构建失败
    #[error("HTTP客户端初始化失败: {message}")]
    Client { message: String },
}

/// 匹配方法非法
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MatcherInputError {
    #[error("未知的匹配方法: {0} (可选: exact, fuzzy, keyword, auto)")]
    UnknownStrategy(String),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 配置值非法
    #[error("配置项 {key} 的值 '{value}' 非法, 期望: {expected}")]
    InvalidValue {
        key: String,
        value: String,
        expected: String,
    },
    /// 配置文件读取失败
    #[error("读取配置文件失败 ({path}): {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 配置文件解析失败
    #[error("解析配置文件失败 ({path}): {message}")]
    Parse { path: String, message: String },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 序列化失败
    #[error("序列化结果失败: {0}")]
    Serialize(#[from] serde_json::Error),
}

// ========== 便捷构造函数 ==========

impl ConfigError {
    /// 创建配置值非法错误
    pub fn invalid(
        key: impl Into<String>,
        value: impl ToString,
        expected: impl Into<String>,
    ) -> Self {
        ConfigError::InvalidValue {
            key: key.into(),
            value: value.to_string(),
            expected: expected.into(),
        }
    }
}

impl FileError {
    /// 创建文件写入错误
    pub fn write_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        FileError::WriteFailed {
            path: path.into(),
            source,
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
