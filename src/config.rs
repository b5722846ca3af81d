use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::{AppResult, ConfigError};
use crate::models::{MatchStrategy, RowRange};
use crate::services::matching_service::DEFAULT_FUZZY_THRESHOLD;

/// 默认配置文件路径
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    // --- Dify 配置 ---
    pub api_key: String,
    pub base_url: String,
    /// blocking 或 streaming
    pub response_mode: String,
    /// 单次请求超时（秒）
    pub timeout_secs: u64,
    pub user: String,
    pub workflow_id: Option<String>,
    // --- 数据源配置 ---
    pub source_path: PathBuf,
    pub question_column: String,
    pub answer_column: String,
    // --- 工作流配置 ---
    pub input_variable_name: String,
    pub output_variable_name: String,
    pub comparison_method: MatchStrategy,
    pub fuzzy_threshold: f64,
    /// 两次请求之间的间隔（秒）
    pub delay_secs: f64,
    pub start_row: usize,
    pub end_row: Option<usize>,
    // --- 输出配置 ---
    pub output_path: PathBuf,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 运行日志文件
    pub output_log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.dify.ai/v1".to_string(),
            response_mode: "blocking".to_string(),
            timeout_secs: 60,
            user: "batch_processor".to_string(),
            workflow_id: None,
            source_path: PathBuf::from("questions.toml"),
            question_column: "question".to_string(),
            answer_column: "answer".to_string(),
            input_variable_name: "query".to_string(),
            output_variable_name: "answer".to_string(),
            comparison_method: MatchStrategy::Auto,
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            delay_secs: 0.5,
            start_row: 0,
            end_row: None,
            output_path: PathBuf::from("results.json"),
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
        }
    }
}

// ========== 配置文件结构 ==========

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    dify: DifySection,
    source: SourceSection,
    workflow: WorkflowSection,
    output: OutputSection,
    logging: LoggingSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DifySection {
    api_key: Option<String>,
    base_url: Option<String>,
    response_mode: Option<String>,
    timeout: Option<u64>,
    user: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SourceSection {
    file_path: Option<PathBuf>,
    question_column: Option<String>,
    answer_column: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WorkflowSection {
    workflow_id: Option<String>,
    input_variable_name: Option<String>,
    output_variable_name: Option<String>,
    comparison_method: Option<String>,
    fuzzy_threshold: Option<f64>,
    delay: Option<f64>,
    start_row: Option<usize>,
    end_row: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OutputSection {
    file_path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LoggingSection {
    verbose: Option<bool>,
    log_file: Option<String>,
}

impl Config {
    /// 加载配置：默认值 → 配置文件（存在时）→ 环境变量
    ///
    /// 配置文件路径取 `DIFY_BATCH_CONFIG`，缺省为 `config.toml`
    pub fn load() -> AppResult<Self> {
        let path = std::env::var("DIFY_BATCH_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));

        let config = if path.exists() {
            Self::from_toml_file(&path)?
        } else {
            debug!("未找到配置文件 {}，使用默认配置", path.display());
            Self::default()
        };

        let config = config.with_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// 从 TOML 配置文件加载（未配置的项保留默认值）
    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_toml_str(&content, &path.display().to_string())
    }

    fn from_toml_str(content: &str, origin: &str) -> AppResult<Self> {
        let file: ConfigFile = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: origin.to_string(),
            message: e.to_string(),
        })?;

        let mut config = Self::default();
        let ConfigFile {
            dify,
            source,
            workflow,
            output,
            logging,
        } = file;

        set(&mut config.api_key, dify.api_key);
        set(&mut config.base_url, dify.base_url);
        set(&mut config.response_mode, dify.response_mode);
        set(&mut config.timeout_secs, dify.timeout);
        set(&mut config.user, dify.user);

        set(&mut config.source_path, source.file_path);
        set(&mut config.question_column, source.question_column);
        set(&mut config.answer_column, source.answer_column);

        if workflow.workflow_id.is_some() {
            config.workflow_id = workflow.workflow_id;
        }
        set(&mut config.input_variable_name, workflow.input_variable_name);
        set(&mut config.output_variable_name, workflow.output_variable_name);
        if let Some(method) = workflow.comparison_method {
            config.comparison_method = MatchStrategy::from_str(&method)?;
        }
        set(&mut config.fuzzy_threshold, workflow.fuzzy_threshold);
        set(&mut config.delay_secs, workflow.delay);
        set(&mut config.start_row, workflow.start_row);
        if workflow.end_row.is_some() {
            config.end_row = workflow.end_row;
        }

        set(&mut config.output_path, output.file_path);
        set(&mut config.verbose_logging, logging.verbose);
        set(&mut config.output_log_file, logging.log_file);

        Ok(config)
    }

    /// 用环境变量覆盖配置
    ///
    /// 数值无法解析时报错，而不是静默回退到默认值
    pub fn with_env_overrides(self) -> AppResult<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        if let Some(v) = lookup("DIFY_API_KEY") {
            self.api_key = v;
        }
        if let Some(v) = lookup("DIFY_BASE_URL") {
            self.base_url = v;
        }
        if let Some(v) = lookup("DIFY_RESPONSE_MODE") {
            self.response_mode = v;
        }
        if let Some(v) = lookup("DIFY_TIMEOUT_SECS") {
            self.timeout_secs = parse_value("DIFY_TIMEOUT_SECS", &v, "正整数")?;
        }
        if let Some(v) = lookup("DIFY_USER") {
            self.user = v;
        }
        if let Some(v) = lookup("DIFY_WORKFLOW_ID") {
            self.workflow_id = Some(v).filter(|id| !id.trim().is_empty());
        }
        if let Some(v) = lookup("SOURCE_PATH") {
            self.source_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("QUESTION_COLUMN") {
            self.question_column = v;
        }
        if let Some(v) = lookup("ANSWER_COLUMN") {
            self.answer_column = v;
        }
        if let Some(v) = lookup("INPUT_VARIABLE_NAME") {
            self.input_variable_name = v;
        }
        if let Some(v) = lookup("OUTPUT_VARIABLE_NAME") {
            self.output_variable_name = v;
        }
        if let Some(v) = lookup("COMPARISON_METHOD") {
            self.comparison_method = MatchStrategy::from_str(&v)?;
        }
        if let Some(v) = lookup("FUZZY_THRESHOLD") {
            self.fuzzy_threshold = parse_value("FUZZY_THRESHOLD", &v, "0 到 1 之间的小数")?;
        }
        if let Some(v) = lookup("DELAY_SECS") {
            self.delay_secs = parse_value("DELAY_SECS", &v, "非负秒数")?;
        }
        if let Some(v) = lookup("START_ROW") {
            self.start_row = parse_value("START_ROW", &v, "非负整数")?;
        }
        if let Some(v) = lookup("END_ROW") {
            self.end_row = Some(parse_value("END_ROW", &v, "非负整数")?);
        }
        if let Some(v) = lookup("OUTPUT_PATH") {
            self.output_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("VERBOSE_LOGGING") {
            self.verbose_logging = parse_value("VERBOSE_LOGGING", &v, "true 或 false")?;
        }
        if let Some(v) = lookup("OUTPUT_LOG_FILE") {
            self.output_log_file = v;
        }
        Ok(self)
    }

    /// 校验配置取值
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.fuzzy_threshold) {
            return Err(ConfigError::invalid(
                "fuzzy_threshold",
                self.fuzzy_threshold,
                "0 到 1 之间的小数",
            ));
        }
        delay_duration(self.delay_secs)?;
        if self.timeout_secs == 0 {
            return Err(ConfigError::invalid("timeout", self.timeout_secs, "正整数"));
        }
        Ok(())
    }

    /// 请求间隔
    ///
    /// 无法表示为 `Duration` 的取值已被 `validate` 拒绝，这里按零间隔处理
    pub fn pacing_delay(&self) -> Duration {
        delay_duration(self.delay_secs).unwrap_or_default()
    }

    /// 请求超时
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// 处理范围
    pub fn row_range(&self) -> RowRange {
        RowRange::new(self.start_row, self.end_row)
    }
}

fn delay_duration(secs: f64) -> Result<Duration, ConfigError> {
    Duration::try_from_secs_f64(secs).map_err(|_| ConfigError::invalid("delay", secs, "非负秒数"))
}

fn set<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str, expected: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::invalid(key, value, expected))
}
