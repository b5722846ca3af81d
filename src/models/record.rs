//! 结果记录与匹配类型
//!
//! 一行题目从 `PendingRecord` 开始，经由 `RowOutcome` 定型为不可变的 `ResultRecord`。

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MatcherInputError;

/// 匹配方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MatchStrategy {
    /// 精确匹配（忽略首尾空白与大小写）
    Exact,
    /// 相似度匹配
    Fuzzy,
    /// 关键词匹配
    Keyword,
    /// 依次尝试 精确 → 相似度 → 关键词
    #[default]
    Auto,
}

impl MatchStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchStrategy::Exact => "exact",
            MatchStrategy::Fuzzy => "fuzzy",
            MatchStrategy::Keyword => "keyword",
            MatchStrategy::Auto => "auto",
        }
    }
}

impl FromStr for MatchStrategy {
    type Err = MatcherInputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "exact" => Ok(MatchStrategy::Exact),
            "fuzzy" => Ok(MatchStrategy::Fuzzy),
            "keyword" => Ok(MatchStrategy::Keyword),
            "auto" => Ok(MatchStrategy::Auto),
            _ => Err(MatcherInputError::UnknownStrategy(s.to_string())),
        }
    }
}

impl fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 匹配类型：产生比较结果的那一种算法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchKind {
    Exact,
    Fuzzy,
    Keyword,
    None,
}

impl MatchKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchKind::Exact => "EXACT",
            MatchKind::Fuzzy => "FUZZY",
            MatchKind::Keyword => "KEYWORD",
            MatchKind::None => "NONE",
        }
    }
}

impl fmt::Display for MatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 一次比较的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchOutcome {
    pub matched: bool,
    pub kind: MatchKind,
}

impl MatchOutcome {
    pub fn matched(kind: MatchKind) -> Self {
        Self {
            matched: true,
            kind,
        }
    }

    pub fn no_match() -> Self {
        Self {
            matched: false,
            kind: MatchKind::None,
        }
    }
}

/// 单行处理的终态
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    /// 网关返回了答案并完成了比较
    Answered {
        actual_answer: String,
        correlation_id: Option<String>,
        outcome: MatchOutcome,
    },
    /// 网关调用失败，不做比较
    Failed { message: String },
}

/// 尚未定型的记录，只持有题目与期望答案
#[derive(Debug, Clone)]
pub struct PendingRecord {
    question: String,
    expected_answer: String,
}

impl PendingRecord {
    pub fn new(question: impl Into<String>, expected_answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            expected_answer: expected_answer.into(),
        }
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn expected_answer(&self) -> &str {
        &self.expected_answer
    }

    /// 用终态定型记录，之后不可再修改
    pub fn finish(self, outcome: RowOutcome) -> ResultRecord {
        let mut record = ResultRecord {
            question: self.question,
            expected_answer: self.expected_answer,
            actual_answer: None,
            correlation_id: None,
            matched: false,
            match_kind: None,
            failure: None,
        };

        match outcome {
            RowOutcome::Answered {
                actual_answer,
                correlation_id,
                outcome,
            } => {
                record.actual_answer = Some(actual_answer);
                record.correlation_id = correlation_id;
                record.matched = outcome.matched;
                record.match_kind = Some(outcome.kind);
            }
            RowOutcome::Failed { message } => {
                record.failure = Some(message);
            }
        }

        record
    }
}

/// 已定型的单行结果
///
/// 要么 `failure` 有值，要么 `actual_answer` 与 `match_kind` 同时有值。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRecord {
    question: String,
    expected_answer: String,
    actual_answer: Option<String>,
    correlation_id: Option<String>,
    matched: bool,
    match_kind: Option<MatchKind>,
    failure: Option<String>,
}

impl ResultRecord {
    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn expected_answer(&self) -> &str {
        &self.expected_answer
    }

    pub fn actual_answer(&self) -> Option<&str> {
        self.actual_answer.as_deref()
    }

    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    pub fn matched(&self) -> bool {
        self.matched
    }

    pub fn match_kind(&self) -> Option<MatchKind> {
        self.match_kind
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    pub fn is_failed(&self) -> bool {
        self.failure.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strategy_case_insensitive() {
        assert_eq!("AUTO".parse::<MatchStrategy>(), Ok(MatchStrategy::Auto));
        assert_eq!(" fuzzy ".parse::<MatchStrategy>(), Ok(MatchStrategy::Fuzzy));
        assert_eq!("Keyword".parse::<MatchStrategy>(), Ok(MatchStrategy::Keyword));
    }

    #[test]
    fn test_parse_strategy_rejects_unknown() {
        assert_eq!(
            "semantic".parse::<MatchStrategy>(),
            Err(MatcherInputError::UnknownStrategy("semantic".to_string()))
        );
    }

    #[test]
    fn test_finish_answered_record() {
        let record = PendingRecord::new("1+1=?", "2").finish(RowOutcome::Answered {
            actual_answer: "2".to_string(),
            correlation_id: Some("task1".to_string()),
            outcome: MatchOutcome::matched(MatchKind::Exact),
        });

        assert_eq!(record.actual_answer(), Some("2"));
        assert_eq!(record.correlation_id(), Some("task1"));
        assert_eq!(record.match_kind(), Some(MatchKind::Exact));
        assert!(record.matched());
        assert!(!record.is_failed());
    }

    #[test]
    fn test_finish_failed_record() {
        let record = PendingRecord::new("1+1=?", "2").finish(RowOutcome::Failed {
            message: "timeout".to_string(),
        });

        assert_eq!(record.failure(), Some("timeout"));
        assert_eq!(record.actual_answer(), None);
        assert_eq!(record.match_kind(), None);
        assert!(!record.matched());
    }
}
