use std::ops::Range;

use serde::{Deserialize, Serialize};

/// 一行待处理的数据：问题 + 期望答案
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub question: String,
    pub expected_answer: String,
}

impl Row {
    pub fn new(question: impl Into<String>, expected_answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            expected_answer: expected_answer.into(),
        }
    }
}

/// 处理范围 `[start, end)`，`end` 缺省表示到末尾
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RowRange {
    pub start: usize,
    pub end: Option<usize>,
}

impl RowRange {
    pub fn new(start: usize, end: Option<usize>) -> Self {
        Self { start, end }
    }

    /// 整个数据源
    pub fn all() -> Self {
        Self::default()
    }

    /// 按数据源长度截断，`start >= end` 时得到空区间
    pub fn clamp(&self, len: usize) -> Range<usize> {
        let end = self.end.map_or(len, |end| end.min(len));
        let start = self.start.min(end);
        start..end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_end_beyond_len() {
        assert_eq!(RowRange::new(0, Some(100)).clamp(3), 0..3);
    }

    #[test]
    fn test_clamp_open_end() {
        assert_eq!(RowRange::new(1, None).clamp(3), 1..3);
    }

    #[test]
    fn test_clamp_start_after_end_is_empty() {
        assert!(RowRange::new(5, Some(2)).clamp(10).is_empty());
        assert!(RowRange::new(7, None).clamp(3).is_empty());
    }
}
