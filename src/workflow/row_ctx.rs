//! 单行处理上下文
//!
//! 封装"我正在处理数据源的第几行"这一信息

use std::fmt::Display;

/// 单行处理上下文
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowCtx {
    /// 行在数据源中的索引（从0开始）
    pub row_index: usize,

    /// 数据源总行数（仅用于日志显示）
    pub total_rows: usize,
}

impl RowCtx {
    /// 创建新的行上下文
    pub fn new(row_index: usize, total_rows: usize) -> Self {
        Self {
            row_index,
            total_rows,
        }
    }

    /// 从1开始的行号
    pub fn position(&self) -> usize {
        self.row_index + 1
    }
}

impl Display for RowCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}/{}]", self.position(), self.total_rows)
    }
}
