//! 统计服务
//!
//! 在全部行处理完成后，一次性把结果列表归约为统计信息

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::{MatchKind, ResultRecord};

/// 一次运行的统计信息
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunStatistics {
    pub total: usize,
    pub succeeded_count: usize,
    pub matched_count: usize,
    /// 调用成功但答案不匹配
    pub unmatched_count: usize,
    pub failed_count: usize,
    pub accuracy: f64,
    pub success_rate: f64,
    pub match_kind_histogram: BTreeMap<MatchKind, usize>,
}

impl RunStatistics {
    pub fn accuracy_percent(&self) -> String {
        format!("{:.2}%", self.accuracy * 100.0)
    }

    pub fn success_rate_percent(&self) -> String {
        format!("{:.2}%", self.success_rate * 100.0)
    }
}

/// 计算统计信息
///
/// 空输入返回全零统计，比率为 0.0
pub fn aggregate(records: &[ResultRecord]) -> RunStatistics {
    let total = records.len();
    let failed_count = records.iter().filter(|r| r.is_failed()).count();
    let matched_count = records.iter().filter(|r| r.matched()).count();
    let succeeded_count = total - failed_count;

    let mut match_kind_histogram = BTreeMap::new();
    for kind in records.iter().filter_map(|r| r.match_kind()) {
        *match_kind_histogram.entry(kind).or_insert(0) += 1;
    }

    RunStatistics {
        total,
        succeeded_count,
        matched_count,
        unmatched_count: succeeded_count - matched_count,
        failed_count,
        accuracy: ratio(matched_count, total),
        success_rate: ratio(succeeded_count, total),
        match_kind_histogram,
    }
}

fn ratio(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MatchOutcome, PendingRecord, RowOutcome};

    fn answered(kind: Option<MatchKind>) -> ResultRecord {
        let outcome = match kind {
            Some(kind) => MatchOutcome::matched(kind),
            None => MatchOutcome::no_match(),
        };
        PendingRecord::new("q", "a").finish(RowOutcome::Answered {
            actual_answer: "x".to_string(),
            correlation_id: None,
            outcome,
        })
    }

    fn failed() -> ResultRecord {
        PendingRecord::new("q", "a").finish(RowOutcome::Failed {
            message: "boom".to_string(),
        })
    }

    #[test]
    fn test_aggregate_empty() {
        let stats = aggregate(&[]);

        assert_eq!(stats.total, 0);
        assert_eq!(stats.accuracy, 0.0);
        assert_eq!(stats.success_rate, 0.0);
        assert!(stats.match_kind_histogram.is_empty());
        assert_eq!(stats.accuracy_percent(), "0.00%");
    }

    #[test]
    fn test_aggregate_counts_and_rates() {
        let records = vec![
            answered(Some(MatchKind::Exact)),
            answered(Some(MatchKind::Keyword)),
            answered(None),
            failed(),
        ];

        let stats = aggregate(&records);

        assert_eq!(stats.total, 4);
        assert_eq!(stats.succeeded_count, 3);
        assert_eq!(stats.matched_count, 2);
        assert_eq!(stats.unmatched_count, 1);
        assert_eq!(stats.failed_count, 1);
        assert_eq!(
            stats.total,
            stats.matched_count + (stats.succeeded_count - stats.matched_count) + stats.failed_count
        );
        assert_eq!(stats.accuracy, 0.5);
        assert_eq!(stats.success_rate, 0.75);
        assert_eq!(stats.success_rate_percent(), "75.00%");
    }

    #[test]
    fn test_histogram_skips_failed_rows() {
        let records = vec![
            answered(Some(MatchKind::Keyword)),
            answered(Some(MatchKind::Keyword)),
            answered(None),
            failed(),
        ];

        let stats = aggregate(&records);

        assert_eq!(stats.match_kind_histogram.get(&MatchKind::Keyword), Some(&2));
        assert_eq!(stats.match_kind_histogram.get(&MatchKind::None), Some(&1));
        assert_eq!(stats.match_kind_histogram.values().sum::<usize>(), 3);
    }
}
