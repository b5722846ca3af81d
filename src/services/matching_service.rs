/// 答案匹配服务
///
/// 负责判断工作流返回的答案与期望答案是否一致
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::models::{MatchKind, MatchOutcome, MatchStrategy};

/// 默认相似度阈值
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.8;

/// 关键词规则：至少两个连续汉字 / 连续拉丁字母 / 连续数字
static KEYWORD_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\x{4e00}-\x{9fff}]{2,}|[a-zA-Z]+|[0-9]+").expect("keyword pattern is valid")
});

/// 答案匹配服务
#[derive(Debug, Clone, Copy)]
pub struct MatchingService {
    fuzzy_threshold: f64,
}

impl Default for MatchingService {
    fn default() -> Self {
        Self::new(DEFAULT_FUZZY_THRESHOLD)
    }
}

impl MatchingService {
    /// 创建新的匹配服务
    pub fn new(fuzzy_threshold: f64) -> Self {
        Self { fuzzy_threshold }
    }

    /// 比较期望答案与实际答案
    ///
    /// `Auto` 按 精确 → 相似度 → 关键词 的固定顺序尝试，第一个命中的算法决定匹配类型。
    /// 未命中时匹配类型为 `MatchKind::None`。
    pub fn compare(&self, expected: &str, actual: &str, strategy: MatchStrategy) -> MatchOutcome {
        let outcome = match strategy {
            MatchStrategy::Exact => single(exact_match(expected, actual), MatchKind::Exact),
            MatchStrategy::Fuzzy => single(self.fuzzy_match(expected, actual), MatchKind::Fuzzy),
            MatchStrategy::Keyword => single(keyword_match(expected, actual), MatchKind::Keyword),
            MatchStrategy::Auto => {
                if exact_match(expected, actual) {
                    MatchOutcome::matched(MatchKind::Exact)
                } else if self.fuzzy_match(expected, actual) {
                    MatchOutcome::matched(MatchKind::Fuzzy)
                } else if keyword_match(expected, actual) {
                    MatchOutcome::matched(MatchKind::Keyword)
                } else {
                    MatchOutcome::no_match()
                }
            }
        };

        debug!(
            "匹配结果: 方法={} matched={} kind={}",
            strategy, outcome.matched, outcome.kind
        );
        outcome
    }

    /// 相似度匹配：相似度 >= 阈值
    pub fn fuzzy_match(&self, expected: &str, actual: &str) -> bool {
        similarity_ratio(&normalize(expected), &normalize(actual)) >= self.fuzzy_threshold
    }
}

fn single(matched: bool, kind: MatchKind) -> MatchOutcome {
    if matched {
        MatchOutcome::matched(kind)
    } else {
        MatchOutcome::no_match()
    }
}

/// 去除首尾空白并转小写
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// 精确匹配
pub fn exact_match(expected: &str, actual: &str) -> bool {
    normalize(expected) == normalize(actual)
}

/// 关键词匹配
///
/// 只从期望答案中提取关键词，全部出现在实际答案中才算命中。
/// 提取不到关键词时视为未命中。单个汉字不构成关键词，
/// 所以"是"这类单字答案永远无法通过关键词匹配。
pub fn keyword_match(expected: &str, actual: &str) -> bool {
    let keywords = extract_keywords(expected);
    if keywords.is_empty() {
        return false;
    }

    let actual = actual.to_lowercase();
    keywords.iter().all(|keyword| actual.contains(keyword.as_str()))
}

/// 按规则提取关键词（已转小写）
pub fn extract_keywords(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    KEYWORD_PATTERN
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// 相似度：`2 * M / (len(a) + len(b))`
///
/// M 为递归取最长公共连续块后累计的匹配字符数，按 Unicode 码点计算。
/// 两个空串的相似度为 1.0。
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    2.0 * matching_chars(&a, &b) as f64 / total as f64
}

fn matching_chars(a: &[char], b: &[char]) -> usize {
    let mut matched = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, k) = longest_match(a, b, alo, ahi, blo, bhi);
        if k == 0 {
            continue;
        }
        matched += k;
        if alo < i && blo < j {
            pending.push((alo, i, blo, j));
        }
        if i + k < ahi && j + k < bhi {
            pending.push((i + k, ahi, j + k, bhi));
        }
    }

    matched
}

/// 在 `a[alo..ahi]` 与 `b[blo..bhi]` 中找最长公共连续块，返回 (i, j, 长度)
fn longest_match(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let width = bhi - blo + 1;
    let mut best = (alo, blo, 0);
    let mut prev = vec![0usize; width];
    let mut cur = vec![0usize; width];

    for i in alo..ahi {
        for j in blo..bhi {
            let slot = j - blo + 1;
            if a[i] == b[j] {
                let k = prev[slot - 1] + 1;
                cur[slot] = k;
                if k > best.2 {
                    best = (i + 1 - k, j + 1 - k, k);
                }
            } else {
                cur[slot] = 0;
            }
        }
        std::mem::swap(&mut prev, &mut cur);
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> MatchingService {
        MatchingService::default()
    }

    #[test]
    fn test_exact_ignores_case_and_whitespace() {
        assert_eq!(
            service().compare("Hello", "  hello ", MatchStrategy::Exact),
            MatchOutcome::matched(MatchKind::Exact)
        );
    }

    #[test]
    fn test_exact_is_symmetric() {
        let pairs = [
            ("Hello", " hello"),
            ("579", "五百七十九"),
            ("", ""),
            ("", "x"),
            ("北京", "北京 "),
        ];
        for (a, b) in pairs {
            assert_eq!(
                service().compare(a, b, MatchStrategy::Exact),
                service().compare(b, a, MatchStrategy::Exact)
            );
        }
    }

    #[test]
    fn test_exact_empty_strings() {
        assert!(exact_match("", ""));
        assert!(exact_match("  ", ""));
        assert!(!exact_match("", "answer"));
        assert!(!exact_match("answer", ""));
    }

    #[test]
    fn test_fuzzy_identical_strings() {
        assert_eq!(
            service().compare("579", "579", MatchStrategy::Fuzzy),
            MatchOutcome::matched(MatchKind::Fuzzy)
        );
        assert!(MatchingService::new(0.99).fuzzy_match("579", "579"));
    }

    #[test]
    fn test_fuzzy_two_empty_strings_match() {
        assert_eq!(similarity_ratio("", ""), 1.0);
        assert!(service().fuzzy_match("", ""));
    }

    #[test]
    fn test_fuzzy_one_empty_string() {
        assert_eq!(similarity_ratio("", "abc"), 0.0);
        assert!(!service().fuzzy_match("abc", ""));
    }

    #[test]
    fn test_fuzzy_threshold_boundary() {
        // 4 个字符匹配，总长 10
        assert_eq!(similarity_ratio("abcde", "abcdf"), 0.8);
        assert!(service().fuzzy_match("abcde", "abcdf"));
        assert!(!MatchingService::new(0.8000001).fuzzy_match("abcde", "abcdf"));

        // 2 * 39 / 98 < 0.8
        let a = "a".repeat(49);
        let b = format!("{}{}", "a".repeat(39), "b".repeat(10));
        assert!(similarity_ratio(&a, &b) < 0.8);
        assert!(!service().fuzzy_match(&a, &b));
    }

    #[test]
    fn test_fuzzy_counts_code_points() {
        // 汉字按码点计算，而不是按字节
        assert_eq!(similarity_ratio("北京是首都", "北京是首府"), 0.8);
    }

    #[test]
    fn test_similarity_ratio_recurses_around_longest_block() {
        // 最长块 "bcd"，左侧 "a" 与 "a" 再匹配 1 个
        assert_eq!(similarity_ratio("abcd", "axbcd"), 8.0 / 9.0);
        assert_eq!(similarity_ratio("abc", "xyz"), 0.0);
    }

    #[test]
    fn test_extract_keywords() {
        assert_eq!(
            extract_keywords("请计算123+456=?"),
            vec!["请计算".to_string(), "123".to_string(), "456".to_string()]
        );
        assert_eq!(
            extract_keywords("Hello, World 2024"),
            vec!["hello".to_string(), "world".to_string(), "2024".to_string()]
        );
    }

    #[test]
    fn test_extract_keywords_skips_single_cjk_character() {
        assert!(extract_keywords("是").is_empty());
        assert!(extract_keywords("是，否").is_empty());
        assert_eq!(extract_keywords("是的"), vec!["是的".to_string()]);
    }

    #[test]
    fn test_keyword_requires_every_token() {
        assert_eq!(
            service().compare("请计算123+456=?", "123 + 456 = 579", MatchStrategy::Keyword),
            MatchOutcome::no_match()
        );
        assert!(keyword_match("请计算123+456=?", "请计算: 123 + 456 = 579"));
    }

    #[test]
    fn test_keyword_is_case_insensitive() {
        assert!(keyword_match("Rust Language", "I like rust, the language."));
    }

    #[test]
    fn test_keyword_without_tokens_fails() {
        assert!(!keyword_match("", "anything"));
        assert!(!keyword_match("?!", "?!"));
        assert!(!keyword_match("是", "是的，北京是首都"));
    }

    #[test]
    fn test_auto_falls_through_to_none() {
        assert_eq!(
            service().compare("579", "五百七十九", MatchStrategy::Auto),
            MatchOutcome::no_match()
        );
    }

    #[test]
    fn test_auto_single_character_answer_is_not_matched() {
        assert_eq!(
            service().compare("是", "是的，北京是首都", MatchStrategy::Auto),
            MatchOutcome::no_match()
        );
    }

    #[test]
    fn test_auto_label_follows_fixed_order() {
        let service = service();

        assert_eq!(
            service.compare("北京", " 北京 ", MatchStrategy::Auto).kind,
            MatchKind::Exact
        );
        assert_eq!(
            service.compare("北京是首都", "北京是首府", MatchStrategy::Auto).kind,
            MatchKind::Fuzzy
        );
        assert_eq!(
            service.compare("2", "1+1=2", MatchStrategy::Auto).kind,
            MatchKind::Keyword
        );
        assert_eq!(
            service.compare("125", "5的立方是125", MatchStrategy::Auto).kind,
            MatchKind::Keyword
        );
    }

    #[test]
    fn test_explicit_strategy_miss_reports_none() {
        assert_eq!(
            service().compare("2", "1+1=2", MatchStrategy::Exact),
            MatchOutcome::no_match()
        );
    }
}
