//! 批次结果汇总
//!
//! 把逐配对结果合并为调用方可读的统计：成功/失败计数、警告数、
//! 耗时与完成时间。每一行结果都单独保留，没有错误会被丢弃。

use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::translation::pipeline::outcome::BatchOutcome;

/// 批次报告
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub outcomes: Vec<BatchOutcome>,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// 附带警告的成功行数（部分节点写回失败）
    pub with_warnings: usize,
    #[serde(skip)]
    pub elapsed: Duration,
    pub finished_at: String,
}

impl BatchReport {
    /// 汇总一批结果行
    pub fn summarize(outcomes: Vec<BatchOutcome>, elapsed: Duration) -> Self {
        let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
        let failed = outcomes.len() - succeeded;
        let with_warnings = outcomes
            .iter()
            .filter(|o| o.is_success() && !o.warnings.is_empty())
            .count();

        Self {
            total: outcomes.len(),
            succeeded,
            failed,
            with_warnings,
            elapsed,
            finished_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            outcomes,
        }
    }

    /// 成功率
    pub fn success_rate(&self) -> f32 {
        if self.total == 0 {
            0.0
        } else {
            self.succeeded as f32 / self.total as f32
        }
    }

    /// 全部警告行，汇总视图里可见
    pub fn all_warnings(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .flat_map(|o| o.warnings.iter().map(String::as_str))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::normalizer::{RecordKind, TranslatableRecord};
    use crate::core::LocaleTarget;
    use crate::translation::pipeline::outcome::PairState;
    use std::collections::BTreeMap;

    fn record(name: &str) -> TranslatableRecord {
        TranslatableRecord {
            id: name.to_string(),
            identifier: name.to_string(),
            kind: RecordKind::TextNode,
            fields: BTreeMap::new(),
            preserved: BTreeMap::new(),
        }
    }

    #[test]
    fn counts_add_up() {
        let locale = LocaleTarget::new("l1", "es", "Spanish", false);
        let outcomes = vec![
            BatchOutcome::success(&record("a"), &locale, Vec::new()),
            BatchOutcome::success(&record("b"), &locale, vec!["节点 n1 写回失败: x".into()]),
            BatchOutcome::failure(
                &record("c"),
                &locale,
                PairState::TranslationFailed,
                "翻译失败".into(),
            ),
        ];

        let report = BatchReport::summarize(outcomes, Duration::from_secs(3));
        assert_eq!(report.total, 3);
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.with_warnings, 1);
        assert_eq!(report.all_warnings().len(), 1);
        assert!((report.success_rate() - 2.0 / 3.0).abs() < f32::EPSILON);
        assert!(!report.finished_at.is_empty());
    }

    #[test]
    fn empty_batch_reports_zero_rate() {
        let report = BatchReport::summarize(Vec::new(), Duration::ZERO);
        assert_eq!(report.total, 0);
        assert_eq!(report.success_rate(), 0.0);
    }
}
