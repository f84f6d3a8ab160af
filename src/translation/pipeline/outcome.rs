//! 逐配对结果行
//!
//! 每个 (记录, 语言) 配对走一遍固定的状态机，终态落成一行
//! `BatchOutcome`。结果行只追加，不在创建后修改。

use serde::Serialize;

use crate::content::normalizer::TranslatableRecord;
use crate::core::LocaleTarget;

/// 配对状态机
///
/// Pending → Translating → {TranslationFailed | Translated}
/// → Writing → {WriteFailed | Written}
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PairState {
    Pending,
    Translating,
    TranslationFailed,
    Translated,
    Writing,
    WriteFailed,
    Written,
}

impl PairState {
    /// 是否终态；失败的配对不自动重试，留给调用方手动重跑
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PairState::TranslationFailed | PairState::WriteFailed | PairState::Written
        )
    }
}

/// 结果状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Success,
    Error,
}

/// 一个 (记录, 语言) 配对的最终结果
#[derive(Debug, Clone, Serialize)]
pub struct BatchOutcome {
    pub item_identifier: String,
    pub locale_name: String,
    pub status: OutcomeStatus,
    pub message: String,
    /// 非致命警告（写回整体成功但部分子节点失败）
    pub warnings: Vec<String>,
    pub state: PairState,
}

impl BatchOutcome {
    /// 成功行，可能附带部分写回警告
    pub fn success(
        record: &TranslatableRecord,
        locale: &LocaleTarget,
        warnings: Vec<String>,
    ) -> Self {
        let message = if warnings.is_empty() {
            "翻译并写回成功".to_string()
        } else {
            format!("翻译并写回成功（{} 个节点有警告）", warnings.len())
        };
        Self {
            item_identifier: record.identifier.clone(),
            locale_name: locale.name.clone(),
            status: OutcomeStatus::Success,
            message,
            warnings,
            state: PairState::Written,
        }
    }

    /// 失败行；`state` 标记失败发生在翻译还是写回阶段
    pub fn failure(
        record: &TranslatableRecord,
        locale: &LocaleTarget,
        state: PairState,
        message: String,
    ) -> Self {
        Self {
            item_identifier: record.identifier.clone(),
            locale_name: locale.name.clone(),
            status: OutcomeStatus::Error,
            message,
            warnings: Vec::new(),
            state,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::normalizer::RecordKind;
    use std::collections::BTreeMap;

    fn record() -> TranslatableRecord {
        TranslatableRecord {
            id: "r1".to_string(),
            identifier: "First post".to_string(),
            kind: RecordKind::CollectionEntry,
            fields: BTreeMap::new(),
            preserved: BTreeMap::new(),
        }
    }

    fn locale() -> LocaleTarget {
        LocaleTarget::new("cms-es", "es", "Spanish", false)
    }

    #[test]
    fn terminal_states_are_classified() {
        assert!(PairState::Written.is_terminal());
        assert!(PairState::TranslationFailed.is_terminal());
        assert!(PairState::WriteFailed.is_terminal());
        assert!(!PairState::Translating.is_terminal());
        assert!(!PairState::Pending.is_terminal());
    }

    #[test]
    fn success_with_warnings_stays_success() {
        let outcome = BatchOutcome::success(&record(), &locale(), vec!["节点 n1 写回失败: bad".into()]);
        assert!(outcome.is_success());
        assert_eq!(outcome.state, PairState::Written);
        assert!(outcome.message.contains("警告"));
        assert_eq!(outcome.warnings.len(), 1);
    }

    #[test]
    fn failure_records_the_failing_stage() {
        let outcome = BatchOutcome::failure(
            &record(),
            &locale(),
            PairState::TranslationFailed,
            "翻译失败: 超时".to_string(),
        );
        assert!(!outcome.is_success());
        assert_eq!(outcome.state, PairState::TranslationFailed);
        assert_eq!(outcome.locale_name, "Spanish");
    }
}
