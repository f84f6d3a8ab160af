//! # 翻译模块
//!
//! 从提示构造到多语言扇出的完整翻译链路：
//!
//! - `glossary` - 禁译术语表（类别 → 字面量列表）
//! - `rules` - 提示策略规则表（数据，可整表覆盖）
//! - `prompt` - 系统/用户消息构造
//! - `gateway` - 聊天补全翻译网关与按语言的供应商路由
//! - `pipeline` - 多语言扇出编排、结果行与汇总

pub mod gateway;
pub mod glossary;
pub mod pipeline;
pub mod prompt;
pub mod rules;

// 重新导出主要类型
pub use gateway::{ChatGateway, RoutedTranslator, TranslationRequest, Translator, TranslatorConfig};
pub use glossary::Glossary;
pub use pipeline::{BatchOutcome, BatchReport, Orchestrator, OutcomeStatus, PairState};
pub use rules::{PromptRule, RuleSet};
