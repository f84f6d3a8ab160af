//! # Sitelingo Library
//!
//! 网站内容平台的多语言翻译工具库：穷举分页抓取内容、按字段模式
//! 归一化、经LLM翻译服务逐语言扇出翻译，再写回平台。
//!
//! ## 模块组织
//!
//! - `core` - 工作流上下文、运行选项与语言目标
//! - `error` - 统一错误分类
//! - `env` - 类型安全的环境变量访问
//! - `network` - 平台API会话与分页抓取
//! - `content` - 原始条目、字段模式、归一化与写回
//! - `translation` - 词汇表、提示规则、翻译网关与扇出管道

pub mod content;
pub mod core;
pub mod env;
pub mod error;
pub mod network;
pub mod translation;

// Re-export commonly used items for convenience
pub use self::content::{
    normalize, ContentWriter, FieldSchema, PlatformWriter, RecordKind, SchemaTable,
    TranslatableRecord, WriteReceipt, WriteTarget,
};
pub use self::core::{
    Credentials, LocaleTarget, RunMode, WorkflowContext, WorkflowOptions,
};
pub use self::error::{SyncError, SyncResult};
pub use self::network::{fetch_all, ApiClient, CollectionPage, FetchOutcome};
pub use self::translation::{
    BatchOutcome, BatchReport, ChatGateway, Glossary, Orchestrator, OutcomeStatus, PairState,
    RoutedTranslator, RuleSet, TranslationRequest, Translator, TranslatorConfig,
};
