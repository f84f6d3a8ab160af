//! 翻译管道模块
//!
//! 多语言扇出编排、逐配对结果行与批次汇总

pub mod orchestrator;
pub mod outcome;
pub mod report;

// 重新导出主要类型
pub use orchestrator::Orchestrator;
pub use outcome::{BatchOutcome, OutcomeStatus, PairState};
pub use report::BatchReport;
