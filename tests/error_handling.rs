//! 错误处理集成测试
//!
//! 验证错误分类、凭证快速失败与失败信息的可见性

use std::sync::Arc;
use std::time::Duration;

use sitelingo::core::{RunMode, WorkflowOptions};
use sitelingo::error::SyncError;
use sitelingo::translation::glossary::Glossary;
use sitelingo::translation::pipeline::{Orchestrator, PairState};

mod common;

use common::{cms_record, locales, StubTranslator, StubWriter};

fn options(mode: RunMode) -> WorkflowOptions {
    WorkflowOptions {
        mode,
        pacing: Duration::ZERO,
        ..WorkflowOptions::default()
    }
}

/// 测试凭证缺失在任何网络调用前让整批失败
#[tokio::test]
async fn missing_credential_fails_whole_batch_fast() {
    let records = vec![cms_record("item-1", "First post")];
    let mut translator = StubTranslator::default();
    translator.missing_credential = true;
    let writer = Arc::new(StubWriter::default());

    let orchestrator = Orchestrator::new(options(RunMode::Sequential)).unwrap();
    let result = orchestrator
        .translate_and_publish(
            &records,
            &locales(),
            &Glossary::new(),
            Arc::new(translator),
            Arc::clone(&writer) as _,
        )
        .await;

    assert!(matches!(result, Err(SyncError::Credential(_))));
    // 没有任何配对被提交
    assert!(writer.recorded().is_empty());

    println!("✅ Credential fast-fail test passed");
}

/// 测试写回失败被就地转为错误行，翻译阶段的成果不影响兄弟配对
#[tokio::test]
async fn write_failure_is_isolated_per_pair() {
    let records = vec![cms_record("item-1", "First post")];
    let translator = Arc::new(StubTranslator::default());
    let mut writer = StubWriter::default();
    writer.fail_locales.insert("loc-fr".to_string());
    let writer = Arc::new(writer);

    let orchestrator = Orchestrator::new(options(RunMode::Sequential)).unwrap();
    let report = orchestrator
        .translate_and_publish(
            &records,
            &locales(),
            &Glossary::new(),
            translator,
            Arc::clone(&writer) as _,
        )
        .await
        .unwrap();

    assert_eq!(report.total, 3);
    assert_eq!(report.failed, 1);

    let failed = report.outcomes.iter().find(|o| !o.is_success()).unwrap();
    assert_eq!(failed.locale_name, "French");
    assert_eq!(failed.state, PairState::WriteFailed);
    assert!(failed.message.contains("写回失败"));
    assert!(failed.message.contains("HTTP 502"));

    println!("✅ Write failure isolation test passed");
}

/// 测试翻译失败与写回失败的终态区分
#[tokio::test]
async fn failure_states_name_the_failing_stage() {
    let records = vec![cms_record("item-1", "First post")];
    let translator = Arc::new(StubTranslator::failing_on(&["es"]));
    let mut writer = StubWriter::default();
    writer.fail_locales.insert("loc-fr".to_string());
    let writer = Arc::new(writer);

    let orchestrator = Orchestrator::new(options(RunMode::Parallel { max_workers: 3 })).unwrap();
    let report = orchestrator
        .translate_and_publish(
            &records,
            &locales(),
            &Glossary::new(),
            translator,
            Arc::clone(&writer) as _,
        )
        .await
        .unwrap();

    assert_eq!(report.total, 3);
    assert_eq!(report.failed, 2);

    for outcome in &report.outcomes {
        match outcome.locale_name.as_str() {
            "Spanish" => assert_eq!(outcome.state, PairState::TranslationFailed),
            "French" => assert_eq!(outcome.state, PairState::WriteFailed),
            "Arabic" => assert_eq!(outcome.state, PairState::Written),
            other => panic!("unexpected locale {}", other),
        }
        assert!(outcome.state.is_terminal());
    }

    println!("✅ Failure stage classification test passed");
}

/// 测试非法运行选项被拒绝
#[tokio::test]
async fn invalid_options_are_rejected() {
    let result = Orchestrator::new(options(RunMode::Parallel { max_workers: 0 }));
    assert!(matches!(result, Err(SyncError::Config(_))));

    let result = Orchestrator::new(options(RunMode::Parallel { max_workers: 64 }));
    assert!(matches!(result, Err(SyncError::Config(_))));

    println!("✅ Option validation test passed");
}
