//! 多语言扇出编排
//!
//! 对每个 (记录, 语言) 配对：构造翻译请求 → 调用翻译网关 → 成功则
//! 写回。单个配对的失败就地转成错误结果行，绝不中断兄弟配对。
//! 支持顺序（带请求间隔）与有界并发两种调度模式；凭证缺失在任何
//! 网络调用前让整批快速失败。

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tokio::time::sleep;

use crate::content::normalizer::TranslatableRecord;
use crate::content::writer::ContentWriter;
use crate::core::{LocaleTarget, RunMode, WorkflowOptions};
use crate::error::SyncResult;
use crate::translation::gateway::{TranslationRequest, Translator};
use crate::translation::glossary::Glossary;
use crate::translation::pipeline::outcome::{BatchOutcome, PairState};
use crate::translation::pipeline::report::BatchReport;

/// 扇出编排器
pub struct Orchestrator {
    options: WorkflowOptions,
    completed: Arc<AtomicUsize>,
    total: Arc<AtomicUsize>,
    cancelled: Arc<AtomicBool>,
}

impl Orchestrator {
    pub fn new(options: WorkflowOptions) -> SyncResult<Self> {
        options.validate()?;
        Ok(Self {
            options,
            completed: Arc::new(AtomicUsize::new(0)),
            total: Arc::new(AtomicUsize::new(0)),
            cancelled: Arc::new(AtomicBool::new(false)),
        })
    }

    /// 当前进度：(已完成配对数, 配对总数)
    pub fn progress(&self) -> (usize, usize) {
        (
            self.completed.load(Ordering::Relaxed),
            self.total.load(Ordering::Relaxed),
        )
    }

    /// 协作式停止：在途配对跑完，不再提交新配对
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// 翻译并写回一批记录到一组语言目标
    ///
    /// 默认语言永远不作为翻译目标。返回的报告里每个未被取消的
    /// (记录, 语言) 配对恰好出现一行；并发模式下行序不保证。
    pub async fn translate_and_publish(
        &self,
        records: &[TranslatableRecord],
        locales: &[LocaleTarget],
        glossary: &Glossary,
        translator: Arc<dyn Translator>,
        writer: Arc<dyn ContentWriter>,
    ) -> SyncResult<BatchReport> {
        // 凭证检查先于一切网络调用
        translator.preflight()?;

        let targets: Vec<LocaleTarget> = locales
            .iter()
            .filter(|locale| !locale.is_default)
            .cloned()
            .collect();

        let pairs: Vec<(Arc<TranslatableRecord>, LocaleTarget)> = records
            .iter()
            .cloned()
            .map(Arc::new)
            .flat_map(|record| {
                targets
                    .iter()
                    .cloned()
                    .map(move |locale| (Arc::clone(&record), locale))
            })
            .collect();

        self.completed.store(0, Ordering::SeqCst);
        self.total.store(pairs.len(), Ordering::SeqCst);

        tracing::info!(
            records = records.len(),
            locales = targets.len(),
            pairs = pairs.len(),
            "pipeline: 批次开始"
        );

        let terms = Arc::new(glossary.flat_terms());
        let started = Instant::now();

        let outcomes = match self.options.mode {
            RunMode::Sequential => {
                self.run_sequential(&pairs, &terms, &translator, &writer).await
            }
            RunMode::Parallel { max_workers } => {
                self.run_parallel(&pairs, &terms, &translator, &writer, max_workers)
                    .await
            }
        };

        let report = BatchReport::summarize(outcomes, started.elapsed());
        tracing::info!(
            total = report.total,
            succeeded = report.succeeded,
            failed = report.failed,
            with_warnings = report.with_warnings,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "pipeline: 批次完成"
        );
        Ok(report)
    }

    async fn run_sequential(
        &self,
        pairs: &[(Arc<TranslatableRecord>, LocaleTarget)],
        terms: &Arc<Vec<String>>,
        translator: &Arc<dyn Translator>,
        writer: &Arc<dyn ContentWriter>,
    ) -> Vec<BatchOutcome> {
        let mut outcomes = Vec::with_capacity(pairs.len());

        for (index, (record, locale)) in pairs.iter().enumerate() {
            if self.is_cancelled() {
                tracing::warn!("pipeline: 已请求停止，剩余配对不再提交");
                break;
            }

            let outcome =
                process_pair(record, locale, terms, translator.as_ref(), writer.as_ref()).await;
            self.mark_done(&outcome);
            outcomes.push(outcome);

            // 请求间隔，尊重上游速率限制
            if index + 1 < pairs.len() && !self.options.pacing.is_zero() {
                sleep(self.options.pacing).await;
            }
        }

        outcomes
    }

    async fn run_parallel(
        &self,
        pairs: &[(Arc<TranslatableRecord>, LocaleTarget)],
        terms: &Arc<Vec<String>>,
        translator: &Arc<dyn Translator>,
        writer: &Arc<dyn ContentWriter>,
        max_workers: usize,
    ) -> Vec<BatchOutcome> {
        let semaphore = Arc::new(Semaphore::new(max_workers));

        let tasks: Vec<_> = pairs
            .iter()
            .map(|(record, locale)| {
                let record = Arc::clone(record);
                let locale = locale.clone();
                let terms = Arc::clone(terms);
                let translator = Arc::clone(translator);
                let writer = Arc::clone(writer);
                let semaphore = Arc::clone(&semaphore);
                let cancelled = Arc::clone(&self.cancelled);
                let completed = Arc::clone(&self.completed);
                let total = pairs.len();

                async move {
                    if cancelled.load(Ordering::SeqCst) {
                        return None;
                    }
                    // 信号量控制同时在途的配对数
                    let _permit = match semaphore.acquire().await {
                        Ok(permit) => permit,
                        Err(_) => return None,
                    };
                    if cancelled.load(Ordering::SeqCst) {
                        return None;
                    }

                    let outcome = process_pair(
                        &record,
                        &locale,
                        &terms,
                        translator.as_ref(),
                        writer.as_ref(),
                    )
                    .await;

                    let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                    tracing::info!(done, total, "pipeline: 进度 {}/{}", done, total);
                    Some(outcome)
                }
            })
            .collect();

        join_all(tasks).await.into_iter().flatten().collect()
    }

    fn mark_done(&self, outcome: &BatchOutcome) {
        let done = self.completed.fetch_add(1, Ordering::SeqCst) + 1;
        let total = self.total.load(Ordering::Relaxed);
        tracing::info!(
            done,
            total,
            item = %outcome.item_identifier,
            locale = %outcome.locale_name,
            "pipeline: 进度 {}/{}",
            done,
            total
        );
    }
}

/// 处理一个 (记录, 语言) 配对
///
/// 状态机：Pending → Translating → {TranslationFailed | Translated}
/// → Writing → {WriteFailed | Written}。没有可翻译文本的记录跳过
/// 翻译阶段，让纯保留内容直接流向写回。
async fn process_pair(
    record: &TranslatableRecord,
    locale: &LocaleTarget,
    terms: &[String],
    translator: &dyn Translator,
    writer: &dyn ContentWriter,
) -> BatchOutcome {
    let translated = if record.has_translatable_text() {
        tracing::debug!(
            item = %record.identifier,
            locale = %locale.name,
            tag = %locale.tag,
            "translate-call: 开始翻译"
        );
        let request =
            TranslationRequest::new(record.fields.clone(), &locale.tag, terms.to_vec());
        match translator.translate(&request).await {
            Ok(fields) => fields,
            Err(error) => {
                tracing::warn!(
                    item = %record.identifier,
                    locale = %locale.name,
                    %error,
                    "translate-call: 翻译失败"
                );
                return BatchOutcome::failure(
                    record,
                    locale,
                    PairState::TranslationFailed,
                    format!("翻译失败: {}", error),
                );
            }
        }
    } else {
        record.fields.clone()
    };

    match writer.write(record, &locale.id, &translated).await {
        Ok(receipt) => BatchOutcome::success(record, locale, receipt.warnings()),
        Err(error) => {
            tracing::warn!(
                item = %record.identifier,
                locale = %locale.name,
                %error,
                "write-call: 写回失败"
            );
            BatchOutcome::failure(
                record,
                locale,
                PairState::WriteFailed,
                format!("写回失败: {}", error),
            )
        }
    }
}
