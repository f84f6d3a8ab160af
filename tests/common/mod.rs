//! 集成测试公共设施
//!
//! 桩翻译器/桩写回器与测试数据构造

use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;

use sitelingo::content::normalizer::{RecordKind, TranslatableRecord};
use sitelingo::content::writer::{ContentWriter, WriteReceipt};
use sitelingo::content::writer::receipt_from_response;
use sitelingo::core::LocaleTarget;
use sitelingo::error::{SyncError, SyncResult};
use sitelingo::translation::gateway::{TranslationRequest, Translator};

/// 桩翻译器：按 `[tag] 原文` 的格式回显译文
///
/// 命中 `fail_tags` 的语言返回传输错误，用于注入失败。
pub struct StubTranslator {
    pub fail_tags: HashSet<String>,
    pub missing_credential: bool,
    /// 固定回复，键为语言标签；缺省走回显
    pub canned: BTreeMap<String, BTreeMap<String, String>>,
}

impl Default for StubTranslator {
    fn default() -> Self {
        Self {
            fail_tags: HashSet::new(),
            missing_credential: false,
            canned: BTreeMap::new(),
        }
    }
}

impl StubTranslator {
    pub fn failing_on(tags: &[&str]) -> Self {
        Self {
            fail_tags: tags.iter().map(|t| t.to_string()).collect(),
            ..Self::default()
        }
    }
}

#[async_trait]
impl Translator for StubTranslator {
    fn preflight(&self) -> SyncResult<()> {
        if self.missing_credential {
            return Err(SyncError::Credential("缺少翻译服务API密钥".to_string()));
        }
        Ok(())
    }

    async fn translate(
        &self,
        request: &TranslationRequest,
    ) -> SyncResult<BTreeMap<String, String>> {
        if self.fail_tags.contains(&request.target_locale_tag) {
            return Err(SyncError::Transport("stub: connection reset".to_string()));
        }
        if let Some(reply) = self.canned.get(&request.target_locale_tag) {
            return Ok(reply.clone());
        }
        Ok(request
            .fields
            .iter()
            .map(|(key, value)| {
                (
                    key.clone(),
                    format!("[{}] {}", request.target_locale_tag, value),
                )
            })
            .collect())
    }
}

/// 记录一次写回调用
#[derive(Debug, Clone)]
pub struct RecordedWrite {
    pub item_id: String,
    pub locale_id: String,
    pub fields: BTreeMap<String, String>,
}

/// 桩写回器：记录全部调用，可按locale注入失败或部分节点错误
pub struct StubWriter {
    pub fail_locales: HashSet<String>,
    pub warn_locales: HashSet<String>,
    pub writes: Mutex<Vec<RecordedWrite>>,
}

impl Default for StubWriter {
    fn default() -> Self {
        Self {
            fail_locales: HashSet::new(),
            warn_locales: HashSet::new(),
            writes: Mutex::new(Vec::new()),
        }
    }
}

impl StubWriter {
    pub fn recorded(&self) -> Vec<RecordedWrite> {
        self.writes.lock().expect("writes mutex poisoned").clone()
    }
}

#[async_trait]
impl ContentWriter for StubWriter {
    async fn write(
        &self,
        record: &TranslatableRecord,
        locale_id: &str,
        fields: &BTreeMap<String, String>,
    ) -> SyncResult<WriteReceipt> {
        if self.fail_locales.contains(locale_id) {
            return Err(SyncError::Transport("stub: HTTP 502".to_string()));
        }

        self.writes
            .lock()
            .expect("writes mutex poisoned")
            .push(RecordedWrite {
                item_id: record.id.clone(),
                locale_id: locale_id.to_string(),
                fields: fields.clone(),
            });

        if self.warn_locales.contains(locale_id) {
            // 平台的200响应可以夹带逐节点错误
            let response = json!({ "errors": [{ "nodeId": "n1", "error": "bad format" }] });
            return Ok(receipt_from_response(&response));
        }
        Ok(WriteReceipt::clean())
    }
}

/// 构造一条CMS记录
pub fn cms_record(id: &str, name: &str) -> TranslatableRecord {
    TranslatableRecord {
        id: id.to_string(),
        identifier: name.to_string(),
        kind: RecordKind::CollectionEntry,
        fields: BTreeMap::from([("name".to_string(), name.to_string())]),
        preserved: BTreeMap::from([("slug".to_string(), json!(id))]),
    }
}

/// 构造一条没有可翻译文本的记录
pub fn preserved_only_record(id: &str) -> TranslatableRecord {
    TranslatableRecord {
        id: id.to_string(),
        identifier: id.to_string(),
        kind: RecordKind::CollectionEntry,
        fields: BTreeMap::new(),
        preserved: BTreeMap::from([("type".to_string(), json!("forex"))]),
    }
}

/// 默认语言 + 三个次级语言
pub fn locales() -> Vec<LocaleTarget> {
    vec![
        LocaleTarget::new("loc-en", "en", "English", true),
        LocaleTarget::new("loc-es", "es", "Spanish", false),
        LocaleTarget::new("loc-fr", "fr", "French", false),
        LocaleTarget::new("loc-ar", "ar", "Arabic", false),
    ]
}
