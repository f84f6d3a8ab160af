//! 翻译网关
//!
//! 封装对聊天补全服务的调用：构造带规则的提示、提交序列化的字段
//! 映射、解析并校验模型的结构化回复。回复必须与请求字段集合同构，
//! 不同构的回复作为错误拒绝，绝不把损坏的数据放行到写回环节。
//!
//! 当配置了第二份凭证时，一个指定的方言语言会被路由到另一家
//! OpenAI兼容的上游，契约与主网关完全一致。

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{json, Value};

use crate::error::{SyncError, SyncResult};
use crate::network::client::extract_error_message;
use crate::translation::prompt;
use crate::translation::rules::RuleSet;

/// 主翻译服务端点
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
/// 方言路由使用的备选端点
pub const DIALECT_ENDPOINT: &str = "https://api.deepseek.com/v1/chat/completions";
/// 默认模型
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
/// 默认采样温度
pub const DEFAULT_TEMPERATURE: f32 = 0.3;

/// 翻译请求，按语言新建，构造后不再变更
#[derive(Debug, Clone)]
pub struct TranslationRequest {
    pub fields: BTreeMap<String, String>,
    pub target_locale_tag: String,
    pub glossary_terms: Vec<String>,
}

impl TranslationRequest {
    pub fn new(
        fields: BTreeMap<String, String>,
        target_locale_tag: &str,
        glossary_terms: Vec<String>,
    ) -> Self {
        Self {
            fields,
            target_locale_tag: target_locale_tag.to_string(),
            glossary_terms,
        }
    }
}

/// 翻译接口
///
/// `preflight` 在任何网络调用前校验凭证，缺失凭证让整批快速失败。
#[async_trait]
pub trait Translator: Send + Sync {
    fn preflight(&self) -> SyncResult<()> {
        Ok(())
    }

    async fn translate(&self, request: &TranslationRequest)
        -> SyncResult<BTreeMap<String, String>>;
}

/// 方言路由配置
#[derive(Debug, Clone)]
pub struct DialectRoute {
    /// 命中该语言标签时改走备选上游
    pub tag: String,
    pub endpoint: String,
    pub model: String,
    pub api_key: String,
}

/// 翻译服务配置
#[derive(Debug, Clone)]
pub struct TranslatorConfig {
    pub endpoint: String,
    pub model: String,
    pub api_key: String,
    pub temperature: f32,
    pub timeout: Duration,
    pub dialect: Option<DialectRoute>,
}

impl TranslatorConfig {
    pub fn new(api_key: &str) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: api_key.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            timeout: Duration::from_secs(60),
            dialect: None,
        }
    }
}

/// 聊天补全翻译网关
#[derive(Debug, Clone)]
pub struct ChatGateway {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
    temperature: f32,
    rules: Arc<RuleSet>,
}

impl ChatGateway {
    pub fn new(
        endpoint: &str,
        model: &str,
        api_key: &str,
        temperature: f32,
        timeout: Duration,
        rules: Arc<RuleSet>,
    ) -> SyncResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SyncError::Internal(format!("构建HTTP客户端失败: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
            temperature,
            rules,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Translator for ChatGateway {
    fn preflight(&self) -> SyncResult<()> {
        if self.api_key.trim().is_empty() {
            return Err(SyncError::Credential("缺少翻译服务API密钥".to_string()));
        }
        Ok(())
    }

    async fn translate(
        &self,
        request: &TranslationRequest,
    ) -> SyncResult<BTreeMap<String, String>> {
        self.preflight()?;
        if request.fields.is_empty() {
            return Err(SyncError::Validation("没有可翻译内容".to_string()));
        }
        if request.target_locale_tag.trim().is_empty() {
            return Err(SyncError::Validation("未指定目标语言".to_string()));
        }

        let system = prompt::system_message(
            &request.target_locale_tag,
            &request.glossary_terms,
            &self.rules,
        );
        let user = prompt::user_message(&request.fields);
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user }
            ],
            "temperature": self.temperature
        });

        let started = Instant::now();
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(SyncError::from)?;

        let status = response.status();
        // 先读文本，JSON解析失败时不丢失错误消息
        let text = response.text().await.map_err(SyncError::from)?;
        tracing::debug!(
            tag = %request.target_locale_tag,
            fields = request.fields.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "translate-call: 上游响应 {}",
            status
        );

        if !status.is_success() {
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    SyncError::Credential("翻译服务API密钥无效".to_string())
                }
                StatusCode::TOO_MANY_REQUESTS => SyncError::RateLimited,
                _ => SyncError::Transport(extract_error_message(status, &text)),
            });
        }

        let value: Value = serde_json::from_str(&text)?;
        let content = value
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(Value::as_str)
            .ok_or_else(|| {
                SyncError::Parse("上游回复缺少 choices[0].message.content".to_string())
            })?;

        validate_reply(&request.fields, content)
    }
}

/// 校验模型回复与请求字段集合同构
///
/// 围栏包裹的回复先解包；回复必须是字符串值的JSON对象，且键集合
/// 与请求完全一致，缺键、多键都按校验错误处理。
pub fn validate_reply(
    request_fields: &BTreeMap<String, String>,
    reply: &str,
) -> SyncResult<BTreeMap<String, String>> {
    let stripped = strip_code_fence(reply);
    let value: Value = serde_json::from_str(stripped)
        .map_err(|e| SyncError::Parse(format!("上游回复不是合法JSON: {}", e)))?;

    let object = value
        .as_object()
        .ok_or_else(|| SyncError::Validation("上游回复不是JSON对象".to_string()))?;

    let mut translated = BTreeMap::new();
    for (key, raw) in object {
        let text = raw.as_str().ok_or_else(|| {
            SyncError::Validation(format!("字段 \"{}\" 的译文不是字符串", key))
        })?;
        translated.insert(key.clone(), text.to_string());
    }

    let expected: BTreeSet<&String> = request_fields.keys().collect();
    let actual: BTreeSet<&String> = translated.keys().collect();

    let missing: Vec<&str> = expected.difference(&actual).map(|k| k.as_str()).collect();
    let extra: Vec<&str> = actual.difference(&expected).map(|k| k.as_str()).collect();
    if !missing.is_empty() || !extra.is_empty() {
        return Err(SyncError::Validation(format!(
            "回复字段集合与请求不一致（缺失: [{}]，多余: [{}]）",
            missing.join(", "),
            extra.join(", ")
        )));
    }

    Ok(translated)
}

/// 去掉Markdown代码围栏
pub fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // 围栏行可能带语言标注（```json）
    let rest = match rest.find('\n') {
        Some(index) => &rest[index + 1..],
        None => rest,
    };
    let rest = rest.trim_end();
    rest.strip_suffix("```").map(str::trim).unwrap_or(rest)
}

/// 按语言标签路由的翻译器
///
/// 主网关处理全部语言；配置了方言路由且凭证可用时，命中的标签
/// 改走备选上游。纯策略替换，契约不变。
pub struct RoutedTranslator {
    primary: ChatGateway,
    dialect: Option<(String, ChatGateway)>,
}

impl RoutedTranslator {
    pub fn new(primary: ChatGateway, dialect: Option<(String, ChatGateway)>) -> Self {
        Self { primary, dialect }
    }

    /// 从配置构建：方言路由只在第二份凭证存在时生效
    pub fn from_config(config: &TranslatorConfig, rules: RuleSet) -> SyncResult<Self> {
        let rules = Arc::new(rules);
        let primary = ChatGateway::new(
            &config.endpoint,
            &config.model,
            &config.api_key,
            config.temperature,
            config.timeout,
            Arc::clone(&rules),
        )?;

        let dialect = match &config.dialect {
            Some(route) if !route.api_key.trim().is_empty() => Some((
                route.tag.clone(),
                ChatGateway::new(
                    &route.endpoint,
                    &route.model,
                    &route.api_key,
                    config.temperature,
                    config.timeout,
                    rules,
                )?,
            )),
            _ => None,
        };

        Ok(Self { primary, dialect })
    }

    /// 选择承接该语言的网关
    pub fn gateway_for(&self, tag: &str) -> &ChatGateway {
        match &self.dialect {
            Some((dialect_tag, gateway)) if dialect_tag.eq_ignore_ascii_case(tag) => gateway,
            _ => &self.primary,
        }
    }
}

#[async_trait]
impl Translator for RoutedTranslator {
    fn preflight(&self) -> SyncResult<()> {
        self.primary.preflight()?;
        if let Some((_, gateway)) = &self.dialect {
            gateway.preflight()?;
        }
        Ok(())
    }

    async fn translate(
        &self,
        request: &TranslationRequest,
    ) -> SyncResult<BTreeMap<String, String>> {
        self.gateway_for(&request.target_locale_tag)
            .translate(request)
            .await
    }
}
