//! 内容平台HTTP会话
//!
//! 所有平台调用走同一个带Bearer认证和超时的客户端。
//! 列举类端点在这里给出类型化封装，DOM/条目抓取通过 `paging::fetch_all`
//! 穷举分页。

use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::content::node::{CollectionItem, ComponentProperty, PageNode};
use crate::core::LocaleTarget;
use crate::error::{SyncError, SyncResult};
use crate::network::paging::{fetch_all, CollectionPage, FetchOutcome, Pagination};

/// 平台API的默认基础地址
pub const DEFAULT_API_BASE: &str = "https://api.webflow.com/v2";

/// DOM端点要求的版本头
const ACCEPT_VERSION: &str = "1.0.0";

/// 页面摘要
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSummary {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub slug: String,
}

/// 集合摘要
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSummary {
    pub id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub slug: String,
}

/// 组件摘要
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentSummary {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// 语言标识命名空间：页面写回用站点locale id，CMS条目写回用cmsLocaleId
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocaleNamespace {
    Site,
    Cms,
}

/// 带认证的平台API客户端
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base: Url,
    page_size: usize,
}

impl ApiClient {
    /// 构建客户端，Bearer令牌进默认请求头
    pub fn new(base_url: &str, token: &str, timeout: Duration, page_size: usize) -> SyncResult<Self> {
        if token.trim().is_empty() {
            return Err(SyncError::Credential(
                "缺少内容平台API令牌（需要pages:read权限）".to_string(),
            ));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let auth = format!("Bearer {}", token.trim());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth)
                .map_err(|_| SyncError::Credential("API令牌含有非法字符".to_string()))?,
        );

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| SyncError::Internal(format!("构建HTTP客户端失败: {}", e)))?;

        Ok(Self {
            client,
            base: Url::parse(base_url)?,
            page_size,
        })
    }

    /// 拼接API端点路径
    pub fn endpoint(&self, segments: &[&str]) -> SyncResult<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| SyncError::Config("API基础地址无效".to_string()))?
            .extend(segments);
        Ok(url)
    }

    /// 校验令牌有效性（最便宜的请求：列举站点）
    pub async fn validate_token(&self) -> SyncResult<()> {
        let url = self.endpoint(&["sites"])?;
        self.get_json(url).await.map(|_| ())
    }

    /// 站点语言目标（页面写回使用的命名空间）
    pub async fn site_locales(&self, site_id: &str) -> SyncResult<Vec<LocaleTarget>> {
        self.locales(site_id, LocaleNamespace::Site).await
    }

    /// CMS语言目标（条目写回使用的命名空间，仅含启用的次级语言）
    pub async fn cms_locales(&self, site_id: &str) -> SyncResult<Vec<LocaleTarget>> {
        self.locales(site_id, LocaleNamespace::Cms).await
    }

    async fn locales(&self, site_id: &str, namespace: LocaleNamespace) -> SyncResult<Vec<LocaleTarget>> {
        let url = self.endpoint(&["sites", site_id])?;
        let site = self.get_json(url).await?;
        Ok(parse_site_locales(&site, namespace))
    }

    /// 站点页面列表
    pub async fn pages(&self, site_id: &str) -> SyncResult<Vec<PageSummary>> {
        let url = self.endpoint(&["sites", site_id, "pages"])?;
        let value = self.get_json(url).await?;
        typed_list(&value, "pages")
    }

    /// 站点集合列表
    pub async fn collections(&self, site_id: &str) -> SyncResult<Vec<CollectionSummary>> {
        let url = self.endpoint(&["sites", site_id, "collections"])?;
        let value = self.get_json(url).await?;
        typed_list(&value, "collections")
    }

    /// 站点组件列表（分页端点）
    pub async fn components(&self, site_id: &str) -> SyncResult<FetchOutcome<ComponentSummary>> {
        let base = self.endpoint(&["sites", site_id, "components"])?;
        fetch_all(self.page_size, |offset, limit| {
            self.fetch_page(base.clone(), "components", offset, limit, false)
        })
        .await
    }

    /// 页面DOM节点（分页端点）
    pub async fn page_nodes(&self, page_id: &str) -> SyncResult<FetchOutcome<PageNode>> {
        let base = self.endpoint(&["pages", page_id, "dom"])?;
        fetch_all(self.page_size, |offset, limit| {
            self.fetch_page(base.clone(), "nodes", offset, limit, true)
        })
        .await
    }

    /// 组件DOM节点（分页端点）
    pub async fn component_nodes(
        &self,
        site_id: &str,
        component_id: &str,
    ) -> SyncResult<FetchOutcome<PageNode>> {
        let base = self.endpoint(&["sites", site_id, "components", component_id, "dom"])?;
        fetch_all(self.page_size, |offset, limit| {
            self.fetch_page(base.clone(), "nodes", offset, limit, true)
        })
        .await
    }

    /// 组件属性（分页端点）
    pub async fn component_properties(
        &self,
        site_id: &str,
        component_id: &str,
    ) -> SyncResult<FetchOutcome<ComponentProperty>> {
        let base = self.endpoint(&["sites", site_id, "components", component_id, "properties"])?;
        fetch_all(self.page_size, |offset, limit| {
            self.fetch_page(base.clone(), "properties", offset, limit, false)
        })
        .await
    }

    /// CMS集合条目（分页端点）
    pub async fn collection_items(
        &self,
        collection_id: &str,
    ) -> SyncResult<FetchOutcome<CollectionItem>> {
        let base = self.endpoint(&["collections", collection_id, "items"])?;
        fetch_all(self.page_size, |offset, limit| {
            self.fetch_page(base.clone(), "items", offset, limit, false)
        })
        .await
    }

    async fn fetch_page<T: DeserializeOwned>(
        &self,
        base: Url,
        items_key: &str,
        offset: usize,
        limit: usize,
        versioned: bool,
    ) -> SyncResult<CollectionPage<T>> {
        let mut url = base;
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string())
            .append_pair("offset", &offset.to_string());

        let started = Instant::now();
        let mut request = self.client.get(url.clone());
        if versioned {
            request = request.header("accept-version", ACCEPT_VERSION);
        }
        let response = request.send().await.map_err(SyncError::from)?;
        let value = self.into_json(response).await?;
        tracing::debug!(
            url = %url,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "fetch-page: 请求完成"
        );

        let items: Vec<T> = match value.get(items_key) {
            Some(raw) => serde_json::from_value(raw.clone())?,
            None => Vec::new(),
        };
        // 个别端点不带分页元信息时按单页处理
        let pagination = match value.get("pagination") {
            Some(raw) => serde_json::from_value(raw.clone())?,
            None => Pagination {
                total: items.len(),
                offset,
                limit,
            },
        };

        Ok(CollectionPage { items, pagination })
    }

    /// GET请求并解析JSON
    pub async fn get_json(&self, url: Url) -> SyncResult<Value> {
        let response = self.client.get(url).send().await.map_err(SyncError::from)?;
        self.into_json(response).await
    }

    /// POST JSON请求（写回端点）
    pub async fn post_json(&self, url: Url, body: &Value) -> SyncResult<Value> {
        let started = Instant::now();
        let response = self
            .client
            .post(url.clone())
            .json(body)
            .send()
            .await
            .map_err(SyncError::from)?;
        let value = self.into_json(response).await?;
        tracing::debug!(
            url = %url,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "write-call: POST完成"
        );
        Ok(value)
    }

    /// PATCH JSON请求（CMS条目更新）
    pub async fn patch_json(&self, url: Url, body: &Value) -> SyncResult<Value> {
        let started = Instant::now();
        let response = self
            .client
            .patch(url.clone())
            .json(body)
            .send()
            .await
            .map_err(SyncError::from)?;
        let value = self.into_json(response).await?;
        tracing::debug!(
            url = %url,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "write-call: PATCH完成"
        );
        Ok(value)
    }

    async fn into_json(&self, response: reqwest::Response) -> SyncResult<Value> {
        let status = response.status();
        // 先读文本，HTTP错误时不丢失服务端的错误消息
        let text = response.text().await.map_err(SyncError::from)?;

        if !status.is_success() {
            return Err(map_status(status, &text));
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }
}

fn typed_list<T: DeserializeOwned>(value: &Value, key: &str) -> SyncResult<Vec<T>> {
    match value.get(key) {
        Some(raw) => Ok(serde_json::from_value(raw.clone())?),
        None => Ok(Vec::new()),
    }
}

/// 从站点负载里解析语言目标
///
/// 站点命名空间取 `id`，CMS命名空间取 `cmsLocaleId` 且只保留启用的
/// 次级语言。主语言永远标记为默认，不作为翻译目标。
pub fn parse_site_locales(site: &Value, namespace: LocaleNamespace) -> Vec<LocaleTarget> {
    let mut targets = Vec::new();
    let locales = site.get("locales");

    let id_key = match namespace {
        LocaleNamespace::Site => "id",
        LocaleNamespace::Cms => "cmsLocaleId",
    };

    let mut push = |raw: &Value, is_default: bool| {
        let id = raw.get(id_key).and_then(Value::as_str).unwrap_or_default();
        if id.is_empty() {
            return;
        }
        targets.push(LocaleTarget {
            id: id.to_string(),
            tag: raw
                .get("tag")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            name: raw
                .get("displayName")
                .and_then(Value::as_str)
                .unwrap_or("Unnamed")
                .to_string(),
            is_default,
        });
    };

    if let Some(primary) = locales.and_then(|l| l.get("primary")) {
        if primary.is_object() {
            push(primary, true);
        }
    }

    if let Some(secondary) = locales
        .and_then(|l| l.get("secondary"))
        .and_then(Value::as_array)
    {
        for raw in secondary {
            if namespace == LocaleNamespace::Cms {
                let enabled = raw.get("enabled").and_then(Value::as_bool).unwrap_or(false);
                if !enabled {
                    continue;
                }
            }
            push(raw, false);
        }
    }

    targets
}

fn map_status(status: StatusCode, body: &str) -> SyncError {
    match status {
        StatusCode::UNAUTHORIZED => SyncError::Credential(
            "API令牌无效，请确认令牌具有所需权限（pages:read）".to_string(),
        ),
        StatusCode::FORBIDDEN => SyncError::Credential(
            "API令牌权限不足，请确认已授予 pages:read 作用域".to_string(),
        ),
        StatusCode::TOO_MANY_REQUESTS => SyncError::RateLimited,
        StatusCode::REQUEST_TIMEOUT => SyncError::Timeout(extract_error_message(status, body)),
        _ => SyncError::Transport(extract_error_message(status, body)),
    }
}

/// 从错误响应体里提取可读消息
///
/// 常见形态：`{ "error": { "message": "..." } }` 或 `{ "message": "..." }`，
/// 否则退回截断后的原始响应体。
pub fn extract_error_message(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        if let Some(msg) = value
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(Value::as_str)
        {
            return format!("HTTP {}: {}", status.as_u16(), msg);
        }
        if let Some(msg) = value.get("message").and_then(Value::as_str) {
            return format!("HTTP {}: {}", status.as_u16(), msg);
        }
    }

    let trimmed = body.trim();
    let snippet: String = trimmed.chars().take(400).collect();
    if snippet.len() < trimmed.len() {
        format!("HTTP {}: {}...", status.as_u16(), snippet)
    } else {
        format!("HTTP {}: {}", status.as_u16(), snippet)
    }
}
