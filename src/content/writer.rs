//! 内容写回
//!
//! 把译文按内容类型重组成更新端点要求的负载形状并执行写回。
//! 平台的DOM更新端点可能在200响应里夹带逐节点错误清单，
//! 这类部分失败作为警告附在成功结果上，不允许被静默吞掉。

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::content::normalizer::{RecordKind, TranslatableRecord};
use crate::error::{SyncError, SyncResult};
use crate::network::client::ApiClient;

/// 写回成功后响应体里夹带的单节点错误
#[derive(Debug, Clone)]
pub struct NodeWriteError {
    pub node_id: String,
    pub error: String,
}

/// 写回回执
///
/// `node_errors` 非空表示整体成功但部分子节点失败。
#[derive(Debug, Clone, Default)]
pub struct WriteReceipt {
    pub node_errors: Vec<NodeWriteError>,
}

impl WriteReceipt {
    pub fn clean() -> Self {
        Self::default()
    }

    pub fn is_clean(&self) -> bool {
        self.node_errors.is_empty()
    }

    /// 回执转为人类可读的警告行
    pub fn warnings(&self) -> Vec<String> {
        self.node_errors
            .iter()
            .map(|e| format!("节点 {} 写回失败: {}", e.node_id, e.error))
            .collect()
    }
}

/// 内容写回接口，按 (记录, 语言) 调用一次
#[async_trait]
pub trait ContentWriter: Send + Sync {
    async fn write(
        &self,
        record: &TranslatableRecord,
        locale_id: &str,
        fields: &BTreeMap<String, String>,
    ) -> SyncResult<WriteReceipt>;
}

/// 写回的父资源
#[derive(Debug, Clone)]
pub enum WriteTarget {
    /// 页面DOM：POST pages/{page_id}/dom?localeId=
    PageDom { page_id: String },
    /// 组件DOM：POST sites/{site_id}/components/{component_id}/dom?localeId=
    ComponentDom {
        site_id: String,
        component_id: String,
    },
    /// 组件属性：POST sites/{site_id}/components/{component_id}/properties?localeId=
    ComponentProperties {
        site_id: String,
        component_id: String,
    },
    /// CMS条目：PATCH collections/{collection_id}/items/{item_id}
    Collection { collection_id: String },
}

/// 平台更新端点的写回实现
#[derive(Debug, Clone)]
pub struct PlatformWriter {
    client: ApiClient,
    target: WriteTarget,
}

impl PlatformWriter {
    pub fn new(client: ApiClient, target: WriteTarget) -> Self {
        Self { client, target }
    }
}

#[async_trait]
impl ContentWriter for PlatformWriter {
    async fn write(
        &self,
        record: &TranslatableRecord,
        locale_id: &str,
        fields: &BTreeMap<String, String>,
    ) -> SyncResult<WriteReceipt> {
        let response = match (&self.target, record.kind) {
            (
                WriteTarget::PageDom { page_id },
                RecordKind::TextNode | RecordKind::PropertyOverrides,
            ) => {
                let mut url = self.client.endpoint(&["pages", page_id.as_str(), "dom"])?;
                url.query_pairs_mut().append_pair("localeId", locale_id);
                self.client.post_json(url, &dom_payload(record, fields)?).await?
            }
            (
                WriteTarget::ComponentDom {
                    site_id,
                    component_id,
                },
                RecordKind::TextNode | RecordKind::PropertyOverrides,
            ) => {
                let mut url = self.client.endpoint(&[
                    "sites",
                    site_id.as_str(),
                    "components",
                    component_id.as_str(),
                    "dom",
                ])?;
                url.query_pairs_mut().append_pair("localeId", locale_id);
                self.client.post_json(url, &dom_payload(record, fields)?).await?
            }
            (
                WriteTarget::ComponentProperties {
                    site_id,
                    component_id,
                },
                RecordKind::ComponentProperties,
            ) => {
                let mut url = self.client.endpoint(&[
                    "sites",
                    site_id.as_str(),
                    "components",
                    component_id.as_str(),
                    "properties",
                ])?;
                url.query_pairs_mut().append_pair("localeId", locale_id);
                self.client
                    .post_json(url, &properties_payload(fields))
                    .await?
            }
            (WriteTarget::Collection { collection_id }, RecordKind::CollectionEntry) => {
                let url = self.client.endpoint(&[
                    "collections",
                    collection_id.as_str(),
                    "items",
                    record.id.as_str(),
                ])?;
                self.client
                    .patch_json(url, &field_data_payload(record, fields, locale_id))
                    .await?
            }
            (target, kind) => {
                return Err(SyncError::Internal(format!(
                    "记录形态 {:?} 与写回目标 {:?} 不匹配",
                    kind, target
                )));
            }
        };

        let receipt = receipt_from_response(&response);
        if !receipt.is_clean() {
            tracing::warn!(
                item = %record.identifier,
                locale_id,
                errors = receipt.node_errors.len(),
                "write-call: 响应夹带部分节点错误"
            );
        }
        Ok(receipt)
    }
}

/// DOM更新负载
///
/// 文本型节点直接携带 text，覆盖型节点按propertyId展开。
pub fn dom_payload(
    record: &TranslatableRecord,
    fields: &BTreeMap<String, String>,
) -> SyncResult<Value> {
    let node = match record.kind {
        RecordKind::TextNode => {
            let text = fields.get("text").ok_or_else(|| {
                SyncError::Internal("文本型节点缺少 text 字段".to_string())
            })?;
            json!({ "nodeId": record.id, "text": text })
        }
        RecordKind::PropertyOverrides => {
            let overrides: Vec<Value> = fields
                .iter()
                .map(|(property_id, text)| json!({ "propertyId": property_id, "text": text }))
                .collect();
            json!({ "nodeId": record.id, "propertyOverrides": overrides })
        }
        other => {
            return Err(SyncError::Internal(format!(
                "记录形态 {:?} 不适用DOM负载",
                other
            )));
        }
    };

    Ok(json!({ "nodes": [node] }))
}

/// 组件属性更新负载
pub fn properties_payload(fields: &BTreeMap<String, String>) -> Value {
    let properties: Vec<Value> = fields
        .iter()
        .map(|(property_id, text)| json!({ "propertyId": property_id, "text": text }))
        .collect();
    json!({ "properties": properties })
}

/// CMS条目更新负载：译文与保留字段合并回 fieldData
pub fn field_data_payload(
    record: &TranslatableRecord,
    fields: &BTreeMap<String, String>,
    locale_id: &str,
) -> Value {
    let mut field_data = serde_json::Map::new();
    for (key, value) in &record.preserved {
        field_data.insert(key.clone(), value.clone());
    }
    for (key, text) in fields {
        field_data.insert(key.clone(), Value::String(text.clone()));
    }

    json!({
        "isArchived": false,
        "isDraft": false,
        "fieldData": Value::Object(field_data),
        "cmsLocaleId": locale_id
    })
}

/// 从成功响应里提取夹带的逐节点错误清单
pub fn receipt_from_response(response: &Value) -> WriteReceipt {
    let node_errors = response
        .get("errors")
        .and_then(Value::as_array)
        .map(|errors| {
            errors
                .iter()
                .map(|e| NodeWriteError {
                    node_id: e
                        .get("nodeId")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string(),
                    error: e
                        .get("error")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string(),
                })
                .collect()
        })
        .unwrap_or_default();

    WriteReceipt { node_errors }
}
