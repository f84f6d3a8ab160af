//! 原始内容条目
//!
//! 平台返回的三种内容形态各自携带文本的方式不同：页面DOM节点是
//! 文本型（单一隐式字段）或覆盖型（按propertyId的多个子字段），
//! 组件属性用富文本/纯文本信封，CMS条目是扁平的fieldData映射。
//! 统一通过 `HasTranslatableFields` 归一到同一种记录形态。

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::content::normalizer::{RecordKind, TranslatableRecord};
use crate::content::schema::FieldSchema;

/// 富文本/纯文本信封
///
/// 富文本取 `html`，纯文本取 `text`；信封存在但内层缺失时按空串处理。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TextEnvelope {
    #[serde(default)]
    pub html: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

impl TextEnvelope {
    pub fn rich(&self) -> String {
        self.html.clone().unwrap_or_default()
    }

    pub fn plain(&self) -> String {
        self.text.clone().unwrap_or_default()
    }
}

/// 组件实例上的属性覆盖
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyOverride {
    pub property_id: String,
    #[serde(default)]
    pub text: Option<TextEnvelope>,
}

/// 页面/组件DOM节点
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageNode {
    pub id: String,
    #[serde(default, rename = "type")]
    pub node_type: Option<String>,
    #[serde(default)]
    pub text: Option<TextEnvelope>,
    #[serde(default)]
    pub property_overrides: Vec<PropertyOverride>,
}

/// 组件属性
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentProperty {
    pub property_id: String,
    #[serde(default, rename = "type")]
    pub property_type: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub text: Option<TextEnvelope>,
}

impl ComponentProperty {
    /// 按属性类型取文本：纯文本取 text，富文本取 html
    pub fn content(&self) -> Option<String> {
        let envelope = self.text.as_ref()?;
        match self.property_type.as_deref() {
            Some("Plain Text") => Some(envelope.plain()),
            Some("Rich Text") => Some(envelope.rich()),
            _ => None,
        }
    }
}

/// CMS集合条目
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionItem {
    pub id: String,
    #[serde(default)]
    pub field_data: BTreeMap<String, Value>,
}

/// 可翻译能力接口
///
/// 不同内容形态各自决定如何在给定字段模式下产出统一记录；
/// 产出 `None` 表示该条目没有可同步内容，归一化时直接跳过。
pub trait HasTranslatableFields {
    fn to_record(&self, schema: &FieldSchema) -> Option<TranslatableRecord>;
}

impl HasTranslatableFields for PageNode {
    fn to_record(&self, _schema: &FieldSchema) -> Option<TranslatableRecord> {
        // 文本型节点：单一隐式字段
        if self.node_type.as_deref() == Some("text") {
            let envelope = self.text.as_ref()?;
            let html = envelope.rich();
            if html.is_empty() {
                return None;
            }
            let mut fields = BTreeMap::new();
            fields.insert("text".to_string(), html);
            return Some(TranslatableRecord {
                id: self.id.clone(),
                identifier: self.id.clone(),
                kind: RecordKind::TextNode,
                fields,
                preserved: BTreeMap::new(),
            });
        }

        // 覆盖型节点：按propertyId的命名子字段
        if self.property_overrides.is_empty() {
            return None;
        }
        let mut fields = BTreeMap::new();
        for over in &self.property_overrides {
            if let Some(envelope) = &over.text {
                fields.insert(over.property_id.clone(), envelope.plain());
            }
        }
        if fields.is_empty() {
            return None;
        }
        Some(TranslatableRecord {
            id: self.id.clone(),
            identifier: self.id.clone(),
            kind: RecordKind::PropertyOverrides,
            fields,
            preserved: BTreeMap::new(),
        })
    }
}

impl HasTranslatableFields for CollectionItem {
    fn to_record(&self, schema: &FieldSchema) -> Option<TranslatableRecord> {
        let identifier = self
            .field_data
            .get(&schema.identifier_field)
            .and_then(Value::as_str)
            .unwrap_or("Unnamed")
            .to_string();

        let mut fields = BTreeMap::new();
        let mut preserved = BTreeMap::new();

        // 只拷贝条目上实际存在的字段，缺失的字段不补默认值
        for key in &schema.translate {
            if let Some(value) = self.field_data.get(key) {
                if let Some(text) = value.as_str() {
                    fields.insert(key.clone(), text.to_string());
                } else {
                    // 非字符串的可翻译字段原样保留，避免破坏结构
                    preserved.insert(key.clone(), value.clone());
                }
            }
        }
        for key in &schema.preserve {
            if let Some(value) = self.field_data.get(key) {
                preserved.insert(key.clone(), value.clone());
            }
        }

        // 仅保留字段的条目也照常产出，让不需要翻译的内容流过管道
        Some(TranslatableRecord {
            id: self.id.clone(),
            identifier,
            kind: RecordKind::CollectionEntry,
            fields,
            preserved,
        })
    }
}

/// 把一个组件的全部文本属性归一为一条记录
///
/// 组件属性端点按属性分页返回，但翻译和写回都以组件为单位。
pub fn component_record(
    component_id: &str,
    properties: &[ComponentProperty],
) -> Option<TranslatableRecord> {
    let mut fields = BTreeMap::new();
    for prop in properties {
        if let Some(text) = prop.content() {
            if !text.is_empty() {
                fields.insert(prop.property_id.clone(), text);
            }
        }
    }
    if fields.is_empty() {
        return None;
    }
    Some(TranslatableRecord {
        id: component_id.to_string(),
        identifier: component_id.to_string(),
        kind: RecordKind::ComponentProperties,
        fields,
        preserved: BTreeMap::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn page_node_deserializes_from_platform_shape() {
        let node: PageNode = serde_json::from_value(json!({
            "id": "n1",
            "type": "text",
            "text": { "html": "<p>Hello</p>", "text": "Hello" }
        }))
        .unwrap();
        assert_eq!(node.node_type.as_deref(), Some("text"));
        assert_eq!(node.text.unwrap().rich(), "<p>Hello</p>");
    }

    #[test]
    fn override_node_collects_property_fields() {
        let node: PageNode = serde_json::from_value(json!({
            "id": "n2",
            "type": "component-instance",
            "propertyOverrides": [
                { "propertyId": "p1", "text": { "text": "Start trading" } },
                { "propertyId": "p2", "text": { "text": "Learn more" } }
            ]
        }))
        .unwrap();

        let record = node.to_record(&FieldSchema::dom()).unwrap();
        assert_eq!(record.kind, RecordKind::PropertyOverrides);
        assert_eq!(record.fields.len(), 2);
        assert_eq!(record.fields["p1"], "Start trading");
    }

    #[test]
    fn empty_text_node_is_skipped() {
        let node: PageNode = serde_json::from_value(json!({
            "id": "n3",
            "type": "text",
            "text": { "html": "" }
        }))
        .unwrap();
        assert!(node.to_record(&FieldSchema::dom()).is_none());
    }

    #[test]
    fn component_property_respects_type_envelope() {
        let plain: ComponentProperty = serde_json::from_value(json!({
            "propertyId": "p1",
            "type": "Plain Text",
            "label": "Heading",
            "text": { "text": "Trade smarter" }
        }))
        .unwrap();
        assert_eq!(plain.content().unwrap(), "Trade smarter");

        let rich: ComponentProperty = serde_json::from_value(json!({
            "propertyId": "p2",
            "type": "Rich Text",
            "text": { "html": "<b>Why us</b>" }
        }))
        .unwrap();
        assert_eq!(rich.content().unwrap(), "<b>Why us</b>");

        // 信封存在但内层缺失按空串处理
        let hollow: ComponentProperty = serde_json::from_value(json!({
            "propertyId": "p3",
            "type": "Plain Text",
            "text": {}
        }))
        .unwrap();
        assert_eq!(hollow.content().unwrap(), "");
    }
}
