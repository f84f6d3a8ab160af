//! 内容归一化
//!
//! 把异构的原始条目转换为统一的可翻译记录：一个稳定标识、
//! 一个字段名→文本的有序映射（翻译目标）、一个原样保留的字段集。

use std::collections::BTreeMap;

use serde_json::Value;

use crate::content::node::HasTranslatableFields;
use crate::content::schema::FieldSchema;

/// 记录的写回形态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// 文本型DOM节点：fields 键为隐式的 "text"
    TextNode,
    /// 组件实例的属性覆盖：fields 键为 propertyId
    PropertyOverrides,
    /// 组件属性集合：fields 键为 propertyId
    ComponentProperties,
    /// CMS条目：fields/preserved 合并为 fieldData
    CollectionEntry,
}

/// 统一的可翻译记录
///
/// `fields` 是翻译目标，每个语言各持一份译文副本；`preserved`
/// 跨语言保持不变。二者键集合的并集不超出配置的字段模式。
#[derive(Debug, Clone)]
pub struct TranslatableRecord {
    /// 写回端点使用的稳定标识（节点ID/组件ID/条目ID）
    pub id: String,
    /// 列表展示用名称
    pub identifier: String,
    pub kind: RecordKind,
    pub fields: BTreeMap<String, String>,
    pub preserved: BTreeMap<String, Value>,
}

impl TranslatableRecord {
    /// 记录是否有可翻译内容
    pub fn has_translatable_text(&self) -> bool {
        self.fields.values().any(|v| !v.trim().is_empty())
    }
}

/// 按字段模式归一化一批原始条目
///
/// 没有可同步内容的条目被丢弃，其余保持输入顺序。
pub fn normalize<T: HasTranslatableFields>(
    items: &[T],
    schema: &FieldSchema,
) -> Vec<TranslatableRecord> {
    let records: Vec<TranslatableRecord> =
        items.iter().filter_map(|item| item.to_record(schema)).collect();
    tracing::debug!(
        input = items.len(),
        records = records.len(),
        "normalize: 归一化完成"
    );
    records
}
