//! 按集合类型的字段模式配置
//!
//! 哪些字段送翻译、哪些字段原样保留是数据而不是控制流：内置表
//! 覆盖常用集合类型，也可以从TOML配置整表替换。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::SyncResult;

/// 单个集合类型的字段模式
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldSchema {
    /// 展示用名称
    #[serde(default)]
    pub display_name: String,
    /// 送翻译的字段
    #[serde(default)]
    pub translate: Vec<String>,
    /// 原样保留的字段（slug、排序号、标志位等）
    #[serde(default)]
    pub preserve: Vec<String>,
    /// 列表里用于展示条目的字段，缺失时显示 "Unnamed"
    #[serde(default = "default_identifier")]
    pub identifier_field: String,
}

fn default_identifier() -> String {
    "name".to_string()
}

impl FieldSchema {
    /// DOM类内容（页面节点、组件属性）使用的空模式：
    /// 字段集合由节点形态隐式决定，不走集合配置。
    pub fn dom() -> Self {
        Self {
            display_name: "DOM".to_string(),
            translate: Vec::new(),
            preserve: Vec::new(),
            identifier_field: default_identifier(),
        }
    }
}

/// 集合类型 → 字段模式的查找表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaTable {
    pub collections: BTreeMap<String, FieldSchema>,
}

impl SchemaTable {
    /// 内置表，字段清单来自线上实际使用的集合
    pub fn builtin() -> Self {
        let mut collections = BTreeMap::new();

        collections.insert(
            "Blog".to_string(),
            FieldSchema {
                display_name: "Blog Post".to_string(),
                translate: strings(&[
                    "disclaimer-2",
                    "post",
                    "summary",
                    "name",
                    "meta-description-2",
                    "page-title",
                ]),
                preserve: strings(&["slug", "accumulators-option"]),
                identifier_field: "name".to_string(),
            },
        );

        collections.insert(
            "Support Questions".to_string(),
            FieldSchema {
                display_name: "Help Center Question".to_string(),
                translate: strings(&["answer", "name"]),
                preserve: strings(&["slug", "category-3", "order-number"]),
                identifier_field: "question".to_string(),
            },
        );

        collections.insert(
            "Tncs".to_string(),
            FieldSchema {
                display_name: "Tncs".to_string(),
                translate: strings(&["name", "content", "meta-description", "page-title"]),
                preserve: strings(&["slug", "order", "category"]),
                identifier_field: "name".to_string(),
            },
        );

        collections.insert(
            "Terms and Conditions".to_string(),
            FieldSchema {
                display_name: "Terms and Conditions".to_string(),
                translate: strings(&["name", "content", "pdf-name-1", "description", "page-title"]),
                preserve: strings(&["slug", "order", "category", "pdf-link-1", "link-1"]),
                identifier_field: "name".to_string(),
            },
        );

        // 纯保留型集合：没有可翻译字段，内容原样流过管道
        collections.insert(
            "Trading Specifications".to_string(),
            FieldSchema {
                display_name: "Trading Specifications".to_string(),
                translate: Vec::new(),
                preserve: strings(&["type"]),
                identifier_field: "name".to_string(),
            },
        );

        collections.insert(
            "Help Center Categories".to_string(),
            FieldSchema {
                display_name: "Help Center Category".to_string(),
                translate: strings(&["name", "page-title", "meta-description"]),
                preserve: strings(&["slug", "type", "order-number", "main-questions"]),
                identifier_field: "name".to_string(),
            },
        );

        collections.insert(
            "Help Center Questions".to_string(),
            FieldSchema {
                display_name: "Help Center Question".to_string(),
                translate: strings(&["name", "answer"]),
                preserve: strings(&["slug", "category", "order-number"]),
                identifier_field: "question".to_string(),
            },
        );

        Self { collections }
    }

    /// 从TOML配置加载整表
    pub fn from_toml(raw: &str) -> SyncResult<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// 按集合名称查找模式，大小写不敏感的子串匹配
    pub fn lookup(&self, collection_name: &str) -> Option<(&str, &FieldSchema)> {
        let lowered = collection_name.to_lowercase();
        self.collections
            .iter()
            .find(|(key, _)| lowered.contains(&key.to_lowercase()))
            .map(|(key, schema)| (key.as_str(), schema))
    }
}

impl Default for SchemaTable {
    fn default() -> Self {
        Self::builtin()
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive_substring() {
        let table = SchemaTable::builtin();

        let (key, schema) = table.lookup("Deriv Blog Posts").unwrap();
        assert_eq!(key, "Blog");
        assert!(schema.translate.contains(&"post".to_string()));

        let (key, _) = table.lookup("help center questions (live)").unwrap();
        assert_eq!(key, "Help Center Questions");

        assert!(table.lookup("Press Releases").is_none());
    }

    #[test]
    fn preserve_only_schema_has_no_translate_fields() {
        let table = SchemaTable::builtin();
        let (_, schema) = table.lookup("Trading Specifications").unwrap();
        assert!(schema.translate.is_empty());
        assert_eq!(schema.preserve, vec!["type".to_string()]);
    }

    #[test]
    fn table_round_trips_through_toml() {
        let table = SchemaTable::builtin();
        let raw = toml::to_string(&table).unwrap();
        let reloaded = SchemaTable::from_toml(&raw).unwrap();
        assert_eq!(
            reloaded.collections.len(),
            table.collections.len()
        );
        let (_, schema) = reloaded.lookup("Blog").unwrap();
        assert_eq!(schema.identifier_field, "name");
    }
}
