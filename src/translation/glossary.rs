//! 禁译术语表
//!
//! 类别名 → 字面量列表。翻译运行期间只读，可在并发工作线程间共享。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// 禁译术语表
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Glossary {
    pub categories: BTreeMap<String, Vec<String>>,
}

impl Glossary {
    pub fn new() -> Self {
        Self::default()
    }

    /// 内置默认术语表
    pub fn with_defaults() -> Self {
        let mut categories = BTreeMap::new();

        categories.insert(
            "product_names".to_string(),
            strings(&[
                "Deriv",
                "Deriv App",
                "Deriv Bot",
                "Deriv GO",
                "Deriv Life",
                "Deriv Blog",
                "Deriv X",
                "Deriv cTrader",
                "MT5",
                "P2P",
                "SmartTrader",
                "Deriv Trader",
                "Binary Bot",
            ]),
        );

        categories.insert(
            "technical_terms".to_string(),
            strings(&[
                "API", "URL", "HTTP", "HTTPS", "SSL", "TLS", "JSON", "XML", "REST", "OAuth",
                "Passkey", "JWT", "SSH", "VPN", "iOS", "Android", "CSV", "PDF",
            ]),
        );

        Self { categories }
    }

    /// 向指定类别追加术语，重复的字面量忽略
    pub fn insert(&mut self, category: &str, term: &str) {
        let terms = self.categories.entry(category.to_string()).or_default();
        if !terms.iter().any(|t| t == term) {
            terms.push(term.to_string());
        }
    }

    /// 展平所有类别的术语，供提示构造使用
    pub fn flat_terms(&self) -> Vec<String> {
        let mut terms = Vec::new();
        for list in self.categories.values() {
            terms.extend(list.iter().cloned());
        }
        terms
    }

    pub fn is_empty(&self) -> bool {
        self.categories.values().all(|list| list.is_empty())
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
