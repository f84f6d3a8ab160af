//! 翻译提示构造
//!
//! 系统消息携带禁译术语与策略规则，用户消息携带序列化后的字段映射。
//! 对模型的要求：只翻译JSON字符串值，结构保持不变，只返回JSON。

use std::collections::BTreeMap;

use crate::translation::rules::RuleSet;

/// 构造系统消息
pub fn system_message(target_tag: &str, glossary_terms: &[String], rules: &RuleSet) -> String {
    let mut message = String::new();

    message.push_str("You are a professional translator with 20 years of experience.\n");
    message.push_str(&format!(
        "Translate only the JSON string values to {}.\n",
        target_tag
    ));

    if !glossary_terms.is_empty() {
        message.push_str(
            "\nDO NOT TRANSLATE the following terms - keep them exactly as they appear:\n",
        );
        for term in glossary_terms {
            message.push_str(&format!("- {}\n", term));
        }
    }

    if !rules.rules.is_empty() {
        message.push_str("\nFollow these additional rules when translating:\n");
        for instruction in rules.instructions() {
            message.push_str(&format!("- {}\n", instruction));
        }
    }

    message.push_str("\nKeep all other JSON structure and values exactly the same.\n");
    message.push_str("Return only the JSON, no explanations.");

    message
}

/// 构造用户消息：字段映射序列化为带缩进的JSON
pub fn user_message(fields: &BTreeMap<String, String>) -> String {
    let payload = serde_json::to_string_pretty(fields).unwrap_or_else(|_| "{}".to_string());
    format!("Translate this JSON content. Original JSON:\n{}", payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_message_lists_glossary_terms() {
        let terms = vec!["Deriv Bot".to_string(), "MT5".to_string()];
        let message = system_message("es", &terms, &RuleSet::default());

        assert!(message.contains("to es."));
        assert!(message.contains("- Deriv Bot"));
        assert!(message.contains("- MT5"));
        assert!(message.contains("Return only the JSON"));
    }

    #[test]
    fn system_message_carries_policy_rules() {
        let message = system_message("ar", &[], &RuleSet::default());
        assert!(message.contains("Swahili"));
        assert!(message.contains("24/7"));
        assert!(message.contains("\u{061F}"));
        // 没有术语时不渲染禁译清单
        assert!(!message.contains("DO NOT TRANSLATE"));
    }

    #[test]
    fn user_message_embeds_field_map() {
        let fields = BTreeMap::from([
            ("name".to_string(), "Deriv Bot helps traders".to_string()),
            ("summary".to_string(), "Short".to_string()),
        ]);
        let message = user_message(&fields);
        assert!(message.starts_with("Translate this JSON content."));
        assert!(message.contains("\"name\": \"Deriv Bot helps traders\""));
        assert!(message.contains("\"summary\": \"Short\""));
    }
}
