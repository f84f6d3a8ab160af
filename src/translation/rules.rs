//! 提示策略规则表
//!
//! 品牌词、人名、语言特例等翻译策略以数据形式存在，随提示注入模型，
//! 不编译进控制流。整表可由配置替换，规则演进不需要改代码。

use serde::{Deserialize, Serialize};

/// 单条策略规则：名称用于配置定位，指令逐条进入系统提示
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptRule {
    pub name: String,
    pub instruction: String,
}

impl PromptRule {
    pub fn new(name: &str, instruction: &str) -> Self {
        Self {
            name: name.to_string(),
            instruction: instruction.to_string(),
        }
    }
}

/// 策略规则表
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    pub rules: Vec<PromptRule>,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            rules: vec![
                PromptRule::new(
                    "brand-prefix",
                    "When encountering the word \"Deriv\" and any succeeding word, analyze the \
                     context and based on it, keep it in English. For example, \"Deriv Blog,\" \
                     \"Deriv Life,\" \"Deriv Bot,\" and \"Deriv App\" should be kept in English.",
                ),
                PromptRule::new(
                    "product-names",
                    "Keep product names such as Forex, CFDs, P2P, MT5, Deriv X, Deriv cTrader, \
                     SmartTrader, Deriv Trader, Deriv GO, Deriv Bot, and Binary Bot in English.",
                ),
                PromptRule::new(
                    "person-names",
                    "Do not translate the following names of people: Louise Wolf, Rakshit \
                     Choudhary, Chris Horn, Seema Hallon, and Jean-Yves Sireau. Keep them in \
                     English.",
                ),
                PromptRule::new(
                    "swahili-tag",
                    "If the target language is \"sw\", then in that case translate to Swahili \
                     only.",
                ),
                PromptRule::new(
                    "always-on-token",
                    "Never translate the literal token \"24/7\"; keep it exactly as written.",
                ),
                PromptRule::new(
                    "arabic-question-mark",
                    "When the target language is Arabic, mirror the question mark according to \
                     right-to-left convention, using \"\u{061F}\" instead of \"?\".",
                ),
            ],
        }
    }
}

impl RuleSet {
    /// 空规则表
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// 规则指令行
    pub fn instructions(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|rule| rule.instruction.as_str())
    }

    /// 按名称替换或追加规则
    pub fn set(&mut self, rule: PromptRule) {
        match self.rules.iter_mut().find(|r| r.name == rule.name) {
            Some(existing) => *existing = rule,
            None => self.rules.push(rule),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rules_cover_known_policies() {
        let rules = RuleSet::default();
        let names: Vec<&str> = rules.rules.iter().map(|r| r.name.as_str()).collect();
        assert!(names.contains(&"brand-prefix"));
        assert!(names.contains(&"swahili-tag"));
        assert!(names.contains(&"arabic-question-mark"));
        assert!(names.contains(&"always-on-token"));
    }

    #[test]
    fn set_replaces_by_name() {
        let mut rules = RuleSet::default();
        let before = rules.rules.len();
        rules.set(PromptRule::new("product-names", "Keep SmartTrader in English."));
        assert_eq!(rules.rules.len(), before);
        assert!(rules
            .instructions()
            .any(|i| i == "Keep SmartTrader in English."));

        rules.set(PromptRule::new("new-rule", "Do something else."));
        assert_eq!(rules.rules.len(), before + 1);
    }

    #[test]
    fn rules_round_trip_through_toml() {
        let rules = RuleSet::default();
        let raw = toml::to_string(&rules).unwrap();
        let reloaded: RuleSet = toml::from_str(&raw).unwrap();
        assert_eq!(reloaded, rules);
    }
}
