use rustc_hash::FxHashMap;

use super::enums::RuleType;

/// 解析后的单条规则（临时对象，入库后即折叠为字符串）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub rule_type: RuleType,
    pub payload: String,
    /// 尾部附加参数，如 no-resolve
    pub options: String,
}

impl Rule {
    /// 入库形式：`payload` 或 `payload,options`
    pub fn stored_form(&self) -> String {
        if self.options.is_empty() {
            self.payload.clone()
        } else {
            format!("{},{}", self.payload, self.options)
        }
    }
}

/// 规则集：一个逻辑分类（如 google、ads）下的全部规则
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    pub name: String,
    /// 按类型归档的规则（类型 → 规则载荷列表）
    pub rules_by_type: FxHashMap<RuleType, Vec<String>>,
    /// 规则内容白名单（glob）
    pub filters: Vec<String>,
    /// 规则内容黑名单（glob）
    pub excludes: Vec<String>,
}

impl RuleSet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn push(&mut self, rule: Rule) {
        let stored = rule.stored_form();
        self.rules_by_type
            .entry(rule.rule_type)
            .or_default()
            .push(stored);
    }

    /// 指定类型的规则，不存在时返回空切片
    pub fn rules_of(&self, rule_type: &RuleType) -> &[String] {
        self.rules_by_type
            .get(rule_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn total_rules(&self) -> usize {
        self.rules_by_type.values().map(Vec::len).sum()
    }

    /// 已出现的类型，按规范顺序排列
    pub fn present_types(&self) -> Vec<&RuleType> {
        let mut types: Vec<&RuleType> = self.rules_by_type.keys().collect();
        types.sort_by(|a, b| {
            a.canonical_rank()
                .cmp(&b.canonical_rank())
                .then_with(|| a.as_str().cmp(b.as_str()))
        });
        types
    }
}
