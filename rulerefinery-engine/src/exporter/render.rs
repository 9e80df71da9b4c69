//! 把过滤后的规则渲染为 YAML / list 文本（先整体渲染到内存，再一次性落盘）
use std::fmt::Write;

use super::dialect::{
    canonical_domain_suffix, ensure_no_resolve, strip_no_resolve, Dialect, CLASSICAL_EXPORT_ORDER,
};
use crate::core::{RuleSet, RuleType};
use crate::filter::RuleFilter;

/// 空输出时的占位注释
pub const PLACEHOLDER_COMMENT: &str = "# No rules in this category, placeholder generated";

/// 一段同类型规则；`rule_type` 为 None 时不输出段标题（domain/ipcidr 方言）
pub(crate) struct Section {
    pub rule_type: Option<RuleType>,
    pub entries: Vec<String>,
}

/// 单个方言的渲染结果
pub(crate) struct Rendered {
    pub yaml: String,
    pub list: String,
    pub rule_count: usize,
}

/// 按方言收集条目（过滤在这里发生，规则库本身不变）
pub(crate) fn collect_sections(dialect: Dialect, rule_set: &RuleSet, filter: &RuleFilter) -> Vec<Section> {
    match dialect {
        Dialect::Domain => {
            let mut entries: Vec<String> = filter
                .apply(&RuleType::Domain, rule_set.rules_of(&RuleType::Domain))
                .into_iter()
                .map(str::to_string)
                .collect();
            entries.extend(
                filter
                    .apply(&RuleType::DomainSuffix, rule_set.rules_of(&RuleType::DomainSuffix))
                    .into_iter()
                    .map(canonical_domain_suffix),
            );
            // KEYWORD/WILDCARD/REGEX 不被 domain behavior 支持
            vec![Section {
                rule_type: None,
                entries,
            }]
        }
        Dialect::IpCidr => {
            let entries = [RuleType::IpCidr, RuleType::IpCidr6]
                .iter()
                .flat_map(|t| filter.apply(t, rule_set.rules_of(t)))
                .map(strip_no_resolve)
                .collect();
            vec![Section {
                rule_type: None,
                entries,
            }]
        }
        Dialect::Classical {
            include_all,
            with_no_resolve,
        } => CLASSICAL_EXPORT_ORDER
            .iter()
            .filter(|t| Dialect::classical_includes(include_all, with_no_resolve, t))
            .filter_map(|rule_type| {
                let rules = rule_set.rules_of(rule_type);
                if rules.is_empty() {
                    return None;
                }
                let filtered = filter.apply(rule_type, rules);
                if filtered.is_empty() {
                    return None;
                }
                let entries = filtered
                    .into_iter()
                    .map(|rule| {
                        let rule = if !rule_type.is_plain_ip_cidr() {
                            rule.to_string()
                        } else if with_no_resolve {
                            ensure_no_resolve(rule)
                        } else {
                            strip_no_resolve(rule)
                        };
                        format!("{},{}", rule_type, rule)
                    })
                    .collect();
                Some(Section {
                    rule_type: Some(rule_type.clone()),
                    entries,
                })
            })
            .collect(),
    }
}

/// YAML 单引号字符串转义：内部 `'` 写成 `''`
fn yaml_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

pub(crate) fn render(dialect: Dialect, rule_set_name: &str, sections: &[Section]) -> Rendered {
    let rule_count: usize = sections.iter().map(|s| s.entries.len()).sum();

    let mut yaml = String::new();
    let mut list = String::new();

    for line in dialect.header_lines(rule_set_name) {
        // String 写入不会失败
        let _ = writeln!(yaml, "# {}", line);
        let _ = writeln!(list, "# {}", line);
    }

    if rule_count == 0 {
        yaml.push_str(PLACEHOLDER_COMMENT);
        yaml.push_str("\npayload: []\n");
        list.push_str(PLACEHOLDER_COMMENT);
        list.push('\n');
        return Rendered {
            yaml,
            list,
            rule_count,
        };
    }

    yaml.push_str("payload:\n");
    for section in sections.iter().filter(|s| !s.entries.is_empty()) {
        if let Some(rule_type) = &section.rule_type {
            let _ = write!(yaml, "\n  # {} ({} rules)\n", rule_type, section.entries.len());
            let _ = write!(list, "\n# {} ({} rules)\n", rule_type, section.entries.len());
        }
        for entry in &section.entries {
            let _ = writeln!(yaml, "  - {}", yaml_quote(entry));
            list.push_str(entry);
            list.push('\n');
        }
    }

    Rendered {
        yaml,
        list,
        rule_count,
    }
}
