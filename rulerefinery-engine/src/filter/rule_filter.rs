//! 规则过滤：先白名单（filters），再黑名单（excludes）
//! 匹配对象是完整规则串 `TYPE,payload[,options]`；过滤只删不排，保留入参顺序
use rustc_hash::FxHashSet;

use super::matcher::GlobMatcher;
use crate::core::RuleType;
use crate::utils::preview_compact;

/// 单次过滤视图（不回写规则库）
pub struct RuleFilter<'a> {
    matcher: &'a dyn GlobMatcher,
    filters: &'a [String],
    excludes: &'a [String],
}

impl<'a> RuleFilter<'a> {
    pub fn new(matcher: &'a dyn GlobMatcher, filters: &'a [String], excludes: &'a [String]) -> Self {
        Self {
            matcher,
            filters,
            excludes,
        }
    }

    /// 对某一类型的规则列表应用过滤
    pub fn apply<'r>(&self, rule_type: &RuleType, rules: &'r [String]) -> Vec<&'r str> {
        if rules.is_empty() {
            return Vec::new();
        }

        let original_count = rules.len();
        // 非法模式每轮只告警一次
        let mut warned: FxHashSet<&str> = FxHashSet::default();

        let mut survivors: Vec<&'r str> = rules.iter().map(String::as_str).collect();

        // 第一步：白名单，空列表视为全部放行
        if self.has_patterns(self.filters) {
            survivors.retain(|rule| {
                let full_rule = format!("{},{}", rule_type, rule);
                self.any_match(self.filters, &full_rule, &mut warned)
            });
            log::debug!(
                "[RULE FILTER] {} filters matched {}/{}",
                rule_type,
                survivors.len(),
                original_count
            );
        }

        // 第二步：黑名单，命中即剔除（优先级高于白名单）
        if self.has_patterns(self.excludes) {
            let before = survivors.len();
            survivors.retain(|rule| {
                let full_rule = format!("{},{}", rule_type, rule);
                let excluded = self.any_match(self.excludes, &full_rule, &mut warned);
                if excluded {
                    log::trace!("[RULE FILTER] excluded: {}", preview_compact(&full_rule, 120));
                }
                !excluded
            });
            if survivors.len() != before {
                log::debug!(
                    "[RULE FILTER] {} excludes removed {} of {}",
                    rule_type,
                    before - survivors.len(),
                    before
                );
            }
        }

        if survivors.len() != original_count {
            log::info!(
                "[RULE FILTER] {} - original {} rules, {} after filtering",
                rule_type,
                original_count,
                survivors.len()
            );
        }

        survivors
    }

    fn has_patterns(&self, patterns: &[String]) -> bool {
        patterns.iter().any(|p| !p.is_empty())
    }

    fn any_match<'p>(
        &self,
        patterns: &'p [String],
        full_rule: &str,
        warned: &mut FxHashSet<&'p str>,
    ) -> bool {
        for pattern in patterns.iter().filter(|p| !p.is_empty()) {
            match self.matcher.matches(pattern, full_rule) {
                Ok(true) => return true,
                Ok(false) => {}
                Err(e) => {
                    if warned.insert(pattern.as_str()) {
                        log::warn!("[RULE FILTER] {}, treated as non-matching", e);
                    }
                }
            }
        }
        false
    }
}
