//! 按规则类型的排序策略表
//! 每个类型对应一个策略：可选的规范化步骤 + 主排序键；主键相等时统一按字典序兜底
use std::cmp::Ordering;

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

use super::cidr::{extract_cidr_mask, normalize_cidr};
use crate::core::RuleType;

/// NETWORK 协议优先级
const NETWORK_PRIORITY: &[&str] = &["tcp", "udp", "icmp"];
/// IN-TYPE 入站类型优先级
const IN_TYPE_PRIORITY: &[&str] = &["http", "https", "socks5"];

/// 短后缀区间（字节长度，闭区间）
const SHORT_SUFFIX_LEN: std::ops::RangeInclusive<usize> = 2..=5;

/// 排序策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortPolicy {
    /// 长度升序（短的通常是主域名/更通用），再字典序
    LengthThenLex,
    /// 2~5 字节的短后缀最优先，其余按长度升序
    ShortSuffixFirst,
    /// 先补默认掩码，再按掩码降序（越精确越靠前）
    CidrMaskDesc,
    /// 按 `-` 之前的起始端口排序（字符串比较）
    PortRangeStart,
    /// 去掉一个前导 `AS` 后按剩余部分排序（字符串比较）
    AsnNumber,
    /// 已知取值按给定优先级（小写查找），其余排在后面
    Priority(&'static [&'static str]),
    /// 纯字典序
    Lexicographic,
}

impl SortPolicy {
    /// 排序前的规范化（目前只有 CIDR 类型需要）
    pub fn normalize(&self, rule: String) -> String {
        match self {
            SortPolicy::CidrMaskDesc => normalize_cidr(&rule),
            _ => rule,
        }
    }

    /// 主排序键比较；返回 Equal 时由调用方按字典序兜底
    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        match self {
            SortPolicy::LengthThenLex => a.len().cmp(&b.len()),
            SortPolicy::ShortSuffixFirst => {
                let short_a = SHORT_SUFFIX_LEN.contains(&a.len());
                let short_b = SHORT_SUFFIX_LEN.contains(&b.len());
                // true 排前面
                short_b
                    .cmp(&short_a)
                    .then_with(|| a.len().cmp(&b.len()))
            }
            SortPolicy::CidrMaskDesc => extract_cidr_mask(b).cmp(&extract_cidr_mask(a)),
            SortPolicy::PortRangeStart => port_start(a).cmp(port_start(b)),
            SortPolicy::AsnNumber => asn_body(a).cmp(asn_body(b)),
            SortPolicy::Priority(table) => {
                // 已知值恒排在未知值之前，保证全序；
                // 与"已知对未知回退字典序"的比较不同：{tcp, gre} 输出 tcp, gre 而非 gre, tcp
                match (priority_of(table, a), priority_of(table, b)) {
                    (Some(pa), Some(pb)) => pa.cmp(&pb),
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                }
            }
            SortPolicy::Lexicographic => Ordering::Equal,
        }
    }
}

#[inline]
fn port_start(rule: &str) -> &str {
    rule.split('-').next().unwrap_or(rule)
}

#[inline]
fn asn_body(rule: &str) -> &str {
    rule.strip_prefix("AS").unwrap_or(rule)
}

fn priority_of(table: &[&str], value: &str) -> Option<usize> {
    let lower = value.to_ascii_lowercase();
    table.iter().position(|p| *p == lower)
}

// 默认策略表
static DEFAULT_POLICIES: Lazy<FxHashMap<RuleType, SortPolicy>> = Lazy::new(|| {
    use RuleType::*;

    let mut table = FxHashMap::default();
    let groups: [(&[RuleType], SortPolicy); 9] = [
        (&[Domain], SortPolicy::LengthThenLex),
        (&[DomainSuffix], SortPolicy::ShortSuffixFirst),
        (&[DomainKeyword, DomainWildcard], SortPolicy::LengthThenLex),
        (
            &[DomainRegex, ProcessNameRegex, ProcessPathRegex],
            SortPolicy::LengthThenLex,
        ),
        (
            &[IpCidr, IpCidr6, SrcIpCidr, SrcIpCidr6, IpSuffix, SrcIpSuffix],
            SortPolicy::CidrMaskDesc,
        ),
        (&[ProcessName, ProcessPath], SortPolicy::LengthThenLex),
        (&[DstPort, SrcPort, InPort], SortPolicy::PortRangeStart),
        (&[IpAsn, SrcIpAsn], SortPolicy::AsnNumber),
        (&[Network], SortPolicy::Priority(NETWORK_PRIORITY)),
    ];
    for (types, policy) in groups {
        for rule_type in types {
            table.insert(rule_type.clone(), policy);
        }
    }
    table.insert(InType, SortPolicy::Priority(IN_TYPE_PRIORITY));
    // GEOIP/GEOSITE/UID/DSCP/IN-USER/IN-NAME 等：字典序（表中缺省即为字典序）
    table
});

/// 类型 → 排序策略 映射表
#[derive(Debug, Clone)]
pub struct SortPolicyTable {
    policies: FxHashMap<RuleType, SortPolicy>,
}

impl Default for SortPolicyTable {
    fn default() -> Self {
        Self {
            policies: DEFAULT_POLICIES.clone(),
        }
    }
}

impl SortPolicyTable {
    /// 覆盖某个类型的策略
    pub fn with_policy(mut self, rule_type: RuleType, policy: SortPolicy) -> Self {
        self.policies.insert(rule_type, policy);
        self
    }

    /// 查询策略，未登记的类型（含词表外类型）按字典序
    pub fn policy_for(&self, rule_type: &RuleType) -> SortPolicy {
        self.policies
            .get(rule_type)
            .copied()
            .unwrap_or(SortPolicy::Lexicographic)
    }

    /// 规范化 → 去重 → 排序，原地替换
    /// 返回被移除的重复条数
    pub fn sort_rules(&self, rule_type: &RuleType, rules: &mut Vec<String>) -> usize {
        let policy = self.policy_for(rule_type);
        let before = rules.len();

        let normalized: Vec<String> = rules.drain(..).map(|r| policy.normalize(r)).collect();
        *rules = normalized;

        rules.sort_by(|a, b| policy.compare(a, b).then_with(|| a.cmp(b)));
        // 全序比较下相同字符串必然相邻
        rules.dedup();

        before - rules.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(rule_type: RuleType, input: &[&str]) -> Vec<String> {
        let mut rules: Vec<String> = input.iter().map(|s| s.to_string()).collect();
        SortPolicyTable::default().sort_rules(&rule_type, &mut rules);
        rules
    }

    #[test]
    fn test_domain_length_then_lex() {
        assert_eq!(
            sorted(RuleType::Domain, &["www.google.com", "b.com", "a.com", "google.com"]),
            vec!["a.com", "b.com", "google.com", "www.google.com"]
        );
    }

    #[test]
    fn test_domain_suffix_short_first() {
        assert_eq!(
            sorted(RuleType::DomainSuffix, &["google.com", "cn", "a", "io", "x.com", "abcdef"]),
            vec!["cn", "io", "x.com", "a", "abcdef", "google.com"]
        );
    }

    #[test]
    fn test_cidr_normalized_and_mask_desc() {
        assert_eq!(
            sorted(
                RuleType::IpCidr,
                &["10.0.0.0/8", "1.2.3.4", "192.168.0.0/16,no-resolve", "1.2.3.4/32"]
            ),
            vec!["1.2.3.4/32", "192.168.0.0/16,no-resolve", "10.0.0.0/8"]
        );
        assert_eq!(
            sorted(RuleType::IpCidr6, &["2001:db8::/32", "::1"]),
            vec!["::1/128", "2001:db8::/32"]
        );
    }

    #[test]
    fn test_port_compared_as_string() {
        // 字符串比较："100" < "20"
        assert_eq!(
            sorted(RuleType::DstPort, &["20-30", "443", "100-200", "80"]),
            vec!["100-200", "20-30", "443", "80"]
        );
    }

    #[test]
    fn test_port_same_start_tie_broken_lex() {
        assert_eq!(
            sorted(RuleType::SrcPort, &["80-90", "80", "80-81"]),
            vec!["80", "80-81", "80-90"]
        );
    }

    #[test]
    fn test_asn_strips_single_prefix() {
        assert_eq!(
            sorted(RuleType::IpAsn, &["AS4134", "13335", "AS15169"]),
            vec!["13335", "AS15169", "AS4134"]
        );
    }

    #[test]
    fn test_network_priority() {
        assert_eq!(
            sorted(RuleType::Network, &["icmp", "UDP", "tcp", "gre"]),
            vec!["tcp", "UDP", "icmp", "gre"]
        );
    }

    #[test]
    fn test_known_network_before_unknown_even_if_lex_larger() {
        assert_eq!(sorted(RuleType::Network, &["gre", "tcp"]), vec!["tcp", "gre"]);
        assert_eq!(sorted(RuleType::Network, &["tcp", "gre"]), vec!["tcp", "gre"]);
        // 未知值之间按字典序
        assert_eq!(sorted(RuleType::Network, &["sctp", "gre"]), vec!["gre", "sctp"]);
    }

    #[test]
    fn test_in_type_priority() {
        assert_eq!(
            sorted(RuleType::InType, &["socks5", "https", "http", "mixed"]),
            vec!["http", "https", "socks5", "mixed"]
        );
    }

    #[test]
    fn test_lexicographic_fallback() {
        assert_eq!(
            sorted(RuleType::GeoIp, &["US", "CN", "JP"]),
            vec!["CN", "JP", "US"]
        );
        assert_eq!(
            sorted(RuleType::Other("USER-AGENT".into()), &["b", "a"]),
            vec!["a", "b"]
        );
    }

    #[test]
    fn test_dedup_is_case_sensitive_and_idempotent() {
        let table = SortPolicyTable::default();
        let mut rules: Vec<String> = ["A.com", "a.com", "a.com"].iter().map(|s| s.to_string()).collect();
        assert_eq!(table.sort_rules(&RuleType::Domain, &mut rules), 1);
        assert_eq!(rules, vec!["A.com", "a.com"]);

        let snapshot = rules.clone();
        assert_eq!(table.sort_rules(&RuleType::Domain, &mut rules), 0);
        assert_eq!(rules, snapshot);
    }

    #[test]
    fn test_policy_override() {
        let table = SortPolicyTable::default().with_policy(RuleType::Domain, SortPolicy::Lexicographic);
        assert_eq!(table.policy_for(&RuleType::Domain), SortPolicy::Lexicographic);
        assert_eq!(table.policy_for(&RuleType::IpCidr), SortPolicy::CidrMaskDesc);
        assert_eq!(table.policy_for(&RuleType::Uid), SortPolicy::Lexicographic);
    }
}
