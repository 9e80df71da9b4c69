//! 输出方言定义与条目级改写
use crate::core::RuleType;

/// classical 方言的类型遍历顺序（MATCH/FINAL 与词表外类型不导出）
pub const CLASSICAL_EXPORT_ORDER: [RuleType; 31] = [
    RuleType::Domain,
    RuleType::DomainSuffix,
    RuleType::DomainKeyword,
    RuleType::DomainWildcard,
    RuleType::DomainRegex,
    RuleType::IpCidr,
    RuleType::IpCidr6,
    RuleType::SrcIpCidr,
    RuleType::SrcIpCidr6,
    RuleType::IpSuffix,
    RuleType::SrcIpSuffix,
    RuleType::IpAsn,
    RuleType::SrcIpAsn,
    RuleType::GeoIp,
    RuleType::SrcGeoIp,
    RuleType::GeoSite,
    RuleType::ProcessName,
    RuleType::ProcessPath,
    RuleType::ProcessNameRegex,
    RuleType::ProcessPathRegex,
    RuleType::DstPort,
    RuleType::SrcPort,
    RuleType::InPort,
    RuleType::Network,
    RuleType::Uid,
    RuleType::InType,
    RuleType::InUser,
    RuleType::InName,
    RuleType::Dscp,
    RuleType::RuleSet,
    RuleType::SubRule,
];

const NO_RESOLVE: &str = "no-resolve";

/// 输出方言（Mihomo rule-provider 的三种 behavior）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// 纯域名列表：DOMAIN 原样 + DOMAIN-SUFFIX 转 `+.` 形式
    Domain,
    /// 纯 CIDR 列表：IP-CIDR / IP-CIDR6，不带 no-resolve
    IpCidr,
    /// `TYPE,payload` 全量格式
    Classical {
        /// 是否包含可由 domain/ipcidr 方言承载的类型
        include_all: bool,
        /// IP-CIDR 条目是否强制带 no-resolve
        with_no_resolve: bool,
    },
}

impl Dialect {
    /// 每个规则集固定导出的 6 种方言
    pub const ALL: [Dialect; 6] = [
        Dialect::Domain,
        Dialect::IpCidr,
        Dialect::Classical {
            include_all: false,
            with_no_resolve: false,
        },
        Dialect::Classical {
            include_all: false,
            with_no_resolve: true,
        },
        Dialect::Classical {
            include_all: true,
            with_no_resolve: false,
        },
        Dialect::Classical {
            include_all: true,
            with_no_resolve: true,
        },
    ];

    /// 文件名后缀：`<name>_<suffix>.yaml` / `.list`
    pub fn file_suffix(&self) -> &'static str {
        match self {
            Dialect::Domain => "domain",
            Dialect::IpCidr => "ipcidr",
            Dialect::Classical {
                include_all: false,
                with_no_resolve: false,
            } => "classical",
            Dialect::Classical {
                include_all: false,
                with_no_resolve: true,
            } => "classical_no_resolve",
            Dialect::Classical {
                include_all: true,
                with_no_resolve: false,
            } => "classical_all",
            Dialect::Classical {
                include_all: true,
                with_no_resolve: true,
            } => "classical_all_no_resolve",
        }
    }

    /// 文件头注释（不含 `#` 前缀）；只有 classical 方言带文件头
    pub fn header_lines(&self, rule_set_name: &str) -> Vec<String> {
        let Dialect::Classical {
            include_all,
            with_no_resolve,
        } = *self
        else {
            return Vec::new();
        };

        let mut lines = Vec::with_capacity(5);
        if include_all {
            lines.push(format!("{} - Classical Format (All Rules)", rule_set_name));
            lines.push("Includes all rule types".to_string());
        } else {
            lines.push(format!("{} - Classical Format (Other Rules)", rule_set_name));
            lines.push(
                "Excludes rules that can use domain.list (DOMAIN/DOMAIN-SUFFIX)".to_string(),
            );
            lines.push("and ipcidr.list (IP-CIDR/IP-CIDR6)".to_string());
        }
        if with_no_resolve {
            lines.push("IP-CIDR rules include 'no-resolve' parameter".to_string());
        } else {
            lines.push("IP-CIDR rules exclude 'no-resolve' parameter".to_string());
        }
        lines.push("Rules are optimized and sorted for best performance".to_string());
        lines
    }

    /// classical 方言下某类型是否输出
    pub fn classical_includes(include_all: bool, with_no_resolve: bool, rule_type: &RuleType) -> bool {
        if include_all {
            return true;
        }
        if rule_type.is_domain_list_type() {
            return false;
        }
        // 只有 no_resolve 版本重新携带 IP-CIDR（ipcidr 方言不带 no-resolve）
        !rule_type.is_plain_ip_cidr() || with_no_resolve
    }
}

/// DOMAIN-SUFFIX 转 domain 方言的 `+.` 形式（幂等）
/// `+.x` 保持，`.x` → `+.x`，`x` → `+.x`
pub fn canonical_domain_suffix(suffix: &str) -> String {
    if suffix.starts_with("+.") {
        suffix.to_string()
    } else if suffix.starts_with('.') {
        format!("+{}", suffix)
    } else {
        format!("+.{}", suffix)
    }
}

/// 去掉所有 no-resolve 参数段
pub fn strip_no_resolve(rule: &str) -> String {
    rule.split(',')
        .filter(|part| part.trim() != NO_RESOLVE)
        .collect::<Vec<_>>()
        .join(",")
}

/// 确保带 no-resolve 参数（已有则原样返回）
pub fn ensure_no_resolve(rule: &str) -> String {
    if rule.split(',').skip(1).any(|part| part.trim() == NO_RESOLVE) {
        rule.to_string()
    } else {
        format!("{},{}", rule, NO_RESOLVE)
    }
}
