use serde::{Serialize, Serializer};
use std::fmt::{Display, Formatter};

/// 规则类型枚举（Mihomo 规则词表）
/// 同一族内按匹配性能从快到慢排列
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RuleType {
    // Domain 类型
    Domain,
    DomainSuffix,
    DomainKeyword,
    DomainWildcard,
    DomainRegex,

    // IP 类型
    IpCidr,
    IpCidr6,
    SrcIpCidr,
    SrcIpCidr6,
    IpSuffix,
    SrcIpSuffix,
    GeoIp,
    SrcGeoIp,
    IpAsn,
    SrcIpAsn,

    // 进程类型
    ProcessName,
    ProcessPath,
    ProcessNameRegex,
    ProcessPathRegex,

    // 端口类型
    DstPort,
    SrcPort,
    InPort,

    // 其他
    GeoSite,
    Network,
    Uid,
    InType,
    InUser,
    InName,
    Dscp,
    RuleSet,
    SubRule,
    Match,
    Final,

    /// 词表之外的类型，按大写原样保留（只参与统计，不参与导出）
    Other(String),
}

impl RuleType {
    /// 所有已知类型（词表顺序）
    pub const KNOWN: [RuleType; 33] = [
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
        RuleType::GeoIp,
        RuleType::SrcGeoIp,
        RuleType::IpAsn,
        RuleType::SrcIpAsn,
        RuleType::ProcessName,
        RuleType::ProcessPath,
        RuleType::ProcessNameRegex,
        RuleType::ProcessPathRegex,
        RuleType::DstPort,
        RuleType::SrcPort,
        RuleType::InPort,
        RuleType::GeoSite,
        RuleType::Network,
        RuleType::Uid,
        RuleType::InType,
        RuleType::InUser,
        RuleType::InName,
        RuleType::Dscp,
        RuleType::RuleSet,
        RuleType::SubRule,
        RuleType::Match,
        RuleType::Final,
    ];

    /// 规则文本中的类型标记
    pub fn as_str(&self) -> &str {
        match self {
            RuleType::Domain => "DOMAIN",
            RuleType::DomainSuffix => "DOMAIN-SUFFIX",
            RuleType::DomainKeyword => "DOMAIN-KEYWORD",
            RuleType::DomainWildcard => "DOMAIN-WILDCARD",
            RuleType::DomainRegex => "DOMAIN-REGEX",
            RuleType::IpCidr => "IP-CIDR",
            RuleType::IpCidr6 => "IP-CIDR6",
            RuleType::SrcIpCidr => "SRC-IP-CIDR",
            RuleType::SrcIpCidr6 => "SRC-IP-CIDR6",
            RuleType::IpSuffix => "IP-SUFFIX",
            RuleType::SrcIpSuffix => "SRC-IP-SUFFIX",
            RuleType::GeoIp => "GEOIP",
            RuleType::SrcGeoIp => "SRC-GEOIP",
            RuleType::IpAsn => "IP-ASN",
            RuleType::SrcIpAsn => "SRC-IP-ASN",
            RuleType::ProcessName => "PROCESS-NAME",
            RuleType::ProcessPath => "PROCESS-PATH",
            RuleType::ProcessNameRegex => "PROCESS-NAME-REGEX",
            RuleType::ProcessPathRegex => "PROCESS-PATH-REGEX",
            RuleType::DstPort => "DST-PORT",
            RuleType::SrcPort => "SRC-PORT",
            RuleType::InPort => "IN-PORT",
            RuleType::GeoSite => "GEOSITE",
            RuleType::Network => "NETWORK",
            RuleType::Uid => "UID",
            RuleType::InType => "IN-TYPE",
            RuleType::InUser => "IN-USER",
            RuleType::InName => "IN-NAME",
            RuleType::Dscp => "DSCP",
            RuleType::RuleSet => "RULE-SET",
            RuleType::SubRule => "SUB-RULE",
            RuleType::Match => "MATCH",
            RuleType::Final => "FINAL",
            RuleType::Other(token) => token.as_str(),
        }
    }

    /// 从类型标记解析（大小写不敏感，前后空白忽略）
    pub fn from_token(token: &str) -> Self {
        let upper = token.trim().to_ascii_uppercase();
        Self::KNOWN
            .iter()
            .find(|known| known.as_str() == upper)
            .cloned()
            .unwrap_or(RuleType::Other(upper))
    }

    /// 仅 IP-CIDR / IP-CIDR6 两种可进入 ipcidr 方言，且受 no-resolve 改写影响
    #[inline]
    pub fn is_plain_ip_cidr(&self) -> bool {
        matches!(self, RuleType::IpCidr | RuleType::IpCidr6)
    }

    /// DOMAIN / DOMAIN-SUFFIX 由 domain 方言承载
    #[inline]
    pub fn is_domain_list_type(&self) -> bool {
        matches!(self, RuleType::Domain | RuleType::DomainSuffix)
    }

    /// 统计/排序用的规范序号，词表外类型排在最后
    pub fn canonical_rank(&self) -> usize {
        Self::KNOWN
            .iter()
            .position(|known| known == self)
            .unwrap_or(Self::KNOWN.len())
    }
}

impl Display for RuleType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RuleType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
