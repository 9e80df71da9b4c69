//! CIDR 文本处理（纯字符串层面，不校验地址合法性）

/// 为缺少掩码的地址补默认掩码：含 `:` 视为 IPv6 补 `/128`，否则补 `/32`
/// 逗号后的附加参数（如 no-resolve）原样保留
pub fn normalize_cidr(rule: &str) -> String {
    let (cidr_part, rest) = match rule.find(',') {
        Some(idx) => (&rule[..idx], &rule[idx..]),
        None => (rule, ""),
    };

    if cidr_part.contains('/') {
        return rule.to_string();
    }

    let default_mask = if cidr_part.contains(':') { "/128" } else { "/32" };
    format!("{}{}{}", cidr_part, default_mask, rest)
}

/// 提取掩码长度：取第一个逗号前的部分，`/` 后的前导数字
/// 无 `/` 时按地址族给默认值；`/` 后无数字时返回 0
pub fn extract_cidr_mask(rule: &str) -> u32 {
    let cidr_part = rule.split(',').next().unwrap_or_default();

    match cidr_part.find('/') {
        Some(idx) => {
            let digits: String = cidr_part[idx + 1..]
                .chars()
                .take_while(|c| c.is_ascii_digit())
                .collect();
            digits.parse().unwrap_or(0)
        }
        None if cidr_part.contains(':') => 128,
        None => 32,
    }
}
