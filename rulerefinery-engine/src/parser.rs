//! 单行规则文本解析
//! 输入格式：`TYPE,payload[,options]`，兼容 Surge/Clash list、YAML payload 列表等常见写法
use crate::core::{Rule, RuleType};
use crate::error::{CoreError, CoreResult};

/// 注释前缀
const COMMENT_PREFIXES: [&str; 4] = ["#", ";", "//", "---"];

/// 文件名回显行的后缀（规则源里常见的 `xxx.list` 标题行）
const FILE_NAME_SUFFIXES: [&str; 4] = [".list", ".yaml", ".txt", ".conf"];

/// 解析单行规则
/// - `Ok(Some(rule))`：有效规则
/// - `Ok(None)`：非数据行（空行/注释/YAML 字段/标题行），直接跳过
/// - `Err(MalformedLine)`：形似规则但缺少类型或载荷
pub fn parse_rule(line: &str) -> CoreResult<Option<Rule>> {
    let mut line = line.trim();

    if line.is_empty() {
        return Ok(None);
    }

    if COMMENT_PREFIXES.iter().any(|prefix| line.starts_with(prefix)) {
        return Ok(None);
    }

    // YAML 列表项 "- DOMAIN,example.com"
    if let Some(rest) = line.strip_prefix('-') {
        line = rest.trim();
        if line.is_empty() {
            return Ok(None);
        }
    }

    if is_yaml_field(line) {
        return Ok(None);
    }

    // 规则必须有类型/载荷分隔符
    if !line.contains(',') {
        return Ok(None);
    }

    if FILE_NAME_SUFFIXES.iter().any(|suffix| line.ends_with(suffix)) {
        return Ok(None);
    }

    let parts: Vec<&str> = line.split(',').collect();
    if parts.len() < 2 {
        return Err(CoreError::MalformedLine {
            line: line.to_string(),
        });
    }

    let type_token = parts[0].trim();
    let payload = parts[1].trim();
    if type_token.is_empty() || payload.is_empty() {
        return Err(CoreError::MalformedLine {
            line: line.to_string(),
        });
    }

    Ok(Some(Rule {
        rule_type: RuleType::from_token(type_token),
        payload: payload.to_string(),
        options: parts.get(2).map(|opt| opt.trim().to_string()).unwrap_or_default(),
    }))
}

/// `payload:`、`behavior: classical` 这类 YAML 键值行：
/// 含冒号、不含逗号，且冒号前是单个词
fn is_yaml_field(line: &str) -> bool {
    if line.contains(',') {
        return false;
    }
    match line.find(':') {
        Some(idx) => {
            let key = line[..idx].trim();
            !key.contains(' ') && !key.contains(',')
        }
        None => false,
    }
}
