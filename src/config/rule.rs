//! 规则集分类配置（classified_rules）
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RefineryError, RefineryResult};

/// 单个规则集的来源与过滤配置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSetConfig {
    /// 规则集描述（可选）
    pub description: String,
    /// 远程规则地址（只读取本地缓存，不下载）
    pub urls: Vec<String>,
    /// 本地文件或目录
    pub files: Vec<String>,
    /// 手工规则，每项一行
    pub rules: Vec<String>,
    /// 排除的来源（URL 或本地路径），通常已被其他规则集收录
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exclude_sources: Vec<String>,
    /// 规则内容白名单（glob）
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<String>,
    /// 规则内容黑名单（glob）
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub excludes: Vec<String>,
}

impl RuleSetConfig {
    pub fn source_count(&self) -> usize {
        self.urls.len() + self.files.len() + self.rules.len()
    }
}

/// 规则集配置文件根结构（按名称有序）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSetsConfig {
    #[serde(default)]
    pub classified_rules: BTreeMap<String, RuleSetConfig>,
}

impl RuleSetsConfig {
    /// 读取 + 解析 + 验证
    pub fn load(path: impl AsRef<Path>) -> RefineryResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| RefineryError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self =
            serde_yaml::from_str(&content).map_err(|source| RefineryError::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        log::debug!(
            "规则集配置已加载：{} | {} 个规则集",
            path.display(),
            config.classified_rules.len()
        );
        Ok(config)
    }

    /// 每个规则集至少有一种来源；URL/文件路径不能为空串
    pub fn validate(&self) -> RefineryResult<()> {
        for (name, rule_set) in &self.classified_rules {
            if rule_set.source_count() == 0 {
                return Err(RefineryError::InvalidConfig(format!(
                    "规则集 '{}' 没有配置 URL、本地文件或手工规则",
                    name
                )));
            }
            if let Some(i) = rule_set.urls.iter().position(|u| u.trim().is_empty()) {
                return Err(RefineryError::InvalidConfig(format!(
                    "规则集 '{}' 的第 {} 个 URL 为空",
                    name,
                    i + 1
                )));
            }
            if let Some(i) = rule_set.files.iter().position(|f| f.trim().is_empty()) {
                return Err(RefineryError::InvalidConfig(format!(
                    "规则集 '{}' 的第 {} 个文件路径为空",
                    name,
                    i + 1
                )));
            }
        }
        Ok(())
    }

    pub fn rule_set_names(&self) -> Vec<&str> {
        self.classified_rules.keys().map(String::as_str).collect()
    }

    pub fn get(&self, name: &str) -> Option<&RuleSetConfig> {
        self.classified_rules.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
classified_rules:
  google:
    description: "Google services"
    urls: [ "https://raw.githubusercontent.com/o/r/main/Google.list" ]
    files: [ "./rules/google.list" ]
    rules: [ "DOMAIN-SUFFIX,google.com" ]
    exclude_sources: [ "./rules/old.list" ]
    filters: [ "DOMAIN*" ]
    excludes: [ "DOMAIN-KEYWORD,*" ]
  ads:
    rules: [ "DOMAIN,ads.example.com" ]
"#;

    #[test]
    fn test_parse_full_config() {
        let config: RuleSetsConfig = serde_yaml::from_str(SAMPLE).unwrap();
        config.validate().unwrap();
        assert_eq!(config.rule_set_names(), vec!["ads", "google"]);

        let google = config.get("google").unwrap();
        assert_eq!(google.description, "Google services");
        assert_eq!(google.source_count(), 3);
        assert_eq!(google.filters, vec!["DOMAIN*"]);

        let ads = config.get("ads").unwrap();
        assert!(ads.urls.is_empty());
        assert!(ads.excludes.is_empty());
    }

    #[test]
    fn test_rule_set_without_sources_rejected() {
        let config: RuleSetsConfig =
            serde_yaml::from_str("classified_rules:\n  empty:\n    description: nothing\n").unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("'empty'"));
    }

    #[test]
    fn test_blank_file_entry_reports_index() {
        let config: RuleSetsConfig =
            serde_yaml::from_str("classified_rules:\n  x:\n    files: [ \"a.list\", \"\" ]\n").unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("第 2 个文件路径为空"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("classified_rules.yaml");
        fs::write(&path, SAMPLE).unwrap();
        let config = RuleSetsConfig::load(&path).unwrap();
        assert_eq!(config.classified_rules.len(), 2);

        let missing = RuleSetsConfig::load(dir.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(missing, RefineryError::ConfigRead { .. }));
    }
}
