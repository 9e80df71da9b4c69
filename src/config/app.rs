//! 应用配置（config.yaml）与生成选项
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{RefineryError, RefineryResult};

/// 日志配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// env_logger 过滤串，如 `info`、`rulerefinery_engine=debug`
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// 规则生成配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateRulesConfig {
    /// 规则集分类文件
    pub classified_rules_file: PathBuf,
    /// 输出目录
    pub output_rules_path: PathBuf,
    /// 远程规则的本地缓存目录
    pub source_cache_dir: PathBuf,
}

impl Default for GenerateRulesConfig {
    fn default() -> Self {
        Self {
            classified_rules_file: PathBuf::from("./classified_rules.yaml"),
            output_rules_path: PathBuf::from("./output"),
            source_cache_dir: PathBuf::from("./rule_sources"),
        }
    }
}

/// 应用配置根结构，所有字段都有默认值
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub generate_rules: GenerateRulesConfig,
}

impl AppConfig {
    pub fn load(path: impl AsRef<Path>) -> RefineryResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| RefineryError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        // 空文件等价于全默认
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&content).map_err(|source| RefineryError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// 由配置派生生成选项
    pub fn generate_options(&self) -> GenerateOptions {
        GenerateOptionsBuilder::new()
            .output_dir(self.generate_rules.output_rules_path.clone())
            .source_cache_dir(self.generate_rules.source_cache_dir.clone())
            .build()
    }
}

/// 一次生成运行的选项
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOptions {
    pub output_dir: PathBuf,
    pub source_cache_dir: PathBuf,
    /// 统计信息 JSON 输出路径（可选）
    pub stats_json: Option<PathBuf>,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        let defaults = GenerateRulesConfig::default();
        Self {
            output_dir: defaults.output_rules_path,
            source_cache_dir: defaults.source_cache_dir,
            stats_json: None,
        }
    }
}

/// 生成选项构建器（链式 API）
#[derive(Debug, Clone, Default)]
pub struct GenerateOptionsBuilder {
    options: GenerateOptions,
}

impl GenerateOptionsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.options.output_dir = path.into();
        self
    }

    pub fn source_cache_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.options.source_cache_dir = path.into();
        self
    }

    pub fn stats_json(mut self, path: Option<PathBuf>) -> Self {
        self.options.stats_json = path;
        self
    }

    pub fn build(self) -> GenerateOptions {
        self.options
    }
}
