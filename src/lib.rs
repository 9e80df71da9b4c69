//! rulerefinery：代理分流规则集生成工具
//! 规则内核见 `rulerefinery-engine`，本 crate 负责配置、来源解析与流程编排

// 错误定义
pub mod error;
// 配置（应用配置 + 规则集分类配置）
pub mod config;
// 规则来源解析
pub mod loader;
// 生成流程
pub mod workflow;
// 日志初始化
pub mod logger;

// 顶层导出常用类型
pub use config::{AppConfig, GenerateOptions, GenerateOptionsBuilder, RuleSetConfig, RuleSetsConfig};
pub use error::{RefineryError, RefineryResult};
pub use loader::{ResolvedRuleSet, RuleSource, RulesLoader};
pub use logger::init_logger;
pub use workflow::{generate_rulesets, GenerateReport};

// 内核重导出
pub use rulerefinery_engine::{Optimizer, RuleType};
