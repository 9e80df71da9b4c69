//! rulerefinery-engine：代理路由规则的解析、去重排序、过滤与多方言导出

// 错误定义
pub mod error;
// 核心公共结构体+枚举
pub mod core;
// 单行规则解析
pub mod parser;
// glob 过滤（白名单/黑名单）
pub mod filter;
// 规范化+去重+按类型排序策略
pub mod sorter;
// 多方言导出
pub mod exporter;
// 各阶段统计
pub mod stats;
// 规则库聚合根
pub mod optimizer;
// 日志预览等工具
pub mod utils;

// 顶层导出常用类型
pub use self::core::{Rule, RuleSet, RuleType};
pub use error::{CoreError, CoreResult};
pub use exporter::Dialect;
pub use filter::{GlobMatcher, GlobPatternMatcher, RuleFilter};
pub use optimizer::Optimizer;
pub use parser::parse_rule;
pub use sorter::{SortPolicy, SortPolicyTable};
pub use stats::{DedupStats, ExportSummary, ExportedFile, LoadReport, RuleSetStats, RuleStatistics};
