mod enums;
mod rule;

// 导出常用项
pub use enums::RuleType;
pub use rule::{Rule, RuleSet};
