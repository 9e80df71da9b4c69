mod matcher;
mod rule_filter;

pub use matcher::{GlobMatcher, GlobPatternMatcher};
pub use rule_filter::RuleFilter;
