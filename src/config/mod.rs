mod app;
mod rule;

pub use app::{AppConfig, GenerateOptions, GenerateOptionsBuilder, GenerateRulesConfig, LoggingConfig};
pub use rule::{RuleSetConfig, RuleSetsConfig};
