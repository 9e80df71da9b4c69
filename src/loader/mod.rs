mod rules_loader;

pub use rules_loader::{ResolvedRuleSet, RuleSource, RulesLoader};
