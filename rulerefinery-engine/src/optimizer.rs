//! 规则库聚合根：加载 → 挂载过滤器 → 去重排序 → 导出
use std::fs;
use std::path::Path;
use std::time::Instant;

use rustc_hash::FxHashMap;

use crate::core::{RuleSet, RuleType};
use crate::error::{CoreError, CoreResult};
use crate::exporter::RuleSetExporter;
use crate::filter::{GlobMatcher, GlobPatternMatcher};
use crate::parser::parse_rule;
use crate::sorter::SortPolicyTable;
use crate::stats::{DedupStats, ExportSummary, LoadReport, RuleSetStats, RuleStatistics, TypeCount};
use crate::utils::preview_compact;

const UTF8_BOM: char = '\u{feff}';
const PREVIEW_LEN: usize = 120;

/// 规则优化器，一次运行创建一个，按引用在流水线中传递
pub struct Optimizer {
    rule_sets: FxHashMap<String, RuleSet>,
    sort_table: SortPolicyTable,
    matcher: Box<dyn GlobMatcher>,
}

impl Default for Optimizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Optimizer {
    pub fn new() -> Self {
        Self::with_matcher(Box::new(GlobPatternMatcher::new()))
    }

    /// 替换 glob 匹配实现
    pub fn with_matcher(matcher: Box<dyn GlobMatcher>) -> Self {
        Self {
            rule_sets: FxHashMap::default(),
            sort_table: SortPolicyTable::default(),
            matcher,
        }
    }

    /// 替换排序策略表
    pub fn with_sort_table(mut self, sort_table: SortPolicyTable) -> Self {
        self.sort_table = sort_table;
        self
    }

    // ===================== 加载 =====================

    /// 加载规则文件到指定规则集（同名多次加载会累积）
    /// 文件打不开返回 `RuleFileOpen`；单行格式错误只记录并跳过
    pub fn load_file(&mut self, path: impl AsRef<Path>, rule_set_name: &str) -> CoreResult<LoadReport> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| CoreError::RuleFileOpen {
            path: path.to_path_buf(),
            source,
        })?;

        // 非法 UTF-8 不中断整个文件
        let content = String::from_utf8_lossy(&bytes);
        let content = content.strip_prefix(UTF8_BOM).unwrap_or(&*content);

        let label = path.display().to_string();
        let report = self.load_lines(rule_set_name, content.lines(), &label);
        Ok(report)
    }

    /// 加载内存中的规则行（配置里的手动规则等）
    pub fn load_lines<'l, I>(&mut self, rule_set_name: &str, lines: I, source_label: &str) -> LoadReport
    where
        I: IntoIterator<Item = &'l str>,
    {
        let rule_set = self
            .rule_sets
            .entry(rule_set_name.to_string())
            .or_insert_with(|| RuleSet::new(rule_set_name));

        let mut report = LoadReport::default();
        for (line_no, line) in lines.into_iter().enumerate() {
            match parse_rule(line) {
                Ok(Some(rule)) => {
                    rule_set.push(rule);
                    report.accepted += 1;
                }
                Ok(None) => report.skipped += 1,
                Err(e) => {
                    report.malformed += 1;
                    log::warn!(
                        "[RULE LOAD] {}:{} skipped: {} | {}",
                        source_label,
                        line_no + 1,
                        e,
                        preview_compact(line, PREVIEW_LEN)
                    );
                }
            }
        }

        log::debug!(
            "[RULE LOAD] {} -> {} | accepted {} | skipped {} | malformed {}",
            source_label,
            rule_set_name,
            report.accepted,
            report.skipped,
            report.malformed
        );
        report
    }

    /// 挂载过滤器，整体替换（后写覆盖）；规则集不存在时不做任何修改
    pub fn set_filters(
        &mut self,
        rule_set_name: &str,
        filters: Vec<String>,
        excludes: Vec<String>,
    ) -> CoreResult<()> {
        let rule_set = self
            .rule_sets
            .get_mut(rule_set_name)
            .ok_or_else(|| CoreError::UnknownRuleSet(rule_set_name.to_string()))?;

        log::debug!(
            "[RULE FILTER] {} filters={:?} excludes={:?}",
            rule_set_name,
            filters,
            excludes
        );
        rule_set.filters = filters;
        rule_set.excludes = excludes;
        Ok(())
    }

    // ===================== 去重排序 =====================

    /// 每个规则集、每种类型：规范化 → 去重 → 按策略排序（幂等）
    pub fn deduplicate(&mut self) -> DedupStats {
        let start = Instant::now();
        let mut stats = DedupStats::default();

        for name in self.rule_set_names() {
            let Some(rule_set) = self.rule_sets.get_mut(&name) else {
                continue;
            };
            let original = rule_set.total_rules();
            for (rule_type, rules) in rule_set.rules_by_type.iter_mut() {
                let removed = self.sort_table.sort_rules(rule_type, rules);
                if removed > 0 {
                    log::trace!("[RULE DEDUP] {} {} removed {}", name, rule_type, removed);
                }
            }
            stats.record(&name, original, rule_set.total_rules());
        }

        stats.print_stats(start.elapsed());
        stats
    }

    // ===================== 导出 =====================

    /// 按名称顺序导出全部规则集；文件系统错误立即中止
    pub fn export(&self, output_dir: impl AsRef<Path>) -> CoreResult<ExportSummary> {
        let output_dir = output_dir.as_ref();
        let exporter = RuleSetExporter::new(self.matcher.as_ref());
        let mut summary = ExportSummary::default();

        for name in self.rule_set_names() {
            if let Some(rule_set) = self.rule_sets.get(&name) {
                summary.files.extend(exporter.export(rule_set, output_dir)?);
            }
        }

        log::info!(
            "[RULE EXPORT] {} rule sets -> {} ({} files, {} placeholders)",
            self.rule_sets.len(),
            output_dir.display(),
            summary.files_written(),
            summary.placeholder_count()
        );
        Ok(summary)
    }

    // ===================== 查询 =====================

    pub fn statistics(&self) -> RuleStatistics {
        let rule_sets = self
            .rule_set_names()
            .into_iter()
            .filter_map(|name| self.rule_sets.get(&name))
            .map(|rule_set| RuleSetStats {
                name: rule_set.name.clone(),
                total: rule_set.total_rules(),
                by_type: rule_set
                    .present_types()
                    .into_iter()
                    .map(|rule_type| TypeCount {
                        rule_type: rule_type.clone(),
                        count: rule_set.rules_of(rule_type).len(),
                    })
                    .collect(),
            })
            .collect();
        RuleStatistics { rule_sets }
    }

    pub fn rule_set(&self, name: &str) -> Option<&RuleSet> {
        self.rule_sets.get(name)
    }

    /// 规则集名称（排序后）
    pub fn rule_set_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.rule_sets.keys().cloned().collect();
        names.sort();
        names
    }

    /// 某规则集某类型的当前规则
    pub fn rules_of(&self, name: &str, rule_type: &RuleType) -> &[String] {
        self.rule_sets
            .get(name)
            .map(|set| set.rules_of(rule_type))
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn load(opt: &mut Optimizer, name: &str, lines: &[&str]) -> LoadReport {
        opt.load_lines(name, lines.iter().copied(), "test")
    }

    #[test]
    fn test_load_lines_accumulates_and_reports() {
        let mut opt = Optimizer::new();
        let report = load(&mut opt, "a", &["# c", "DOMAIN,a.com", "DOMAIN,", "payload:"]);
        assert_eq!(report, LoadReport { accepted: 1, skipped: 2, malformed: 1 });
        load(&mut opt, "a", &["DOMAIN,b.com"]);
        assert_eq!(opt.rules_of("a", &RuleType::Domain), ["a.com", "b.com"]);
    }

    #[test]
    fn test_load_file_handles_bom_crlf_and_bad_utf8() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"\xEF\xBB\xBFDOMAIN,a.com\r\nDOMAIN-SUFFIX,b\xFF.com\r\n").unwrap();

        let mut opt = Optimizer::new();
        let report = opt.load_file(file.path(), "x").unwrap();
        assert_eq!(report.accepted, 2);
        assert_eq!(opt.rules_of("x", &RuleType::Domain), ["a.com"]);
        assert_eq!(opt.rules_of("x", &RuleType::DomainSuffix).len(), 1);
    }

    #[test]
    fn test_load_missing_file_is_error_and_creates_nothing() {
        let mut opt = Optimizer::new();
        let err = opt.load_file("/definitely/not/here.list", "ghost").unwrap_err();
        assert!(matches!(err, CoreError::RuleFileOpen { .. }));
        assert!(opt.rule_set("ghost").is_none());
    }

    #[test]
    fn test_set_filters_unknown_rule_set() {
        let mut opt = Optimizer::new();
        let err = opt.set_filters("nope", vec!["*".into()], vec![]).unwrap_err();
        assert!(matches!(err, CoreError::UnknownRuleSet(ref n) if n == "nope"));
        assert!(opt.rule_set_names().is_empty());
    }

    #[test]
    fn test_set_filters_last_write_wins() {
        let mut opt = Optimizer::new();
        load(&mut opt, "a", &["DOMAIN,a.com"]);
        opt.set_filters("a", vec!["DOMAIN,*".into()], vec!["x".into()]).unwrap();
        opt.set_filters("a", vec![], vec!["DOMAIN,b*".into()]).unwrap();
        let set = opt.rule_set("a").unwrap();
        assert!(set.filters.is_empty());
        assert_eq!(set.excludes, vec!["DOMAIN,b*"]);
    }

    #[test]
    fn test_deduplicate_idempotent() {
        let mut opt = Optimizer::new();
        load(
            &mut opt,
            "a",
            &["IP-CIDR,1.2.3.4", "IP-CIDR,1.2.3.4/32", "DOMAIN,b.com", "DOMAIN,a.com", "DOMAIN,b.com"],
        );
        let first = opt.deduplicate();
        assert_eq!(first.total_original, 5);
        assert_eq!(first.total_removed, 2);
        assert_eq!(opt.rules_of("a", &RuleType::IpCidr), ["1.2.3.4/32"]);
        assert_eq!(opt.rules_of("a", &RuleType::Domain), ["a.com", "b.com"]);

        let second = opt.deduplicate();
        assert_eq!(second.total_removed, 0);
        assert_eq!(opt.rules_of("a", &RuleType::Domain), ["a.com", "b.com"]);
    }

    #[test]
    fn test_end_to_end_test_rule_set() {
        let dir = tempfile::tempdir().unwrap();
        let mut opt = Optimizer::new();
        load(
            &mut opt,
            "test",
            &["IP-CIDR,1.2.3.0/24", "IP-CIDR,1.2.3.0/24", "DOMAIN-SUFFIX,.example.com"],
        );
        opt.deduplicate();
        let summary = opt.export(dir.path()).unwrap();
        assert_eq!(summary.files_written(), 12);

        let read = |file: &str| fs::read_to_string(dir.path().join("test").join(file)).unwrap();
        let rules = |text: String| -> Vec<String> {
            text.lines()
                .filter(|l| !l.is_empty() && !l.starts_with('#'))
                .map(str::to_string)
                .collect()
        };

        assert_eq!(rules(read("test_domain.list")), ["+.example.com"]);
        assert_eq!(rules(read("test_ipcidr.list")), ["1.2.3.0/24"]);
        assert_eq!(
            rules(read("test_classical_no_resolve.list")),
            ["IP-CIDR,1.2.3.0/24,no-resolve"]
        );
        assert!(rules(read("test_classical.list")).is_empty());
        assert_eq!(
            rules(read("test_classical_all.list")),
            ["DOMAIN-SUFFIX,.example.com", "IP-CIDR,1.2.3.0/24"]
        );
    }

    #[test]
    fn test_statistics_sorted_and_counts_unknown_types() {
        let mut opt = Optimizer::new();
        load(&mut opt, "b", &["USER-AGENT,curl*", "DOMAIN,a.com"]);
        load(&mut opt, "a", &["GEOIP,CN"]);

        let stats = opt.statistics();
        let names: Vec<_> = stats.rule_sets.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);

        let b = stats.get("b").unwrap();
        assert_eq!(b.total, 2);
        assert_eq!(b.by_type[0].rule_type, RuleType::Domain);
        assert_eq!(b.count_of(&RuleType::Other("USER-AGENT".into())), 1);
    }
}
