//! 规则集生成流程：解析来源 → 加载 → 挂载过滤器 → 去重排序 → 导出 → 统计
use std::fs;
use std::time::Instant;

use rulerefinery_engine::{DedupStats, ExportSummary, LoadReport, Optimizer, RuleStatistics};
use serde::Serialize;

use crate::config::{GenerateOptions, RuleSetsConfig};
use crate::error::RefineryResult;
use crate::loader::{RuleSource, RulesLoader};

/// 一次生成运行的汇总
#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerateReport {
    /// 成功加载的文件数
    pub loaded_files: usize,
    /// 打开失败的文件数
    pub failed_files: usize,
    /// 全部来源的行级加载统计
    pub load: LoadReport,
    pub dedup: DedupStats,
    pub export: ExportSummary,
    pub statistics: RuleStatistics,
}

/// 执行完整生成流程
/// 单个文件加载失败只记录并继续；导出失败直接返回错误
pub fn generate_rulesets(config: &RuleSetsConfig, options: &GenerateOptions) -> RefineryResult<GenerateReport> {
    let total_start = Instant::now();
    log::info!(
        "开始生成规则集 | 规则集数: {} | 输出目录: {}",
        config.classified_rules.len(),
        options.output_dir.display()
    );

    let mut report = GenerateReport::default();
    let mut optimizer = Optimizer::new();

    // 1. 解析来源
    let resolved = RulesLoader::new(config, &options.source_cache_dir).resolve_all();

    // 2. 加载
    for rule_set in &resolved {
        for source in &rule_set.sources {
            match source {
                RuleSource::File(path) => match optimizer.load_file(path, &rule_set.name) {
                    Ok(load) => {
                        report.loaded_files += 1;
                        report.load.merge(load);
                    }
                    Err(e) => {
                        report.failed_files += 1;
                        log::warn!("[RULE LOAD] {} 加载失败: {}", rule_set.name, e);
                    }
                },
                RuleSource::Inline(lines) => {
                    let load = optimizer.load_lines(
                        &rule_set.name,
                        lines.iter().map(String::as_str),
                        "manual rules",
                    );
                    report.load.merge(load);
                }
            }
        }
    }

    // 3. 挂载过滤器（规则集未成功加载时只告警）
    for rule_set in &resolved {
        if rule_set.filters.is_empty() && rule_set.excludes.is_empty() {
            continue;
        }
        if let Err(e) = optimizer.set_filters(
            &rule_set.name,
            rule_set.filters.clone(),
            rule_set.excludes.clone(),
        ) {
            log::warn!("[RULE FILTER] {}", e);
        }
    }

    // 4. 去重排序
    report.dedup = optimizer.deduplicate();

    // 5. 导出
    report.export = optimizer.export(&options.output_dir)?;

    // 6. 统计
    report.statistics = optimizer.statistics();
    report.statistics.print_stats();
    if let Some(path) = &options.stats_json {
        fs::write(path, report.statistics.to_json()?)?;
        log::info!("统计信息已写入: {}", path.display());
    }

    log::info!(
        "规则集生成完成 | 耗时: {:?} | 文件: 成功 {} / 失败 {} | 规则: {} | 导出文件: {}",
        total_start.elapsed(),
        report.loaded_files,
        report.failed_files,
        report.statistics.total_rules(),
        report.export.files_written()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GenerateOptionsBuilder, RuleSetConfig};
    use rulerefinery_engine::RuleType;
    use std::path::Path;

    fn read_rules(path: &Path) -> Vec<String> {
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_generate_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("google.list");
        fs::write(
            &source,
            "# Google\nDOMAIN-SUFFIX,google.com\nDOMAIN-SUFFIX,google.com\nIP-CIDR,8.8.8.8\nDOMAIN-KEYWORD,ads\nDOMAIN,\n",
        )
        .unwrap();

        let mut config = RuleSetsConfig::default();
        config.classified_rules.insert(
            "google".into(),
            RuleSetConfig {
                files: vec![source.to_string_lossy().to_string(), "/missing/dir/x.list".into()],
                rules: vec!["DOMAIN,www.google.com".into()],
                excludes: vec!["DOMAIN-KEYWORD,*".into()],
                ..Default::default()
            },
        );

        let out = dir.path().join("out");
        let stats_path = dir.path().join("stats.json");
        let options = GenerateOptionsBuilder::new()
            .output_dir(&out)
            .source_cache_dir(dir.path().join("cache"))
            .stats_json(Some(stats_path.clone()))
            .build();

        let report = generate_rulesets(&config, &options).unwrap();
        assert_eq!(report.loaded_files, 1);
        assert_eq!(report.failed_files, 0);
        assert_eq!(report.load.malformed, 1);
        assert_eq!(report.dedup.total_removed, 1);
        assert_eq!(report.export.files_written(), 12);

        let google = report.statistics.get("google").unwrap();
        assert_eq!(google.count_of(&RuleType::DomainSuffix), 1);
        assert_eq!(google.count_of(&RuleType::DomainKeyword), 1);

        assert_eq!(
            read_rules(&out.join("google/google_domain.list")),
            ["www.google.com", "+.google.com"]
        );
        assert_eq!(read_rules(&out.join("google/google_ipcidr.list")), ["8.8.8.8/32"]);
        // KEYWORD 被 excludes 拦下
        assert!(read_rules(&out.join("google/google_classical.list")).is_empty());

        let json = fs::read_to_string(&stats_path).unwrap();
        assert!(json.contains("\"google\""));
    }

    #[test]
    fn test_rule_set_without_loaded_rules_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = RuleSetsConfig::default();
        config.classified_rules.insert(
            "ghost".into(),
            RuleSetConfig {
                files: vec!["/definitely/not/here.list".into()],
                filters: vec!["DOMAIN,*".into()],
                ..Default::default()
            },
        );
        let options = GenerateOptionsBuilder::new()
            .output_dir(dir.path().join("out"))
            .source_cache_dir(dir.path().join("cache"))
            .build();

        let report = generate_rulesets(&config, &options).unwrap();
        assert_eq!(report.loaded_files, 0);
        assert!(report.statistics.rule_sets.is_empty());
        assert_eq!(report.export.files_written(), 0);
        assert!(!dir.path().join("out/ghost").exists());
    }
}
