//! rulerefinery 命令行入口
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use rulerefinery::{generate_rulesets, init_logger, AppConfig, GenerateOptionsBuilder, RuleSetsConfig};

/// 代理分流规则集生成：去重、排序、过滤，并导出 domain / ipcidr / classical 格式
#[derive(Debug, Parser)]
#[command(name = "rulerefinery", version, about)]
struct Cli {
    /// 应用配置文件（缺省时使用内置默认值）
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 规则集分类文件，覆盖配置中的 classified_rules_file
    #[arg(short, long)]
    rules: Option<PathBuf>,

    /// 输出目录，覆盖配置中的 output_rules_path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// 日志级别，覆盖配置中的 logging.level
    #[arg(long)]
    log_level: Option<String>,

    /// 统计信息 JSON 输出路径
    #[arg(long)]
    stats_json: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let app_config = match &cli.config {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => AppConfig::default(),
    };

    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| app_config.logging.level.clone());
    init_logger(&level);

    let rules_file = cli
        .rules
        .clone()
        .unwrap_or_else(|| app_config.generate_rules.classified_rules_file.clone());
    let rule_sets = RuleSetsConfig::load(&rules_file)
        .with_context(|| format!("failed to load rule sets {}", rules_file.display()))?;

    let defaults = app_config.generate_options();
    let options = GenerateOptionsBuilder::new()
        .output_dir(cli.output.unwrap_or(defaults.output_dir))
        .source_cache_dir(defaults.source_cache_dir)
        .stats_json(cli.stats_json)
        .build();

    let report = generate_rulesets(&rule_sets, &options).context("rule set generation failed")?;
    log::info!(
        "完成：{} 个规则集，{} 条规则，{} 个文件",
        report.statistics.rule_sets.len(),
        report.statistics.total_rules(),
        report.export.files_written()
    );
    Ok(())
}
