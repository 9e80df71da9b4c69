//! 各阶段统计数据的定义与格式化输出
use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

use crate::core::RuleType;
use crate::error::CoreResult;

// ========== 加载统计 ==========
/// 单次加载（文件或内存行）的结果
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    /// 入库的规则数
    pub accepted: usize,
    /// 跳过的非数据行（空行/注释/YAML 字段等）
    pub skipped: usize,
    /// 格式非法、已记录并丢弃的行
    pub malformed: usize,
}

impl LoadReport {
    pub fn merge(&mut self, other: LoadReport) {
        self.accepted += other.accepted;
        self.skipped += other.skipped;
        self.malformed += other.malformed;
    }
}

// ========== 去重统计 ==========
/// 单个规则集的去重结果
#[derive(Debug, Default, Clone, Serialize)]
pub struct RuleSetDedup {
    pub name: String,
    pub original: usize,
    pub kept: usize,
    pub removed: usize,
}

/// 去重统计
#[derive(Debug, Default, Clone, Serialize)]
pub struct DedupStats {
    /// 按规则集名称排序
    pub rule_sets: Vec<RuleSetDedup>,
    pub total_original: usize,
    pub total_kept: usize,
    pub total_removed: usize,
}

impl DedupStats {
    pub(crate) fn record(&mut self, name: &str, original: usize, kept: usize) {
        let removed = original.saturating_sub(kept);
        self.total_original += original;
        self.total_kept += kept;
        self.total_removed += removed;
        self.rule_sets.push(RuleSetDedup {
            name: name.to_string(),
            original,
            kept,
            removed,
        });
    }

    /// 结构化日志输出
    pub fn print_stats(&self, total_time: Duration) {
        log::info!(
            "[RULE DEDUP] completed | Time: {:?} | Rule sets: {} | Original rules: {} | Kept rules: {} | Removed duplicates: {}",
            total_time,
            self.rule_sets.len(),
            self.total_original,
            self.total_kept,
            self.total_removed
        );
        for set in &self.rule_sets {
            log::debug!(
                "[RULE DEDUP] {} (original {} -> kept {}, removed {})",
                set.name,
                set.original,
                set.kept,
                set.removed
            );
        }
    }
}

// ========== 导出统计 ==========
/// 一对导出文件（同一方言的 .yaml + .list）
#[derive(Debug, Clone, Serialize)]
pub struct ExportedFile {
    pub rule_set: String,
    /// 文件名后缀，如 `classical_no_resolve`
    pub dialect: &'static str,
    pub yaml_path: PathBuf,
    pub list_path: PathBuf,
    /// 写入的规则条数，0 表示占位文件
    pub rule_count: usize,
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct ExportSummary {
    pub files: Vec<ExportedFile>,
}

impl ExportSummary {
    /// 实际落盘的文件数（每个方言两份）
    pub fn files_written(&self) -> usize {
        self.files.len() * 2
    }

    pub fn placeholder_count(&self) -> usize {
        self.files.iter().filter(|f| f.rule_count == 0).count()
    }

    /// 查找某规则集某方言的导出记录
    pub fn find(&self, rule_set: &str, dialect: &str) -> Option<&ExportedFile> {
        self.files
            .iter()
            .find(|f| f.rule_set == rule_set && f.dialect == dialect)
    }
}

// ========== 规则库统计 ==========
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeCount {
    pub rule_type: RuleType,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RuleSetStats {
    pub name: String,
    pub total: usize,
    /// 规范类型顺序，词表外类型在最后
    pub by_type: Vec<TypeCount>,
}

impl RuleSetStats {
    pub fn count_of(&self, rule_type: &RuleType) -> usize {
        self.by_type
            .iter()
            .find(|c| &c.rule_type == rule_type)
            .map(|c| c.count)
            .unwrap_or(0)
    }
}

/// 规则库整体统计（规则集按名称排序）
#[derive(Debug, Default, Clone, Serialize)]
pub struct RuleStatistics {
    pub rule_sets: Vec<RuleSetStats>,
}

impl RuleStatistics {
    pub fn total_rules(&self) -> usize {
        self.rule_sets.iter().map(|s| s.total).sum()
    }

    pub fn get(&self, name: &str) -> Option<&RuleSetStats> {
        self.rule_sets.iter().find(|s| s.name == name)
    }

    pub fn to_json(&self) -> CoreResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn print_stats(&self) {
        log::info!(
            "Rule statistics | Rule sets: {} | Total rules: {}",
            self.rule_sets.len(),
            self.total_rules()
        );
        for set in &self.rule_sets {
            let breakdown = set
                .by_type
                .iter()
                .map(|c| format!("{} {}", c.rule_type, c.count))
                .collect::<Vec<_>>()
                .join(" | ");
            log::info!("  {} ({} rules): {}", set.name, set.total, breakdown);
        }
    }
}
