//! 多方言导出：每个规则集固定产出 6 种方言 × (.yaml + .list) 共 12 个文件
mod dialect;
mod render;

use std::fs;
use std::path::Path;

pub use dialect::{
    canonical_domain_suffix, ensure_no_resolve, strip_no_resolve, Dialect, CLASSICAL_EXPORT_ORDER,
};
pub use render::PLACEHOLDER_COMMENT;

use crate::core::RuleSet;
use crate::error::{CoreError, CoreResult};
use crate::filter::{GlobMatcher, RuleFilter};
use crate::stats::ExportedFile;

/// 单个规则集的导出器
pub struct RuleSetExporter<'a> {
    matcher: &'a dyn GlobMatcher,
}

impl<'a> RuleSetExporter<'a> {
    pub fn new(matcher: &'a dyn GlobMatcher) -> Self {
        Self { matcher }
    }

    /// 导出到 `output_dir/<name>/`，任何文件系统错误立即中止
    pub fn export(&self, rule_set: &RuleSet, output_dir: &Path) -> CoreResult<Vec<ExportedFile>> {
        let rule_set_dir = output_dir.join(&rule_set.name);
        fs::create_dir_all(&rule_set_dir).map_err(|source| CoreError::Export {
            path: rule_set_dir.clone(),
            source,
        })?;

        let filter = RuleFilter::new(self.matcher, &rule_set.filters, &rule_set.excludes);
        let mut exported = Vec::with_capacity(Dialect::ALL.len());

        for dialect in Dialect::ALL {
            let sections = render::collect_sections(dialect, rule_set, &filter);
            let rendered = render::render(dialect, &rule_set.name, &sections);

            let base = format!("{}_{}", rule_set.name, dialect.file_suffix());
            let yaml_path = rule_set_dir.join(format!("{}.yaml", base));
            let list_path = rule_set_dir.join(format!("{}.list", base));
            write_file(&yaml_path, &rendered.yaml)?;
            write_file(&list_path, &rendered.list)?;

            if rendered.rule_count > 0 {
                log::info!(
                    "[RULE EXPORT] generated {}, {} ({} rules)",
                    yaml_path.display(),
                    list_path.display(),
                    rendered.rule_count
                );
            } else {
                log::info!(
                    "[RULE EXPORT] generated empty {}, {} (comments only)",
                    yaml_path.display(),
                    list_path.display()
                );
            }

            exported.push(ExportedFile {
                rule_set: rule_set.name.clone(),
                dialect: dialect.file_suffix(),
                yaml_path,
                list_path,
                rule_count: rendered.rule_count,
            });
        }

        Ok(exported)
    }
}

fn write_file(path: &Path, content: &str) -> CoreResult<()> {
    fs::write(path, content).map_err(|source| CoreError::Export {
        path: path.to_path_buf(),
        source,
    })
}
