//! 规则源解析：把配置里的 URL / 文件 / 目录 / 手工规则解析为可加载的来源
//! 不做任何网络请求，URL 只映射到本地缓存路径
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use url::Url;
use walkdir::WalkDir;

use crate::config::{RuleSetConfig, RuleSetsConfig};
use crate::error::RefineryResult;

/// 目录展开时收录的规则文件扩展名
const RULE_FILE_EXTENSIONS: [&str; 5] = ["list", "yaml", "yml", "txt", "conf"];

/// 可加载的规则来源
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleSource {
    /// 本地文件（含 URL 缓存文件）
    File(PathBuf),
    /// 配置内的手工规则
    Inline(Vec<String>),
}

/// 单个规则集的解析结果
#[derive(Debug, Clone, Default)]
pub struct ResolvedRuleSet {
    pub name: String,
    pub sources: Vec<RuleSource>,
    pub filters: Vec<String>,
    pub excludes: Vec<String>,
}

impl ResolvedRuleSet {
    pub fn file_count(&self) -> usize {
        self.sources
            .iter()
            .filter(|s| matches!(s, RuleSource::File(_)))
            .count()
    }
}

/// 规则源解析器
/// 来源一旦被某个规则集收录（或被 exclude_sources 声明）即视为已认领，后续规则集不再收录
pub struct RulesLoader<'a> {
    config: &'a RuleSetsConfig,
    cache_dir: PathBuf,
    claimed: HashSet<String>,
}

impl<'a> RulesLoader<'a> {
    pub fn new(config: &'a RuleSetsConfig, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            config,
            cache_dir: cache_dir.into(),
            claimed: HashSet::new(),
        }
    }

    /// 按名称顺序解析全部规则集
    pub fn resolve_all(&mut self) -> Vec<ResolvedRuleSet> {
        log::info!(
            "[RULE LOAD] resolving {} rule sets",
            self.config.classified_rules.len()
        );
        let config = self.config;
        let resolved: Vec<ResolvedRuleSet> = config
            .classified_rules
            .iter()
            .map(|(name, rule_set)| self.resolve(name, rule_set))
            .collect();

        let files: usize = resolved.iter().map(ResolvedRuleSet::file_count).sum();
        log::info!(
            "[RULE LOAD] resolved {} rule sets, {} source files",
            resolved.len(),
            files
        );
        resolved
    }

    /// 解析单个规则集
    pub fn resolve(&mut self, name: &str, rule_set: &RuleSetConfig) -> ResolvedRuleSet {
        log::info!(
            "[RULE LOAD] {} ({}) sources: {} (URLs: {}, Files: {}, Rules: {})",
            name,
            rule_set.description,
            rule_set.source_count(),
            rule_set.urls.len(),
            rule_set.files.len(),
            rule_set.rules.len()
        );

        // 先认领排除项
        for exclude in &rule_set.exclude_sources {
            self.claim(exclude);
            log::debug!("[RULE LOAD]   excluded source: {}", exclude);
        }

        let mut sources = Vec::new();

        for (i, url) in rule_set.urls.iter().enumerate() {
            if self.is_claimed(url) {
                log::info!("[RULE LOAD]   URL {} already claimed, skipped: {}", i + 1, url);
                continue;
            }
            match self.cached_url_path(name, url, i) {
                Ok(path) if path.is_file() => {
                    log::debug!("[RULE LOAD]   URL {} -> cache {}", i + 1, path.display());
                    self.claim(url);
                    sources.push(RuleSource::File(path));
                }
                Ok(path) => {
                    log::warn!(
                        "[RULE LOAD]   URL {} not cached at {}, skipped: {}",
                        i + 1,
                        path.display(),
                        url
                    );
                }
                Err(e) => log::warn!("[RULE LOAD]   URL {} skipped: {}", i + 1, e),
            }
        }

        for (i, file) in rule_set.files.iter().enumerate() {
            if self.is_claimed(file) {
                log::info!("[RULE LOAD]   file {} already claimed, skipped: {}", i + 1, file);
                continue;
            }
            let path = Path::new(file);
            if path.is_dir() {
                let found = self.walk_rule_dir(path);
                log::debug!("[RULE LOAD]   dir {} -> {} files", file, found.len());
                sources.extend(found.into_iter().map(RuleSource::File));
                self.claim(file);
            } else if path.is_file() {
                sources.push(RuleSource::File(path.to_path_buf()));
                self.claim(file);
            } else {
                log::warn!("[RULE LOAD]   file {} does not exist, skipped: {}", i + 1, file);
            }
        }

        let manual: Vec<String> = rule_set
            .rules
            .iter()
            .map(|r| r.trim())
            .filter(|r| !r.is_empty())
            .map(str::to_string)
            .collect();
        if !manual.is_empty() {
            log::debug!("[RULE LOAD]   manual rules: {}", manual.len());
            sources.push(RuleSource::Inline(manual));
        }

        ResolvedRuleSet {
            name: name.to_string(),
            sources,
            filters: rule_set.filters.clone(),
            excludes: rule_set.excludes.clone(),
        }
    }

    /// URL → `<cache_dir>/<rule_set>/[<owner>/<repo>/]<basename>`
    /// owner/repo 只对 github 系主机生效
    pub fn cached_url_path(&self, rule_set_name: &str, raw_url: &str, index: usize) -> RefineryResult<PathBuf> {
        let url = Url::parse(raw_url.trim())?;

        let segments: Vec<&str> = url
            .path_segments()
            .map(|s| s.filter(|seg| !seg.is_empty()).collect())
            .unwrap_or_default();

        let file_name = segments
            .last()
            .map(|s| s.to_string())
            .unwrap_or_else(|| format!("source_{}.list", index + 1));

        let mut path = self.cache_dir.join(rule_set_name);
        let is_github = url.host_str().is_some_and(|h| h.contains("github"));
        if is_github && segments.len() >= 2 {
            path.push(segments[0]);
            path.push(segments[1]);
        }
        path.push(file_name);
        Ok(path)
    }

    fn walk_rule_dir(&mut self, dir: &Path) -> Vec<PathBuf> {
        let mut found = Vec::new();
        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("[RULE LOAD]   walk {} failed: {}", dir.display(), e);
                    continue;
                }
            };
            if !entry.file_type().is_file() || !has_rule_extension(entry.path()) {
                continue;
            }
            let path = entry.into_path();
            let key = path.to_string_lossy().to_string();
            if self.is_claimed(&key) {
                log::debug!("[RULE LOAD]   {} already claimed, skipped", path.display());
                continue;
            }
            self.claim(&key);
            found.push(path);
        }
        found
    }

    fn is_claimed(&self, source: &str) -> bool {
        self.claimed.contains(&source_key(source))
    }

    fn claim(&mut self, source: &str) {
        self.claimed.insert(source_key(source));
    }
}

fn has_rule_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| RULE_FILE_EXTENSIONS.iter().any(|ext| e.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

/// 来源去重键：URL 原样，本地路径去掉 `.` 段与多余分隔符
fn source_key(source: &str) -> String {
    let source = source.trim();
    if source.contains("://") {
        return source.to_string();
    }
    Path::new(source)
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect::<PathBuf>()
        .to_string_lossy()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn rule_set(files: Vec<String>, urls: Vec<String>, rules: Vec<&str>) -> RuleSetConfig {
        RuleSetConfig {
            files,
            urls,
            rules: rules.into_iter().map(String::from).collect(),
            ..Default::default()
        }
    }

    fn s(path: &Path) -> String {
        path.to_string_lossy().to_string()
    }

    #[test]
    fn test_source_key_normalizes_local_paths() {
        assert_eq!(source_key("./rules//a.list"), source_key("rules/a.list"));
        assert_eq!(source_key("https://x/a.list"), "https://x/a.list");
    }

    #[test]
    fn test_github_url_cache_path() {
        let config = RuleSetsConfig::default();
        let loader = RulesLoader::new(&config, "/cache");
        let path = loader
            .cached_url_path(
                "google",
                "https://raw.githubusercontent.com/owner/repo/main/rule/Google.list",
                0,
            )
            .unwrap();
        assert_eq!(path, PathBuf::from("/cache/google/owner/repo/Google.list"));

        let plain = loader
            .cached_url_path("google", "https://example.com/rules/g.yaml", 0)
            .unwrap();
        assert_eq!(plain, PathBuf::from("/cache/google/g.yaml"));

        let bare = loader.cached_url_path("google", "https://example.com/", 2).unwrap();
        assert_eq!(bare, PathBuf::from("/cache/google/source_3.list"));

        assert!(loader.cached_url_path("google", "not a url", 0).is_err());
    }

    #[test]
    fn test_cached_url_used_and_missing_url_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let cached = dir.path().join("g/a.list");
        fs::create_dir_all(cached.parent().unwrap()).unwrap();
        fs::write(&cached, "DOMAIN,a.com\n").unwrap();

        let config = RuleSetsConfig::default();
        let mut loader = RulesLoader::new(&config, dir.path());
        let resolved = loader.resolve(
            "g",
            &rule_set(
                vec![],
                vec!["https://example.com/a.list".into(), "https://example.com/b.list".into()],
                vec![],
            ),
        );
        assert_eq!(resolved.sources, vec![RuleSource::File(cached)]);
    }

    #[test]
    fn test_directory_walk_and_claims() {
        let dir = tempfile::tempdir().unwrap();
        let rules_dir = dir.path().join("rules");
        fs::create_dir_all(rules_dir.join("nested")).unwrap();
        fs::write(rules_dir.join("b.list"), "DOMAIN,b.com").unwrap();
        fs::write(rules_dir.join("a.yaml"), "payload:").unwrap();
        fs::write(rules_dir.join("nested/c.txt"), "DOMAIN,c.com").unwrap();
        fs::write(rules_dir.join("readme.md"), "# docs").unwrap();
        fs::write(rules_dir.join("old.list"), "DOMAIN,old.com").unwrap();

        let mut config = RuleSetsConfig::default();
        let mut first = rule_set(vec![s(&rules_dir)], vec![], vec![" DOMAIN,x.com ", ""]);
        first.exclude_sources = vec![s(&rules_dir.join("old.list"))];
        config.classified_rules.insert("a_first".into(), first);
        // 同一个文件被后面的规则集再次引用时应被跳过
        config.classified_rules.insert(
            "b_second".into(),
            rule_set(vec![s(&rules_dir.join("b.list"))], vec![], vec!["DOMAIN,y.com"]),
        );

        let mut loader = RulesLoader::new(&config, dir.path().join("cache"));
        let resolved = loader.resolve_all();
        assert_eq!(resolved.len(), 2);

        let first = &resolved[0];
        assert_eq!(first.name, "a_first");
        assert_eq!(
            first.sources,
            vec![
                RuleSource::File(rules_dir.join("a.yaml")),
                RuleSource::File(rules_dir.join("b.list")),
                RuleSource::File(rules_dir.join("nested/c.txt")),
                RuleSource::Inline(vec!["DOMAIN,x.com".into()]),
            ]
        );

        let second = &resolved[1];
        assert_eq!(second.sources, vec![RuleSource::Inline(vec!["DOMAIN,y.com".into()])]);
    }

    #[test]
    fn test_missing_file_skipped() {
        let config = RuleSetsConfig::default();
        let mut loader = RulesLoader::new(&config, "/cache");
        let resolved = loader.resolve(
            "x",
            &rule_set(vec!["/definitely/not/here.list".into()], vec![], vec![]),
        );
        assert!(resolved.sources.is_empty());
    }
}
