//! glob 匹配能力边界
//! 过滤引擎只依赖 `GlobMatcher`，具体的 glob 实现可替换
use std::sync::Mutex;

use globset::{GlobBuilder, GlobMatcher as CompiledGlob};
use rustc_hash::FxHashMap;

use crate::error::{CoreError, CoreResult};

/// glob 匹配接口
pub trait GlobMatcher: Send + Sync {
    /// 模式非法时返回 `InvalidGlob`
    fn matches(&self, pattern: &str, candidate: &str) -> CoreResult<bool>;
}

/// 基于 `globset` 的默认实现
/// - `*` / `?` 不跨越 `/`
/// - 独占一段的 `**` 跨段匹配，段内的 `**` 退化为 `*`
/// - 支持 `{a,b}` 分支、`[!..]` / `[^..]` 取反字符类、`\` 转义
#[derive(Default)]
pub struct GlobPatternMatcher {
    // 编译缓存：原始模式 → 编译结果（失败原因也缓存，避免重复编译）
    cache: Mutex<FxHashMap<String, Result<CompiledGlob, String>>>,
}

impl GlobPatternMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    fn compile(pattern: &str) -> Result<CompiledGlob, String> {
        GlobBuilder::new(&collapse_inner_double_star(pattern))
            .literal_separator(true)
            .backslash_escape(true)
            .case_insensitive(false)
            .build()
            .map(|glob| glob.compile_matcher())
            .map_err(|e| e.to_string())
    }
}

impl GlobMatcher for GlobPatternMatcher {
    fn matches(&self, pattern: &str, candidate: &str) -> CoreResult<bool> {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        let compiled = cache
            .entry(pattern.to_string())
            .or_insert_with(|| Self::compile(pattern));

        match compiled {
            Ok(glob) => Ok(glob.is_match(candidate)),
            Err(reason) => Err(CoreError::InvalidGlob {
                pattern: pattern.to_string(),
                reason: reason.clone(),
            }),
        }
    }
}

/// 非整段的 `**`（如 `DOMAIN,**google**`）折叠为单个 `*`
fn collapse_inner_double_star(pattern: &str) -> String {
    pattern
        .split('/')
        .map(|segment| {
            if segment == "**" || !segment.contains("**") {
                return segment.to_string();
            }
            let mut out = String::with_capacity(segment.len());
            let mut prev_star = false;
            for ch in segment.chars() {
                if ch == '*' {
                    if !prev_star {
                        out.push(ch);
                    }
                    prev_star = true;
                } else {
                    out.push(ch);
                    prev_star = false;
                }
            }
            out
        })
        .collect::<Vec<_>>()
        .join("/")
}
