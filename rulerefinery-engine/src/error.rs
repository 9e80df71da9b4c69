//! rulerefinery-engine 内核错误定义
//! 封装内核层所有核心错误，与业务层错误解耦，基于thiserror实现类型安全处理
use std::io::Error as IoError;
use std::path::PathBuf;

use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// 内核核心错误枚举
#[derive(Error, Debug)]
pub enum CoreError {
    // ===================== 规则解析错误 =====================
    /// 规则行格式非法（缺少类型或载荷），调用方记录后跳过该行
    #[error("invalid rule format: {line}")]
    MalformedLine { line: String },

    // ===================== 规则集错误 =====================
    /// 规则集从未被加载过，不允许挂载过滤器
    #[error("rule set '{0}' does not exist")]
    UnknownRuleSet(String),

    /// 规则文件无法打开（单文件级错误，调用方决定是否继续）
    #[error("failed to open rule file {}: {source}", path.display())]
    RuleFileOpen {
        path: PathBuf,
        #[source]
        source: IoError,
    },

    // ===================== 过滤错误 =====================
    /// glob 模式非法
    #[error("invalid glob pattern '{pattern}': {reason}")]
    InvalidGlob { pattern: String, reason: String },

    // ===================== 导出错误 =====================
    /// 导出阶段文件系统错误（目录/文件创建、写入失败），整个导出中止
    #[error("export failed at {}: {source}", path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: IoError,
    },

    // ===================== 基础错误 =====================
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] SerdeJsonError),
}

/// 内核层全局Result类型别名
pub type CoreResult<T> = Result<T, CoreError>;
