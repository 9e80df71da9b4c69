//! 全局错误类型定义
use std::io::Error as IoError;
use std::path::PathBuf;

use rulerefinery_engine::CoreError;
use serde_json::Error as SerdeJsonError;
use serde_yaml::Error as SerdeYamlError;
use thiserror::Error;
use url::ParseError as UrlParseError;

#[derive(Error, Debug)]
pub enum RefineryError {
    // 配置相关错误
    #[error("配置文件读取失败 {}：{source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: IoError,
    },
    #[error("配置文件解析失败 {}：{source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: SerdeYamlError,
    },
    #[error("规则配置验证失败：{0}")]
    InvalidConfig(String),

    // 规则源相关错误
    #[error("URL解析失败：{0}")]
    UrlError(#[from] UrlParseError),

    // 内核错误
    #[error(transparent)]
    Core(#[from] CoreError),

    // 序列化错误
    #[error("JSON序列化失败：{0}")]
    JsonError(#[from] SerdeJsonError),

    // 基础错误
    #[error("IO操作失败：{0}")]
    IoError(#[from] IoError),
}

// 全局Result类型
pub type RefineryResult<T> = Result<T, RefineryError>;
