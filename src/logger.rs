//! 日志初始化（env_logger，输出到 stdout）
use env_logger::{Builder, Env, Target};
use once_cell::sync::OnceCell;

static LOGGER: OnceCell<()> = OnceCell::new();

/// 初始化全局日志；`RUST_LOG` 优先于传入的默认级别
/// 重复调用只有第一次生效
pub fn init_logger(default_level: &str) {
    LOGGER.get_or_init(|| {
        let result = Builder::from_env(Env::default().default_filter_or(default_level))
            .target(Target::Stdout)
            .format_timestamp_millis()
            .try_init();
        if let Err(e) = result {
            // 已有其他 logger（如测试框架）时忽略
            eprintln!("logger already initialized: {}", e);
        }
    });
}
