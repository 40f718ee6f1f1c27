//! 日志安装入口。
//!
//! # 教案式说明
//! - **意图 (Why)**：库本身只通过 `tracing` 宏发出事件，是否输出、输出到哪里由宿主决定；
//!   对没有自建订阅器的二进制与演示程序，提供一次性安装的便捷入口；
//! - **契约 (What)**：过滤规则优先读取 `RUST_LOG`，缺省为 `info`；外部已设置全局订阅器时返回错误，
//!   不会覆盖；
//! - **实现 (How)**：`tracing-subscriber` 的 `registry + EnvFilter + fmt` 三层组合。

use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;

/// 安装全局 `tracing` 订阅器。
pub fn init_tracing() -> Result<(), SetGlobalDefaultError> {
    let subscriber = tracing_subscriber::registry()
        .with(build_env_filter())
        .with(tracing_subscriber::fmt::layer());
    tracing::subscriber::set_global_default(subscriber)
}

fn build_env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}
