//! # error 模块说明
//!
//! ## 角色定位（Why）
//! - 集中定义节律器对外暴露的错误语义，区分“调用方传参错误”“控制循环已终止”“宿主环境缺失”
//!   与“配置解析失败”四类场景；
//! - 输出通道永远不承载错误，所有失败都以返回值的形式交还给发起控制操作的调用方。
//!
//! ## 设计要求（What）
//! - 所有错误类型派生 `thiserror::Error`，兼容 `std::error::Error` 与 `?` 传播；
//! - `InvalidDuration` 是唯一由常规控制操作产生的错误，出现时节律器状态保持不变；
//! - 构造期的非法参数在 [`Ticker::new`](crate::Ticker::new) 中以 panic 呈现，在
//!   [`Ticker::try_new`](crate::Ticker::try_new) 中以本枚举呈现。

use thiserror::Error;

/// 节律器错误域。
///
/// # 教案式说明
/// - **意图 (Why)**：为构造、调整与配置加载提供统一的可恢复错误表示；
/// - **契约 (What)**：
///   - `InvalidDuration`：周期为零（`Duration` 无负值，零即“非正”）；调用方可修正后重试；
///   - `Closed`：控制循环已经退出（显式 `shutdown` 或 `Ticker` 被丢弃）；
///   - `RuntimeUnavailable`：构造时当前线程未处于 Tokio 运行时上下文；
///   - `Config`：TOML 配置无法解析；
/// - **设计权衡 (Trade-offs)**：`Config` 直接包裹 `toml::de::Error` 以保留行列信息，因此本枚举不实现
///   `Clone`/`PartialEq`，测试请使用 `matches!` 断言。
#[derive(Debug, Error)]
pub enum TickerError {
    /// 周期为零。
    #[error("non-positive interval provided")]
    InvalidDuration,

    /// 控制循环已终止，命令无法再被处理。
    #[error("ticker control loop has terminated")]
    Closed,

    /// 构造时没有可用的 Tokio 运行时承载控制循环。
    #[error("no Tokio runtime is available to host the ticker control loop")]
    RuntimeUnavailable,

    /// 配置文本不是合法的节律器 TOML。
    #[error("invalid ticker configuration: {0}")]
    Config(#[from] toml::de::Error),
}

/// crate 内统一使用的 `Result` 别名。
pub type Result<T, E = TickerError> = core::result::Result<T, E>;
