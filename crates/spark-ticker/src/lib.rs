#![doc = r#"
# spark-ticker

## 设计动机（Why）
- **定位**：提供一个可控的周期时钟源。消费者从容量为 1 的通道读取时间戳，节律可在运行期
  暂停、恢复与调整，而消费者手中的通道始终不变。
- **架构角色**：核心是一个独占底层计时器的控制循环任务，它在“计时器触发”与“控制命令到达”
  之间仲裁，并以非阻塞方式把节拍转发给消费者，慢消费者永远不会拖住生产端。

## 核心契约（What）
- **构造**：[`Ticker::new`] 对零周期 panic；[`Ticker::try_new`] / [`Ticker::with_config`]
  以 [`TickerError`] 报告失败，且失败时不留下任何半初始化的实例；
- **控制**：`stop` / `resume` / `adjust` 只向命令通道入队，周期与计时器仅由控制循环修改；
  `adjust` 对零周期返回 [`TickerError::InvalidDuration`] 并保持原状态；
- **背压**：输出槽位被占用时丢弃最新节拍，不排队、不阻塞；
- **生命周期**：[`Ticker::shutdown`] 或丢弃 [`Ticker`] 都会终止控制循环并释放计时器。

## 实现策略（How）
- 底层计时器抽象为 [`TimerSource`] / [`PeriodicTimer`]，默认实现基于 Tokio `Interval`；
- 控制循环以 `tokio::select!` 有偏轮询关闭信号、命令与计时器；
- 配置经 `serde` + `toml` 加载，日志经 `tracing` 输出。

## 风险与考量（Trade-offs）
- 节拍时机为尽力而为，受运行时调度影响；
- 运行中调用 `resume` 会以相同周期重建计时器，节拍相位随之重置。
"#]

mod command;
mod driver;

/// 配置模型与 TOML 加载。
pub mod config;
/// 错误类型集中声明处。
pub mod error;
/// 全局 tracing 订阅器的安装入口。
pub mod logging;
mod period;
/// 节律器控制面与消费面。
pub mod ticker;
/// 底层计时器抽象与 Tokio 实现。
pub mod timer;

pub use config::{FirstTick, MissedTickPolicy, TickerConfig};
pub use error::{Result, TickerError};
pub use period::Period;
pub use ticker::{Ticker, TickerHandle};
pub use timer::{IntervalSource, IntervalTimer, PeriodicTimer, TimerSource};
