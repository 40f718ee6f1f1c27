//! 底层周期计时器的抽象与 Tokio 实现。
//!
//! # 教案级说明
//! - **意图 (Why)**：控制循环把“周期触发”视为外部协作者，只依赖三种能力：以正周期创建、
//!   在自身通道上周期性交付时间戳、停止后不再交付。以 trait 表达这一契约后，生产环境使用
//!   Tokio `Interval`，测试可注入手动触发的计时器；
//! - **契约 (What)**：
//!   - [`TimerSource::start`] 以给定 [`Period`] 创建并启动计时器；
//!   - [`PeriodicTimer::tick`] 返回下一次触发的时间戳，Future 必须满足取消安全：被丢弃后再次调用
//!     不得丢失或重复节拍；
//!   - 停止即丢弃计时器实例，由所有权保证幂等；
//! - **实现 (How)**：[`IntervalSource`] 依据 [`FirstTick`] 选择 `interval` 或 `interval_at`，
//!   并套用 [`MissedTickPolicy`]；周期超过 [`MAX_TIMER_PERIOD`] 时按该上限计时，与 Tokio
//!   `sleep` 对超远截止时间的处理一致，避免时刻加法溢出。

use std::future::Future;
use std::time::Duration;

use tokio::time::{Instant, Interval};

use crate::config::{FirstTick, MissedTickPolicy, TickerConfig};
use crate::period::Period;

/// 底层计时器可表达的最长周期（约 30 年）。
///
/// `Instant` 与周期相加溢出会 panic，而 `Interval` 每次触发后都要计算“上次截止时刻 + 周期”。
/// 更长的合法周期在计时器内部按此上限处理，控制循环记录的周期保持原值。
pub const MAX_TIMER_PERIOD: Duration = Duration::from_secs(86_400 * 365 * 30);

/// 周期计时器：在自身节奏下交付时间戳。
pub trait PeriodicTimer: Send + 'static {
    /// 等待下一次触发并返回其时间戳。
    fn tick(&mut self) -> impl Future<Output = Instant> + Send;
}

/// 计时器工厂：控制循环每次恢复或调整周期时都通过它创建新的计时器。
pub trait TimerSource: Send + 'static {
    type Timer: PeriodicTimer;

    /// 以给定周期创建并启动计时器。
    fn start(&mut self, period: Period) -> Self::Timer;
}

/// 基于 Tokio `Interval` 的计时器工厂。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IntervalSource {
    missed_tick: MissedTickPolicy,
    first_tick: FirstTick,
}

impl IntervalSource {
    pub fn new(missed_tick: MissedTickPolicy, first_tick: FirstTick) -> Self {
        Self {
            missed_tick,
            first_tick,
        }
    }

    /// 从配置中提取计时器策略。
    pub fn from_config(config: &TickerConfig) -> Self {
        Self::new(config.missed_tick(), config.first_tick())
    }
}

impl TimerSource for IntervalSource {
    type Timer = IntervalTimer;

    fn start(&mut self, period: Period) -> IntervalTimer {
        let duration = period.as_duration().min(MAX_TIMER_PERIOD);
        let mut interval = match self.first_tick {
            FirstTick::Delayed => {
                let now = Instant::now();
                tokio::time::interval_at(now.checked_add(duration).unwrap_or(now), duration)
            }
            FirstTick::Immediate => tokio::time::interval(duration),
        };
        interval.set_missed_tick_behavior(self.missed_tick.to_tokio());
        IntervalTimer { interval }
    }
}

/// [`IntervalSource`] 创建的计时器；丢弃即停止。
#[derive(Debug)]
pub struct IntervalTimer {
    interval: Interval,
}

impl PeriodicTimer for IntervalTimer {
    fn tick(&mut self) -> impl Future<Output = Instant> + Send {
        // `Interval::tick` 取消安全。
        self.interval.tick()
    }
}
