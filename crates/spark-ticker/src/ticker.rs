//! 节律器的公开控制面与消费面。
//!
//! # 教案级说明
//! - **意图 (Why)**：消费者只持有一个容量为 1 的输出通道，暂停、恢复与变速都不会关闭或替换它，
//!   因此“暂时没有节拍”与“不再有节拍”始终可以区分；
//! - **契约 (What)**：
//!   - [`Ticker`] 独占输出通道的读端，同时携带一个 [`TickerHandle`]；
//!   - [`TickerHandle`] 可克隆并跨任务共享，三种控制操作都只是向命令通道入队一条命令，
//!     从不直接改写周期或计时器；
//!   - 命令通道容量为 1，连续快速调用时后一次调用会短暂等待控制循环取走前一条命令；
//! - **生命周期 (How)**：[`Ticker::shutdown`] 显式终止控制循环；直接丢弃 [`Ticker`] 同样会让
//!   控制循环退出并释放底层计时器。

use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use futures::Stream;
use tokio::runtime::Handle;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::command::Command;
use crate::config::TickerConfig;
use crate::driver::{ControlLoop, TickerState};
use crate::error::{Result, TickerError};
use crate::period::Period;
use crate::timer::{IntervalSource, TimerSource};

/// 输出通道容量：至多缓存一个未被消费的节拍。
const TICK_CAPACITY: usize = 1;
/// 命令通道容量：常态下控制操作无需等待。
const COMMAND_CAPACITY: usize = 1;

/// 可暂停、可恢复、可变速的周期时钟源。
///
/// # 教案式注释
/// - **意图 (Why)**：提供与普通周期计时器一致的“从通道读取时间戳”的使用方式，同时允许在运行期
///   停止、恢复与调整周期；
/// - **契约 (What)**：
///   - 节拍值为底层计时器的触发时刻（[`tokio::time::Instant`]）；
///   - 消费者读取过慢时，新的节拍被直接丢弃，通道中至多保留一个最早未读的节拍；
///   - 停止期间通道保持打开，读操作只会等待；仅在控制循环终止后读到 `None`；
/// - **前置条件**：必须在启用了时间驱动（`enable_time`）的 Tokio 运行时上下文中构造；
/// - **注意 (Trade-offs)**：不保证亚周期级的准时性，节拍时机受运行时调度影响。
#[derive(Debug)]
pub struct Ticker {
    ticks: mpsc::Receiver<Instant>,
    handle: TickerHandle,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl Ticker {
    /// 以给定周期创建节律器并立即开始计时。
    ///
    /// # Panics
    /// 周期为零或当前线程不在 Tokio 运行时内时 panic：周期通常来自静态配置，零周期属于编程错误。
    /// 需要以返回值处理的场景请使用 [`Ticker::try_new`]。
    pub fn new(interval: Duration) -> Self {
        match Self::try_new(interval) {
            Ok(ticker) => ticker,
            Err(err) => panic!("Ticker::new: {err}"),
        }
    }

    /// [`Ticker::new`] 的可失败版本；失败时不会留下任何已启动的任务或计时器。
    pub fn try_new(interval: Duration) -> Result<Self> {
        Self::with_source(Period::new(interval)?, IntervalSource::default())
    }

    /// 按配置创建节律器，底层计时器策略取自配置。
    pub fn with_config(config: &TickerConfig) -> Result<Self> {
        Self::with_source(config.interval(), IntervalSource::from_config(config))
    }

    /// 以自定义计时器工厂创建节律器。
    ///
    /// ### 教案式说明
    /// - **契约 (What)**：分配容量均为 1 的输出通道与命令通道，以 `interval` 启动首个计时器，
    ///   在当前运行时上派生控制循环后立即返回；
    /// - **实现 (How)**：先确认运行时可用再创建任何资源，保证失败路径没有副作用。
    pub fn with_source<S: TimerSource>(interval: Period, source: S) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|_| TickerError::RuntimeUnavailable)?;

        let (tick_tx, ticks) = mpsc::channel(TICK_CAPACITY);
        let (command_tx, commands) = mpsc::channel(COMMAND_CAPACITY);
        let (shutdown, shutdown_rx) = oneshot::channel();

        let state = TickerState::start(source, interval);
        let task = runtime.spawn(ControlLoop::new(state, commands, tick_tx, shutdown_rx).run());

        Ok(Self {
            ticks,
            handle: TickerHandle {
                commands: command_tx,
            },
            shutdown: Some(shutdown),
            task: Some(task),
        })
    }

    /// 等待下一个节拍；控制循环终止且缓存为空时返回 `None`。
    pub async fn recv(&mut self) -> Option<Instant> {
        self.ticks.recv().await
    }

    /// 非阻塞读取已缓存的节拍。
    pub fn try_recv(&mut self) -> core::result::Result<Instant, TryRecvError> {
        self.ticks.try_recv()
    }

    pub fn poll_recv(&mut self, cx: &mut Context<'_>) -> Poll<Option<Instant>> {
        self.ticks.poll_recv(cx)
    }

    /// 返回可克隆、可跨任务共享的控制句柄。
    pub fn handle(&self) -> TickerHandle {
        self.handle.clone()
    }

    /// 停止发送节拍，见 [`TickerHandle::stop`]。
    pub async fn stop(&self) {
        self.handle.stop().await;
    }

    /// 恢复发送节拍，见 [`TickerHandle::resume`]。
    pub async fn resume(&self) {
        self.handle.resume().await;
    }

    /// 调整节拍周期，见 [`TickerHandle::adjust`]。
    pub async fn adjust(&self, interval: Duration) -> Result<()> {
        self.handle.adjust(interval).await
    }

    /// 终止控制循环并等待其退出。
    ///
    /// ### 教案式说明
    /// - **契约 (What)**：返回后底层计时器已释放，输出通道写端已关闭；此前已缓存的节拍仍可读出，
    ///   之后 [`Ticker::recv`] 返回 `None`。重复调用无副作用；
    /// - **实现 (How)**：通过控制循环同样在等待的 `oneshot` 发出关闭信号，再 `await` 任务句柄。
    pub async fn shutdown(&mut self) {
        if let Some(signal) = self.shutdown.take() {
            // 控制循环可能已因消费者离开而退出，信号无人接收属正常情况。
            let _ = signal.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(err) = task.await {
                warn!(error = %err, "ticker control loop ended abnormally");
            }
        }
    }
}

impl Stream for Ticker {
    type Item = Instant;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Instant>> {
        self.get_mut().ticks.poll_recv(cx)
    }
}

/// 节律器的控制句柄。
///
/// # 教案式注释
/// - **意图 (Why)**：控制操作与节拍消费往往位于不同任务，句柄只持有命令通道的写端，可任意克隆；
/// - **契约 (What)**：
///   - `stop`/`resume` 永不失败；控制循环终止后调用将被记录并忽略；
///   - `adjust` 对零周期返回 [`TickerError::InvalidDuration`] 且不发送任何命令，现有周期与运行状态
///     保持不变；控制循环终止后返回 [`TickerError::Closed`]；
///   - 命令按入队顺序被控制循环处理；操作返回时命令已入队，但未必已生效；
/// - **注意 (Trade-offs)**：`blocking_*` 系列供同步代码使用，不得在异步上下文中调用。
#[derive(Clone, Debug)]
pub struct TickerHandle {
    commands: mpsc::Sender<Command>,
}

impl TickerHandle {
    /// 停止节拍。已停止时再次调用无副作用。
    pub async fn stop(&self) {
        self.submit(Command::Stop).await;
    }

    /// 以最近一次周期恢复节拍。运行中调用会以相同周期重建计时器。
    pub async fn resume(&self) {
        self.submit(Command::Resume).await;
    }

    /// 修改周期并（必要时）恢复节拍。
    pub async fn adjust(&self, interval: Duration) -> Result<()> {
        let period = Period::new(interval)?;
        self.commands
            .send(Command::AdjustTo(period))
            .await
            .map_err(|_| TickerError::Closed)
    }

    /// [`TickerHandle::stop`] 的同步版本。
    pub fn blocking_stop(&self) {
        self.blocking_submit(Command::Stop);
    }

    /// [`TickerHandle::resume`] 的同步版本。
    pub fn blocking_resume(&self) {
        self.blocking_submit(Command::Resume);
    }

    /// [`TickerHandle::adjust`] 的同步版本。
    pub fn blocking_adjust(&self, interval: Duration) -> Result<()> {
        let period = Period::new(interval)?;
        self.commands
            .blocking_send(Command::AdjustTo(period))
            .map_err(|_| TickerError::Closed)
    }

    /// 控制循环是否已经终止。
    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }

    /// 等待控制循环终止。
    pub async fn closed(&self) {
        self.commands.closed().await;
    }

    async fn submit(&self, command: Command) {
        if self.commands.send(command).await.is_err() {
            debug!(
                command = command.name(),
                "ticker command ignored, control loop has terminated"
            );
        }
    }

    fn blocking_submit(&self, command: Command) {
        if self.commands.blocking_send(command).is_err() {
            debug!(
                command = command.name(),
                "ticker command ignored, control loop has terminated"
            );
        }
    }
}
