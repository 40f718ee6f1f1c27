//! 控制循环：节律器唯一的可变状态持有者。
//!
//! # 教案级导览
//!
//! - **Why**：周期、底层计时器与输出通道的写端只属于控制循环任务，调用方只能通过命令通道
//!   表达意图，所有状态跃迁都在同一个任务内串行完成，无需任何锁；
//! - **What**：每轮循环只等待一个事件：关闭信号、控制命令或计时器触发。命令先于计时器被轮询，
//!   保证排队中的命令不会被高频节拍饿死；
//! - **How**：状态跃迁抽离为 [`TickerState`]，与通道无关，便于以模型测试覆盖任意命令序列；
//!   [`ControlLoop`] 负责 `select!` 与节拍发布。

use std::ops::ControlFlow;

use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::command::Command;
use crate::period::Period;
use crate::timer::{PeriodicTimer, TimerSource};

/// Running / Stopped 两态状态机。
///
/// # 教案式注释
/// - **契约 (What)**：
///   - `timer` 为 `Some` 即 Running，为 `None` 即 Stopped；
///   - `interval` 在 Stopped 期间保留最近一次取值，供 `Resume` 复用；
///   - 处理任何命令前都先停止现存计时器，避免遗留一个无人读取的活动计时器；
/// - **注意 (Trade-offs)**：已处于 Running 时的 `Resume` 会以相同周期重建计时器，节拍相位随之重置。
pub(crate) struct TickerState<S: TimerSource> {
    source: S,
    interval: Period,
    timer: Option<S::Timer>,
}

impl<S: TimerSource> TickerState<S> {
    /// 以初始周期启动计时器，初始状态为 Running。
    pub(crate) fn start(mut source: S, interval: Period) -> Self {
        let timer = source.start(interval);
        Self {
            source,
            interval,
            timer: Some(timer),
        }
    }

    pub(crate) fn apply(&mut self, command: Command) {
        self.halt();
        match command {
            Command::Stop => {}
            Command::Resume => self.arm(),
            Command::AdjustTo(period) => {
                self.interval = period;
                self.arm();
            }
        }
    }

    /// 停止底层计时器；重复调用无副作用。
    pub(crate) fn halt(&mut self) {
        self.timer.take();
    }

    fn arm(&mut self) {
        self.timer = Some(self.source.start(self.interval));
    }

    pub(crate) fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    pub(crate) fn interval(&self) -> Period {
        self.interval
    }
}

enum Event {
    Shutdown,
    Command(Command),
    Fired(Instant),
}

/// 控制循环任务体。
pub(crate) struct ControlLoop<S: TimerSource> {
    state: TickerState<S>,
    commands: mpsc::Receiver<Command>,
    ticks: mpsc::Sender<Instant>,
    shutdown: oneshot::Receiver<()>,
    dropped: u64,
}

impl<S: TimerSource> ControlLoop<S> {
    pub(crate) fn new(
        state: TickerState<S>,
        commands: mpsc::Receiver<Command>,
        ticks: mpsc::Sender<Instant>,
        shutdown: oneshot::Receiver<()>,
    ) -> Self {
        Self {
            state,
            commands,
            ticks,
            shutdown,
            dropped: 0,
        }
    }

    /// 运行直至收到关闭信号、`Ticker` 被丢弃或消费者离开。
    ///
    /// 退出时释放底层计时器并丢弃输出通道写端，消费者随后读到 `None`。
    pub(crate) async fn run(mut self) {
        debug!(interval = %self.state.interval(), "ticker control loop started");
        loop {
            let event = tokio::select! {
                biased;
                _ = &mut self.shutdown => Event::Shutdown,
                command = self.commands.recv() => match command {
                    Some(command) => Event::Command(command),
                    None => Event::Shutdown,
                },
                at = next_fire(self.state.timer.as_mut()) => Event::Fired(at),
            };

            match event {
                Event::Shutdown => break,
                Event::Command(command) => {
                    self.state.apply(command);
                    debug!(
                        command = command.name(),
                        interval = %self.state.interval(),
                        running = self.state.is_running(),
                        "ticker command applied"
                    );
                }
                Event::Fired(at) => {
                    if self.publish(at).is_break() {
                        break;
                    }
                }
            }
        }
        self.state.halt();
        debug!(dropped = self.dropped, "ticker control loop terminated");
    }

    /// 非阻塞发布：槽位空闲则写入，已占用则丢弃最新节拍。
    fn publish(&mut self, at: Instant) -> ControlFlow<()> {
        match self.ticks.try_send(at) {
            Ok(()) => ControlFlow::Continue(()),
            Err(mpsc::error::TrySendError::Full(_)) => {
                self.dropped += 1;
                trace!(
                    dropped = self.dropped,
                    "tick dropped, consumer has not drained the previous one"
                );
                ControlFlow::Continue(())
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                debug!("tick consumer is gone");
                ControlFlow::Break(())
            }
        }
    }
}

async fn next_fire<T: PeriodicTimer>(timer: Option<&mut T>) -> Instant {
    match timer {
        Some(timer) => timer.tick().await,
        // Stopped：没有活动计时器，此分支永不就绪。
        None => std::future::pending().await,
    }
}
