use crate::period::Period;

/// 发往控制循环的控制命令。
///
/// # 教案式注释
/// - **意图 (Why)**：三类控制意图以带标签的枚举区分，取代“负值=停止、零=恢复、正值=调整”
///   的哨兵编码，让控制循环按变体分派而非按数值符号猜测；
/// - **契约 (What)**：
///   - `Stop`：停止当前底层计时器，进入 Stopped；
///   - `Resume`：以最近一次周期重建计时器，进入 Running；
///   - `AdjustTo`：更新周期并重建计时器，同时承担“恢复”与“变速”；
/// - **注意 (Trade-offs)**：命令只由公开控制面构造，`AdjustTo` 携带的 [`Period`] 已保证大于零。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Command {
    Stop,
    Resume,
    AdjustTo(Period),
}

impl Command {
    /// 用于日志字段的稳定名称。
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Command::Stop => "stop",
            Command::Resume => "resume",
            Command::AdjustTo(_) => "adjust",
        }
    }
}
